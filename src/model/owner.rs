use super::Language;
use crate::validation::{
    validate_custom, validate_dpm_code_content, validate_length, Validatable, ValidatableInfo,
    ValidationResults,
};

/// Publishing organisation of a dictionary: naming, XBRL prefix and accepted languages.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Owner {
    pub name: String,
    pub namespace: String,
    pub prefix: String,
    pub location: String,
    pub copyright: String,
    pub languages: Vec<Language>,
    pub default_language: Language,
}

impl Validatable for Owner {
    fn validatable_info(&self) -> ValidatableInfo {
        ValidatableInfo {
            object_kind: "Owner".into(),
            object_address: self.prefix.clone(),
        }
    }

    fn validate(&self, results: &mut ValidationResults) {
        validate_length(results, self, "name", self.name.as_str(), 1, 500);
        validate_length(results, self, "namespace", self.namespace.as_str(), 1, 500);
        validate_length(results, self, "prefix", self.prefix.as_str(), 1, 50);
        validate_dpm_code_content(results, self, "prefix", &self.prefix);
        validate_length(results, self, "location", self.location.as_str(), 1, 500);
        validate_length(results, self, "copyright", self.copyright.as_str(), 1, 500);
        validate_length(results, self, "languages", &self.languages, 1, 50);
        validate_custom(
            results,
            self,
            "defaultLanguage",
            !self.languages.contains(&self.default_language),
            || {
                format!(
                    "language '{}' is not among the owner languages",
                    self.default_language
                )
            },
        );
    }
}

use super::{element_info, validate_dpm_element, Concept, DpmElement, DpmElementKind};
use crate::validation::{
    validate_dpm_code_content, validate_length, Validatable, ValidatableInfo, ValidationResults,
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Member {
    pub uri: String,
    pub concept: Concept,
    pub member_code: String,
    pub default_member: bool,
}

impl DpmElement for Member {
    fn uri(&self) -> &str {
        &self.uri
    }

    fn concept(&self) -> &Concept {
        &self.concept
    }

    fn kind(&self) -> DpmElementKind {
        DpmElementKind::Member
    }

    fn code(&self) -> &str {
        &self.member_code
    }
}

impl Validatable for Member {
    fn validatable_info(&self) -> ValidatableInfo {
        element_info(self)
    }

    fn validate(&self, results: &mut ValidationResults) {
        validate_dpm_element(results, self);
        validate_length(results, self, "memberCode", self.member_code.as_str(), 1, 50);
        validate_dpm_code_content(results, self, "memberCode", &self.member_code);
    }
}

#[cfg(test)]
mod tests {
    use crate::model::test_support::*;

    #[test]
    fn valid_member_has_no_violations() {
        assert!(messages(&member("M1")).is_empty());
    }

    #[test]
    fn member_code_must_be_legal_dpm_code() {
        let mut m = member("M1");
        m.member_code = "1 bad".into();
        assert_eq!(messages(&m), vec!["Member.memberCode: is illegal DPM Code"]);
    }

    #[test]
    fn member_label_needs_a_translation() {
        let mut m = member("M1");
        m.concept = m
            .concept
            .clone()
            .with_texts(crate::model::TranslatedText::empty(), crate::model::TranslatedText::empty());
        assert_eq!(
            messages(&m),
            vec!["Concept.label: has too few translations (minimum 1)"]
        );
    }
}

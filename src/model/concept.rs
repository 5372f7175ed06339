use std::sync::Arc;

use chrono::{DateTime, NaiveDate, Utc};

use super::{Owner, TranslatedText};
use crate::validation::{
    validate_custom, validate_translated_text, TranslatedTextPolicy, Validatable, ValidatableInfo,
    ValidationResults,
};

/// Descriptive metadata shared by every DPM element.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Concept {
    pub created_at: DateTime<Utc>,
    pub modified_at: DateTime<Utc>,
    pub applicable_from: Option<NaiveDate>,
    pub applicable_until: Option<NaiveDate>,
    pub label: TranslatedText,
    pub description: TranslatedText,
    pub owner: Arc<Owner>,
}

impl Concept {
    /// Builds a concept whose texts default to the owner's default language.
    pub fn new(
        created_at: DateTime<Utc>,
        modified_at: DateTime<Utc>,
        applicable_from: Option<NaiveDate>,
        applicable_until: Option<NaiveDate>,
        label: TranslatedText,
        description: TranslatedText,
        owner: Arc<Owner>,
    ) -> Self {
        let default_language = owner.default_language;
        Self {
            created_at,
            modified_at,
            applicable_from,
            applicable_until,
            label: label.with_default_language(default_language),
            description: description.with_default_language(default_language),
            owner,
        }
    }

    pub fn with_texts(self, label: TranslatedText, description: TranslatedText) -> Self {
        let default_language = self.owner.default_language;
        Self {
            label: label.with_default_language(default_language),
            description: description.with_default_language(default_language),
            ..self
        }
    }

    pub fn diagnostic_label(&self) -> String {
        self.label.default_text().unwrap_or_default().to_string()
    }
}

impl Validatable for Concept {
    fn validatable_info(&self) -> ValidatableInfo {
        ValidatableInfo {
            object_kind: "Concept".into(),
            object_address: self.diagnostic_label(),
        }
    }

    fn validate(&self, results: &mut ValidationResults) {
        validate_custom(
            results,
            self,
            "modifiedAt",
            self.modified_at < self.created_at,
            || "is earlier than createdAt".to_string(),
        );

        validate_custom(
            results,
            self,
            "applicableUntil",
            matches!(
                (self.applicable_from, self.applicable_until),
                (Some(from), Some(until)) if until < from
            ),
            || "is earlier than applicableFrom".to_string(),
        );

        validate_translated_text(
            results,
            self,
            "label",
            &self.label,
            TranslatedTextPolicy {
                min_lang_count: 1,
                min_translation_length: Some(1),
                accepted_languages: Some(&self.owner.languages),
            },
        );

        validate_translated_text(
            results,
            self,
            "description",
            &self.description,
            TranslatedTextPolicy {
                min_lang_count: 0,
                min_translation_length: None,
                accepted_languages: Some(&self.owner.languages),
            },
        );
    }
}

//! Validation framework for the DPM model.
//!
//! Every model type implements [`Validatable`]: it appends violations into a
//! [`ValidationResults`] collector instead of failing on the first problem, so a single
//! call on a composite (for example a whole dictionary) surfaces every violation in the tree.
//!
//! The reusable rules live in [`validators`]; model types compose them in their
//! `validate` implementations and recurse into their children.

pub mod validators;

pub use validators::{
    validate_custom, validate_custom_messages, validate_dpm_code_content,
    validate_element_value_unique, validate_length, validate_non_blank_uri,
    validate_referenced_values_contained, validate_translated_text, Measurable,
    TranslatedTextPolicy,
};

use std::fmt;

/// Kind and address of the object handed to a top-level validation call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidatableInfo {
    pub object_kind: String,
    pub object_address: String,
}

/// One violation, attributed to the object and property that caused it.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct ValidationResult {
    pub object_kind: String,
    pub object_address: String,
    pub property: String,
    pub message: String,
}

impl fmt::Display for ValidationResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}: {}", self.object_kind, self.property, self.message)
    }
}

pub trait Validatable {
    /// Entity kind and identifying address used when attributing violations.
    fn validatable_info(&self) -> ValidatableInfo;

    fn validate(&self, results: &mut ValidationResults);
}

/// Accumulates violations during one validation pass.
#[derive(Debug, Default)]
pub struct ValidationResults {
    results: Vec<ValidationResult>,
}

impl ValidationResults {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, subject: &dyn Validatable, property: &str, message: impl Into<String>) {
        let info = subject.validatable_info();
        self.results.push(ValidationResult {
            object_kind: info.object_kind,
            object_address: info.object_address,
            property: property.to_string(),
            message: message.into(),
        });
    }

    pub fn is_empty(&self) -> bool {
        self.results.is_empty()
    }

    pub fn len(&self) -> usize {
        self.results.len()
    }

    /// Final, ordered and de-duplicated list of violations.
    pub fn compile_results(mut self) -> Vec<ValidationResult> {
        self.results.sort();
        self.results.dedup();
        self.results
    }
}

/// Runs a full validation pass over `subject` and returns the compiled violations.
pub fn collect_violations(subject: &dyn Validatable) -> Vec<ValidationResult> {
    let mut results = ValidationResults::new();
    subject.validate(&mut results);
    results.compile_results()
}

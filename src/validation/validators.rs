use std::collections::{HashMap, HashSet};
use std::fmt::Display;
use std::hash::Hash;
use std::sync::OnceLock;

use regex::Regex;

use super::{Validatable, ValidationResults};
use crate::model::{Language, TranslatedText};

/// Anything whose length can be bounded: strings by characters, collections by items.
pub trait Measurable {
    fn measure(&self) -> usize;
}

impl Measurable for str {
    fn measure(&self) -> usize {
        self.chars().count()
    }
}

impl Measurable for String {
    fn measure(&self) -> usize {
        self.as_str().measure()
    }
}

impl<T> Measurable for [T] {
    fn measure(&self) -> usize {
        self.len()
    }
}

impl<T> Measurable for Vec<T> {
    fn measure(&self) -> usize {
        self.len()
    }
}

pub fn validate_length<M: Measurable + ?Sized>(
    results: &mut ValidationResults,
    subject: &dyn Validatable,
    property: &str,
    value: &M,
    min: usize,
    max: usize,
) {
    let length = value.measure();
    if length < min {
        results.add(subject, property, format!("is too short (minimum {min})"));
    } else if length > max {
        results.add(subject, property, format!("is too long (maximum {max})"));
    }
}

pub fn validate_custom(
    results: &mut ValidationResults,
    subject: &dyn Validatable,
    property: &str,
    fail_if: bool,
    message: impl FnOnce() -> String,
) {
    if fail_if {
        results.add(subject, property, message());
    }
}

/// Runs `check`, which may push any number of messages; each becomes a violation.
pub fn validate_custom_messages(
    results: &mut ValidationResults,
    subject: &dyn Validatable,
    property: &str,
    check: impl FnOnce(&mut Vec<String>),
) {
    let mut messages = Vec::new();
    check(&mut messages);
    for message in messages {
        results.add(subject, property, message);
    }
}

fn dpm_code_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"^[A-Za-z_:][A-Za-z0-9._:\-]*$").expect("DPM code pattern is valid")
    })
}

pub fn is_legal_dpm_code(code: &str) -> bool {
    dpm_code_pattern().is_match(code)
}

pub fn validate_dpm_code_content(
    results: &mut ValidationResults,
    subject: &dyn Validatable,
    property: &str,
    code: &str,
) {
    if !is_legal_dpm_code(code) {
        results.add(subject, property, "is illegal DPM Code");
    }
}

pub fn validate_non_blank_uri(
    results: &mut ValidationResults,
    subject: &dyn Validatable,
    property: &str,
    uri: &str,
) {
    if uri.trim().is_empty() {
        results.add(subject, property, "empty or blank uri");
    }
}

/// Translation count, per-translation length and language restrictions for a text.
#[derive(Debug, Clone, Copy, Default)]
pub struct TranslatedTextPolicy<'a> {
    pub min_lang_count: usize,
    pub min_translation_length: Option<usize>,
    pub accepted_languages: Option<&'a [Language]>,
}

pub fn validate_translated_text(
    results: &mut ValidationResults,
    subject: &dyn Validatable,
    property: &str,
    text: &TranslatedText,
    policy: TranslatedTextPolicy<'_>,
) {
    if text.translations().len() < policy.min_lang_count {
        results.add(
            subject,
            property,
            format!(
                "has too few translations (minimum {})",
                policy.min_lang_count
            ),
        );
    }

    for (language, translation) in text.translations() {
        if let Some(min_length) = policy.min_translation_length {
            if translation.measure() < min_length {
                results.add(
                    subject,
                    property,
                    format!(
                        "has too short translation for language '{}' (minimum {min_length})",
                        language.iso_code()
                    ),
                );
            }
        }

        if let Some(accepted) = policy.accepted_languages {
            if !accepted.contains(language) {
                results.add(
                    subject,
                    property,
                    format!(
                        "contains translation in unsupported language '{}'",
                        language.iso_code()
                    ),
                );
            }
        }
    }
}

/// Reports every value produced more than once by `selector`, once per value.
pub fn validate_element_value_unique<T, K>(
    results: &mut ValidationResults,
    subject: &dyn Validatable,
    property: &str,
    items: impl IntoIterator<Item = T>,
    selector: impl Fn(&T) -> K,
    value_description: &str,
) where
    K: Eq + Hash + Display,
{
    let mut counts: HashMap<K, usize> = HashMap::new();
    let mut order: Vec<K> = Vec::new();

    for item in items {
        let key = selector(&item);
        match counts.get_mut(&key) {
            Some(count) => {
                *count += 1;
                if *count == 2 {
                    order.push(key);
                }
            }
            None => {
                counts.insert(key, 1);
            }
        }
    }

    for duplicate in order {
        results.add(
            subject,
            property,
            format!("duplicate {value_description} value '{duplicate}'"),
        );
    }
}

/// Checks that every `(referrer, target)` pair points at a value in `contained`.
pub fn validate_referenced_values_contained<'r>(
    results: &mut ValidationResults,
    subject: &dyn Validatable,
    property: &str,
    contained: &HashSet<&str>,
    references: impl IntoIterator<Item = (&'r str, &'r str)>,
    describe: impl Fn(&str, &str) -> String,
) {
    validate_custom_messages(results, subject, property, |messages| {
        for (referrer, target) in references {
            if !contained.contains(target) {
                messages.push(describe(referrer, target));
            }
        }
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::validation::{collect_violations, ValidatableInfo};

    struct Subject {
        check: Box<dyn Fn(&dyn Validatable, &mut ValidationResults)>,
    }

    impl Validatable for Subject {
        fn validatable_info(&self) -> ValidatableInfo {
            ValidatableInfo {
                object_kind: "Subject".into(),
                object_address: "subject-1".into(),
            }
        }

        fn validate(&self, results: &mut ValidationResults) {
            (self.check)(self, results)
        }
    }

    fn messages(
        check: impl Fn(&dyn Validatable, &mut ValidationResults) + 'static,
    ) -> Vec<String> {
        let subject = Subject {
            check: Box::new(check),
        };
        collect_violations(&subject)
            .into_iter()
            .map(|r| r.to_string())
            .collect()
    }

    #[test]
    fn length_bounds_are_inclusive() {
        assert!(messages(|s, r| validate_length(r, s, "code", "ab", 2, 2)).is_empty());
        assert_eq!(
            messages(|s, r| validate_length(r, s, "code", "a", 2, 50)),
            vec!["Subject.code: is too short (minimum 2)"]
        );
        assert_eq!(
            messages(|s, r| validate_length(r, s, "items", &vec![1, 2, 3], 0, 2)),
            vec!["Subject.items: is too long (maximum 2)"]
        );
    }

    #[test]
    fn dpm_code_syntax() {
        assert!(is_legal_dpm_code("Mbr-1-Code"));
        assert!(is_legal_dpm_code("_x:y.z"));
        assert!(!is_legal_dpm_code("1abc"));
        assert!(!is_legal_dpm_code(""));
        assert!(!is_legal_dpm_code("a b"));
        assert_eq!(
            messages(|s, r| validate_dpm_code_content(r, s, "memberCode", "ä")),
            vec!["Subject.memberCode: is illegal DPM Code"]
        );
    }

    #[test]
    fn duplicates_are_reported_once_per_value() {
        let values = vec!["a", "b", "a", "a", "c", "b"];
        let found = messages(move |s, r| {
            validate_element_value_unique(r, s, "items", values.iter(), |v| v.to_string(), "uri")
        });
        assert_eq!(
            found,
            vec![
                "Subject.items: duplicate uri value 'a'",
                "Subject.items: duplicate uri value 'b'"
            ]
        );
    }

    #[test]
    fn blank_uri_is_rejected() {
        assert_eq!(
            messages(|s, r| validate_non_blank_uri(r, s, "domainRef", "  ")),
            vec!["Subject.domainRef: empty or blank uri"]
        );
    }

    #[test]
    fn references_outside_container_are_reported() {
        let contained: HashSet<&str> = ["m1", "m2"].into_iter().collect();
        let found = messages(move |s, r| {
            validate_referenced_values_contained(
                r,
                s,
                "hierarchies",
                &contained,
                vec![("n1", "m1"), ("n2", "m9")],
                |node, target| format!("node {node} refers to {target}"),
            )
        });
        assert_eq!(found, vec!["Subject.hierarchies: node n2 refers to m9"]);
    }
}

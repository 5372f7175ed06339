use std::collections::BTreeMap;

use super::Language;

/// Per-language text with an optional default language.
///
/// The default language is never set in place: [`TranslatedText::with_default_language`]
/// returns a new value, so a text read from the source stays unchanged.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TranslatedText {
    translations: BTreeMap<Language, String>,
    default_language: Option<Language>,
}

impl TranslatedText {
    pub fn new(translations: BTreeMap<Language, String>) -> Self {
        Self {
            translations,
            default_language: None,
        }
    }

    pub fn empty() -> Self {
        Self::default()
    }

    pub fn single(language: Language, text: impl Into<String>) -> Self {
        Self::new(BTreeMap::from([(language, text.into())]))
    }

    pub fn with_default_language(self, language: Language) -> Self {
        Self {
            default_language: Some(language),
            ..self
        }
    }

    pub fn translations(&self) -> &BTreeMap<Language, String> {
        &self.translations
    }

    pub fn default_language(&self) -> Option<Language> {
        self.default_language
    }

    pub fn text(&self, language: Language) -> Option<&str> {
        self.translations.get(&language).map(String::as_str)
    }

    /// Text in the default language, or failing that the first available translation.
    pub fn default_text(&self) -> Option<&str> {
        self.default_language
            .and_then(|language| self.text(language))
            .or_else(|| self.translations.values().next().map(String::as_str))
    }

    pub fn is_empty(&self) -> bool {
        self.translations.is_empty()
    }
}

use std::fmt;

/// ISO 639-1 code and English name of every language a dictionary may use.
const KNOWN_LANGUAGES: &[(&str, &str)] = &[
    ("bg", "Bulgarian"),
    ("cs", "Czech"),
    ("da", "Danish"),
    ("de", "German"),
    ("el", "Greek"),
    ("en", "English"),
    ("es", "Spanish"),
    ("et", "Estonian"),
    ("fi", "Finnish"),
    ("fr", "French"),
    ("ga", "Irish"),
    ("hr", "Croatian"),
    ("hu", "Hungarian"),
    ("is", "Icelandic"),
    ("it", "Italian"),
    ("lt", "Lithuanian"),
    ("lv", "Latvian"),
    ("mt", "Maltese"),
    ("nb", "Norwegian Bokmål"),
    ("nl", "Dutch"),
    ("pl", "Polish"),
    ("pt", "Portuguese"),
    ("ro", "Romanian"),
    ("se", "Northern Sami"),
    ("sk", "Slovak"),
    ("sl", "Slovenian"),
    ("sv", "Swedish"),
];

#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Language {
    iso_code: &'static str,
    english_name: &'static str,
}

impl Language {
    pub fn by_iso_code(code: &str) -> Option<Language> {
        let code = code.trim().to_ascii_lowercase();
        KNOWN_LANGUAGES
            .iter()
            .find(|(iso_code, _)| *iso_code == code)
            .map(|&(iso_code, english_name)| Language {
                iso_code,
                english_name,
            })
    }

    pub fn iso_code(&self) -> &'static str {
        self.iso_code
    }

    pub fn english_name(&self) -> &'static str {
        self.english_name
    }

    pub fn all() -> impl Iterator<Item = Language> {
        KNOWN_LANGUAGES
            .iter()
            .map(|&(iso_code, english_name)| Language {
                iso_code,
                english_name,
            })
    }
}

impl fmt::Debug for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Language({})", self.iso_code)
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.iso_code)
    }
}

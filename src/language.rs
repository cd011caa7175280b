use serde::{Deserialize, Serialize};

/// Languages offered for explanations and translations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Language {
    #[serde(rename = "en")]
    English,
    #[serde(rename = "es")]
    Spanish,
    #[serde(rename = "fr")]
    French,
    #[serde(rename = "de")]
    German,
    #[serde(rename = "bn")]
    Bengali,
}

pub const FALLBACK_LANGUAGE_LABEL: &str = "the selected language";

impl Language {
    pub const ALL: [Language; 5] = [
        Language::English,
        Language::Spanish,
        Language::French,
        Language::German,
        Language::Bengali,
    ];

    pub fn code(&self) -> &'static str {
        match self {
            Language::English => "en",
            Language::Spanish => "es",
            Language::French => "fr",
            Language::German => "de",
            Language::Bengali => "bn",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            Language::English => "English",
            Language::Spanish => "Spanish",
            Language::French => "French",
            Language::German => "German",
            Language::Bengali => "Bengali",
        }
    }

    pub fn from_code(code: &str) -> Option<Language> {
        let code = code.trim().to_lowercase();
        Language::ALL.iter().copied().find(|lang| lang.code() == code)
    }
}

/// Display name for a raw language code, with a neutral label for codes we don't know.
pub fn display_name_for_code(code: &str) -> &'static str {
    Language::from_code(code)
        .map(|lang| lang.display_name())
        .unwrap_or(FALLBACK_LANGUAGE_LABEL)
}

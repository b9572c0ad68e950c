//! Supported display languages and localized text.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// A display language supported by the service.
///
/// English is the primary language: every localized value has an English
/// entry, and lookups in other languages fall back to it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    #[default]
    En,
    Fr,
    Ar,
}

/// Error returned when parsing an unknown language code.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unsupported language: {0}")]
pub struct UnsupportedLanguage(String);

impl Language {
    pub const ALL: [Language; 3] = [Language::En, Language::Fr, Language::Ar];

    /// Two-letter code, as used in query strings.
    pub fn code(self) -> &'static str {
        match self {
            Language::En => "en",
            Language::Fr => "fr",
            Language::Ar => "ar",
        }
    }

    /// Whether text in this language is laid out right-to-left.
    pub fn is_rtl(self) -> bool {
        matches!(self, Language::Ar)
    }

    /// Parse a language code, falling back to English for anything unknown.
    pub fn parse_or_default(code: Option<&str>) -> Self {
        code.and_then(|c| c.parse().ok()).unwrap_or_default()
    }
}

impl FromStr for Language {
    type Err = UnsupportedLanguage;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "en" => Ok(Language::En),
            "fr" => Ok(Language::Fr),
            "ar" => Ok(Language::Ar),
            _ => Err(UnsupportedLanguage(s.to_string())),
        }
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

/// A piece of text with one entry per supported language.
///
/// The English entry is mandatory. French and Arabic entries are optional;
/// [`LocalizedText::resolve`] falls back to English when the requested entry
/// is missing or blank.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LocalizedText {
    en: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    fr: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    ar: Option<String>,
}

impl LocalizedText {
    pub fn new(en: impl Into<String>, fr: Option<String>, ar: Option<String>) -> Self {
        Self {
            en: en.into(),
            fr: fr.filter(|s| !s.trim().is_empty()),
            ar: ar.filter(|s| !s.trim().is_empty()),
        }
    }

    /// Text with only an English entry.
    pub fn english(en: impl Into<String>) -> Self {
        Self::new(en, None, None)
    }

    /// The text in `language`, or the English text if there is none.
    pub fn resolve(&self, language: Language) -> &str {
        let entry = match language {
            Language::En => None,
            Language::Fr => self.fr.as_deref(),
            Language::Ar => self.ar.as_deref(),
        };
        entry.unwrap_or(&self.en)
    }

    /// All present entries, English first.
    pub fn variants(&self) -> impl Iterator<Item = &str> {
        std::iter::once(self.en.as_str())
            .chain(self.fr.as_deref())
            .chain(self.ar.as_deref())
    }

    /// Whether any entry equals `needle`, ignoring case.
    ///
    /// `needle` must already be lowercased.
    pub fn equals_lowercase(&self, needle: &str) -> bool {
        self.variants().any(|v| v.to_lowercase() == needle)
    }

    /// Whether any entry contains `needle`, ignoring case.
    ///
    /// `needle` must already be lowercased.
    pub fn contains_lowercase(&self, needle: &str) -> bool {
        self.variants().any(|v| v.to_lowercase().contains(needle))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn algeria() -> LocalizedText {
        LocalizedText::new(
            "Algeria",
            Some("Algérie".to_string()),
            Some("الجزائر".to_string()),
        )
    }

    #[test]
    fn resolve_each_language() {
        let text = algeria();
        assert_eq!(text.resolve(Language::En), "Algeria");
        assert_eq!(text.resolve(Language::Fr), "Algérie");
        assert_eq!(text.resolve(Language::Ar), "الجزائر");
    }

    #[test]
    fn resolve_falls_back_to_english() {
        let text = LocalizedText::new("Oran", None, Some("  ".to_string()));
        assert_eq!(text.resolve(Language::Fr), "Oran");
        assert_eq!(text.resolve(Language::Ar), "Oran");
    }

    #[test]
    fn case_insensitive_equality() {
        let text = algeria();
        assert!(text.equals_lowercase("algeria"));
        assert!(text.equals_lowercase("algérie"));
        assert!(text.equals_lowercase("الجزائر"));
        assert!(!text.equals_lowercase("alg"));
        assert!(text.contains_lowercase("alg"));
    }

    #[test]
    fn parse_language_codes() {
        assert_eq!("fr".parse::<Language>(), Ok(Language::Fr));
        assert_eq!(" AR ".parse::<Language>(), Ok(Language::Ar));
        assert!("de".parse::<Language>().is_err());
        assert_eq!(Language::parse_or_default(Some("de")), Language::En);
        assert_eq!(Language::parse_or_default(None), Language::En);
    }

    #[test]
    fn only_arabic_is_rtl() {
        assert!(Language::Ar.is_rtl());
        assert!(!Language::En.is_rtl());
        assert!(!Language::Fr.is_rtl());
    }
}

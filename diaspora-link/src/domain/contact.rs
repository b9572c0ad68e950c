//! Carrier contact methods.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// The channel a contact entry is reachable on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContactKind {
    Phone,
    Whatsapp,
    Messenger,
}

/// Error returned when parsing an unknown contact kind.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unsupported contact kind: {0}")]
pub struct UnsupportedContactKind(String);

impl ContactKind {
    pub const ALL: [ContactKind; 3] = [ContactKind::Phone, ContactKind::Whatsapp, ContactKind::Messenger];

    pub fn as_str(self) -> &'static str {
        match self {
            ContactKind::Phone => "phone",
            ContactKind::Whatsapp => "whatsapp",
            ContactKind::Messenger => "messenger",
        }
    }

    /// Default label stored alongside the contact value.
    pub fn label(self) -> &'static str {
        match self {
            ContactKind::Phone => "Phone",
            ContactKind::Whatsapp => "WhatsApp",
            ContactKind::Messenger => "Messenger",
        }
    }

    /// Deep link that opens this contact in the matching app.
    pub fn link(self, value: &str) -> String {
        let compact: String = value.chars().filter(|c| !c.is_whitespace()).collect();
        match self {
            ContactKind::Phone => format!("tel:{compact}"),
            ContactKind::Whatsapp => format!("https://wa.me/{}", compact.trim_start_matches('+')),
            ContactKind::Messenger => format!("https://m.me/{compact}"),
        }
    }
}

impl FromStr for ContactKind {
    type Err = UnsupportedContactKind;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lower = s.trim().to_ascii_lowercase();
        ContactKind::ALL
            .into_iter()
            .find(|k| k.as_str() == lower)
            .ok_or_else(|| UnsupportedContactKind(s.to_string()))
    }
}

impl fmt::Display for ContactKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single way to reach a carrier.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Contact {
    pub kind: ContactKind,
    pub value: String,
    pub label: String,
}

impl Contact {
    /// A contact with the kind's default label.
    pub fn new(kind: ContactKind, value: impl Into<String>) -> Self {
        Self {
            kind,
            value: value.into(),
            label: kind.label().to_string(),
        }
    }

    pub fn link(&self) -> String {
        self.kind.link(&self.value)
    }
}

/// Error returned when parsing an invalid phone number.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid phone number: {reason}")]
pub struct InvalidPhone {
    reason: &'static str,
}

/// A phone number in compact international form.
///
/// Whitespace is stripped; what remains must be an optional leading `+`
/// followed by 1 to 16 digits, the first of which is not `0`.
///
/// # Examples
///
/// ```
/// use diaspora_link::domain::PhoneNumber;
///
/// let phone = PhoneNumber::parse("+33 6 12 34 56 78").unwrap();
/// assert_eq!(phone.as_str(), "+33612345678");
///
/// assert!(PhoneNumber::parse("06 12 34 56 78").is_err());
/// assert!(PhoneNumber::parse("+33-6").is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PhoneNumber(String);

impl PhoneNumber {
    pub fn parse(s: &str) -> Result<Self, InvalidPhone> {
        let compact: String = s.chars().filter(|c| !c.is_whitespace()).collect();
        let digits = compact.strip_prefix('+').unwrap_or(&compact);

        if digits.is_empty() {
            return Err(InvalidPhone {
                reason: "must contain digits",
            });
        }

        if digits.len() > 16 {
            return Err(InvalidPhone {
                reason: "must be at most 16 digits",
            });
        }

        if !digits.bytes().all(|b| b.is_ascii_digit()) {
            return Err(InvalidPhone {
                reason: "must contain only digits after an optional '+'",
            });
        }

        if digits.starts_with('0') {
            return Err(InvalidPhone {
                reason: "must be in international form (no leading 0)",
            });
        }

        Ok(Self(compact))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PhoneNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn links_per_kind() {
        assert_eq!(ContactKind::Phone.link("+33 6 12"), "tel:+33612");
        assert_eq!(ContactKind::Whatsapp.link("+213 555 01"), "https://wa.me/21355501");
        assert_eq!(ContactKind::Messenger.link("karim.b"), "https://m.me/karim.b");
    }

    #[test]
    fn parse_kinds() {
        assert_eq!("WhatsApp".parse::<ContactKind>(), Ok(ContactKind::Whatsapp));
        assert_eq!("phone".parse::<ContactKind>(), Ok(ContactKind::Phone));
        assert!("telegram".parse::<ContactKind>().is_err());
    }

    #[test]
    fn default_labels() {
        let contact = Contact::new(ContactKind::Whatsapp, "+213555");
        assert_eq!(contact.label, "WhatsApp");
        assert_eq!(contact.link(), "https://wa.me/213555");
    }

    #[test]
    fn valid_phones() {
        assert!(PhoneNumber::parse("+213555123456").is_ok());
        assert!(PhoneNumber::parse("33612345678").is_ok());
        assert!(PhoneNumber::parse(" +1 202 555 0100 ").is_ok());
        assert!(PhoneNumber::parse("1").is_ok());
    }

    #[test]
    fn invalid_phones() {
        assert!(PhoneNumber::parse("").is_err());
        assert!(PhoneNumber::parse("+").is_err());
        assert!(PhoneNumber::parse("0612345678").is_err());
        assert!(PhoneNumber::parse("+33 6 12-34").is_err());
        assert!(PhoneNumber::parse("12345678901234567").is_err());
        assert!(PhoneNumber::parse("++33").is_err());
    }
}

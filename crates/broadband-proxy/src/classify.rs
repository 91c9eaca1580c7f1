//! Free-text search classification.
//!
//! A visitor types one string into the widget. It is either a UK postcode,
//! a GB phone number (CLI), an Alternative Line Identifier (ALID, prefixed
//! `BBEU`) or nothing we can search for. Classification is pure and makes
//! no upstream calls.

use std::sync::LazyLock;

use phonenumber::PhoneNumber;
use phonenumber::country::Id as Country;
use regex::Regex;

/// Prefix that marks an Alternative Line Identifier.
pub const ALID_PREFIX: &str = "BBEU";

/// Outward code of one or two letters, one or two digits and an optional
/// letter, followed by a digit and two letters. Applied after spaces are
/// removed and the input is uppercased.
static POSTCODE_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[A-Z]{1,2}[0-9]{1,2}[A-Z]?[0-9][A-Z]{2}$").expect("postcode pattern is valid")
});

/// What a free-text search string turned out to be.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClassifiedInput {
    /// Uppercased postcode with spaces removed, e.g. `SW1A1AA`.
    Postcode(String),
    /// Sanitized phone number as the visitor typed it.
    PhoneNumber(String),
    /// Sanitized ALID as the visitor typed it.
    Alid(String),
    Invalid,
}

impl ClassifiedInput {
    /// Value to send upstream, if the input was classified.
    pub fn value(&self) -> Option<&str> {
        match self {
            ClassifiedInput::Postcode(v)
            | ClassifiedInput::PhoneNumber(v)
            | ClassifiedInput::Alid(v) => Some(v),
            ClassifiedInput::Invalid => None,
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            ClassifiedInput::Postcode(_) => "postcode",
            ClassifiedInput::PhoneNumber(_) => "phone_number",
            ClassifiedInput::Alid(_) => "alid",
            ClassifiedInput::Invalid => "invalid",
        }
    }
}

/// Classify a raw search string.
///
/// Postcode wins over phone number, which wins over ALID.
pub fn classify(raw: &str) -> ClassifiedInput {
    let cleaned = sanitize(raw);

    if let Some(postcode) = normalize_postcode(&cleaned) {
        return ClassifiedInput::Postcode(postcode);
    }
    if parse_phone_number(&cleaned).is_some() {
        return ClassifiedInput::PhoneNumber(cleaned);
    }
    if is_alid(&cleaned) {
        return ClassifiedInput::Alid(cleaned);
    }
    ClassifiedInput::Invalid
}

/// Trim, then drop `+ ( ) -` and the U+202C/U+202D bidi controls that
/// copy-pasted numbers often carry.
pub fn sanitize(raw: &str) -> String {
    raw.trim()
        .chars()
        .filter(|c| !matches!(c, '+' | '(' | ')' | '-' | '\u{202C}' | '\u{202D}'))
        .collect()
}

/// Uppercased, space-free postcode if `input` is one.
pub fn normalize_postcode(input: &str) -> Option<String> {
    let candidate = input.to_uppercase().replace(' ', "");
    POSTCODE_PATTERN.is_match(&candidate).then_some(candidate)
}

/// Parse `input` as a GB number, returning it only when valid for the
/// region. Parse failures are just `None`.
pub fn parse_phone_number(input: &str) -> Option<PhoneNumber> {
    let number = phonenumber::parse(Some(Country::GB), input).ok()?;
    phonenumber::is_valid(&number).then_some(number)
}

pub fn is_alid(input: &str) -> bool {
    input
        .get(..ALID_PREFIX.len())
        .is_some_and(|prefix| prefix.eq_ignore_ascii_case(ALID_PREFIX))
}

//! Per-byte mask/match predicates and their textual forms.

use crate::error::{ConfigError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;

/// One byte of a rule filter: `byte & mask == match`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FieldSpec {
    pub mask: u8,
    #[serde(rename = "match")]
    pub match_: u8,
}

/// Named filters. Everything but `ANY` is only valid for the status byte.
const NAMED_CLASSES: &[(&str, u8, u8)] = &[
    ("NOTE", 0xe0, 0x80),
    ("NOTEOFF", 0xf0, 0x80),
    ("NOTEON", 0xf0, 0x90),
    ("KeyPressure", 0xf0, 0xa0),
    ("CC", 0xf0, 0xb0),
    ("PGM", 0xf0, 0xc0),
    ("ChanPressure", 0xf0, 0xd0),
    ("Pitch", 0xf0, 0xe0),
    ("Pos", 0xff, 0xf2),
    ("Song", 0xff, 0xf3),
    ("Start", 0xff, 0xfa),
    ("Cont", 0xff, 0xfb),
    ("Stop", 0xff, 0xfc),
];

impl FieldSpec {
    /// Matches every byte value.
    pub const ANY: FieldSpec = FieldSpec {
        mask: 0x00,
        match_: 0x00,
    };

    pub const fn new(match_: u8, mask: u8) -> Self {
        Self { mask, match_ }
    }

    /// Exact match on a status byte.
    pub const fn status(value: u8) -> Self {
        Self::new(value, 0xff)
    }

    /// Exact match on a 7-bit data byte.
    pub const fn data(value: u8) -> Self {
        Self::new(value, 0x7f)
    }

    #[inline]
    pub fn accepts(&self, byte: u8) -> bool {
        byte & self.mask == self.match_
    }

    /// Parse the spec for field `index` (0 = status byte).
    ///
    /// Accepts a named class, `<match>/<mask>`, or a bare `<match>` which
    /// implies mask `0xff` for the status byte and `0x7f` for data bytes.
    pub fn parse(token: &str, index: usize) -> Result<Self> {
        let invalid = || ConfigError::InvalidFieldSpec {
            token: token.to_string(),
            index,
        };

        if token.eq_ignore_ascii_case("ANY") {
            return Ok(Self::ANY);
        }
        if let Some(&(_, mask, match_)) = NAMED_CLASSES
            .iter()
            .find(|(name, _, _)| name.eq_ignore_ascii_case(token))
        {
            return if index == 0 {
                Ok(Self { mask, match_ })
            } else {
                Err(invalid())
            };
        }

        if let Some((match_, mask)) = token.split_once('/') {
            let match_ = parse_c_int(match_).ok_or_else(invalid)?;
            let mask = parse_c_int(mask).ok_or_else(invalid)?;
            return Ok(Self::new(match_ as u8, mask as u8));
        }

        let match_ = parse_c_int(token).ok_or_else(invalid)?;
        let mask = if index == 0 { 0xff } else { 0x7f };
        Ok(Self::new(match_ as u8, mask))
    }
}

impl fmt::Display for FieldSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{:02x}/0x{:02x}", self.match_, self.mask)
    }
}

/// Integer in C `%i` notation: optional sign, then `0x` hex, leading-`0`
/// octal, or decimal. The whole string must be consumed.
pub fn parse_c_int(s: &str) -> Option<i64> {
    let s = s.trim();
    let (negative, digits) = match s.as_bytes().first()? {
        b'-' => (true, &s[1..]),
        b'+' => (false, &s[1..]),
        _ => (false, s),
    };
    let (radix, digits) = if let Some(hex) = digits
        .strip_prefix("0x")
        .or_else(|| digits.strip_prefix("0X"))
    {
        (16, hex)
    } else if digits.len() > 1 && digits.starts_with('0') {
        (8, &digits[1..])
    } else {
        (10, digits)
    };
    if digits.is_empty() || !digits.chars().all(|c| c.is_digit(radix)) {
        return None;
    }
    let value = i64::from_str_radix(digits, radix).ok()?;
    Some(if negative { -value } else { value })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_c_int() {
        assert_eq!(parse_c_int("42"), Some(42));
        assert_eq!(parse_c_int("-7"), Some(-7));
        assert_eq!(parse_c_int("0x7F"), Some(127));
        assert_eq!(parse_c_int("0X10"), Some(16));
        assert_eq!(parse_c_int("010"), Some(8));
        assert_eq!(parse_c_int("0"), Some(0));
        assert_eq!(parse_c_int(" 5 "), Some(5));
        assert_eq!(parse_c_int(""), None);
        assert_eq!(parse_c_int("0x"), None);
        assert_eq!(parse_c_int("09"), None);
        assert_eq!(parse_c_int("12abc"), None);
    }

    #[test]
    fn test_named_classes() {
        assert_eq!(FieldSpec::parse("NOTEON", 0).unwrap(), FieldSpec::new(0x90, 0xf0));
        assert_eq!(FieldSpec::parse("noteoff", 0).unwrap(), FieldSpec::new(0x80, 0xf0));
        assert_eq!(FieldSpec::parse("Note", 0).unwrap(), FieldSpec::new(0x80, 0xe0));
        assert_eq!(FieldSpec::parse("cc", 0).unwrap(), FieldSpec::new(0xb0, 0xf0));
        assert_eq!(FieldSpec::parse("Start", 0).unwrap(), FieldSpec::status(0xfa));
        assert_eq!(FieldSpec::parse("STOP", 0).unwrap(), FieldSpec::status(0xfc));
    }

    #[test]
    fn test_named_class_only_in_status_position() {
        assert!(FieldSpec::parse("CC", 1).is_err());
        assert_eq!(FieldSpec::parse("any", 2).unwrap(), FieldSpec::ANY);
    }

    #[test]
    fn test_numeric_specs() {
        assert_eq!(FieldSpec::parse("0x90/0xf0", 0).unwrap(), FieldSpec::new(0x90, 0xf0));
        assert_eq!(FieldSpec::parse("176", 0).unwrap(), FieldSpec::status(0xb0));
        assert_eq!(FieldSpec::parse("64", 1).unwrap(), FieldSpec::data(64));
        assert_eq!(FieldSpec::parse("0x1ff/0xff", 0).unwrap(), FieldSpec::status(0xff));
        assert!(FieldSpec::parse("0x90/", 0).is_err());
        assert!(FieldSpec::parse("velocity", 2).is_err());
    }

    #[test]
    fn test_accepts() {
        let note_on = FieldSpec::parse("NOTEON", 0).unwrap();
        assert!(note_on.accepts(0x90));
        assert!(note_on.accepts(0x9f));
        assert!(!note_on.accepts(0x80));
        assert!(FieldSpec::ANY.accepts(0xff));
    }

    #[test]
    fn test_display() {
        assert_eq!(FieldSpec::new(0x90, 0xf0).to_string(), "0x90/0xf0");
    }
}

//! Outbound message templates.

use crate::error::{ConfigError, Result};
use serde::{Deserialize, Serialize};

/// Type descriptor characters understood by the dispatcher.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ParamKind {
    /// `i`: 32-bit integer.
    Int,
    /// `f`: 32-bit float.
    Float,
    /// `s`: literal string, never expanded.
    Str,
}

impl ParamKind {
    pub fn from_descriptor(c: char) -> Option<Self> {
        match c {
            'i' => Some(ParamKind::Int),
            'f' => Some(ParamKind::Float),
            's' => Some(ParamKind::Str),
            _ => None,
        }
    }
}

/// One OSC message to emit when a rule fires.
///
/// `descriptor` holds one character per entry of `params`. Characters other
/// than `i`/`f`/`s` are kept; the dispatcher refuses to send such messages.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MessageTemplate {
    address: String,
    descriptor: String,
    params: Vec<String>,
}

impl MessageTemplate {
    /// Leading spaces of non-string parameters are dropped. Empty
    /// parameters are only allowed for `s`. No field may contain `"`.
    pub fn new(
        address: impl Into<String>,
        descriptor: impl Into<String>,
        params: impl IntoIterator<Item = impl Into<String>>,
    ) -> Result<Self> {
        let address = address.into();
        let descriptor = descriptor.into();
        let raw: Vec<String> = params.into_iter().map(Into::into).collect();

        if address.is_empty() {
            return Err(ConfigError::InvalidMessage("empty address".into()));
        }
        if address.contains('"') || descriptor.contains('"') {
            return Err(ConfigError::InvalidMessage(
                "address and type descriptor may not contain '\"'".into(),
            ));
        }

        let expected = descriptor.chars().count();
        if expected != raw.len() {
            return Err(ConfigError::ParamCountMismatch {
                expected,
                got: raw.len(),
            });
        }

        let mut params = Vec::with_capacity(raw.len());
        for (index, (kind, param)) in descriptor.chars().zip(raw).enumerate() {
            if param.contains('"') {
                return Err(ConfigError::InvalidMessage(format!(
                    "parameter {} may not contain '\"'",
                    index
                )));
            }
            let param = if kind == 's' {
                param
            } else {
                param.trim_start_matches(' ').to_string()
            };
            if param.is_empty() && kind != 's' {
                return Err(ConfigError::InvalidMessage(format!(
                    "parameter {} is empty",
                    index
                )));
            }
            params.push(param);
        }

        Ok(Self {
            address,
            descriptor,
            params,
        })
    }

    /// A message without arguments.
    pub fn bare(address: impl Into<String>) -> Result<Self> {
        Self::new(address, "", Vec::<String>::new())
    }

    pub fn address(&self) -> &str {
        &self.address
    }

    pub fn descriptor(&self) -> &str {
        &self.descriptor
    }

    pub fn params(&self) -> &[String] {
        &self.params
    }

    /// `(descriptor char, expression)` pairs in argument order.
    pub fn args(&self) -> impl Iterator<Item = (char, &str)> {
        self.descriptor
            .chars()
            .zip(self.params.iter().map(String::as_str))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_counts_must_match() {
        let err = MessageTemplate::new("/a", "if", ["1"]).unwrap_err();
        assert_eq!(err, ConfigError::ParamCountMismatch { expected: 2, got: 1 });
        assert!(MessageTemplate::new("/a", "i", ["1", "2"]).is_err());
    }

    #[test]
    fn test_bare_message() {
        let tpl = MessageTemplate::bare("/transport_play").unwrap();
        assert_eq!(tpl.descriptor(), "");
        assert!(tpl.params().is_empty());
    }

    #[test]
    fn test_leading_spaces_trimmed_except_strings() {
        let tpl = MessageTemplate::new("/a", "ifs", ["  %1", " 0.5", "  padded"]).unwrap();
        assert_eq!(tpl.params(), &["%1", "0.5", "  padded"]);
    }

    #[test]
    fn test_empty_params() {
        assert!(MessageTemplate::new("/a", "s", [""]).is_ok());
        assert!(MessageTemplate::new("/a", "i", [" "]).is_err());
        assert!(MessageTemplate::new("", "", Vec::<String>::new()).is_err());
    }

    #[test]
    fn test_unknown_descriptor_kept() {
        let tpl = MessageTemplate::new("/a", "x", ["1"]).unwrap();
        let args: Vec<_> = tpl.args().collect();
        assert_eq!(args, vec![('x', "1")]);
        assert_eq!(ParamKind::from_descriptor('x'), None);
    }

    #[test]
    fn test_quotes_rejected() {
        assert!(MessageTemplate::new("/a", "s", ["say \"hi\""]).is_err());
    }
}

//! Tokenizer for message lines: a whitespace-separated run of `"..."` strings.

use crate::error::{ConfigError, Result};

/// A quoted token and the 1-based column of its opening quote.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Token<'a> {
    pub text: &'a str,
    pub column: usize,
}

/// Split a message line into its quoted tokens.
///
/// Quotes cannot be escaped. Anything outside quotes other than whitespace,
/// an unterminated quote, or two tokens without whitespace between them is
/// rejected with the column where it was found.
pub fn tokenize(line: &str) -> Result<Vec<Token<'_>>> {
    let mut tokens = Vec::new();
    let mut chars = line.char_indices().peekable();

    while let Some((pos, c)) = chars.next() {
        if c.is_whitespace() {
            continue;
        }
        if c != '"' {
            return Err(ConfigError::Syntax {
                column: pos + 1,
                reason: "expected '\"'",
            });
        }

        let start = pos + 1;
        let end = loop {
            match chars.next() {
                Some((end, '"')) => break end,
                Some(_) => {}
                None => {
                    return Err(ConfigError::Syntax {
                        column: pos + 1,
                        reason: "unterminated quote",
                    })
                }
            }
        };

        if let Some(&(next, c)) = chars.peek() {
            if !c.is_whitespace() {
                return Err(ConfigError::Syntax {
                    column: next + 1,
                    reason: "expected whitespace after closing quote",
                });
            }
        }

        tokens.push(Token {
            text: &line[start..end],
            column: start,
        });
    }

    Ok(tokens)
}

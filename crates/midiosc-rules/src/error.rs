//! Error types for configuration loading and parameter expansion.

use thiserror::Error;

/// Problems found while reading rule configuration text.
///
/// Most are reported as [`Diagnostic`]s and parsing carries on; only
/// [`ConfigError::UnexpectedSection`] aborts a parse.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Invalid field spec '{token}' at position {index}")]
    InvalidFieldSpec { token: String, index: usize },

    #[error("Invalid filter rule: {0}")]
    InvalidRule(String),

    #[error("Syntax error at column {column}: {reason}")]
    Syntax { column: usize, reason: &'static str },

    #[error("Invalid message: {0}")]
    InvalidMessage(String),

    #[error("Expected {expected} parameters, got {got}")]
    ParamCountMismatch { expected: usize, got: usize },

    #[error("Invalid value '{value}' for '{key}': {reason}")]
    InvalidSetting {
        key: String,
        value: String,
        reason: String,
    },

    #[error("Unknown setting '{0}'")]
    UnknownSetting(String),

    #[error("Invalid OSC destination '{0}' (expected host:port or a port number)")]
    InvalidDestination(String),

    #[error("Line too long")]
    LineTooLong,

    #[error("Ignored config line")]
    IgnoredLine,

    #[error("Unexpected section header '{section}' on line {line}, expected a rule filter")]
    UnexpectedSection { section: String, line: usize },
}

/// A non-fatal config problem tied to its 1-based line number.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("line {line}: {error}")]
pub struct Diagnostic {
    pub line: usize,
    pub error: ConfigError,
}

/// Why a single parameter could not be expanded.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ExpandError {
    #[error("Invalid expression: {0}")]
    InvalidExpression(String),

    #[error("Invalid range: {0}")]
    InvalidRange(String),

    #[error("Invalid placeholder: {0}")]
    InvalidPlaceholder(String),

    #[error("Invalid literal: {0}")]
    InvalidLiteral(String),

    #[error("Unknown type descriptor '{0}'")]
    UnknownDescriptor(char),
}

pub type Result<T> = std::result::Result<T, ConfigError>;

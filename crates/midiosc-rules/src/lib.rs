//! Rules that turn MIDI events into OSC messages.
//!
//! A [`RuleSet`] is built once from config text and only read afterwards.
//! Each [`Rule`] is a byte mask/match filter with a list of
//! [`MessageTemplate`]s; template parameters are expanded against the
//! triggering event by the [`expand`] module.

pub mod error;
pub use error::{ConfigError, Diagnostic, ExpandError, Result};

pub mod field;
pub use field::FieldSpec;

pub(crate) mod template;
pub use template::{MessageTemplate, ParamKind};

pub(crate) mod rule;
pub use rule::{FieldSpecs, Rule, RuleLength, RuleSet};

pub mod expand;
pub use expand::{expand_float, expand_int, expand_param, ExpandFailure, Value};

pub(crate) mod destination;
pub use destination::{Destination, DEFAULT_HOST, DEFAULT_PORT};

pub mod config;
pub use config::{parse_config, render_config, ParsedConfig, Settings};

pub use midiosc_midi::{RawEvent, SyncMode};

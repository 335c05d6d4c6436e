//! Config text: `[config]` settings and `[rule]` blocks.
//!
//! ```text
//! [config]
//! osc=localhost:3819
//! syncmode=Absolute
//!
//! [rule]
//! CC 7
//! "/master/gain" "f" "%2 [-60,6]"
//! ```

mod parser;
mod render;
mod token;

pub use parser::{parse_config, parse_filter, parse_message};
pub use render::render_config;
pub use token::{tokenize, Token};

use crate::destination::Destination;
use crate::error::Diagnostic;
use crate::rule::RuleSet;
use midiosc_midi::SyncMode;
use serde::{Deserialize, Serialize};

/// Lines longer than this are skipped.
pub const MAX_LINE_LEN: usize = 1024;

/// Values from `[config]` sections. `None` means not set.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Settings {
    pub destination: Option<Destination>,
    pub input: Option<String>,
    pub sync_mode: Option<SyncMode>,
}

impl Settings {
    pub fn is_empty(&self) -> bool {
        self.destination.is_none() && self.input.is_none() && self.sync_mode.is_none()
    }

    /// Overlay `other`: every value it sets replaces ours.
    pub fn merge(&mut self, other: Settings) {
        if other.destination.is_some() {
            self.destination = other.destination;
        }
        if other.input.is_some() {
            self.input = other.input;
        }
        if other.sync_mode.is_some() {
            self.sync_mode = other.sync_mode;
        }
    }
}

/// Result of parsing one config text.
#[derive(Debug, Clone, Default)]
pub struct ParsedConfig {
    pub settings: Settings,
    pub rules: RuleSet,
    pub diagnostics: Vec<Diagnostic>,
}

impl ParsedConfig {
    /// Combine with a config read later: its settings win, its rules are
    /// appended after ours.
    pub fn merge(&mut self, other: ParsedConfig) {
        self.settings.merge(other.settings);
        self.rules.extend(other.rules);
        self.diagnostics.extend(other.diagnostics);
    }
}

//! Line-oriented config parser.

use super::token::tokenize;
use super::{ParsedConfig, Settings, MAX_LINE_LEN};
use crate::destination::Destination;
use crate::error::{ConfigError, Diagnostic, Result};
use crate::field::FieldSpec;
use crate::rule::Rule;
use crate::template::MessageTemplate;
use midiosc_midi::SyncMode;
use tracing::warn;

const CONFIG_HEADER: &str = "[config]";
const RULE_HEADER: &str = "[rule]";
const ANY_LENGTH_MARKER: &str = "*";

enum State {
    /// Outside any section, or skipping a rule whose filter was rejected.
    Idle,
    InConfig,
    /// `[rule]` seen, the filter line comes next.
    RuleFilter,
    InRule(Rule),
}

struct Parser {
    state: State,
    settings: Settings,
    rules: Vec<Rule>,
    diagnostics: Vec<Diagnostic>,
}

impl Parser {
    fn new() -> Self {
        Self {
            state: State::Idle,
            settings: Settings::default(),
            rules: Vec::new(),
            diagnostics: Vec::new(),
        }
    }

    fn report(&mut self, line: usize, error: ConfigError) {
        warn!(line, "{}", error);
        self.diagnostics.push(Diagnostic { line, error });
    }

    fn enter(&mut self, next: State, section: &str, line: usize) -> Result<()> {
        match std::mem::replace(&mut self.state, next) {
            State::RuleFilter => {
                return Err(ConfigError::UnexpectedSection {
                    section: section.to_string(),
                    line,
                })
            }
            State::InRule(rule) => self.rules.push(rule),
            State::Idle | State::InConfig => {}
        }
        Ok(())
    }

    fn line(&mut self, lineno: usize, line: &str) -> Result<()> {
        if line.len() > MAX_LINE_LEN {
            self.report(lineno, ConfigError::LineTooLong);
            return Ok(());
        }

        let line = line.trim_end_matches(['\r', '\n', ' ', '\t']);
        if line.is_empty() || line.starts_with('#') {
            return Ok(());
        }

        match line {
            CONFIG_HEADER => return self.enter(State::InConfig, line, lineno),
            RULE_HEADER => return self.enter(State::RuleFilter, line, lineno),
            _ => {}
        }

        let error = match &mut self.state {
            State::Idle => Some(ConfigError::IgnoredLine),
            State::InConfig => self.settings.apply_line(line).err(),
            State::RuleFilter => match parse_filter(line) {
                Ok(rule) => {
                    self.state = State::InRule(rule);
                    None
                }
                Err(error) => {
                    self.state = State::Idle;
                    Some(error)
                }
            },
            State::InRule(rule) => match parse_message(line) {
                Ok(template) => {
                    rule.push_template(template);
                    None
                }
                Err(error) => Some(error),
            },
        };
        if let Some(error) = error {
            self.report(lineno, error);
        }
        Ok(())
    }

    fn finish(mut self) -> ParsedConfig {
        if let State::InRule(rule) = std::mem::replace(&mut self.state, State::Idle) {
            self.rules.push(rule);
        }
        ParsedConfig {
            settings: self.settings,
            rules: self.rules.into_iter().collect(),
            diagnostics: self.diagnostics,
        }
    }
}

/// Parse config text.
///
/// Malformed lines are collected as diagnostics (and logged) and skipped.
/// The only fatal error is a section header where a rule filter was expected.
pub fn parse_config(text: &str) -> Result<ParsedConfig> {
    let mut parser = Parser::new();
    for (index, line) in text.lines().enumerate() {
        parser.line(index + 1, line)?;
    }
    Ok(parser.finish())
}

/// Parse a rule filter line: one to three field specs, optionally followed
/// by `*` to match events of any length.
pub fn parse_filter(line: &str) -> Result<Rule> {
    let mut tokens: Vec<&str> = line.split_whitespace().collect();
    let any_length = tokens.last() == Some(&ANY_LENGTH_MARKER);
    if any_length {
        tokens.pop();
    }

    if tokens.is_empty() || tokens.len() > 3 {
        return Err(ConfigError::InvalidRule(format!(
            "expected 1 to 3 field specs, got {}",
            tokens.len()
        )));
    }

    let fields = tokens
        .iter()
        .enumerate()
        .map(|(index, token)| FieldSpec::parse(token, index))
        .collect::<Result<Vec<_>>>()?;

    if any_length {
        Rule::any_length(&fields)
    } else {
        Rule::new(&fields)
    }
}

/// Parse a message line: `"<address>" "<descriptor>" "<param>"...`.
pub fn parse_message(line: &str) -> Result<MessageTemplate> {
    let tokens = tokenize(line)?;
    match tokens.as_slice() {
        [address, descriptor, params @ ..] => {
            MessageTemplate::new(address.text, descriptor.text, params.iter().map(|t| t.text))
        }
        _ => Err(ConfigError::InvalidMessage(
            "expected a quoted address and type descriptor".into(),
        )),
    }
}

impl Settings {
    /// Apply one `key=value` line from a `[config]` section. Keys are
    /// case-insensitive; an empty value leaves the setting unchanged.
    pub fn apply_line(&mut self, line: &str) -> Result<()> {
        let Some((key, value)) = line.split_once('=') else {
            return Err(ConfigError::UnknownSetting(line.to_string()));
        };
        let key = key.trim();

        if key.eq_ignore_ascii_case("osc") {
            if !value.is_empty() {
                self.destination = Some(value.parse::<Destination>()?);
            }
        } else if key.eq_ignore_ascii_case("input") {
            if !value.is_empty() {
                self.input = Some(value.to_string());
            }
        } else if key.eq_ignore_ascii_case("syncmode") {
            if !value.is_empty() {
                let mode = value
                    .parse::<SyncMode>()
                    .map_err(|e| ConfigError::InvalidSetting {
                        key: key.to_string(),
                        value: value.to_string(),
                        reason: e.to_string(),
                    })?;
                self.sync_mode = Some(mode);
            }
        } else {
            return Err(ConfigError::UnknownSetting(key.to_string()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rule::RuleLength;

    #[test]
    fn test_filter_lengths() {
        let rule = parse_filter("NOTEON ANY 0x40/0x7f").unwrap();
        assert_eq!(rule.length(), RuleLength::Exact(3));
        assert_eq!(rule.fields()[2], FieldSpec::new(0x40, 0x7f));

        let rule = parse_filter("0xf8 *").unwrap();
        assert_eq!(rule.length(), RuleLength::Any);
        assert_eq!(rule.fields(), &[FieldSpec::status(0xf8)]);

        assert!(parse_filter("*").is_err());
        assert!(parse_filter("CC 1 2 3").is_err());
        assert!(parse_filter("CC NOTEON").is_err());
    }

    #[test]
    fn test_message_lines() {
        let t = parse_message(r#""/strip/gain" "if" "1" " %2 [0,1]""#).unwrap();
        assert_eq!(t.address(), "/strip/gain");
        assert_eq!(t.params(), &["1".to_string(), "%2 [0,1]".to_string()]);

        let t = parse_message(r#""/transport_stop" """#).unwrap();
        assert!(t.params().is_empty());

        assert_eq!(
            parse_message(r#""/a" "ii" "1""#),
            Err(ConfigError::ParamCountMismatch { expected: 2, got: 1 })
        );
        assert!(parse_message(r#""/a""#).is_err());
        assert!(parse_message(r#"/a "i" "1""#).is_err());
    }

    #[test]
    fn test_settings() {
        let mut settings = Settings::default();
        settings.apply_line("OSC=9000").unwrap();
        settings.apply_line("input=nanoKONTROL").unwrap();
        settings.apply_line("syncmode=rel").unwrap();
        settings.apply_line("input=").unwrap();

        assert_eq!(settings.destination, Some(Destination::new("localhost", 9000)));
        assert_eq!(settings.input.as_deref(), Some("nanoKONTROL"));
        assert_eq!(settings.sync_mode, Some(SyncMode::Relative));

        assert!(matches!(
            settings.apply_line("syncmode=later"),
            Err(ConfigError::InvalidSetting { .. })
        ));
        assert!(matches!(
            settings.apply_line("osc=host:0"),
            Err(ConfigError::InvalidDestination(_))
        ));
        assert_eq!(
            settings.apply_line("colour=blue"),
            Err(ConfigError::UnknownSetting("colour".into()))
        );
    }
}

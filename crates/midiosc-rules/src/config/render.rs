//! Render settings and rules back into config text.

use super::{ParsedConfig, Settings};
use crate::rule::{Rule, RuleLength, RuleSet};
use crate::template::MessageTemplate;
use std::fmt::{self, Write};

/// Render a complete config file. Parsing the result yields the same
/// settings and rules.
pub fn render_config(settings: &Settings, rules: &RuleSet) -> String {
    let mut out = String::new();
    // Writing to a String cannot fail.
    let _ = write_config(&mut out, settings, rules);
    out
}

fn write_config(out: &mut impl Write, settings: &Settings, rules: &RuleSet) -> fmt::Result {
    if !settings.is_empty() {
        writeln!(out, "[config]")?;
        if let Some(destination) = &settings.destination {
            writeln!(out, "osc={}", destination)?;
        }
        if let Some(input) = &settings.input {
            writeln!(out, "input={}", input)?;
        }
        if let Some(mode) = settings.sync_mode {
            writeln!(out, "syncmode={}", mode)?;
        }
    }

    let mut separate = !settings.is_empty();
    for rule in rules {
        if separate {
            writeln!(out)?;
        }
        separate = true;
        write_rule(out, rule)?;
    }
    Ok(())
}

fn write_rule(out: &mut impl Write, rule: &Rule) -> fmt::Result {
    writeln!(out, "[rule]")?;
    let mut fields = rule.fields().iter();
    if let Some(first) = fields.next() {
        write!(out, "{}", first)?;
    }
    for field in fields {
        write!(out, " {}", field)?;
    }
    if rule.length() == RuleLength::Any {
        write!(out, " *")?;
    }
    writeln!(out)?;

    for template in rule.templates() {
        write_template(out, template)?;
    }
    Ok(())
}

fn write_template(out: &mut impl Write, template: &MessageTemplate) -> fmt::Result {
    write!(out, "\"{}\" \"{}\"", template.address(), template.descriptor())?;
    for param in template.params() {
        write!(out, " \"{}\"", param)?;
    }
    writeln!(out)
}

impl fmt::Display for ParsedConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write_config(f, &self.settings, &self.rules)
    }
}

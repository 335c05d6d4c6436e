//! Rules and the rule table the consumer matches events against.

use crate::error::{ConfigError, Result};
use crate::field::FieldSpec;
use crate::template::MessageTemplate;
use midiosc_midi::RawEvent;
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

/// Up to one spec per MIDI byte.
pub type FieldSpecs = SmallVec<[FieldSpec; 3]>;

/// Which event lengths a rule accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RuleLength {
    /// Only events of exactly this many bytes (1..=3).
    Exact(u8),
    /// Any event length; bytes without a field spec match anything.
    Any,
}

/// A byte-pattern filter and the messages it triggers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rule {
    fields: FieldSpecs,
    length: RuleLength,
    templates: Vec<MessageTemplate>,
}

impl Rule {
    /// Rule matching events of exactly `fields.len()` bytes.
    pub fn new(fields: &[FieldSpec]) -> Result<Self> {
        Self::check_field_count(fields)?;
        Ok(Self {
            fields: fields.iter().copied().collect(),
            length: RuleLength::Exact(fields.len() as u8),
            templates: Vec::new(),
        })
    }

    /// Rule matching events of any length.
    pub fn any_length(fields: &[FieldSpec]) -> Result<Self> {
        Self::check_field_count(fields)?;
        Ok(Self {
            fields: fields.iter().copied().collect(),
            length: RuleLength::Any,
            templates: Vec::new(),
        })
    }

    fn check_field_count(fields: &[FieldSpec]) -> Result<()> {
        if fields.is_empty() || fields.len() > 3 {
            return Err(ConfigError::InvalidRule(format!(
                "expected 1 to 3 field specs, got {}",
                fields.len()
            )));
        }
        Ok(())
    }

    pub fn with_template(mut self, template: MessageTemplate) -> Self {
        self.templates.push(template);
        self
    }

    pub fn push_template(&mut self, template: MessageTemplate) {
        self.templates.push(template);
    }

    pub fn fields(&self) -> &[FieldSpec] {
        &self.fields
    }

    pub fn length(&self) -> RuleLength {
        self.length
    }

    pub fn templates(&self) -> &[MessageTemplate] {
        &self.templates
    }

    /// Length condition plus `byte & mask == match` for every byte of the event.
    #[inline]
    pub fn matches(&self, event: &RawEvent) -> bool {
        let len = event.len();
        if let RuleLength::Exact(expected) = self.length {
            if expected as usize != len {
                return false;
            }
        }
        event.data().iter().enumerate().all(|(i, &byte)| {
            self.fields
                .get(i)
                .map_or(true, |field| field.accepts(byte))
        })
    }
}

/// Rules in declaration order. Read-only once loading is done.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RuleSet {
    rules: Vec<Rule>,
}

impl RuleSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, rule: Rule) -> usize {
        self.rules.push(rule);
        self.rules.len() - 1
    }

    pub fn extend(&mut self, other: RuleSet) {
        self.rules.extend(other.rules);
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Rule> {
        self.rules.iter()
    }

    pub fn get(&self, index: usize) -> Option<&Rule> {
        self.rules.get(index)
    }

    /// Every rule that matches `event`, with its index, in declaration order.
    pub fn matching<'a>(
        &'a self,
        event: &'a RawEvent,
    ) -> impl Iterator<Item = (usize, &'a Rule)> + 'a {
        self.rules
            .iter()
            .enumerate()
            .filter(move |(_, rule)| rule.matches(event))
    }
}

impl FromIterator<Rule> for RuleSet {
    fn from_iter<I: IntoIterator<Item = Rule>>(iter: I) -> Self {
        Self {
            rules: iter.into_iter().collect(),
        }
    }
}

impl<'a> IntoIterator for &'a RuleSet {
    type Item = &'a Rule;
    type IntoIter = std::slice::Iter<'a, Rule>;

    fn into_iter(self) -> Self::IntoIter {
        self.rules.iter()
    }
}

//! Parameter expressions: literals and `%<field> [t0,t1] [s0,s1]` placeholders.
//!
//! A placeholder picks a value out of the event, clamps it to the source range
//! and maps it linearly onto the target range:
//!
//! | field | value |
//! |---|---|
//! | `0` | status byte, 0-255 |
//! | `1` | first data byte, 7 bit |
//! | `2` | second data byte, 7 bit |
//! | `c` | channel (low nibble of the status byte) |
//! | `s` | status (high nibble of the status byte) |
//!
//! The source range defaults to `[0,127]`; the target range to `[0,127]`
//! (`[0.0,127.0]` for floats).

use crate::error::ExpandError;
use crate::field::parse_c_int;
use crate::template::ParamKind;
use midiosc_midi::RawEvent;
use std::fmt;

const DEFAULT_SOURCE: (i64, i64) = (0, 0x7f);

/// A fully expanded argument value.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Int(i32),
    Float(f32),
    Str(String),
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Int(v) => write!(f, "{}", v),
            Value::Float(v) => write!(f, "{}", v),
            Value::Str(v) => write!(f, "\"{}\"", v),
        }
    }
}

/// Expansion failed; `fallback` is the target lower bound when one was
/// parsed, zero otherwise.
#[derive(Debug, Clone, PartialEq)]
pub struct ExpandFailure<T> {
    pub error: ExpandError,
    pub fallback: T,
}

impl<T> ExpandFailure<T> {
    pub fn map_fallback<U>(self, f: impl FnOnce(T) -> U) -> ExpandFailure<U> {
        ExpandFailure {
            error: self.error,
            fallback: f(self.fallback),
        }
    }
}

impl<T: fmt::Debug> fmt::Display for ExpandFailure<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} (fallback {:?})", self.error, self.fallback)
    }
}

impl<T: fmt::Debug> std::error::Error for ExpandFailure<T> {}

/// Numeric types an expression can expand to.
pub trait Target: Copy + fmt::Debug + PartialEq {
    const ZERO: Self;
    const DEFAULT_RANGE: (Self, Self);

    fn parse_number(s: &str) -> Option<Self>;

    /// Interpolate `val`, already known to lie strictly inside `source`.
    fn interpolate(val: i64, source: (i64, i64), target: (Self, Self)) -> Self;
}

impl Target for i32 {
    const ZERO: Self = 0;
    const DEFAULT_RANGE: (Self, Self) = (0, 0x7f);

    fn parse_number(s: &str) -> Option<Self> {
        parse_c_int(s).and_then(|v| i32::try_from(v).ok())
    }

    fn interpolate(val: i64, source: (i64, i64), target: (Self, Self)) -> Self {
        let (s0, s1) = source;
        let (t0, t1) = (target.0 as i64, target.1 as i64);
        (t0 + (val - s0) * (t1 - t0) / (s1 - s0)) as i32
    }
}

impl Target for f32 {
    const ZERO: Self = 0.0;
    const DEFAULT_RANGE: (Self, Self) = (0.0, 127.0);

    fn parse_number(s: &str) -> Option<Self> {
        s.trim().parse().ok()
    }

    fn interpolate(val: i64, source: (i64, i64), target: (Self, Self)) -> Self {
        let (s0, s1) = source;
        let (t0, t1) = target;
        t0 + (val - s0) as f32 * (t1 - t0) / (s1 - s0) as f32
    }
}

/// Which part of the event a placeholder reads.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventField {
    StatusByte,
    Data1,
    Data2,
    Channel,
    Status,
}

impl EventField {
    pub fn from_char(c: char) -> Option<Self> {
        match c {
            '0' => Some(EventField::StatusByte),
            '1' => Some(EventField::Data1),
            '2' => Some(EventField::Data2),
            'c' => Some(EventField::Channel),
            's' => Some(EventField::Status),
            _ => None,
        }
    }

    pub fn read(self, event: &RawEvent) -> i64 {
        let value = match self {
            EventField::StatusByte => event.byte(0),
            EventField::Data1 => event.byte(1) & 0x7f,
            EventField::Data2 => event.byte(2) & 0x7f,
            EventField::Channel => event.channel(),
            EventField::Status => event.status_nibble(),
        };
        value as i64
    }
}

/// A parsed placeholder, before validation.
#[derive(Debug, Clone, PartialEq)]
pub struct Placeholder<T> {
    pub field: char,
    pub target: Option<(T, T)>,
    pub source: Option<(i64, i64)>,
}

/// A parameter expression.
#[derive(Debug, Clone, PartialEq)]
pub enum ParamExpr<T> {
    Literal(T),
    Placeholder(Placeholder<T>),
}

impl<T: Target> ParamExpr<T> {
    pub fn parse(expr: &str) -> Result<Self, ExpandFailure<T>> {
        let fail = |error| ExpandFailure {
            error,
            fallback: T::ZERO,
        };

        let Some(rest) = expr.strip_prefix('%') else {
            return T::parse_number(expr)
                .map(ParamExpr::Literal)
                .ok_or_else(|| fail(ExpandError::InvalidLiteral(expr.to_string())));
        };

        let invalid = || fail(ExpandError::InvalidExpression(expr.to_string()));
        let mut chars = rest.chars();
        let field = chars.next().ok_or_else(invalid)?;
        let mut cursor = Cursor::new(chars.as_str());

        let target = match cursor.bracket_pair() {
            Some(pair) => {
                let (a, b) = pair.ok_or_else(invalid)?;
                Some((
                    T::parse_number(a).ok_or_else(invalid)?,
                    T::parse_number(b).ok_or_else(invalid)?,
                ))
            }
            None => None,
        };

        let source = match (target.is_some(), cursor.bracket_pair()) {
            (true, Some(pair)) => {
                let (a, b) = pair.ok_or_else(invalid)?;
                Some((
                    parse_c_int(a).ok_or_else(invalid)?,
                    parse_c_int(b).ok_or_else(invalid)?,
                ))
            }
            (_, None) => None,
            (false, Some(_)) => return Err(invalid()),
        };

        if !cursor.at_end() {
            return Err(invalid());
        }

        Ok(ParamExpr::Placeholder(Placeholder {
            field,
            target,
            source,
        }))
    }

    /// Evaluate against an event.
    pub fn eval(&self, expr: &str, event: &RawEvent) -> Result<T, ExpandFailure<T>> {
        let placeholder = match self {
            ParamExpr::Literal(value) => return Ok(*value),
            ParamExpr::Placeholder(placeholder) => placeholder,
        };

        let (t0, t1) = placeholder.target.unwrap_or(T::DEFAULT_RANGE);
        let (s0, s1) = placeholder.source.unwrap_or(DEFAULT_SOURCE);
        let fail = |error| ExpandFailure { error, fallback: t0 };

        if s0 >= s1 || s0 < 0 || s1 > 0x7f {
            return Err(fail(ExpandError::InvalidRange(expr.to_string())));
        }

        let field = EventField::from_char(placeholder.field)
            .ok_or_else(|| fail(ExpandError::InvalidPlaceholder(expr.to_string())))?;

        let val = field.read(event);
        if val <= s0 {
            return Ok(t0);
        }
        if val >= s1 {
            return Ok(t1);
        }
        Ok(T::interpolate(val, (s0, s1), (t0, t1)))
    }
}

/// Minimal scanner for the `[a,b]` groups after a placeholder.
struct Cursor<'a> {
    rest: &'a str,
}

impl<'a> Cursor<'a> {
    fn new(rest: &'a str) -> Self {
        Self { rest }
    }

    /// `None` if no group starts here, `Some(None)` if one starts but is malformed.
    fn bracket_pair(&mut self) -> Option<Option<(&'a str, &'a str)>> {
        let trimmed = self.rest.trim_start();
        let body = trimmed.strip_prefix('[')?;
        let Some(close) = body.find(']') else {
            self.rest = "";
            return Some(None);
        };
        self.rest = &body[close + 1..];
        Some(body[..close].split_once(','))
    }

    fn at_end(&self) -> bool {
        self.rest.trim().is_empty()
    }
}

fn expand<T: Target>(expr: &str, event: &RawEvent) -> Result<T, ExpandFailure<T>> {
    ParamExpr::<T>::parse(expr)?.eval(expr, event)
}

pub fn expand_int(expr: &str, event: &RawEvent) -> Result<i32, ExpandFailure<i32>> {
    expand(expr, event)
}

pub fn expand_float(expr: &str, event: &RawEvent) -> Result<f32, ExpandFailure<f32>> {
    expand(expr, event)
}

/// Expand one argument according to its type descriptor character.
/// String parameters are passed through verbatim.
pub fn expand_param(
    descriptor: char,
    expr: &str,
    event: &RawEvent,
) -> Result<Value, ExpandFailure<Value>> {
    match ParamKind::from_descriptor(descriptor) {
        Some(ParamKind::Int) => expand_int(expr, event)
            .map(Value::Int)
            .map_err(|f| f.map_fallback(Value::Int)),
        Some(ParamKind::Float) => expand_float(expr, event)
            .map(Value::Float)
            .map_err(|f| f.map_fallback(Value::Float)),
        Some(ParamKind::Str) => Ok(Value::Str(expr.to_string())),
        None => Err(ExpandFailure {
            error: ExpandError::UnknownDescriptor(descriptor),
            fallback: Value::Int(0),
        }),
    }
}

//! Dual-typed filter values.

use serde::de::{self, Deserializer, SeqAccess, Visitor};
use serde::{Deserialize, Serialize};
use std::fmt;

/// A scalar compared against feature attributes.
///
/// Stylesheet literals are typed by trying a numeric parse, so a token like
/// `007` becomes a number. It still has to match a feature whose `name` is the
/// string `"007"`, which is why numeric values may keep their source text.
///
/// Derived `PartialEq` is structural. Attribute matching goes through the
/// `equals*` methods, which are deliberately asymmetric.
///
/// Deserialized scalars are typed like stylesheet literals: `7` and `"007"`
/// both become numeric values keeping their text. An explicit
/// `[number, "text"]` pair sets both forms.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Value {
    /// Plain text, never numeric.
    Text(String),
    /// A number with no retained text.
    Number(f64),
    /// A numeric literal that keeps its original text.
    NumericText(f64, String),
}

impl Value {
    pub fn text(s: impl Into<String>) -> Self {
        Value::Text(s.into())
    }

    pub fn number(n: f64) -> Self {
        Value::Number(n)
    }

    pub fn numeric_text(n: f64, s: impl Into<String>) -> Self {
        Value::NumericText(n, s.into())
    }

    /// Infer a value from a bare literal: anything that parses as a finite
    /// number is numeric and keeps its text, everything else is text.
    pub fn parse_literal(literal: &str) -> Self {
        match literal.trim().parse::<f64>() {
            Ok(n) if n.is_finite() => Value::NumericText(n, literal.to_string()),
            _ => Value::Text(literal.to_string()),
        }
    }

    pub fn is_numeric(&self) -> bool {
        matches!(self, Value::Number(_) | Value::NumericText(..))
    }

    pub fn as_number(&self) -> Option<f64> {
        match self {
            Value::Number(n) | Value::NumericText(n, _) => Some(*n),
            Value::Text(_) => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Text(s) | Value::NumericText(_, s) => Some(s),
            Value::Number(_) => None,
        }
    }

    /// True iff this value is numeric and equal to `n`.
    pub fn equals_number(&self, n: f64) -> bool {
        self.as_number() == Some(n)
    }

    /// True iff this value carries non-empty text equal to `s`.
    pub fn equals_str(&self, s: &str) -> bool {
        matches!(self.as_str(), Some(own) if !own.is_empty() && own == s)
    }

    /// Match `other` against this value: first by this value's number, then
    /// by this value's text. `a.equals(&b)` need not equal `b.equals(&a)`.
    pub fn equals(&self, other: &Value) -> bool {
        if let Some(n) = self.as_number()
            && other.equals_number(n)
        {
            return true;
        }
        self.as_str().is_some_and(|s| other.equals_str(s))
    }
}

impl<'de> Deserialize<'de> for Value {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        deserializer.deserialize_any(ValueVisitor)
    }
}

/// Types rule-file scalars the way stylesheet literals are typed: numbers and
/// numeric-looking strings become numeric values that keep their text.
struct ValueVisitor;

impl<'de> Visitor<'de> for ValueVisitor {
    type Value = Value;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("a string, a number, or a [number, text] pair")
    }

    fn visit_bool<E: de::Error>(self, b: bool) -> Result<Value, E> {
        Ok(Value::Text(b.to_string()))
    }

    fn visit_i64<E: de::Error>(self, n: i64) -> Result<Value, E> {
        Ok(Value::NumericText(n as f64, n.to_string()))
    }

    fn visit_u64<E: de::Error>(self, n: u64) -> Result<Value, E> {
        Ok(Value::NumericText(n as f64, n.to_string()))
    }

    fn visit_f64<E: de::Error>(self, n: f64) -> Result<Value, E> {
        if n.is_finite() {
            Ok(Value::NumericText(n, n.to_string()))
        } else {
            Ok(Value::Number(n))
        }
    }

    fn visit_str<E: de::Error>(self, s: &str) -> Result<Value, E> {
        Ok(Value::parse_literal(s))
    }

    fn visit_seq<A: SeqAccess<'de>>(self, mut seq: A) -> Result<Value, A::Error> {
        let n: f64 = seq
            .next_element()?
            .ok_or_else(|| de::Error::invalid_length(0, &self))?;
        let text: String = seq
            .next_element()?
            .ok_or_else(|| de::Error::invalid_length(1, &self))?;
        if seq.next_element::<de::IgnoredAny>()?.is_some() {
            return Err(de::Error::invalid_length(3, &self));
        }
        Ok(Value::NumericText(n, text))
    }
}

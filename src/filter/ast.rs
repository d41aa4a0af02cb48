//! Filter tree types.

use super::value::Value;
use serde::{Deserialize, Serialize};
use std::fmt;

/// A compiled style filter.
///
/// Combinator nodes own their operands; leaf nodes test a single attribute
/// key. Trees are built once per style rule and evaluated for every feature.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Filter {
    /// True if any operand is true.
    Any(Vec<Filter>),

    /// True if every operand is true.
    All(Vec<Filter>),

    /// True if no operand is true.
    None(Vec<Filter>),

    /// Key presence in the context or either attribute map.
    Existence { key: String, exists: bool },

    /// Key value matches any of `values`.
    Equality { key: String, values: Vec<Value> },

    /// Numeric key value in `[min, max)`.
    Range { key: String, min: f64, max: f64 },
}

/// Logical combinator kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operator {
    Any,
    All,
    None,
}

/// Discriminant of a [`Filter`] node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FilterKind {
    Any,
    All,
    None,
    Existence,
    Equality,
    Range,
}

impl fmt::Display for FilterKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            FilterKind::Any => "any",
            FilterKind::All => "all",
            FilterKind::None => "none",
            FilterKind::Existence => "existence",
            FilterKind::Equality => "equality",
            FilterKind::Range => "range",
        };
        f.write_str(name)
    }
}

impl Filter {
    /// Build an `any`, `all` or `none` node.
    pub fn combinator(op: Operator, operands: Vec<Filter>) -> Self {
        match op {
            Operator::Any => Filter::Any(operands),
            Operator::All => Filter::All(operands),
            Operator::None => Filter::None(operands),
        }
    }

    /// Build an equality node. An empty `values` list never matches.
    pub fn equality(key: impl Into<String>, values: Vec<Value>) -> Self {
        Filter::Equality {
            key: key.into(),
            values,
        }
    }

    /// Build a `[min, max)` range node. `min == max` never matches.
    pub fn range(key: impl Into<String>, min: f64, max: f64) -> Self {
        Filter::Range {
            key: key.into(),
            min,
            max,
        }
    }

    pub fn existence(key: impl Into<String>, exists: bool) -> Self {
        Filter::Existence {
            key: key.into(),
            exists,
        }
    }

    pub fn kind(&self) -> FilterKind {
        match self {
            Filter::Any(_) => FilterKind::Any,
            Filter::All(_) => FilterKind::All,
            Filter::None(_) => FilterKind::None,
            Filter::Existence { .. } => FilterKind::Existence,
            Filter::Equality { .. } => FilterKind::Equality,
            Filter::Range { .. } => FilterKind::Range,
        }
    }

    /// Child filters of a combinator; empty for leaves.
    pub fn operands(&self) -> &[Filter] {
        match self {
            Filter::Any(ops) | Filter::All(ops) | Filter::None(ops) => ops.as_slice(),
            _ => &[],
        }
    }

    /// Attribute key tested by a leaf; `None` for combinators.
    pub fn key(&self) -> Option<&str> {
        match self {
            Filter::Existence { key, .. }
            | Filter::Equality { key, .. }
            | Filter::Range { key, .. } => Some(key.as_str()),
            _ => Option::None,
        }
    }

    /// Number of leaf predicates in the tree.
    pub fn leaf_count(&self) -> usize {
        match self {
            Filter::Any(ops) | Filter::All(ops) | Filter::None(ops) => {
                ops.iter().map(Filter::leaf_count).sum()
            }
            _ => 1,
        }
    }

    /// Tree depth; a lone leaf or empty combinator is depth 1.
    pub fn depth(&self) -> usize {
        1 + self
            .operands()
            .iter()
            .map(Filter::depth)
            .max()
            .unwrap_or(0)
    }
}

/// The identity filter: an empty `none` node, which matches every feature.
impl Default for Filter {
    fn default() -> Self {
        Filter::None(Vec::new())
    }
}

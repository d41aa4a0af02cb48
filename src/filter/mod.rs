//! Style filters over feature attributes.
//!
//! A filter tree combines three leaf predicates with `any`, `all` and `none`:
//!   existence   - key present (or absent) in context or feature
//!   equality    - key value matches one of a set of values
//!   range       - numeric key value in `[min, max)`
//!
//! A per-evaluation context shadows the feature's own attributes.

mod ast;
mod eval;
mod value;

pub use ast::{Filter, FilterKind, Operator};
pub use eval::evaluate_filter;
pub use value::Value;

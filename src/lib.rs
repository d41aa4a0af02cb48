//! Style filter evaluation for map features.
//!
//! [`filter`] holds the core: dual-typed [`filter::Value`]s and the
//! [`filter::Filter`] tree evaluated against a [`feature::Feature`] and a
//! shadowing [`feature::Context`]. The remaining modules move features in
//! and out of GeoJSON and apply path updates to scene configurations.

pub mod config;
pub mod feature;
pub mod filter;
pub mod pipeline;
pub mod scene;
pub mod sinks;
pub mod source;

use anyhow::{Context as _, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::feature::Context;
use crate::filter::{Filter, Value};

/// A style rule file: one filter tree plus default context values.
///
/// Filter nodes are written as single-key maps (`all: [...]`,
/// `range: { key, min, max }`) at every depth.
#[derive(Debug, Default, Deserialize, Serialize)]
pub struct RulesConfig {
    #[serde(default, with = "serde_yaml::with::singleton_map_recursive")]
    pub filter: Filter,
    #[serde(default)]
    pub context: Context,
}

impl RulesConfig {
    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("Rules: Failed to read {:?}", path))?;
        Self::from_yaml(&text).with_context(|| format!("Rules: Failed to parse {:?}", path))
    }

    pub fn from_yaml(text: &str) -> Result<Self> {
        Ok(serde_yaml::from_str(text)?)
    }

    /// Overlay `key=value` pairs on the configured context. Later entries win.
    pub fn apply_overrides(&mut self, overrides: &[(String, Value)]) {
        for (key, value) in overrides {
            self.context.insert(key.clone(), value.clone());
        }
    }
}

/// Parse a `key=value` context override, inferring the value type from the
/// literal text.
pub fn parse_context_override(arg: &str) -> Result<(String, Value), String> {
    let (key, value) = arg
        .split_once('=')
        .ok_or_else(|| format!("invalid context override (expected key=value): {arg}"))?;
    let key = key.trim();
    if key.is_empty() {
        return Err(format!("invalid context override (empty key): {arg}"));
    }
    Ok((key.to_string(), Value::parse_literal(value)))
}

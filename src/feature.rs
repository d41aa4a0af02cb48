//! Map features as seen by the filter evaluator.

use anyhow::{Context as _, Result};
use geo_types::Geometry;
use serde_json::{Map, Value as JsonValue};
use std::collections::HashMap;

use crate::filter::Value;

/// Per-evaluation attribute overrides, keyed by attribute name.
pub type Context = HashMap<String, Value>;

/// Typed feature attributes. A key normally lives in only one of the maps.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Properties {
    pub string_props: HashMap<String, String>,
    pub numeric_props: HashMap<String, f64>,
}

impl Properties {
    pub fn is_empty(&self) -> bool {
        self.string_props.is_empty() && self.numeric_props.is_empty()
    }

    pub fn len(&self) -> usize {
        self.string_props.len() + self.numeric_props.len()
    }
}

/// A feature under evaluation.
///
/// Only `props` takes part in filtering. The remaining GeoJSON members are
/// carried so matched features are written back unchanged.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Feature {
    pub geometry: Option<Geometry<f64>>,
    pub props: Properties,
    pub id: Option<geojson::feature::Id>,
    pub bbox: Option<geojson::Bbox>,
    /// Properties with no attribute type (booleans, nulls, arrays, objects).
    pub extras: Map<String, JsonValue>,
    pub foreign_members: Option<geojson::JsonObject>,
}

impl Feature {
    pub fn new(props: Properties) -> Self {
        Self {
            props,
            ..Default::default()
        }
    }

    pub fn with_geometry(mut self, geometry: Geometry<f64>) -> Self {
        self.geometry = Some(geometry);
        self
    }

    /// Convert a GeoJSON feature. String and number properties become
    /// attributes; everything else is kept aside in `extras`.
    pub fn from_geojson(feature: geojson::Feature) -> Result<Self> {
        let geometry = match feature.geometry {
            Some(geom) => Some(
                Geometry::<f64>::try_from(geom)
                    .context("Input: Unsupported feature geometry")?,
            ),
            None => None,
        };

        let mut props = Properties::default();
        let mut extras = Map::new();
        for (key, value) in feature.properties.unwrap_or_default() {
            match value {
                JsonValue::String(s) => {
                    props.string_props.insert(key, s);
                }
                JsonValue::Number(n) => match n.as_f64() {
                    Some(f) => {
                        props.numeric_props.insert(key, f);
                    }
                    None => {
                        extras.insert(key, JsonValue::Number(n));
                    }
                },
                other => {
                    tracing::debug!("Untyped property '{}' ({})", key, json_kind(&other));
                    extras.insert(key, other);
                }
            }
        }

        Ok(Self {
            geometry,
            props,
            id: feature.id,
            bbox: feature.bbox,
            extras,
            foreign_members: feature.foreign_members,
        })
    }

    /// Rebuild a GeoJSON feature. A key set as both a string and a number
    /// is written as the string.
    pub fn to_geojson(&self) -> geojson::Feature {
        let mut properties = self.extras.clone();
        for (key, value) in &self.props.numeric_props {
            if self.props.string_props.contains_key(key) {
                tracing::debug!("Property '{}' written as string, numeric value dropped", key);
                continue;
            }
            if let Some(n) = json_number(*value) {
                properties.insert(key.clone(), JsonValue::Number(n));
            }
        }
        for (key, value) in &self.props.string_props {
            properties.insert(key.clone(), JsonValue::String(value.clone()));
        }

        geojson::Feature {
            bbox: self.bbox.clone(),
            geometry: self.geometry.as_ref().map(geojson::Geometry::from),
            id: self.id.clone(),
            properties: Some(properties),
            foreign_members: self.foreign_members.clone(),
        }
    }
}

/// Integral values are written without a fractional part, so `2` stays `2`.
fn json_number(value: f64) -> Option<serde_json::Number> {
    if value.fract() == 0.0 && value.abs() < 9.0e15 {
        Some(serde_json::Number::from(value as i64))
    } else {
        serde_json::Number::from_f64(value)
    }
}

fn json_kind(value: &JsonValue) -> &'static str {
    match value {
        JsonValue::Null => "null",
        JsonValue::Bool(_) => "bool",
        JsonValue::Number(_) => "number",
        JsonValue::String(_) => "string",
        JsonValue::Array(_) => "array",
        JsonValue::Object(_) => "object",
    }
}

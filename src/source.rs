//! Feature input: GeoJSON FeatureCollections and newline-delimited features.

use anyhow::{Context as _, Result, bail};
use clap::ValueEnum;
use geojson::GeoJson;
use std::io::{BufRead, BufReader, Read};
use std::path::Path;

use crate::feature::Feature;

#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, ValueEnum, Debug)]
pub enum InputFormat {
    /// A single FeatureCollection (or lone Feature) document
    #[value(name = "geojson")]
    GeoJson,
    /// One Feature per line
    #[value(name = "geojsonl", alias = "jsonl")]
    GeoJsonl,
}

impl InputFormat {
    /// Detect from the file extension. `-` (stdin) reads line-delimited.
    pub fn detect(path: &Path) -> Option<Self> {
        if path == Path::new("-") {
            return Some(InputFormat::GeoJsonl);
        }
        let ext = path.extension()?.to_str()?;
        match ext.to_lowercase().as_str() {
            "geojson" | "json" => Some(InputFormat::GeoJson),
            "geojsonl" | "jsonl" | "ndjson" => Some(InputFormat::GeoJsonl),
            _ => None,
        }
    }
}

pub fn read_features(path: &Path, format: InputFormat) -> Result<Vec<Feature>> {
    let reader: Box<dyn Read> = if path == Path::new("-") {
        Box::new(std::io::stdin())
    } else {
        let file = std::fs::File::open(path)
            .with_context(|| format!("Input: Failed to open {:?}", path))?;
        Box::new(file)
    };

    match format {
        InputFormat::GeoJson => read_collection(reader),
        InputFormat::GeoJsonl => read_lines(BufReader::new(reader)),
    }
}

pub fn read_collection<R: Read>(mut reader: R) -> Result<Vec<Feature>> {
    let mut text = String::new();
    reader
        .read_to_string(&mut text)
        .context("Input: Failed to read GeoJSON")?;
    let geojson: GeoJson = text.parse().context("Input: Invalid GeoJSON")?;

    match geojson {
        GeoJson::FeatureCollection(collection) => collection
            .features
            .into_iter()
            .map(Feature::from_geojson)
            .collect(),
        GeoJson::Feature(feature) => Ok(vec![Feature::from_geojson(feature)?]),
        GeoJson::Geometry(_) => {
            bail!("Input: Expected a Feature or FeatureCollection, got a bare geometry")
        }
    }
}

pub fn read_lines<R: BufRead>(reader: R) -> Result<Vec<Feature>> {
    let mut features = Vec::new();
    for (i, line) in reader.lines().enumerate() {
        let line = line.context("Input: Failed to read line")?;
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        let geojson: GeoJson = line
            .parse()
            .with_context(|| format!("Input: Invalid GeoJSON on line {}", i + 1))?;
        match geojson {
            GeoJson::Feature(feature) => features.push(
                Feature::from_geojson(feature)
                    .with_context(|| format!("Input: Bad feature on line {}", i + 1))?,
            ),
            _ => tracing::warn!("Input: Skipping non-Feature object on line {}", i + 1),
        }
    }
    Ok(features)
}

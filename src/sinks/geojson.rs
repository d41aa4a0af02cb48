use super::DataSink;
use crate::feature::Feature;
use anyhow::{Context as _, Result};
use geojson::GeoJson;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

pub struct GeoJsonSink {
    writer: BufWriter<File>,
    first_feature: bool,
}

impl GeoJsonSink {
    pub fn new<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let file =
            File::create(path).with_context(|| format!("Output: Failed to create {:?}", path))?;
        let mut writer = BufWriter::new(file);

        // Write the header of the FeatureCollection
        writeln!(writer, "{{")?;
        writeln!(writer, "  \"type\": \"FeatureCollection\",")?;
        writeln!(writer, "  \"features\": [")?;

        Ok(Self {
            writer,
            first_feature: true,
        })
    }
}

impl DataSink for GeoJsonSink {
    fn add_feature(&mut self, feature: &Feature) -> Result<()> {
        if !self.first_feature {
            writeln!(self.writer, ",")?;
        }
        self.first_feature = false;

        let geojson = GeoJson::Feature(feature.to_geojson());
        serde_json::to_writer(&mut self.writer, &geojson)?;

        Ok(())
    }

    fn finish(&mut self) -> Result<()> {
        // Close the array and object
        writeln!(self.writer)?;
        writeln!(self.writer, "  ]")?;
        writeln!(self.writer, "}}")?;
        self.writer.flush()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::feature::Properties;
    use geo_types::{Geometry, LineString, Point, Polygon};
    use tempfile::NamedTempFile;

    fn feature(
        geometry: Geometry<f64>,
        strings: &[(&str, &str)],
        numbers: &[(&str, f64)],
    ) -> Feature {
        let mut props = Properties::default();
        for (k, v) in strings {
            props.string_props.insert(k.to_string(), v.to_string());
        }
        for (k, v) in numbers {
            props.numeric_props.insert(k.to_string(), *v);
        }
        Feature::new(props).with_geometry(geometry)
    }

    fn point(name: &str, lon: f64, lat: f64) -> Feature {
        feature(Geometry::Point(Point::new(lon, lat)), &[("name", name)], &[])
    }

    fn write_and_parse(features: &[Feature]) -> serde_json::Value {
        let temp_file = NamedTempFile::with_suffix(".geojson").unwrap();
        let mut sink = GeoJsonSink::new(temp_file.path()).unwrap();
        for f in features {
            sink.add_feature(f).unwrap();
        }
        sink.finish().unwrap();

        let content = std::fs::read_to_string(temp_file.path()).unwrap();
        serde_json::from_str(&content).unwrap()
    }

    #[test]
    fn creates_valid_geojson_structure() {
        let parsed = write_and_parse(&[point("Test", 0.0, 0.0)]);

        assert_eq!(parsed["type"], "FeatureCollection");
        assert!(parsed["features"].is_array());
        assert_eq!(parsed["features"].as_array().unwrap().len(), 1);
    }

    #[test]
    fn writes_multiple_features_with_commas() {
        let parsed = write_and_parse(&[
            point("First", 0.0, 0.0),
            point("Second", 1.0, 1.0),
            point("Third", 2.0, 2.0),
        ]);

        assert_eq!(parsed["features"].as_array().unwrap().len(), 3);
    }

    #[test]
    fn writes_empty_feature_collection() {
        let parsed = write_and_parse(&[]);

        assert_eq!(parsed["type"], "FeatureCollection");
        assert!(parsed["features"].as_array().unwrap().is_empty());
    }

    #[test]
    fn includes_geometry_in_feature() {
        let parsed = write_and_parse(&[point("Test", -0.1, 51.5)]);

        let feature = &parsed["features"][0];
        assert_eq!(feature["type"], "Feature");
        assert_eq!(feature["geometry"]["type"], "Point");

        let coords = &feature["geometry"]["coordinates"];
        assert!((coords[0].as_f64().unwrap() - (-0.1)).abs() < 1e-10);
        assert!((coords[1].as_f64().unwrap() - 51.5).abs() < 1e-10);
    }

    #[test]
    fn includes_typed_properties() {
        let parsed = write_and_parse(&[feature(
            Geometry::Point(Point::new(0.0, 0.0)),
            &[("name", "Test")],
            &[("population", 1000.0), ("area", 123.45)],
        )]);

        let props = &parsed["features"][0]["properties"];
        assert_eq!(props["name"], "Test");
        assert_eq!(props["population"].as_f64(), Some(1000.0));
        assert!((props["area"].as_f64().unwrap() - 123.45).abs() < 1e-10);
    }

    #[test]
    fn writes_linestring_and_polygon_geometry() {
        let line = LineString::from(vec![(0.0, 0.0), (1.0, 1.0), (2.0, 0.0)]);
        let polygon = Polygon::new(
            LineString::from(vec![(0.0, 0.0), (1.0, 0.0), (1.0, 1.0), (0.0, 1.0), (0.0, 0.0)]),
            vec![],
        );
        let parsed = write_and_parse(&[
            feature(Geometry::LineString(line), &[], &[]),
            feature(Geometry::Polygon(polygon), &[], &[]),
        ]);

        assert_eq!(parsed["features"][0]["geometry"]["type"], "LineString");
        assert_eq!(parsed["features"][1]["geometry"]["type"], "Polygon");
    }

    #[test]
    fn reports_uncreatable_output_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing").join("out");
        let err = GeoJsonSink::new(&path).err().unwrap();
        assert!(err.to_string().starts_with("Output: Failed to create"));
    }
}

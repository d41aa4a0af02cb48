//! Scene configuration and queued path updates.
//!
//! An update addresses a node by a dotted path (`lights.light1.ambient`) and
//! carries YAML text for the new value. Updates are applied in the order they
//! were queued; an update whose parent path doesn't resolve to a mapping is
//! skipped rather than creating intermediate nodes.

use anyhow::{Context as _, Result};
use serde_yaml::Value as YamlValue;
use std::path::Path;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SceneUpdate {
    pub path: String,
    pub value: String,
}

impl SceneUpdate {
    pub fn new(path: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            value: value.into(),
        }
    }
}

/// Parse a `path=value` update argument.
pub fn parse_scene_update(arg: &str) -> Result<SceneUpdate, String> {
    let (path, value) = arg
        .split_once('=')
        .ok_or_else(|| format!("invalid scene update (expected path=value): {arg}"))?;
    if path.trim().is_empty() {
        return Err(format!("invalid scene update (empty path): {arg}"));
    }
    Ok(SceneUpdate::new(path.trim(), value))
}

#[derive(Debug, Default)]
pub struct Scene {
    config: YamlValue,
    updates: Vec<SceneUpdate>,
}

impl Scene {
    pub fn load_config(source: &str) -> Result<Self> {
        let config = serde_yaml::from_str(source).context("Scene: Invalid scene YAML")?;
        Ok(Self {
            config,
            updates: Vec::new(),
        })
    }

    pub fn load(path: &Path) -> Result<Self> {
        let source = std::fs::read_to_string(path)
            .with_context(|| format!("Scene: Failed to read {:?}", path))?;
        Self::load_config(&source)
    }

    pub fn config(&self) -> &YamlValue {
        &self.config
    }

    pub fn queue_update(&mut self, path: impl Into<String>, value: impl Into<String>) {
        self.updates.push(SceneUpdate::new(path, value));
    }

    pub fn updates(&self) -> &[SceneUpdate] {
        &self.updates
    }

    pub fn clear_updates(&mut self) {
        self.updates.clear();
    }

    /// Apply and clear the queued updates. Returns how many took effect.
    pub fn apply_queued(&mut self) -> usize {
        let applied = apply_updates(&mut self.config, &self.updates);
        self.clear_updates();
        applied
    }

    pub fn to_yaml(&self) -> Result<String> {
        serde_yaml::to_string(&self.config).context("Scene: Failed to serialize scene")
    }
}

/// Apply `updates` to `root` in order. Returns how many took effect.
pub fn apply_updates(root: &mut YamlValue, updates: &[SceneUpdate]) -> usize {
    let mut applied = 0;
    for update in updates {
        if apply_update(root, update) {
            applied += 1;
        } else {
            tracing::debug!("Scene: Skipping update to missing path '{}'", update.path);
        }
    }
    applied
}

fn apply_update(root: &mut YamlValue, update: &SceneUpdate) -> bool {
    let keys: Vec<&str> = update.path.split('.').collect();
    let Some((last, parents)) = keys.split_last() else {
        return false;
    };

    let mut node = root;
    for key in parents {
        node = match node.get_mut(*key) {
            Some(child) => child,
            None => return false,
        };
    }

    let Some(mapping) = node.as_mapping_mut() else {
        return false;
    };
    mapping.insert(YamlValue::String(last.to_string()), parse_value(&update.value));
    true
}

/// Parse update text as YAML, keeping it as a plain string if it isn't valid.
fn parse_value(text: &str) -> YamlValue {
    serde_yaml::from_str(text).unwrap_or_else(|_| YamlValue::String(text.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    const SCENE: &str = r#"
global:
    default_order: function() { return feature.sort_key; }

cameras:
    iso-camera:
        type: isometric
        active: false
    perspective-camera:
        type: perspective
        active: true

lights:
    light1:
        type: directional
        direction: [.1, .5, -1]
        diffuse: .7
        ambient: .5

styles:
    heightglow:
        base: polygons
        shaders:
            uniforms:
                u_time_expand: 10.0
    heightglowline:
        base: lines
        mix: heightglow

layers:
    poi_icons:
        draw:
            icons:
                interactive: true
"#;

    fn yaml(text: &str) -> YamlValue {
        serde_yaml::from_str(text).unwrap()
    }

    #[test]
    fn test_scene_updates() {
        let mut scene = Scene::load_config(SCENE).unwrap();

        scene.queue_update("lights.light1.ambient", "0.9");
        scene.queue_update("lights.light1.type", "spotlight");
        scene.queue_update("lights.light1.origin", "ground");
        scene.queue_update("layers.poi_icons.draw.icons.interactive", "false");
        scene.queue_update("styles.heightglow.shaders.uniforms.u_time_expand", "5.0");
        scene.queue_update("cameras.iso-camera.active", "true");
        scene.queue_update("cameras.iso-camera.type", "perspective");
        scene.queue_update("global.default_order", "function() { return 0.0; }");
        scene.queue_update("global.non_existing_property0", "true");
        scene.queue_update(
            "global.non_existing_property1.non_existing_property_deep",
            "true",
        );

        let applied = apply_updates(&mut scene.config, &scene.updates);
        scene.clear_updates();
        assert_eq!(applied, 9);
        assert!(scene.updates().is_empty());

        let root = scene.config();
        assert_eq!(root["lights"]["light1"]["ambient"], yaml("0.9"));
        assert_eq!(root["lights"]["light1"]["type"], yaml("spotlight"));
        assert_eq!(root["lights"]["light1"]["origin"], yaml("ground"));
        assert_eq!(
            root["layers"]["poi_icons"]["draw"]["icons"]["interactive"],
            YamlValue::Bool(false)
        );
        assert_eq!(
            root["styles"]["heightglow"]["shaders"]["uniforms"]["u_time_expand"],
            yaml("5.0")
        );
        assert_eq!(root["cameras"]["iso-camera"]["active"], YamlValue::Bool(true));
        assert_eq!(root["cameras"]["iso-camera"]["type"], yaml("perspective"));
        assert_eq!(
            root["global"]["default_order"],
            YamlValue::String("function() { return 0.0; }".into())
        );
        assert_eq!(root["global"]["non_existing_property0"], YamlValue::Bool(true));
        assert!(root["global"].get("non_existing_property1").is_none());
    }

    #[test]
    fn test_update_ordering_is_preserved() {
        let mut scene = Scene::load_config(SCENE).unwrap();

        scene.queue_update("lights.light1.ambient", "0.9");
        scene.queue_update("lights.light2.ambient", "0.0");

        // Null out lights; later updates below it have nowhere to go.
        scene.queue_update("lights", "null");
        scene.queue_update("lights.light2.ambient", "0.0");

        assert_eq!(scene.apply_queued(), 2);

        let root = scene.config();
        assert!(root["lights"].is_null());
        assert!(root["lights"].get("light1").is_none());
        assert!(root["lights"].get("light2").is_none());
    }

    #[test]
    fn test_update_into_scalar_is_skipped() {
        let mut scene = Scene::load_config(SCENE).unwrap();
        scene.queue_update("lights.light1.ambient.deeper", "1");
        assert_eq!(scene.apply_queued(), 0);
        assert_eq!(scene.config()["lights"]["light1"]["ambient"], yaml(".5"));
    }

    #[test]
    fn test_invalid_yaml_value_is_kept_as_text() {
        let mut scene = Scene::load_config(SCENE).unwrap();
        scene.queue_update("global.broken", "[unclosed");
        scene.apply_queued();
        assert_eq!(
            scene.config()["global"]["broken"],
            YamlValue::String("[unclosed".into())
        );
    }

    #[test]
    fn test_parse_scene_update() {
        assert_eq!(
            parse_scene_update("lights.light1.ambient=0.9").unwrap(),
            SceneUpdate::new("lights.light1.ambient", "0.9")
        );
        assert_eq!(
            parse_scene_update("global.expr=a == b").unwrap(),
            SceneUpdate::new("global.expr", "a == b")
        );
        assert!(parse_scene_update("lights").is_err());
        assert!(parse_scene_update("=1").is_err());
    }
}

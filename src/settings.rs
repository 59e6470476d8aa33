//! Simulation settings
//!
//! Loaded from JSON by the host. Every field has a default so partial files
//! are accepted.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::consts::*;
use crate::error::{Error, Result};
use crate::sim::LayerMask;

/// What a press does when the pointer ray hits neither a snowball nor ground
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum MissPolicy {
    /// Stay idle; nothing is spawned
    #[default]
    Ignore,
    /// Spawn at the world origin and start growing it
    SpawnAtOrigin,
}

impl MissPolicy {
    pub fn as_str(&self) -> &'static str {
        match self {
            MissPolicy::Ignore => "ignore",
            MissPolicy::SpawnAtOrigin => "spawn_at_origin",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "ignore" => Some(MissPolicy::Ignore),
            "spawn_at_origin" | "origin" => Some(MissPolicy::SpawnAtOrigin),
            _ => None,
        }
    }
}

/// Tuning for growth, contact resolution and spatial filtering
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    // === Growth ===
    /// Scale gained per unit of pointer movement (|dx| + |dy|)
    pub growth_rate: f32,
    /// Scale of a newly spawned snowball
    pub prefab_scale: f32,
    /// Optional ceiling on scale, applied to growth and absorption
    pub max_scale: Option<f32>,

    // === Queries ===
    /// Ray length for ground and pick rays (`None` = unbounded)
    pub max_ray_distance: Option<f32>,
    /// Layers treated as ground
    pub ground_layer: LayerMask,
    /// Layers treated as snowballs
    pub sphere_layer: LayerMask,

    // === Contacts ===
    /// Maximum horizontal center distance for stacking (`None` = no limit)
    pub max_stack_distance: Option<f32>,

    // === Input ===
    /// Behavior of a press that hits nothing
    pub miss_policy: MissPolicy,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            growth_rate: DEFAULT_GROWTH_RATE,
            prefab_scale: DEFAULT_PREFAB_SCALE,
            max_scale: None,

            max_ray_distance: None,
            ground_layer: LayerMask::GROUND,
            sphere_layer: LayerMask::SPHERE,

            max_stack_distance: None,

            miss_policy: MissPolicy::Ignore,
        }
    }
}

impl Settings {
    /// Parse and validate settings from a JSON document
    pub fn from_json_str(json: &str) -> Result<Self> {
        let settings: Settings = serde_json::from_str(json)?;
        settings.validate()?;
        Ok(settings)
    }

    /// Load settings from a JSON file
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path)?;
        let settings = Self::from_json_str(&json)?;
        log::info!("Loaded settings from {}", path.display());
        Ok(settings)
    }

    /// Write settings as pretty JSON
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path.as_ref(), json)?;
        log::info!("Settings saved to {}", path.as_ref().display());
        Ok(())
    }

    /// Reject values the simulation cannot honor
    pub fn validate(&self) -> Result<()> {
        if !self.growth_rate.is_finite() || self.growth_rate < 0.0 {
            return Err(invalid("growth_rate", "must be finite and >= 0"));
        }
        if !self.prefab_scale.is_finite() || self.prefab_scale <= 0.0 {
            return Err(invalid("prefab_scale", "must be finite and > 0"));
        }
        if let Some(max) = self.max_scale {
            if !(max >= self.prefab_scale) {
                return Err(invalid("max_scale", "must be >= prefab_scale"));
            }
        }
        if let Some(dist) = self.max_ray_distance {
            if !(dist > 0.0) {
                return Err(invalid("max_ray_distance", "must be > 0"));
            }
        }
        if let Some(dist) = self.max_stack_distance {
            if !(dist >= 0.0) {
                return Err(invalid("max_stack_distance", "must be >= 0"));
            }
        }
        if self.ground_layer.is_empty() {
            return Err(invalid("ground_layer", "must select at least one layer"));
        }
        if self.sphere_layer.is_empty() {
            return Err(invalid("sphere_layer", "must select at least one layer"));
        }
        if self.ground_layer.intersects(self.sphere_layer) {
            log::warn!(
                "ground_layer and sphere_layer overlap ({:?} & {:?}); snowballs will be treated as ground",
                self.ground_layer,
                self.sphere_layer
            );
        }
        Ok(())
    }

    /// Effective ray length
    pub fn ray_distance(&self) -> f32 {
        self.max_ray_distance.unwrap_or(f32::INFINITY)
    }

    /// Apply the optional scale ceiling
    pub fn clamp_scale(&self, scale: f32) -> f32 {
        match self.max_scale {
            Some(max) => scale.min(max),
            None => scale,
        }
    }
}

fn invalid(field: &'static str, reason: &str) -> Error {
    Error::InvalidSetting {
        field,
        reason: reason.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_validate() {
        let settings = Settings::default();
        assert!(settings.validate().is_ok());
        assert_eq!(settings.growth_rate, 0.1);
        assert_eq!(settings.ray_distance(), f32::INFINITY);
        assert_eq!(settings.miss_policy, MissPolicy::Ignore);
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let settings = Settings::from_json_str(r#"{ "growth_rate": 0.25 }"#).unwrap();
        assert_eq!(settings.growth_rate, 0.25);
        assert_eq!(settings.prefab_scale, DEFAULT_PREFAB_SCALE);
        assert_eq!(settings.sphere_layer, LayerMask::SPHERE);
    }

    #[test]
    fn test_miss_policy_json() {
        let settings = Settings::from_json_str(r#"{ "miss_policy": "spawn_at_origin" }"#).unwrap();
        assert_eq!(settings.miss_policy, MissPolicy::SpawnAtOrigin);
        assert_eq!(MissPolicy::from_str("Origin"), Some(MissPolicy::SpawnAtOrigin));
        assert_eq!(MissPolicy::from_str("bogus"), None);
    }

    #[test]
    fn test_rejects_bad_values() {
        let err = Settings::from_json_str(r#"{ "prefab_scale": 0.0 }"#).unwrap_err();
        assert!(matches!(err, Error::InvalidSetting { field: "prefab_scale", .. }));

        let err = Settings::from_json_str(r#"{ "growth_rate": -1.0 }"#).unwrap_err();
        assert!(matches!(err, Error::InvalidSetting { field: "growth_rate", .. }));

        let err = Settings::from_json_str(r#"{ "max_scale": 0.5 }"#).unwrap_err();
        assert!(matches!(err, Error::InvalidSetting { field: "max_scale", .. }));

        let err = Settings::from_json_str(r#"{ "sphere_layer": 0 }"#).unwrap_err();
        assert!(matches!(err, Error::InvalidSetting { field: "sphere_layer", .. }));

        assert!(matches!(
            Settings::from_json_str("{ not json").unwrap_err(),
            Error::Json(_)
        ));
    }

    #[test]
    fn test_clamp_scale() {
        let mut settings = Settings::default();
        assert_eq!(settings.clamp_scale(50.0), 50.0);
        settings.max_scale = Some(4.0);
        assert_eq!(settings.clamp_scale(50.0), 4.0);
        assert_eq!(settings.clamp_scale(2.0), 2.0);
    }

    #[test]
    fn test_save_and_load_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");
        let mut settings = Settings::default();
        settings.max_stack_distance = Some(2.0);
        settings.save(&path).unwrap();
        let loaded = Settings::load(&path).unwrap();
        assert_eq!(loaded, settings);
    }

    #[test]
    fn test_load_missing_file() {
        let err = Settings::load("/definitely/not/here.json").unwrap_err();
        assert!(matches!(err, Error::Io(_)));
    }
}

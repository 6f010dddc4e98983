//! Configuration for the detection engine

use super::error::{EngineError, EngineResult};
use crate::features::FeatureConfig;
use crate::matching::MatcherKind;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DetectionConfig {
    /// Lowe ratio: nearest distance must be below this times the second nearest
    pub ratio_threshold: f32,
    /// Good matches needed for a template to count, also the DBSCAN density floor
    pub min_good_matches: usize,
    /// Frames with fewer keypoints are skipped without matching
    pub min_frame_keypoints: usize,
    /// Fixed pause after every scan tick
    pub tick_interval_ms: u64,
    /// Cluster radius as a multiple of the template diagonal. One on-screen
    /// instance spans about one diagonal, so its matches chain into one cluster.
    pub cluster_radius_factor: f32,
    pub matcher: MatcherKind,
    /// Seed for the cluster choice; random when unset
    pub rng_seed: Option<u64>,
    pub features: FeatureConfig,
}

impl Default for DetectionConfig {
    fn default() -> Self {
        Self {
            ratio_threshold: 0.6,
            min_good_matches: 10,
            min_frame_keypoints: 10,
            tick_interval_ms: 100,
            cluster_radius_factor: 1.0,
            matcher: MatcherKind::default(),
            rng_seed: None,
            features: FeatureConfig::default(),
        }
    }
}

impl DetectionConfig {
    /// Fewer false clicks, needs a clearer view of the template
    pub fn strict() -> Self {
        Self {
            ratio_threshold: 0.5,
            min_good_matches: 15,
            cluster_radius_factor: 0.8,
            matcher: MatcherKind::KdTree {
                leaf_size: 8,
                checks: 128,
            },
            ..Self::default()
        }
    }

    /// For small or low contrast templates
    pub fn lenient() -> Self {
        Self {
            ratio_threshold: 0.7,
            min_good_matches: 6,
            min_frame_keypoints: 6,
            cluster_radius_factor: 1.25,
            features: FeatureConfig {
                fast_threshold: 12,
                ..FeatureConfig::default()
            },
            ..Self::default()
        }
    }

    pub fn from_preset(name: &str) -> Option<Self> {
        match name {
            "default" => Some(Self::default()),
            "strict" => Some(Self::strict()),
            "lenient" => Some(Self::lenient()),
            _ => None,
        }
    }

    pub fn tick_interval(&self) -> Duration {
        Duration::from_millis(self.tick_interval_ms)
    }

    pub fn validate(&self) -> EngineResult<()> {
        let invalid = |description: String| Err(EngineError::InvalidConfig { description });

        if !(self.ratio_threshold > 0.0 && self.ratio_threshold <= 1.0) {
            return invalid(format!(
                "ratio_threshold must be in (0, 1], got {}",
                self.ratio_threshold
            ));
        }
        if self.min_good_matches == 0 {
            return invalid("min_good_matches must be at least 1".to_string());
        }
        if !(self.cluster_radius_factor > 0.0) {
            return invalid(format!(
                "cluster_radius_factor must be positive, got {}",
                self.cluster_radius_factor
            ));
        }
        if let MatcherKind::KdTree { leaf_size, checks } = self.matcher
            && (leaf_size == 0 || checks == 0)
        {
            return invalid("kd-tree leaf_size and checks must be at least 1".to_string());
        }
        Ok(())
    }

    pub fn from_toml_str(text: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(text)
    }

    /// Load a TOML config file; missing keys keep their defaults.
    pub fn load_toml(path: impl AsRef<Path>) -> EngineResult<Self> {
        let path = path.as_ref();
        let config_error = |description: String| EngineError::ConfigFile {
            path: path.to_path_buf(),
            description,
        };

        let text = std::fs::read_to_string(path).map_err(|e| config_error(e.to_string()))?;
        let config = Self::from_toml_str(&text).map_err(|e| config_error(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn summary(&self) -> String {
        format!(
            "ratio={:.2} min_matches={} min_frame_kp={} interval={}ms radius_factor={:.2} matcher={:?}",
            self.ratio_threshold,
            self.min_good_matches,
            self.min_frame_keypoints,
            self.tick_interval_ms,
            self.cluster_radius_factor,
            self.matcher
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_design_values() {
        let config = DetectionConfig::default();
        assert_eq!(config.ratio_threshold, 0.6);
        assert_eq!(config.min_good_matches, 10);
        assert_eq!(config.min_frame_keypoints, 10);
        assert_eq!(config.cluster_radius_factor, 1.0);
        assert_eq!(config.tick_interval(), Duration::from_millis(100));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_presets_are_valid() {
        for name in ["default", "strict", "lenient"] {
            let config = DetectionConfig::from_preset(name).unwrap();
            assert!(config.validate().is_ok(), "preset {name} invalid");
        }
        assert!(DetectionConfig::from_preset("turbo").is_none());
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config = DetectionConfig::from_toml_str(
            r#"
            ratio_threshold = 0.65
            rng_seed = 42

            [matcher]
            kind = "brute_force"

            [features]
            fast_threshold = 30
            "#,
        )
        .unwrap();

        assert_eq!(config.ratio_threshold, 0.65);
        assert_eq!(config.rng_seed, Some(42));
        assert_eq!(config.matcher, MatcherKind::BruteForce);
        assert_eq!(config.features.fast_threshold, 30);
        assert_eq!(config.features.pyramid_levels, FeatureConfig::default().pyramid_levels);
        assert_eq!(config.min_good_matches, 10);
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        let bad_ratio = DetectionConfig {
            ratio_threshold: 1.5,
            ..DetectionConfig::default()
        };
        assert!(matches!(bad_ratio.validate(), Err(EngineError::InvalidConfig { .. })));

        let bad_matcher = DetectionConfig {
            matcher: MatcherKind::KdTree {
                leaf_size: 0,
                checks: 10,
            },
            ..DetectionConfig::default()
        };
        assert!(bad_matcher.validate().is_err());
    }

    #[test]
    fn test_missing_config_file_reports_path() {
        let err = DetectionConfig::load_toml("/no/such/clicker.toml").unwrap_err();
        match err {
            EngineError::ConfigFile { path, .. } => {
                assert_eq!(path, Path::new("/no/such/clicker.toml"))
            }
            other => panic!("unexpected error {other:?}"),
        }
    }
}

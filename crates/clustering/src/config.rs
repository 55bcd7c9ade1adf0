use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::cluster::DEFAULT_TOP_K;
use crate::proximity::DEFAULT_PROXIMITY_THRESHOLD_DEG;
use crate::tiers::ZoomTierTable;

/// Which aggregation path `cluster_catalog` runs.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Strategy {
    /// Zoom-dependent grid cells.
    #[default]
    Grid,
    /// Exact `(city, country)` groups, then proximity merging of the rest.
    Semantic,
}

impl std::str::FromStr for Strategy {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "grid" => Ok(Strategy::Grid),
            "semantic" => Ok(Strategy::Semantic),
            other => Err(ConfigError::Parse(format!("unknown strategy {other:?}"))),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClusteringConfig {
    pub top_k: usize,
    pub proximity_threshold_deg: f64,
    pub tiers: ZoomTierTable,
    pub strategy: Strategy,
}

impl Default for ClusteringConfig {
    fn default() -> Self {
        Self {
            top_k: DEFAULT_TOP_K,
            proximity_threshold_deg: DEFAULT_PROXIMITY_THRESHOLD_DEG,
            tiers: ZoomTierTable::default(),
            strategy: Strategy::Grid,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    Io(String),
    Parse(String),
    InvalidTopK,
    InvalidThreshold(String),
    NonMonotonicTiers(String),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::Io(msg) => write!(f, "config read error: {msg}"),
            ConfigError::Parse(msg) => write!(f, "config parse error: {msg}"),
            ConfigError::InvalidTopK => write!(f, "top_k must be at least 1"),
            ConfigError::InvalidThreshold(v) => {
                write!(f, "proximity threshold must be finite and positive, got {v}")
            }
            ConfigError::NonMonotonicTiers(msg) => write!(f, "zoom tiers not monotonic: {msg}"),
        }
    }
}

impl std::error::Error for ConfigError {}

impl ClusteringConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.top_k == 0 {
            return Err(ConfigError::InvalidTopK);
        }
        if !(self.proximity_threshold_deg.is_finite() && self.proximity_threshold_deg > 0.0) {
            return Err(ConfigError::InvalidThreshold(
                self.proximity_threshold_deg.to_string(),
            ));
        }
        self.tiers.validate()
    }

    /// Parses and validates; omitted fields take their defaults.
    pub fn from_json_str(raw: &str) -> Result<Self, ConfigError> {
        let config = serde_json::from_str::<Self>(raw).map_err(|e| ConfigError::Parse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_path(path: &Path) -> Result<Self, ConfigError> {
        let raw = std::fs::read_to_string(path)
            .map_err(|e| ConfigError::Io(format!("{}: {e}", path.display())))?;
        Self::from_json_str(&raw)
    }
}

#[cfg(test)]
mod tests {
    use super::{ClusteringConfig, ConfigError, Strategy};
    use pretty_assertions::assert_eq;

    #[test]
    fn empty_document_uses_defaults() {
        let cfg = ClusteringConfig::from_json_str("{}").unwrap();
        assert_eq!(cfg, ClusteringConfig::default());
        assert_eq!(cfg.top_k, 5);
        assert_eq!(cfg.proximity_threshold_deg, 0.5);
    }

    #[test]
    fn partial_document_overrides_fields() {
        let cfg = ClusteringConfig::from_json_str(
            r#"{
                "top_k": 8,
                "strategy": "semantic",
                "tiers": [
                    {"min_altitude_m": 5000000, "grid_size_deg": 3.0},
                    {"min_altitude_m": 100000, "grid_size_deg": 0.25}
                ]
            }"#,
        )
        .unwrap();
        assert_eq!(cfg.top_k, 8);
        assert_eq!(cfg.strategy, Strategy::Semantic);
        assert_eq!(cfg.tiers.tiers().len(), 2);
        assert_eq!(cfg.proximity_threshold_deg, 0.5);
    }

    #[test]
    fn rejects_bad_values() {
        assert_eq!(
            ClusteringConfig::from_json_str(r#"{"top_k": 0}"#).unwrap_err(),
            ConfigError::InvalidTopK
        );
        assert!(matches!(
            ClusteringConfig::from_json_str(r#"{"proximity_threshold_deg": -1.0}"#).unwrap_err(),
            ConfigError::InvalidThreshold(_)
        ));
        assert!(matches!(
            ClusteringConfig::from_json_str(r#"{"strategy": "hexagons"}"#).unwrap_err(),
            ConfigError::Parse(_)
        ));
    }

    #[test]
    fn strategy_parses_from_cli_text() {
        assert_eq!("Grid".parse::<Strategy>().unwrap(), Strategy::Grid);
        assert_eq!("semantic".parse::<Strategy>().unwrap(), Strategy::Semantic);
        assert!("other".parse::<Strategy>().is_err());
    }
}

use serde::{Deserialize, Serialize};

use crate::config::ConfigError;

/// How finely the grid bucketizer partitions the globe at one zoom level.
#[derive(Debug, Copy, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum GridPolicy {
    /// Square cells of this many degrees.
    Cells { grid_size_deg: f64 },
    /// Zoomed in past the finest tier: every station stands alone.
    PerStation,
}

impl GridPolicy {
    /// Grid size to hand to `bucketize`; `0.0` disables clustering.
    pub fn grid_size_deg(self) -> f64 {
        match self {
            GridPolicy::Cells { grid_size_deg } => grid_size_deg,
            GridPolicy::PerStation => 0.0,
        }
    }
}

/// One row of the zoom table: at or above `min_altitude_m`, use `grid_size_deg`.
#[derive(Debug, Copy, Clone, PartialEq, Serialize, Deserialize)]
pub struct ZoomTier {
    pub min_altitude_m: f64,
    pub grid_size_deg: f64,
}

/// Monotonic camera-altitude to grid-size mapping.
///
/// Tiers are ordered from the highest altitude (coarsest grid) down; the
/// first tier whose `min_altitude_m` the camera is at or above wins.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ZoomTierTable {
    tiers: Vec<ZoomTier>,
}

impl Default for ZoomTierTable {
    fn default() -> Self {
        Self {
            tiers: vec![
                ZoomTier { min_altitude_m: 8_000_000.0, grid_size_deg: 5.0 },
                ZoomTier { min_altitude_m: 4_000_000.0, grid_size_deg: 2.0 },
                ZoomTier { min_altitude_m: 2_000_000.0, grid_size_deg: 1.0 },
                ZoomTier { min_altitude_m: 800_000.0, grid_size_deg: 0.5 },
                ZoomTier { min_altitude_m: 200_000.0, grid_size_deg: 0.1 },
            ],
        }
    }
}

impl ZoomTierTable {
    pub fn new(tiers: Vec<ZoomTier>) -> Result<Self, ConfigError> {
        let table = Self { tiers };
        table.validate()?;
        Ok(table)
    }

    /// Thresholds and grid sizes must both strictly decrease, and be finite
    /// with positive grid sizes.
    pub fn validate(&self) -> Result<(), ConfigError> {
        for (i, tier) in self.tiers.iter().enumerate() {
            if !tier.min_altitude_m.is_finite()
                || !tier.grid_size_deg.is_finite()
                || tier.grid_size_deg <= 0.0
            {
                return Err(ConfigError::NonMonotonicTiers(format!(
                    "tier {i} has a non-finite altitude or non-positive grid size"
                )));
            }
        }
        for (i, pair) in self.tiers.windows(2).enumerate() {
            let (hi, lo) = (pair[0], pair[1]);
            if lo.min_altitude_m >= hi.min_altitude_m || lo.grid_size_deg >= hi.grid_size_deg {
                return Err(ConfigError::NonMonotonicTiers(format!(
                    "tier {} must have lower altitude and smaller grid than tier {i}",
                    i + 1
                )));
            }
        }
        Ok(())
    }

    pub fn tiers(&self) -> &[ZoomTier] {
        &self.tiers
    }

    pub fn policy_for_altitude(&self, altitude_m: f64) -> GridPolicy {
        // NaN altitude compares false everywhere and lands on PerStation.
        self.tiers
            .iter()
            .find(|t| altitude_m >= t.min_altitude_m)
            .map(|t| GridPolicy::Cells {
                grid_size_deg: t.grid_size_deg,
            })
            .unwrap_or(GridPolicy::PerStation)
    }
}

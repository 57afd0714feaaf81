//! Configuration for the TSDF integrator.

use serde::{Deserialize, Serialize};

use crate::error::{MapError, Result};

/// TSDF integrator configuration.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct TsdfIntegratorConfig {
    /// Symmetric truncation band around measured surfaces (meters).
    pub default_truncation_distance: f32,

    /// Saturation cap for per-voxel accumulated weight.
    pub max_weight: f32,

    /// If true, the free-space segment from the sensor origin to the
    /// surface is traversed; if false, only the truncation band around
    /// the measured point.
    pub voxel_carving_enabled: bool,

    /// If true, each measurement contributes weight 1; otherwise
    /// inverse-square distance weighting.
    pub const_weight: bool,

    /// Linearly taper the measurement weight to zero across the
    /// negative truncation band.
    pub use_weight_dropoff: bool,

    /// Points closer to the sensor than this are dropped (meters).
    pub min_ray_length_m: f32,

    /// Points farther from the sensor than this are dropped or clipped
    /// (meters). 0 disables the limit.
    pub max_ray_length_m: f32,

    /// If true, over-length rays are clipped to `max_ray_length_m` and
    /// integrated as free-space clearing rays (requires carving);
    /// if false they are dropped entirely.
    pub clip_long_rays: bool,

    /// Worker threads for integration. 1 integrates on the calling
    /// thread; more shard the cloud and merge partial layers.
    pub integrator_threads: usize,
}

impl Default for TsdfIntegratorConfig {
    fn default() -> Self {
        Self {
            default_truncation_distance: 0.1, // 10 cm band
            max_weight: 10_000.0,
            voxel_carving_enabled: true,
            const_weight: false,
            use_weight_dropoff: true,
            min_ray_length_m: 0.1,
            max_ray_length_m: 5.0,
            clip_long_rays: false,
            integrator_threads: 1,
        }
    }
}

impl TsdfIntegratorConfig {
    /// Check the configuration for fatal parameter errors.
    pub fn validate(&self) -> Result<()> {
        if !self.default_truncation_distance.is_finite() || self.default_truncation_distance <= 0.0
        {
            return Err(MapError::Config(format!(
                "default_truncation_distance must be positive, got {}",
                self.default_truncation_distance
            )));
        }
        if !self.max_weight.is_finite() || self.max_weight <= 0.0 {
            return Err(MapError::Config(format!(
                "max_weight must be positive, got {}",
                self.max_weight
            )));
        }
        if !self.min_ray_length_m.is_finite() || self.min_ray_length_m < 0.0 {
            return Err(MapError::Config(format!(
                "min_ray_length_m must be non-negative, got {}",
                self.min_ray_length_m
            )));
        }
        if !self.max_ray_length_m.is_finite() || self.max_ray_length_m < 0.0 {
            return Err(MapError::Config(format!(
                "max_ray_length_m must be non-negative, got {}",
                self.max_ray_length_m
            )));
        }
        if self.max_ray_length_m > 0.0 && self.max_ray_length_m < self.min_ray_length_m {
            return Err(MapError::Config(format!(
                "max_ray_length_m ({}) is below min_ray_length_m ({})",
                self.max_ray_length_m, self.min_ray_length_m
            )));
        }
        if self.integrator_threads < 1 {
            return Err(MapError::Config(
                "integrator_threads must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}

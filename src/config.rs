//! Crate-level configuration with YAML (de)serialization.

use serde::{Deserialize, Serialize};

use crate::error::{MapError, Result};
use crate::integrator::TsdfIntegratorConfig;

/// Layer grid configuration.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct LayerConfig {
    /// Edge length of one voxel in meters (e.g. 0.05 = 5 cm voxels).
    pub voxel_size: f32,

    /// Voxels along one block edge; a block holds `voxels_per_side³`
    /// voxels.
    pub voxels_per_side: usize,
}

impl Default for LayerConfig {
    fn default() -> Self {
        Self {
            voxel_size: 0.2, // 20 cm voxels
            voxels_per_side: 16,
        }
    }
}

impl LayerConfig {
    /// Check the configuration for fatal parameter errors.
    pub fn validate(&self) -> Result<()> {
        if !self.voxel_size.is_finite() || self.voxel_size <= 0.0 {
            return Err(MapError::Config(format!(
                "voxel_size must be positive, got {}",
                self.voxel_size
            )));
        }
        if self.voxels_per_side < 1 {
            return Err(MapError::Config(
                "voxels_per_side must be at least 1".to_string(),
            ));
        }
        Ok(())
    }

    /// Heap memory of one block in bytes.
    pub fn block_memory_bytes(&self) -> usize {
        let voxels = self.voxels_per_side * self.voxels_per_side * self.voxels_per_side;
        voxels * std::mem::size_of::<crate::core::TsdfVoxel>()
    }
}

/// Full map configuration: layer grid plus integrator options.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct MapConfig {
    /// Layer grid configuration (voxel size, block size).
    pub layer: LayerConfig,
    /// TSDF integrator configuration.
    pub integrator: TsdfIntegratorConfig,
}

impl MapConfig {
    /// Load configuration from a YAML file.
    pub fn from_yaml_file(path: &std::path::Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_yaml(&contents)
    }

    /// Load configuration from a YAML string.
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        let config: MapConfig = serde_yaml::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    /// Save configuration to a YAML file.
    pub fn to_yaml_file(&self, path: &std::path::Path) -> Result<()> {
        std::fs::write(path, self.to_yaml()?)?;
        Ok(())
    }

    /// Serialize to a YAML string.
    pub fn to_yaml(&self) -> Result<String> {
        Ok(serde_yaml::to_string(self)?)
    }

    /// Check both sections for fatal parameter errors.
    pub fn validate(&self) -> Result<()> {
        self.layer.validate()?;
        self.integrator.validate()
    }
}

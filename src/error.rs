//! Error types for ghana-map.

use thiserror::Error;

/// Ghana-map error type.
#[derive(Error, Debug)]
pub enum MapError {
    /// Invalid construction-time parameter (non-positive sizes,
    /// negative weights, and similar).
    #[error("Configuration error: {0}")]
    Config(String),

    /// A point cloud and its color array disagree in length.
    #[error("Point cloud size mismatch: {points} points vs {colors} colors")]
    PointColorMismatch {
        /// Number of points in the cloud
        points: usize,
        /// Number of colors supplied
        colors: usize,
    },

    /// Two layers with different grid parameters cannot be merged.
    #[error("Layer mismatch: {0}")]
    LayerMismatch(String),

    /// Configuration file I/O failure.
    #[error("Config I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration file parse failure.
    #[error("Config parse error: {0}")]
    Parse(String),
}

impl From<serde_yaml::Error> for MapError {
    fn from(e: serde_yaml::Error) -> Self {
        MapError::Parse(e.to_string())
    }
}

/// Crate-wide result alias.
pub type Result<T> = std::result::Result<T, MapError>;

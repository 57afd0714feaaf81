//! # Ghana-Map: Volumetric TSDF Mapping Library
//!
//! A volumetric mapping engine that fuses streams of posed 3D point
//! measurements into a Truncated Signed Distance Field (TSDF) on a
//! sparse, block-partitioned voxel grid. Each voxel records a signed
//! distance to the nearest measured surface and an accumulated
//! confidence weight, from which smooth implicit surfaces can later be
//! extracted.
//!
//! ## Quick Start
//!
//! ```rust
//! use ghana_map::{TsdfIntegrator, TsdfIntegratorConfig, TsdfLayer};
//! use ghana_map::core::{Color, Point, Transform};
//!
//! // 5 cm voxels in blocks of 16³.
//! let layer = TsdfLayer::new(0.05, 16).unwrap();
//! let mut integrator = TsdfIntegrator::new(TsdfIntegratorConfig::default(), layer).unwrap();
//!
//! // One frame: sensor pose plus points and colors in the sensor frame.
//! let points = vec![Point::new(1.0, 0.0, 0.0), Point::new(1.0, 0.1, 0.0)];
//! let colors = vec![Color::rgb(200, 180, 160); points.len()];
//! let stats = integrator
//!     .integrate_point_cloud(&Transform::identity(), &points, &colors)
//!     .unwrap();
//! println!(
//!     "updated {} voxels in {} blocks",
//!     stats.voxels_updated,
//!     integrator.layer().num_blocks()
//! );
//! ```
//!
//! ## Architecture
//!
//! - [`core`]: grid indices, voxel/color types, point ↔ index math
//! - [`layer`]: sparse block container ([`TsdfLayer`], [`Block`])
//! - [`integrator`]: ray traversal and TSDF fusion ([`TsdfIntegrator`])
//! - [`config`]: YAML-loadable configuration
//! - [`simulation`]: synthetic point clouds for tests and benchmarks
//!
//! ## Data Flow
//!
//! ```text
//!            ┌──────────────────┐
//!            │  (T_WC, points,  │
//!            │     colors)      │
//!            └────────┬─────────┘
//!                     │ transform to world
//!                     ▼
//!            ┌──────────────────┐
//!            │  Ray planning    │  truncation band + carving,
//!            │  (per point)     │  Amanatides–Woo traversal
//!            └────────┬─────────┘
//!                     │ {block → [voxel]}
//!                     ▼
//!            ┌──────────────────┐
//!            │  TSDF update     │  signed distance, weight,
//!            │  (per voxel)     │  color fusion
//!            └────────┬─────────┘
//!                     ▼
//!            ┌──────────────────┐
//!            │    TsdfLayer     │──► mesh extraction, serialization
//!            │  (sparse blocks) │    (external consumers)
//!            └──────────────────┘
//! ```
//!
//! ## Coordinate Frames
//!
//! World and sensor frames are right-handed, X-forward, Y-left, Z-up.
//! Grid APIs state whether they take world coordinates (meters) or
//! scaled coordinates (one unit = one voxel).

pub mod config;
pub mod core;
pub mod error;
pub mod integrator;
pub mod layer;
pub mod simulation;

// Re-export main types at crate root.
pub use config::{LayerConfig, MapConfig};
pub use error::{MapError, Result};
pub use integrator::{IntegrationStats, TsdfIntegrator, TsdfIntegratorConfig};
pub use layer::{Block, TsdfLayer};

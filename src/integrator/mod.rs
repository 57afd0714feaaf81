//! TSDF integration: from posed point clouds to voxel updates.
//!
//! - [`raycaster`]: grid traversal and per-ray block grouping
//! - [`update`]: the per-voxel distance/weight/color fusion kernel
//! - [`TsdfIntegrator`]: the frame driver tying them together
//!
//! Data flow for one frame `(T_WC, points_C, colors)`:
//!
//! ```text
//! points_C ──T_WC──► points_W ──► blocks_along_ray ──► {block → [voxel]}
//!                                                           │
//!                                 update_tsdf_voxel ◄───────┘
//!                                 (per voxel, in traversal order)
//! ```

pub mod config;
pub mod raycaster;
pub mod update;

mod tsdf_integrator;

pub use config::TsdfIntegratorConfig;
pub use tsdf_integrator::{IntegrationStats, TsdfIntegrator};

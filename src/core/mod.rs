//! Core types for ghana-map.
//!
//! This module provides the fundamental grid and measurement types:
//! - [`GridIndex`]: integer 3D index (block / global voxel / local voxel)
//! - [`TsdfVoxel`]: one TSDF sample (distance, weight, color)
//! - [`Color`]: RGBA color with weighted blending
//! - [`math`]: point ↔ index conversions
//!
//! Continuous geometry is expressed with nalgebra: [`Point`] for world
//! and scaled coordinates, [`Transform`] for sensor poses. Coordinates
//! follow the right-handed X-forward, Y-left, Z-up convention.

pub mod index;
pub mod math;
pub mod voxel;

pub use index::{BlockIndex, GlobalVoxelIndex, GridIndex, LocalVoxelIndex};
pub use voxel::{Color, TsdfVoxel};

/// 3D point in world or scaled coordinates (APIs state which).
pub type Point = nalgebra::Point3<f32>;

/// 3D displacement / direction.
pub type Ray = nalgebra::Vector3<f32>;

/// Rigid sensor pose `T_WC` (camera/sensor frame to world frame).
pub type Transform = nalgebra::Isometry3<f32>;

//! Integer grid index types.
//!
//! A [`GridIndex`] names a cell of an infinite integer lattice. The same
//! type is used at three granularities, distinguished by alias:
//! - [`GlobalVoxelIndex`]: a voxel in the infinite voxel grid
//! - [`BlockIndex`]: a block in the infinite block grid
//! - [`LocalVoxelIndex`]: a voxel within its block, components in
//!   `[0, voxels_per_side)`

use serde::{Deserialize, Serialize};
use std::ops::{Add, Mul, Sub};

/// Signed integer 3D grid index.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct GridIndex {
    /// X component
    pub x: i32,
    /// Y component
    pub y: i32,
    /// Z component
    pub z: i32,
}

/// Index of a voxel in the infinite voxel grid.
pub type GlobalVoxelIndex = GridIndex;

/// Index of a block in the infinite block grid.
pub type BlockIndex = GridIndex;

/// Index of a voxel within its block (non-negative components).
pub type LocalVoxelIndex = GridIndex;

impl GridIndex {
    /// Origin index (0, 0, 0).
    pub const ZERO: GridIndex = GridIndex { x: 0, y: 0, z: 0 };

    /// Create a new grid index.
    #[inline]
    pub const fn new(x: i32, y: i32, z: i32) -> Self {
        Self { x, y, z }
    }

    /// Component by axis number (0 = x, 1 = y, 2 = z).
    #[inline]
    pub fn component(&self, axis: usize) -> i32 {
        match axis {
            0 => self.x,
            1 => self.y,
            _ => self.z,
        }
    }

    /// Mutable component by axis number (0 = x, 1 = y, 2 = z).
    #[inline]
    pub fn component_mut(&mut self, axis: usize) -> &mut i32 {
        match axis {
            0 => &mut self.x,
            1 => &mut self.y,
            _ => &mut self.z,
        }
    }

    /// Apply a function to each component.
    #[inline]
    pub fn map(&self, f: impl Fn(i32) -> i32) -> GridIndex {
        GridIndex::new(f(self.x), f(self.y), f(self.z))
    }

    /// Chebyshev distance (max absolute component difference).
    #[inline]
    pub fn chebyshev_distance(&self, other: &GridIndex) -> i32 {
        (self.x - other.x)
            .abs()
            .max((self.y - other.y).abs())
            .max((self.z - other.z).abs())
    }

    /// Manhattan distance (sum of absolute component differences).
    #[inline]
    pub fn manhattan_distance(&self, other: &GridIndex) -> i32 {
        (self.x - other.x).abs() + (self.y - other.y).abs() + (self.z - other.z).abs()
    }
}

impl Add for GridIndex {
    type Output = Self;

    #[inline]
    fn add(self, other: Self) -> Self {
        GridIndex::new(self.x + other.x, self.y + other.y, self.z + other.z)
    }
}

impl Sub for GridIndex {
    type Output = Self;

    #[inline]
    fn sub(self, other: Self) -> Self {
        GridIndex::new(self.x - other.x, self.y - other.y, self.z - other.z)
    }
}

impl Mul<i32> for GridIndex {
    type Output = Self;

    #[inline]
    fn mul(self, scalar: i32) -> Self {
        GridIndex::new(self.x * scalar, self.y * scalar, self.z * scalar)
    }
}

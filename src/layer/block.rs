//! Dense voxel block: the unit of allocation of the sparse layer.
//!
//! A block is a cube of `voxels_per_side³` voxels stored in one flat
//! array. Local voxel index `(x, y, z)` linearizes to
//! `x + S * (y + S * z)` with `S = voxels_per_side`.

use crate::core::math::{center_point_from_index, grid_index_from_point, origin_index_from_point};
use crate::core::{BlockIndex, LocalVoxelIndex, Point, TsdfVoxel};

/// A fixed-size cube of TSDF voxels.
#[derive(Clone, Debug)]
pub struct Block {
    voxels: Vec<TsdfVoxel>,

    // Base parameters.
    voxels_per_side: usize,
    voxel_size: f32,
    /// World coordinates of the block's low corner.
    origin: Point,

    // Derived, cached parameters.
    voxel_size_inv: f32,
    block_size: f32,
    block_size_inv: f32,

    /// True iff any voxel in this block has been observed.
    has_data: bool,
    /// Set by mutating operations; cleared by external consumers.
    updated: bool,
}

impl Block {
    /// Create an empty block with its low corner at `origin`.
    pub fn new(voxels_per_side: usize, voxel_size: f32, origin: Point) -> Self {
        let num_voxels = voxels_per_side * voxels_per_side * voxels_per_side;
        let block_size = voxels_per_side as f32 * voxel_size;
        Self {
            voxels: vec![TsdfVoxel::default(); num_voxels],
            voxels_per_side,
            voxel_size,
            origin,
            voxel_size_inv: 1.0 / voxel_size,
            block_size,
            block_size_inv: 1.0 / block_size,
            has_data: false,
            updated: false,
        }
    }

    /// Number of voxels along one edge.
    #[inline]
    pub fn voxels_per_side(&self) -> usize {
        self.voxels_per_side
    }

    /// Edge length of one voxel in meters.
    #[inline]
    pub fn voxel_size(&self) -> f32 {
        self.voxel_size
    }

    /// Edge length of the whole block in meters.
    #[inline]
    pub fn block_size(&self) -> f32 {
        self.block_size
    }

    /// World coordinates of the block's low corner.
    #[inline]
    pub fn origin(&self) -> Point {
        self.origin
    }

    /// Total number of voxels in the block.
    #[inline]
    pub fn num_voxels(&self) -> usize {
        self.voxels.len()
    }

    /// Index of this block in the block grid, recovered from its origin.
    pub fn block_index(&self) -> BlockIndex {
        origin_index_from_point(&self.origin, self.block_size_inv)
    }

    /// True iff any voxel in this block has been observed.
    #[inline]
    pub fn has_data(&self) -> bool {
        self.has_data
    }

    /// Has this block been mutated since the flag was last cleared?
    #[inline]
    pub fn updated(&self) -> bool {
        self.updated
    }

    /// Mark the block as mutated and observed.
    #[inline]
    pub fn mark_updated(&mut self) {
        self.updated = true;
        self.has_data = true;
    }

    /// Clear the updated flag (for mesh extractors and serializers).
    #[inline]
    pub fn clear_updated(&mut self) {
        self.updated = false;
    }

    /// Is a local index within `[0, voxels_per_side)` on every axis?
    #[inline]
    pub fn is_valid_local_index(&self, index: &LocalVoxelIndex) -> bool {
        let s = self.voxels_per_side as i32;
        index.x >= 0 && index.x < s && index.y >= 0 && index.y < s && index.z >= 0 && index.z < s
    }

    /// Flat array position of a local voxel index.
    ///
    /// Out-of-range components are a programming error; they are caught
    /// in debug builds and clamped into range in release builds.
    #[inline]
    pub fn linear_index_from_local(&self, index: &LocalVoxelIndex) -> usize {
        debug_assert!(self.is_valid_local_index(index));
        let s = self.voxels_per_side;
        let max = s as i32 - 1;
        let x = index.x.clamp(0, max) as usize;
        let y = index.y.clamp(0, max) as usize;
        let z = index.z.clamp(0, max) as usize;
        x + s * (y + s * z)
    }

    /// Local voxel index of a flat array position.
    #[inline]
    pub fn local_index_from_linear(&self, linear_index: usize) -> LocalVoxelIndex {
        let s = self.voxels_per_side;
        debug_assert!(linear_index < self.voxels.len());
        LocalVoxelIndex::new(
            (linear_index % s) as i32,
            ((linear_index / s) % s) as i32,
            (linear_index / (s * s)) as i32,
        )
    }

    /// World coordinates of the center of a voxel in this block.
    #[inline]
    pub fn center_from_local(&self, index: &LocalVoxelIndex) -> Point {
        self.origin + center_point_from_index(*index, self.voxel_size).coords
    }

    /// Local voxel index containing a world point.
    ///
    /// The point is assumed to lie inside this block; points outside
    /// produce out-of-range indices.
    #[inline]
    pub fn local_index_from_point(&self, point: &Point) -> LocalVoxelIndex {
        grid_index_from_point(&Point::from(point - self.origin), self.voxel_size_inv)
    }

    /// Voxel by flat array position.
    #[inline]
    pub fn voxel(&self, linear_index: usize) -> &TsdfVoxel {
        &self.voxels[linear_index]
    }

    /// Mutable voxel by flat array position.
    #[inline]
    pub fn voxel_mut(&mut self, linear_index: usize) -> &mut TsdfVoxel {
        &mut self.voxels[linear_index]
    }

    /// Voxel by local index.
    #[inline]
    pub fn voxel_by_local(&self, index: &LocalVoxelIndex) -> &TsdfVoxel {
        &self.voxels[self.linear_index_from_local(index)]
    }

    /// Mutable voxel by local index.
    #[inline]
    pub fn voxel_by_local_mut(&mut self, index: &LocalVoxelIndex) -> &mut TsdfVoxel {
        let linear = self.linear_index_from_local(index);
        &mut self.voxels[linear]
    }

    /// All voxels in linearization order.
    #[inline]
    pub fn voxels(&self) -> &[TsdfVoxel] {
        &self.voxels
    }

    /// Merge another block's observations into this one, voxel by voxel.
    ///
    /// Both blocks must have identical dimensions (guaranteed when going
    /// through [`TsdfLayer::merge`](crate::layer::TsdfLayer::merge)).
    pub fn merge(&mut self, other: &Block, max_weight: f32) {
        debug_assert_eq!(self.voxels_per_side, other.voxels_per_side);
        debug_assert_eq!(self.voxels.len(), other.voxels.len());

        for (voxel, other_voxel) in self.voxels.iter_mut().zip(other.voxels.iter()) {
            voxel.merge(other_voxel, max_weight);
        }

        if other.has_data {
            self.mark_updated();
        }
    }

    /// Approximate heap memory used by this block, in bytes.
    pub fn memory_size(&self) -> usize {
        self.voxels.len() * std::mem::size_of::<TsdfVoxel>()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::GridIndex;
    use approx::assert_relative_eq;

    fn make_block() -> Block {
        Block::new(4, 0.5, Point::new(2.0, -2.0, 0.0))
    }

    #[test]
    fn test_block_creation() {
        let block = make_block();
        assert_eq!(block.num_voxels(), 64);
        assert_eq!(block.voxels_per_side(), 4);
        assert_relative_eq!(block.block_size(), 2.0, epsilon = 1e-6);
        assert!(!block.has_data());
        assert!(!block.updated());
        assert!(block.voxels().iter().all(|v| !v.is_observed()));
    }

    #[test]
    fn test_linear_index_roundtrip() {
        let block = make_block();
        for linear in 0..block.num_voxels() {
            let local = block.local_index_from_linear(linear);
            assert!(block.is_valid_local_index(&local));
            assert_eq!(block.linear_index_from_local(&local), linear);
        }
    }

    #[test]
    fn test_linearization_order() {
        // x + S*(y + S*z)
        let block = make_block();
        assert_eq!(block.linear_index_from_local(&GridIndex::new(1, 0, 0)), 1);
        assert_eq!(block.linear_index_from_local(&GridIndex::new(0, 1, 0)), 4);
        assert_eq!(block.linear_index_from_local(&GridIndex::new(0, 0, 1)), 16);
        assert_eq!(
            block.linear_index_from_local(&GridIndex::new(3, 3, 3)),
            63
        );
    }

    #[test]
    fn test_voxel_center() {
        let block = make_block();
        let center = block.center_from_local(&GridIndex::new(0, 0, 0));
        assert_relative_eq!(center.x, 2.25, epsilon = 1e-6);
        assert_relative_eq!(center.y, -1.75, epsilon = 1e-6);
        assert_relative_eq!(center.z, 0.25, epsilon = 1e-6);

        let center = block.center_from_local(&GridIndex::new(3, 0, 0));
        assert_relative_eq!(center.x, 3.75, epsilon = 1e-6);
    }

    #[test]
    fn test_local_index_from_point() {
        let block = make_block();
        let idx = block.local_index_from_point(&Point::new(2.3, -1.9, 0.1));
        assert_eq!(idx, GridIndex::new(0, 0, 0));

        let idx = block.local_index_from_point(&Point::new(3.8, -0.1, 1.9));
        assert_eq!(idx, GridIndex::new(3, 3, 3));
    }

    #[test]
    fn test_block_index_from_origin() {
        let block = make_block();
        assert_eq!(block.block_index(), GridIndex::new(1, -1, 0));
    }

    #[test]
    fn test_update_flags() {
        let mut block = make_block();
        block.mark_updated();
        assert!(block.updated());
        assert!(block.has_data());

        block.clear_updated();
        assert!(!block.updated());
        assert!(block.has_data());
    }

    #[test]
    fn test_block_merge() {
        let mut a = make_block();
        let mut b = make_block();

        let idx = GridIndex::new(1, 2, 3);
        let voxel = b.voxel_by_local_mut(&idx);
        voxel.distance = 0.25;
        voxel.weight = 2.0;
        b.mark_updated();

        a.merge(&b, 100.0);
        assert!(a.has_data());
        assert!(a.updated());
        assert_relative_eq!(a.voxel_by_local(&idx).distance, 0.25, epsilon = 1e-6);
        assert_relative_eq!(a.voxel_by_local(&idx).weight, 2.0, epsilon = 1e-6);
    }
}

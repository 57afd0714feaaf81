//! Sparse block container for the TSDF.
//!
//! A layer maps block indices to dense voxel [`Block`]s. Blocks are
//! allocated lazily on first write and never deleted during
//! integration; destroying the layer reclaims everything at once.

use std::collections::HashMap;

use crate::core::math::{
    block_index_from_global_voxel, grid_index_from_point, local_from_global_voxel,
    origin_point_from_index,
};
use crate::core::{BlockIndex, GlobalVoxelIndex, Point, TsdfVoxel};
use crate::error::{MapError, Result};
use crate::layer::Block;

/// Sparse voxel layer: the central TSDF data structure.
///
/// Invariant: for every stored block with key `k`,
/// `block.origin() == k * block_size` componentwise.
#[derive(Clone, Debug)]
pub struct TsdfLayer {
    voxel_size: f32,
    voxels_per_side: usize,

    // Derived, cached parameters.
    voxel_size_inv: f32,
    block_size: f32,
    block_size_inv: f32,

    blocks: HashMap<BlockIndex, Block>,
}

impl TsdfLayer {
    /// Create an empty layer.
    ///
    /// Fails if `voxel_size` is not strictly positive and finite or
    /// `voxels_per_side` is zero.
    pub fn new(voxel_size: f32, voxels_per_side: usize) -> Result<Self> {
        if !voxel_size.is_finite() || voxel_size <= 0.0 {
            return Err(MapError::Config(format!(
                "voxel_size must be positive, got {voxel_size}"
            )));
        }
        if voxels_per_side < 1 {
            return Err(MapError::Config(
                "voxels_per_side must be at least 1".to_string(),
            ));
        }

        let block_size = voxels_per_side as f32 * voxel_size;
        Ok(Self {
            voxel_size,
            voxels_per_side,
            voxel_size_inv: 1.0 / voxel_size,
            block_size,
            block_size_inv: 1.0 / block_size,
            blocks: HashMap::new(),
        })
    }

    /// Edge length of one voxel in meters.
    #[inline]
    pub fn voxel_size(&self) -> f32 {
        self.voxel_size
    }

    /// Inverse voxel size (cached).
    #[inline]
    pub fn voxel_size_inv(&self) -> f32 {
        self.voxel_size_inv
    }

    /// Number of voxels along one block edge.
    #[inline]
    pub fn voxels_per_side(&self) -> usize {
        self.voxels_per_side
    }

    /// Edge length of one block in meters.
    #[inline]
    pub fn block_size(&self) -> f32 {
        self.block_size
    }

    /// Number of allocated blocks.
    #[inline]
    pub fn num_blocks(&self) -> usize {
        self.blocks.len()
    }

    /// True if no block has been allocated yet.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }

    /// Read-only block lookup.
    #[inline]
    pub fn block(&self, index: &BlockIndex) -> Option<&Block> {
        self.blocks.get(index)
    }

    /// Mutable block lookup.
    #[inline]
    pub fn block_mut(&mut self, index: &BlockIndex) -> Option<&mut Block> {
        self.blocks.get_mut(index)
    }

    /// Return the block at `index`, constructing it if absent.
    ///
    /// A new block is placed with its low corner at
    /// `index * block_size`.
    pub fn allocate_block(&mut self, index: &BlockIndex) -> &mut Block {
        self.blocks.entry(*index).or_insert_with(|| {
            Block::new(
                self.voxels_per_side,
                self.voxel_size,
                origin_point_from_index(*index, self.block_size),
            )
        })
    }

    /// Iterate over all blocks. Order is unspecified.
    pub fn iter_blocks(&self) -> impl Iterator<Item = (&BlockIndex, &Block)> {
        self.blocks.iter()
    }

    /// Iterate over all blocks mutably. Order is unspecified.
    pub fn iter_blocks_mut(&mut self) -> impl Iterator<Item = (&BlockIndex, &mut Block)> {
        self.blocks.iter_mut()
    }

    /// Block index containing a world point.
    #[inline]
    pub fn block_index_from_point(&self, point: &Point) -> BlockIndex {
        grid_index_from_point(point, self.block_size_inv)
    }

    /// Global voxel index containing a world point.
    #[inline]
    pub fn global_voxel_index_from_point(&self, point: &Point) -> GlobalVoxelIndex {
        grid_index_from_point(point, self.voxel_size_inv)
    }

    /// Voxel lookup by global voxel index.
    ///
    /// Returns `None` when the owning block has not been allocated.
    pub fn voxel_from_global_index(&self, global_index: GlobalVoxelIndex) -> Option<&TsdfVoxel> {
        let vps = self.voxels_per_side as i32;
        let block = self
            .blocks
            .get(&block_index_from_global_voxel(global_index, vps))?;
        Some(block.voxel_by_local(&local_from_global_voxel(global_index, vps)))
    }

    /// Voxel lookup by world point.
    pub fn voxel_from_point(&self, point: &Point) -> Option<&TsdfVoxel> {
        self.voxel_from_global_index(self.global_voxel_index_from_point(point))
    }

    /// Number of observed voxels across all blocks.
    pub fn num_observed_voxels(&self) -> usize {
        self.blocks
            .values()
            .map(|block| block.voxels().iter().filter(|v| v.is_observed()).count())
            .sum()
    }

    /// Merge another layer's observations into this one.
    ///
    /// Blocks absent here are cloned in; blocks present in both are
    /// merged voxel by voxel (weighted-average distance and color,
    /// summed weight saturating at `max_weight`). Fails if the two
    /// layers disagree on grid parameters.
    pub fn merge(&mut self, other: &TsdfLayer, max_weight: f32) -> Result<()> {
        if self.voxel_size != other.voxel_size || self.voxels_per_side != other.voxels_per_side {
            return Err(MapError::LayerMismatch(format!(
                "cannot merge layer ({} m, {} vps) into layer ({} m, {} vps)",
                other.voxel_size, other.voxels_per_side, self.voxel_size, self.voxels_per_side
            )));
        }

        for (block_index, other_block) in other.iter_blocks() {
            match self.blocks.get_mut(block_index) {
                Some(block) => block.merge(other_block, max_weight),
                None => {
                    let mut block = other_block.clone();
                    for i in 0..block.num_voxels() {
                        let voxel = block.voxel_mut(i);
                        voxel.weight = voxel.weight.min(max_weight);
                    }
                    self.blocks.insert(*block_index, block);
                }
            }
        }

        Ok(())
    }

    /// Approximate heap memory used by all blocks, in bytes.
    pub fn memory_size(&self) -> usize {
        self.blocks.values().map(Block::memory_size).sum()
    }
}

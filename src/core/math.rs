//! Grid ↔ point conversion primitives.
//!
//! All float-to-integer conversions floor toward negative infinity so
//! that negative coordinates land in the correct cell. The block/local
//! split of a global voxel index uses Euclidean division: block indices
//! follow the sign of the global index, local indices are always in
//! `[0, voxels_per_side)`.

use crate::core::index::{BlockIndex, GlobalVoxelIndex, GridIndex, LocalVoxelIndex};
use crate::core::Point;

/// Grid index containing a world point, given the inverse grid spacing.
///
/// Points exactly on a cell boundary may land in either neighbor due to
/// float rounding; callers must not rely on boundary classification.
#[inline]
pub fn grid_index_from_point(point: &Point, grid_size_inv: f32) -> GridIndex {
    GridIndex::new(
        (point.x * grid_size_inv).floor() as i32,
        (point.y * grid_size_inv).floor() as i32,
        (point.z * grid_size_inv).floor() as i32,
    )
}

/// Grid index containing a pre-scaled point (one unit = one cell).
#[inline]
pub fn grid_index_from_scaled_point(scaled_point: &Point) -> GridIndex {
    GridIndex::new(
        scaled_point.x.floor() as i32,
        scaled_point.y.floor() as i32,
        scaled_point.z.floor() as i32,
    )
}

/// Grid index of a point lying on (or near) a grid line, by rounding.
///
/// Used to recover the index of a cell origin, where flooring would be
/// unstable against rounding error.
#[inline]
pub fn origin_index_from_point(point: &Point, grid_size_inv: f32) -> GridIndex {
    GridIndex::new(
        (point.x * grid_size_inv).round() as i32,
        (point.y * grid_size_inv).round() as i32,
        (point.z * grid_size_inv).round() as i32,
    )
}

/// World coordinates of the center of a grid cell.
#[inline]
pub fn center_point_from_index(index: GridIndex, grid_size: f32) -> Point {
    Point::new(
        (index.x as f32 + 0.5) * grid_size,
        (index.y as f32 + 0.5) * grid_size,
        (index.z as f32 + 0.5) * grid_size,
    )
}

/// World coordinates of the low corner of a grid cell.
#[inline]
pub fn origin_point_from_index(index: GridIndex, grid_size: f32) -> Point {
    Point::new(
        index.x as f32 * grid_size,
        index.y as f32 * grid_size,
        index.z as f32 * grid_size,
    )
}

/// Block containing a global voxel index (floor division).
#[inline]
pub fn block_index_from_global_voxel(
    global_voxel: GlobalVoxelIndex,
    voxels_per_side: i32,
) -> BlockIndex {
    global_voxel.map(|c| c.div_euclid(voxels_per_side))
}

/// Position of a global voxel within its block (Euclidean remainder).
///
/// Every component of the result is in `[0, voxels_per_side)`,
/// regardless of the sign of the global index.
#[inline]
pub fn local_from_global_voxel(
    global_voxel: GlobalVoxelIndex,
    voxels_per_side: i32,
) -> LocalVoxelIndex {
    global_voxel.map(|c| c.rem_euclid(voxels_per_side))
}

/// Recombine a block index and local voxel index into a global index.
#[inline]
pub fn global_voxel_from_block_and_local(
    block_index: BlockIndex,
    local_index: LocalVoxelIndex,
    voxels_per_side: i32,
) -> GlobalVoxelIndex {
    block_index * voxels_per_side + local_index
}

/// Sign of a scalar: -1, 0, or +1.
#[inline]
pub fn signum(x: f32) -> i32 {
    if x == 0.0 {
        0
    } else if x < 0.0 {
        -1
    } else {
        1
    }
}

//! Grid traversal for TSDF integration.
//!
//! This module provides the voxel enumeration behind every integrated
//! measurement:
//!
//! - [`GridRay`]: iterator over the voxels pierced by a segment
//!   (Amanatides & Woo 3D-DDA)
//! - [`blocks_along_ray`]: applies truncation and carving policy to a
//!   world-space ray and groups the pierced voxels by owning block
//!
//! ## Algorithm
//!
//! The traversal works in *scaled* coordinates (one unit = one voxel).
//! For each axis it tracks the ray parameter `t` at which the next
//! voxel boundary is crossed; every step advances the axis with the
//! smallest crossing, producing a 6-connected chain of voxel indices:
//!
//! ```text
//!     2 │      ●●
//!     1 │   ●●
//!     0 ●●
//!       └─────────
//!        0  1  2
//! ```
//!
//! Axes the ray never crosses keep a sentinel crossing parameter larger
//! than any real one, so they are never selected. Ties are broken toward
//! the lowest axis number, which makes the enumeration deterministic.

use std::collections::HashMap;

use crate::core::math::{
    block_index_from_global_voxel, grid_index_from_scaled_point, local_from_global_voxel, signum,
};
use crate::core::{BlockIndex, GlobalVoxelIndex, GridIndex, LocalVoxelIndex, Point};

/// Guards against literal zeros and near-parallel-to-plane rays.
const TOLERANCE: f32 = 1e-6;

/// Crossing parameter sentinel for axes the ray never crosses. The real
/// crossing parameters of a segment lie in [0, 1].
const NEVER_CROSSED: f32 = 2.0;

/// Iterator over the voxel indices pierced by a segment.
///
/// Input coordinates are scaled (one unit = one voxel). The enumeration
/// starts at the voxel containing the start point and ends at the voxel
/// containing the end point; a zero-length segment yields exactly its
/// single containing voxel.
pub struct GridRay {
    current: GridIndex,
    end: GridIndex,
    step: GridIndex,
    t_to_next: [f32; 3],
    t_step: [f32; 3],
    started: bool,
    done: bool,
}

impl GridRay {
    /// Create a traversal from `start_scaled` to `end_scaled`.
    pub fn new(start_scaled: &Point, end_scaled: &Point) -> Self {
        let start_index = grid_index_from_scaled_point(start_scaled);
        let end_index = grid_index_from_scaled_point(end_scaled);

        let ray = end_scaled - start_scaled;
        let step = GridIndex::new(signum(ray.x), signum(ray.y), signum(ray.z));

        let mut t_to_next = [NEVER_CROSSED; 3];
        let mut t_step = [NEVER_CROSSED; 3];
        for axis in 0..3 {
            if ray[axis].abs() < TOLERANCE {
                continue;
            }
            // Fractional offset from the start point to the first
            // boundary crossed in this axis.
            let corrected_step = step.component(axis).max(0) as f32;
            let shifted = start_scaled[axis] - start_index.component(axis) as f32;
            t_to_next[axis] = (corrected_step - shifted) / ray[axis];
            t_step[axis] = step.component(axis) as f32 / ray[axis];
        }

        Self {
            current: start_index,
            end: end_index,
            step,
            t_to_next,
            t_step,
            started: false,
            done: false,
        }
    }
}

impl Iterator for GridRay {
    type Item = GlobalVoxelIndex;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }

        if !self.started {
            self.started = true;
            if self.current == self.end {
                self.done = true;
            }
            return Some(self.current);
        }

        // Advance along the axis with the nearest boundary; ties go to
        // the lowest axis.
        let mut axis = 0;
        for a in 1..3 {
            if self.t_to_next[a] < self.t_to_next[axis] {
                axis = a;
            }
        }

        *self.current.component_mut(axis) += self.step.component(axis);
        self.t_to_next[axis] += self.t_step[axis];

        if self.current == self.end {
            self.done = true;
        }
        Some(self.current)
    }
}

/// Collect all voxels pierced by a segment in scaled coordinates.
pub fn voxels_along_ray(start_scaled: &Point, end_scaled: &Point) -> Vec<GlobalVoxelIndex> {
    GridRay::new(start_scaled, end_scaled).collect()
}

/// Voxels to update for one ray, grouped by their owning block.
///
/// Within each block the local indices appear in traversal order (from
/// the ray start outward).
pub type BlockHitMap = HashMap<BlockIndex, Vec<LocalVoxelIndex>>;

/// Plan the voxel updates for one measurement ray.
///
/// Takes the sensor origin `start_w` and measured point `end_w` in
/// world coordinates. The traversed segment extends `truncation_distance`
/// past the measured point; with carving enabled it begins at the sensor
/// origin, otherwise `truncation_distance` before the measured point.
/// The resulting voxels are split into `(block, local)` pairs and
/// grouped so the integrator acquires each block exactly once per ray.
///
/// `start_w` and `end_w` must be distinct; degenerate rays are the
/// caller's responsibility.
pub fn blocks_along_ray(
    start_w: &Point,
    end_w: &Point,
    voxels_per_side: usize,
    voxel_size: f32,
    truncation_distance: f32,
    voxel_carving_enabled: bool,
    hit_map: &mut BlockHitMap,
) {
    hit_map.clear();

    let vps = voxels_per_side as i32;
    let voxel_size_inv = 1.0 / voxel_size;

    let unit_ray = (end_w - start_w).normalize();
    let ray_end = end_w + unit_ray * truncation_distance;
    let ray_start = if voxel_carving_enabled {
        *start_w
    } else {
        end_w - unit_ray * truncation_distance
    };

    let start_scaled = ray_start * voxel_size_inv;
    let end_scaled = ray_end * voxel_size_inv;

    for global_index in GridRay::new(&start_scaled, &end_scaled) {
        let block_index = block_index_from_global_voxel(global_index, vps);
        let local_index = local_from_global_voxel(global_index, vps);
        hit_map.entry(block_index).or_default().push(local_index);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::SmallRng;
    use rand::{Rng, SeedableRng};

    #[test]
    fn test_ray_zero_length() {
        let p = Point::new(0.1, 0.1, 0.1);
        let voxels = voxels_along_ray(&p, &p);
        assert_eq!(voxels, vec![GridIndex::ZERO]);
    }

    #[test]
    fn test_ray_within_single_voxel() {
        let voxels = voxels_along_ray(&Point::new(0.2, 0.3, 0.4), &Point::new(0.9, 0.8, 0.7));
        assert_eq!(voxels, vec![GridIndex::ZERO]);
    }

    #[test]
    fn test_ray_axis_aligned() {
        let voxels = voxels_along_ray(&Point::new(0.5, 0.5, 0.5), &Point::new(3.5, 0.5, 0.5));
        assert_eq!(
            voxels,
            vec![
                GridIndex::new(0, 0, 0),
                GridIndex::new(1, 0, 0),
                GridIndex::new(2, 0, 0),
                GridIndex::new(3, 0, 0),
            ]
        );
    }

    #[test]
    fn test_ray_diagonal_tie_break() {
        // Perfect diagonal in the XY plane: boundary crossings tie on
        // both axes, and the lower axis (x) must advance first.
        let voxels = voxels_along_ray(&Point::new(0.0, 0.0, 0.0), &Point::new(2.0, 2.0, 0.0));
        assert_eq!(
            voxels,
            vec![
                GridIndex::new(0, 0, 0),
                GridIndex::new(1, 0, 0),
                GridIndex::new(1, 1, 0),
                GridIndex::new(2, 1, 0),
                GridIndex::new(2, 2, 0),
            ]
        );
    }

    #[test]
    fn test_ray_negative_direction() {
        let voxels = voxels_along_ray(&Point::new(0.0, 0.5, 0.5), &Point::new(-2.5, 0.5, 0.5));
        assert_eq!(
            voxels,
            vec![
                GridIndex::new(0, 0, 0),
                GridIndex::new(-1, 0, 0),
                GridIndex::new(-2, 0, 0),
                GridIndex::new(-3, 0, 0),
            ]
        );
    }

    #[test]
    fn test_ray_endpoints_and_connectivity() {
        let mut rng = SmallRng::seed_from_u64(42);

        for _ in 0..200 {
            let start = Point::new(
                rng.random_range(-8.0f32..8.0),
                rng.random_range(-8.0f32..8.0),
                rng.random_range(-8.0f32..8.0),
            );
            let end = Point::new(
                rng.random_range(-8.0f32..8.0),
                rng.random_range(-8.0f32..8.0),
                rng.random_range(-8.0f32..8.0),
            );

            let voxels = voxels_along_ray(&start, &end);
            assert!(!voxels.is_empty());
            assert_eq!(voxels[0], grid_index_from_scaled_point(&start));
            assert_eq!(
                *voxels.last().unwrap(),
                grid_index_from_scaled_point(&end)
            );

            // Consecutive indices differ by exactly ±1 in exactly one
            // component.
            for pair in voxels.windows(2) {
                assert_eq!(pair[0].manhattan_distance(&pair[1]), 1);
            }
        }
    }

    #[test]
    fn test_ray_deterministic() {
        let start = Point::new(-1.3, 2.7, 0.4);
        let end = Point::new(4.1, -0.9, 3.3);

        let first = voxels_along_ray(&start, &end);
        let second = voxels_along_ray(&start, &end);
        assert_eq!(first, second);
    }

    #[test]
    fn test_blocks_along_ray_negative_grouping() {
        // Ray from the origin to (-2.5, 0, 0) at 1 m voxels, 4 voxels
        // per side, no truncation extension: global x-indices
        // 0, -1, -2, -3 land in blocks 0 and -1 with local x-indices
        // 0 and 3, 2, 1.
        let mut hit_map = BlockHitMap::new();
        blocks_along_ray(
            &Point::new(0.0, 0.5, 0.5),
            &Point::new(-2.5, 0.5, 0.5),
            4,
            1.0,
            0.0,
            true,
            &mut hit_map,
        );

        assert_eq!(hit_map.len(), 2);
        assert_eq!(
            hit_map[&GridIndex::new(0, 0, 0)],
            vec![GridIndex::new(0, 0, 0)]
        );
        assert_eq!(
            hit_map[&GridIndex::new(-1, 0, 0)],
            vec![
                GridIndex::new(3, 0, 0),
                GridIndex::new(2, 0, 0),
                GridIndex::new(1, 0, 0),
            ]
        );
    }

    #[test]
    fn test_blocks_along_ray_truncation_extension() {
        // With carving the traversal runs from the origin to one
        // truncation distance past the measured point.
        let mut hit_map = BlockHitMap::new();
        blocks_along_ray(
            &Point::new(0.5, 0.5, 0.5),
            &Point::new(3.5, 0.5, 0.5),
            8,
            1.0,
            1.5,
            true,
            &mut hit_map,
        );

        let locals = &hit_map[&GridIndex::ZERO];
        let xs: Vec<i32> = locals.iter().map(|l| l.x).collect();
        assert_eq!(xs, vec![0, 1, 2, 3, 4, 5]);
    }

    #[test]
    fn test_blocks_along_ray_band_only_without_carving() {
        // Carving disabled: only the ±truncation band around the
        // measured point is traversed.
        let mut hit_map = BlockHitMap::new();
        blocks_along_ray(
            &Point::new(0.5, 0.5, 0.5),
            &Point::new(5.5, 0.5, 0.5),
            8,
            1.0,
            1.0,
            false,
            &mut hit_map,
        );

        let locals = &hit_map[&GridIndex::ZERO];
        let xs: Vec<i32> = locals.iter().map(|l| l.x).collect();
        assert_eq!(xs, vec![4, 5, 6]);
    }
}

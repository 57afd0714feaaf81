//! Per-voxel TSDF update kernel.
//!
//! Computes one measurement's contribution to one voxel (signed
//! distance along the ray, measurement weight, color) and fuses it
//! into the voxel as an incremental weighted mean.

use crate::core::{Color, Point, TsdfVoxel};
use crate::integrator::config::TsdfIntegratorConfig;

/// Measurements whose final weight falls below this contribute nothing.
const WEIGHT_EPSILON: f32 = 1e-6;

/// Fuse one measurement into one voxel.
///
/// `origin` is the sensor position, `point` the measured surface point,
/// `voxel_center` the center of the voxel being updated (all world
/// coordinates, with `origin != point`). `dropoff_epsilon` is the width
/// of the near-surface band over which the weight drop-off begins,
/// normally one voxel size.
///
/// Returns true iff the voxel was modified. Voxels more than one
/// truncation distance behind the surface are left untouched, as are
/// updates whose weight tapers to zero.
pub fn update_tsdf_voxel(
    origin: &Point,
    point: &Point,
    voxel_center: &Point,
    color: Color,
    config: &TsdfIntegratorConfig,
    dropoff_epsilon: f32,
    voxel: &mut TsdfVoxel,
) -> bool {
    let ray = point - origin;
    let distance = ray.norm();
    debug_assert!(distance > 0.0);
    let unit_ray = ray / distance;

    let truncation_distance = config.default_truncation_distance;

    // Projection of the voxel-to-surface vector onto the ray: positive
    // between sensor and surface, negative behind the surface.
    let sdf = (point - voxel_center).dot(&unit_ray);

    if sdf < -truncation_distance {
        return false;
    }

    let mut weight = if config.const_weight {
        1.0
    } else {
        1.0 / (distance * distance)
    };

    // Linear taper over the negative truncation band: full weight down
    // to -dropoff_epsilon, zero at -truncation_distance.
    if config.use_weight_dropoff && truncation_distance > dropoff_epsilon && sdf < -dropoff_epsilon
    {
        weight *= (truncation_distance + sdf) / (truncation_distance - dropoff_epsilon);
        weight = weight.max(0.0);
    }

    if weight < WEIGHT_EPSILON {
        return false;
    }

    let sdf = sdf.clamp(-truncation_distance, truncation_distance);

    let combined_weight = voxel.weight + weight;
    voxel.distance = (voxel.distance * voxel.weight + sdf * weight) / combined_weight;
    voxel.color = Color::blend(voxel.color, voxel.weight, color, weight);
    voxel.weight = combined_weight.min(config.max_weight);

    true
}

//! TSDF integration driver.
//!
//! Fuses a posed point cloud into a [`TsdfLayer`]: every measured point
//! becomes a ray from the sensor origin, the ray is traversed voxel by
//! voxel, and each pierced voxel receives a signed-distance update.
//!
//! Integration is synchronous; a call returns when every point of the
//! frame has been processed. With `integrator_threads > 1` the cloud is
//! sharded across scoped worker threads, each fusing into a private
//! partial layer, and the partials are merged in worker order; no two
//! workers ever touch the same block.

use crate::core::{Color, Point, Transform};
use crate::error::{MapError, Result};
use crate::integrator::config::TsdfIntegratorConfig;
use crate::integrator::raycaster::{BlockHitMap, blocks_along_ray};
use crate::integrator::update::update_tsdf_voxel;
use crate::layer::TsdfLayer;

/// Rays shorter than this are numerically degenerate and skipped.
const DEGENERATE_RAY_LENGTH: f32 = 1e-6;

/// Per-frame integration counters.
///
/// Returned by every [`TsdfIntegrator::integrate_point_cloud`] call;
/// there is no global state.
#[derive(Clone, Copy, Debug, Default)]
pub struct IntegrationStats {
    /// Points fully integrated.
    pub points_integrated: usize,
    /// Points skipped for non-finite components.
    pub points_skipped_invalid: usize,
    /// Points skipped for being closer than the minimum ray length
    /// (including degenerate zero-length rays).
    pub points_skipped_short: usize,
    /// Points dropped for exceeding the maximum ray length.
    pub points_dropped_long: usize,
    /// Over-length rays clipped and integrated as clearing rays.
    pub rays_clipped: usize,
    /// Individual voxel updates applied.
    pub voxels_updated: usize,
    /// Blocks newly allocated during integration (summed across
    /// workers in the sharded path).
    pub blocks_allocated: usize,
}

impl IntegrationStats {
    /// Fold another frame's (or worker's) counters into this one.
    pub fn accumulate(&mut self, other: &IntegrationStats) {
        self.points_integrated += other.points_integrated;
        self.points_skipped_invalid += other.points_skipped_invalid;
        self.points_skipped_short += other.points_skipped_short;
        self.points_dropped_long += other.points_dropped_long;
        self.rays_clipped += other.rays_clipped;
        self.voxels_updated += other.voxels_updated;
        self.blocks_allocated += other.blocks_allocated;
    }
}

/// Fuses posed point clouds into a TSDF layer.
pub struct TsdfIntegrator {
    config: TsdfIntegratorConfig,
    layer: TsdfLayer,
}

impl TsdfIntegrator {
    /// Create an integrator owning `layer`.
    ///
    /// Fails on invalid configuration values.
    pub fn new(config: TsdfIntegratorConfig, layer: TsdfLayer) -> Result<Self> {
        config.validate()?;
        if config.default_truncation_distance < layer.voxel_size() {
            log::warn!(
                "truncation distance {} m is below the voxel size {} m; \
                 surfaces will be thinner than one voxel",
                config.default_truncation_distance,
                layer.voxel_size()
            );
        }
        Ok(Self { config, layer })
    }

    /// The integrator configuration.
    pub fn config(&self) -> &TsdfIntegratorConfig {
        &self.config
    }

    /// The layer being fused into.
    pub fn layer(&self) -> &TsdfLayer {
        &self.layer
    }

    /// Mutable access to the layer (e.g. for clearing updated flags).
    pub fn layer_mut(&mut self) -> &mut TsdfLayer {
        &mut self.layer
    }

    /// Consume the integrator and return its layer.
    pub fn into_layer(self) -> TsdfLayer {
        self.layer
    }

    /// Integrate one frame: a sensor pose and the points and colors
    /// measured from it.
    ///
    /// `points_c` are in the sensor frame; `t_wc` maps them to world
    /// coordinates. Fails if `points_c` and `colors` differ in length.
    /// Non-finite, too-short and too-long points are skipped and
    /// counted in the returned stats.
    pub fn integrate_point_cloud(
        &mut self,
        t_wc: &Transform,
        points_c: &[Point],
        colors: &[Color],
    ) -> Result<IntegrationStats> {
        if points_c.len() != colors.len() {
            return Err(MapError::PointColorMismatch {
                points: points_c.len(),
                colors: colors.len(),
            });
        }

        let mut stats = IntegrationStats::default();
        if self.config.integrator_threads > 1 && points_c.len() > 1 {
            self.integrate_sharded(t_wc, points_c, colors, &mut stats)?;
        } else {
            integrate_points(
                &self.config,
                &mut self.layer,
                t_wc,
                points_c,
                colors,
                &mut stats,
            );
        }

        let skipped =
            stats.points_skipped_invalid + stats.points_skipped_short + stats.points_dropped_long;
        if skipped > 0 {
            log::debug!(
                "integrated {} of {} points ({} non-finite, {} short, {} long)",
                stats.points_integrated,
                points_c.len(),
                stats.points_skipped_invalid,
                stats.points_skipped_short,
                stats.points_dropped_long
            );
        }

        Ok(stats)
    }

    /// Shard the cloud across worker threads, each integrating into a
    /// private partial layer, then merge the partials in worker order.
    fn integrate_sharded(
        &mut self,
        t_wc: &Transform,
        points_c: &[Point],
        colors: &[Color],
        stats: &mut IntegrationStats,
    ) -> Result<()> {
        let num_threads = self.config.integrator_threads.min(points_c.len());
        let chunk_size = points_c.len().div_ceil(num_threads);

        let config = &self.config;
        let voxel_size = self.layer.voxel_size();
        let voxels_per_side = self.layer.voxels_per_side();

        let partials: Vec<(TsdfLayer, IntegrationStats)> = std::thread::scope(|scope| {
            let workers: Vec<_> = points_c
                .chunks(chunk_size)
                .zip(colors.chunks(chunk_size))
                .map(|(point_chunk, color_chunk)| {
                    scope.spawn(move || {
                        let mut partial = TsdfLayer::new(voxel_size, voxels_per_side)
                            .expect("layer parameters were validated at construction");
                        let mut partial_stats = IntegrationStats::default();
                        integrate_points(
                            config,
                            &mut partial,
                            t_wc,
                            point_chunk,
                            color_chunk,
                            &mut partial_stats,
                        );
                        (partial, partial_stats)
                    })
                })
                .collect();

            workers
                .into_iter()
                .map(|worker| worker.join().expect("integrator worker panicked"))
                .collect()
        });

        for (partial, partial_stats) in &partials {
            self.layer.merge(partial, self.config.max_weight)?;
            stats.accumulate(partial_stats);
        }
        Ok(())
    }
}

/// Integrate a slice of points into one layer on the calling thread.
fn integrate_points(
    config: &TsdfIntegratorConfig,
    layer: &mut TsdfLayer,
    t_wc: &Transform,
    points_c: &[Point],
    colors: &[Color],
    stats: &mut IntegrationStats,
) {
    let origin = Point::from(t_wc.translation.vector);
    let dropoff_epsilon = layer.voxel_size();
    let mut hit_map = BlockHitMap::new();

    for (point_c, color) in points_c.iter().zip(colors) {
        if !(point_c.x.is_finite() && point_c.y.is_finite() && point_c.z.is_finite()) {
            stats.points_skipped_invalid += 1;
            continue;
        }

        let point_w = t_wc * point_c;
        let ray_length = (point_w - origin).norm();

        if ray_length < DEGENERATE_RAY_LENGTH || ray_length < config.min_ray_length_m {
            stats.points_skipped_short += 1;
            continue;
        }

        // Endpoint of the traversed segment and its truncation
        // extension. Over-length rays are either dropped or clipped
        // into clearing rays: traversal stops at the clipped endpoint
        // with no extension, while the SDF is still computed against
        // the true measured point, so every touched voxel gets a
        // free-space update.
        let mut traversal_end = point_w;
        let mut truncation_distance = config.default_truncation_distance;

        if config.max_ray_length_m > 0.0 && ray_length > config.max_ray_length_m {
            if config.clip_long_rays && config.voxel_carving_enabled {
                let scale = config.max_ray_length_m / ray_length;
                traversal_end = origin + (point_w - origin) * scale;
                truncation_distance = 0.0;
                stats.rays_clipped += 1;
            } else {
                stats.points_dropped_long += 1;
                continue;
            }
        }

        blocks_along_ray(
            &origin,
            &traversal_end,
            layer.voxels_per_side(),
            layer.voxel_size(),
            truncation_distance,
            config.voxel_carving_enabled,
            &mut hit_map,
        );

        for (block_index, local_indices) in &hit_map {
            if layer.block(block_index).is_none() {
                stats.blocks_allocated += 1;
            }
            let block = layer.allocate_block(block_index);

            let mut block_updated = false;
            for local_index in local_indices {
                let voxel_center = block.center_from_local(local_index);
                let voxel = block.voxel_by_local_mut(local_index);
                if update_tsdf_voxel(
                    &origin,
                    &point_w,
                    &voxel_center,
                    *color,
                    config,
                    dropoff_epsilon,
                    voxel,
                ) {
                    stats.voxels_updated += 1;
                    block_updated = true;
                }
            }
            if block_updated {
                block.mark_updated();
            }
        }

        stats.points_integrated += 1;
    }
}

//! Synthetic point-cloud generation for tests and benchmarks.
//!
//! Provides deterministic noisy geometry so integration behavior can be
//! exercised without sensor hardware or recorded data.

use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};
use rand_distr::StandardNormal;

use crate::core::{Point, Ray};

/// Generate a noisy spherical point cloud centered on the origin.
///
/// Directions are sampled uniformly over the sphere; each point sits at
/// `radius + n` along its direction, where `n` is Gaussian noise with
/// the given `mean` and `sigma`. The same seed always produces the same
/// cloud.
pub fn sphere_cloud(mean: f32, sigma: f32, radius: f32, num_points: usize, seed: u64) -> Vec<Point> {
    let mut rng = SmallRng::seed_from_u64(seed);

    (0..num_points)
        .map(|_| {
            // Uniform direction: normalized standard-normal 3-vector.
            let direction = loop {
                let v = Ray::new(
                    rng.sample(StandardNormal),
                    rng.sample(StandardNormal),
                    rng.sample(StandardNormal),
                );
                let norm = v.norm();
                if norm > 1e-6 {
                    break v / norm;
                }
            };

            let noise: f32 = rng.sample::<f32, _>(StandardNormal) * sigma + mean;
            Point::from(direction * (radius + noise))
        })
        .collect()
}

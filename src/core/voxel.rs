//! TSDF voxel sample and color types.
//!
//! A voxel stores the fused signed distance to the nearest observed
//! surface, the accumulated measurement weight, and a blended color.
//! A voxel with zero weight has never been observed; its distance and
//! color are meaningless.

use serde::{Deserialize, Serialize};

/// RGBA color, 8 bits per channel.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Color {
    /// Red channel
    pub r: u8,
    /// Green channel
    pub g: u8,
    /// Blue channel
    pub b: u8,
    /// Alpha channel
    pub a: u8,
}

impl Color {
    /// Create a color from all four channels.
    #[inline]
    pub const fn new(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    /// Create an opaque color from RGB channels.
    #[inline]
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 255 }
    }

    /// Weighted blend of two colors.
    ///
    /// Each channel is the weighted average rounded to the nearest
    /// integer. The weight sum must be positive.
    pub fn blend(first: Color, first_weight: f32, second: Color, second_weight: f32) -> Color {
        let total_weight = first_weight + second_weight;
        debug_assert!(total_weight > 0.0);

        let w1 = first_weight / total_weight;
        let w2 = second_weight / total_weight;

        let channel = |c1: u8, c2: u8| (c1 as f32 * w1 + c2 as f32 * w2).round() as u8;

        Color {
            r: channel(first.r, second.r),
            g: channel(first.g, second.g),
            b: channel(first.b, second.b),
            a: channel(first.a, second.a),
        }
    }
}

/// A single TSDF sample.
///
/// Default-constructed voxels are unobserved: zero distance, zero
/// weight, transparent black color.
#[derive(Clone, Copy, Debug, Default, Serialize, Deserialize)]
pub struct TsdfVoxel {
    /// Signed distance to the nearest observed surface (meters).
    /// Positive in free space, negative behind the surface.
    pub distance: f32,
    /// Accumulated measurement confidence. Zero means unobserved.
    pub weight: f32,
    /// Blended surface color.
    pub color: Color,
}

impl TsdfVoxel {
    /// Has this voxel received at least one measurement?
    #[inline]
    pub fn is_observed(&self) -> bool {
        self.weight > 0.0
    }

    /// Merge another voxel's accumulated observation into this one.
    ///
    /// Distance and color become the weight-averaged combination; the
    /// weights sum, saturating at `max_weight`. Merging an unobserved
    /// voxel is a no-op.
    pub fn merge(&mut self, other: &TsdfVoxel, max_weight: f32) {
        if other.weight <= 0.0 {
            return;
        }
        if self.weight <= 0.0 {
            *self = *other;
            self.weight = other.weight.min(max_weight);
            return;
        }

        let combined_weight = self.weight + other.weight;
        self.distance =
            (self.distance * self.weight + other.distance * other.weight) / combined_weight;
        self.color = Color::blend(self.color, self.weight, other.color, other.weight);
        self.weight = combined_weight.min(max_weight);
    }
}

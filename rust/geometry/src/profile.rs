// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Cross-section profiles swept by the extruder
//!
//! Offsets are expressed in the frame's (right, up) plane: `lateral` along
//! `right`, `vertical` along `up`. The normal hint lives in the same plane and
//! decides which side of each ribbon strip faces outward.

use crate::material::MaterialId;
use nalgebra::Vector2;
use smallvec::SmallVec;
use std::f64::consts::{PI, TAU};

/// Which side of the road centerline
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Side {
    Left,
    Right,
}

impl Side {
    pub const BOTH: [Side; 2] = [Side::Left, Side::Right];

    /// -1 for left, +1 for right (lateral axis points right)
    #[inline]
    pub fn sign(self) -> f64 {
        match self {
            Side::Left => -1.0,
            Side::Right => 1.0,
        }
    }

    #[inline]
    pub fn opposite(self) -> Side {
        match self {
            Side::Left => Side::Right,
            Side::Right => Side::Left,
        }
    }
}

/// One point of a cross-section
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ProfilePoint {
    pub lateral: f64,
    pub vertical: f64,
    /// Outward direction in the (lateral, vertical) plane, need not be unit
    pub normal: Vector2<f64>,
    pub color: [f32; 4],
    /// Texture u coordinate
    pub u: f32,
}

impl ProfilePoint {
    pub fn new(lateral: f64, vertical: f64, normal: Vector2<f64>, color: [f32; 4], u: f32) -> Self {
        Self {
            lateral,
            vertical,
            normal,
            color,
            u,
        }
    }
}

/// Ordered cross-section with a material
#[derive(Debug, Clone, PartialEq)]
pub struct CrossSection {
    pub points: SmallVec<[ProfilePoint; 16]>,
    /// Connect the last point back to the first
    pub closed: bool,
    pub material: MaterialId,
}

impl CrossSection {
    /// Open profile (a strip)
    pub fn open(material: MaterialId, points: impl IntoIterator<Item = ProfilePoint>) -> Self {
        Self {
            points: points.into_iter().collect(),
            closed: false,
            material,
        }
    }

    /// Closed profile (a ring)
    pub fn closed(material: MaterialId, points: impl IntoIterator<Item = ProfilePoint>) -> Self {
        Self {
            points: points.into_iter().collect(),
            closed: true,
            material,
        }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.points.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Number of strips between consecutive points
    #[inline]
    pub fn edge_count(&self) -> usize {
        match (self.closed, self.points.len()) {
            (_, 0) | (_, 1) => 0,
            (true, n) => n,
            (false, n) => n - 1,
        }
    }

    /// Reassign u coordinates by cumulative edge length, 0 at the first point
    pub fn with_perimeter_u(mut self) -> Self {
        let mut lengths = Vec::with_capacity(self.points.len());
        let mut total = 0.0;
        lengths.push(0.0);
        for pair in self.points.windows(2) {
            total += ((pair[1].lateral - pair[0].lateral).powi(2)
                + (pair[1].vertical - pair[0].vertical).powi(2))
            .sqrt();
            lengths.push(total);
        }

        if total > 0.0 {
            for (point, length) in self.points.iter_mut().zip(lengths) {
                point.u = (length / total) as f32;
            }
        }
        self
    }
}

/// Flat horizontal strip from `lateral_start` to `lateral_end` with
/// `segments` subdivisions, facing up
pub fn flat_strip(
    material: MaterialId,
    lateral_start: f64,
    lateral_end: f64,
    segments: u32,
    vertical: f64,
    color: [f32; 4],
) -> CrossSection {
    let segments = segments.max(1);
    CrossSection::open(
        material,
        (0..=segments).map(|k| {
            let f = k as f64 / segments as f64;
            ProfilePoint::new(
                lateral_start + (lateral_end - lateral_start) * f,
                vertical,
                Vector2::new(0.0, 1.0),
                color,
                f as f32,
            )
        }),
    )
}

/// Barrier rail just outside the road edge on `side`.
///
/// Four points: inner-bottom, inner-top, outer-top, outer-bottom, giving an
/// inner face towards the road, a top face and an outer face.
pub fn barrier_rail(
    material: MaterialId,
    side: Side,
    inner_offset: f64,
    thickness: f64,
    height: f64,
    color: [f32; 4],
) -> CrossSection {
    let s = side.sign();
    let inner = s * inner_offset;
    let outer = s * (inner_offset + thickness.max(0.0));
    let inward = Vector2::new(-s, 0.0);
    let outward = Vector2::new(s, 0.0);
    let up = Vector2::new(0.0, 1.0);

    CrossSection::open(
        material,
        [
            ProfilePoint::new(inner, 0.0, inward, color, 0.0),
            ProfilePoint::new(inner, height, (inward + up).normalize(), color, 0.0),
            ProfilePoint::new(outer, height, (outward + up).normalize(), color, 0.0),
            ProfilePoint::new(outer, 0.0, outward, color, 0.0),
        ],
    )
    .with_perimeter_u()
}

/// Vertical wall at `lateral` from `bottom` to `top`, facing towards the centerline
pub fn inward_wall(
    material: MaterialId,
    lateral: f64,
    bottom: f64,
    top: f64,
    color: [f32; 4],
) -> CrossSection {
    let facing = Vector2::new(-lateral.signum(), 0.0);
    CrossSection::open(
        material,
        [
            ProfilePoint::new(lateral, bottom, facing, color, 0.0),
            ProfilePoint::new(lateral, top, facing, color, 1.0),
        ],
    )
}

/// Elliptical vault from the right wall top to the left wall top.
///
/// `x = cos(a)·span`, `y = wall_height + sin(a)·span·0.5` for a in [0, π];
/// normals point into the tunnel.
pub fn elliptical_arch(
    material: MaterialId,
    span: f64,
    wall_height: f64,
    segments: u32,
    color: [f32; 4],
) -> CrossSection {
    let segments = segments.max(1);
    CrossSection::open(
        material,
        (0..=segments).map(|k| {
            let angle = PI * k as f64 / segments as f64;
            let (sin, cos) = angle.sin_cos();
            // Gradient of the ellipse with semi-axes (span, span / 2), reversed
            let inward = -Vector2::new(cos, 2.0 * sin);
            ProfilePoint::new(
                cos * span,
                wall_height + sin * span * 0.5,
                inward,
                color,
                k as f32 / segments as f32,
            )
        }),
    )
}

/// Circle of `radius` in the profile plane, centred at `center`, facing outward
pub fn ring(
    material: MaterialId,
    center: Vector2<f64>,
    radius: f64,
    segments: u32,
    color: [f32; 4],
) -> CrossSection {
    let segments = segments.max(3);
    CrossSection::closed(
        material,
        (0..segments).map(|k| {
            let angle = TAU * k as f64 / segments as f64;
            let (sin, cos) = angle.sin_cos();
            ProfilePoint::new(
                center.x + cos * radius,
                center.y + sin * radius,
                Vector2::new(cos, sin),
                color,
                k as f32 / segments as f32,
            )
        }),
    )
}

/// Deck slab hanging below a surface at vertical 0: left side, underside,
/// right side
pub fn deck_slab(material: MaterialId, half_width: f64, depth: f64, color: [f32; 4]) -> CrossSection {
    let down = Vector2::new(0.0, -1.0);
    let left = Vector2::new(-1.0, 0.0);
    let right = Vector2::new(1.0, 0.0);

    CrossSection::open(
        material,
        [
            ProfilePoint::new(-half_width, 0.0, left, color, 0.0),
            ProfilePoint::new(-half_width, -depth, (left + down).normalize(), color, 0.0),
            ProfilePoint::new(half_width, -depth, (right + down).normalize(), color, 0.0),
            ProfilePoint::new(half_width, 0.0, right, color, 0.0),
        ],
    )
    .with_perimeter_u()
}

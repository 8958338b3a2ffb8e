// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Axis-aligned culling volumes
//!
//! Segment bounds come from a sparse sample of the centerline padded by the
//! widest and tallest structure the segment can carry. They feed frustum
//! culling only, so a loose fit is fine.

use crate::buffer::Vertex;
use crate::config::GeometryConfig;
use crate::curve::HermiteCurve;
use crate::fork::ForkGeometry;
use crate::path::{ElevatedPath, FramePath};
use crate::segment::{SegmentDescriptor, SegmentKind};
use nalgebra::{Point3, Vector3};

/// Axis-aligned box
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bounds {
    pub min: Point3<f64>,
    pub max: Point3<f64>,
    pub center: Point3<f64>,
    /// Half size along each axis
    pub extents: Vector3<f64>,
}

impl Bounds {
    pub fn new(min: Point3<f64>, max: Point3<f64>) -> Self {
        Self {
            min,
            max,
            center: nalgebra::center(&min, &max),
            extents: (max - min) * 0.5,
        }
    }

    /// Smallest box containing every point, `None` for an empty iterator
    pub fn from_points(points: impl IntoIterator<Item = Point3<f64>>) -> Option<Self> {
        let mut points = points.into_iter();
        let first = points.next()?;
        let (min, max) = points.fold((first, first), |(min, max), p| (min.inf(&p), max.sup(&p)));
        Some(Self::new(min, max))
    }

    pub fn union(&self, other: &Bounds) -> Self {
        Self::new(self.min.inf(&other.min), self.max.sup(&other.max))
    }

    /// Grow by `horizontal` on X and Z, `below` and `above` on Y
    pub fn padded(&self, horizontal: f64, below: f64, above: f64) -> Self {
        Self::new(
            self.min - Vector3::new(horizontal, below, horizontal),
            self.max + Vector3::new(horizontal, above, horizontal),
        )
    }

    pub fn contains(&self, point: &Point3<f64>) -> bool {
        (0..3).all(|i| point[i] >= self.min[i] && point[i] <= self.max[i])
    }

    pub fn size(&self) -> Vector3<f64> {
        self.max - self.min
    }

    /// Euclidean distance from `point` to the box, zero inside
    pub fn distance_to(&self, point: &Point3<f64>) -> f64 {
        let closest = point.sup(&self.min).inf(&self.max);
        nalgebra::distance(point, &closest)
    }
}

fn sample_path<P: FramePath + ?Sized>(path: &P, samples: u32) -> Option<Bounds> {
    let n = samples.max(2);
    Bounds::from_points((0..n).map(|i| path.position_at(i as f64 / (n - 1) as f64)))
}

/// Culling bounds of a segment from `config.bounds.samples` curve positions
pub fn segment_bounds(
    curve: &HermiteCurve,
    descriptor: &SegmentDescriptor,
    config: &GeometryConfig,
) -> Bounds {
    let samples = config.bounds.samples;
    let half_width = config.road.half_width(descriptor.lanes());
    let barrier_reach = config.barrier.outer_offset(half_width);
    let mut horizontal = barrier_reach;
    let mut above = config.barrier.height;

    if descriptor.kind.is_lit_by_poles() {
        horizontal = horizontal.max(barrier_reach + config.fixtures.light_setback);
        above = above.max(config.fixtures.pole_height);
    }

    let centerline = match descriptor.kind {
        SegmentKind::Tunnel(params) => {
            let span = crate::builders::tunnel::tunnel_span(&params, half_width * 2.0, &config.tunnel);
            horizontal = horizontal.max(span);
            above = above.max(params.height + span * 0.5);
            sample_path(curve, samples)
        }
        SegmentKind::Overpass(params) => {
            // Deck samples plus the ground line the pillars stand on
            let deck = sample_path(&ElevatedPath::new(curve, params.amplitude), samples);
            let ground = sample_path(curve, samples);
            deck.zip(ground).map(|(d, g)| d.union(&g))
        }
        SegmentKind::Fork(params) => {
            let fork = ForkGeometry::new(curve, &params, half_width * 2.0);
            let left = sample_path(&fork.left, samples);
            let right = sample_path(&fork.right, samples);
            left.zip(right).map(|(l, r)| l.union(&r))
        }
        SegmentKind::Straight | SegmentKind::Curve => sample_path(curve, samples),
    };

    // sample_path always yields at least two points
    let centerline = centerline.unwrap_or_else(|| Bounds::new(curve.p0, curve.p0));
    centerline.padded(
        horizontal,
        config.bounds.ground_clearance,
        above + config.bounds.vertical_padding,
    )
}

/// Exact bounds of generated vertices
pub fn geometry_bounds(vertices: &[Vertex]) -> Option<Bounds> {
    Bounds::from_points(vertices.iter().map(Vertex::position_f64))
}

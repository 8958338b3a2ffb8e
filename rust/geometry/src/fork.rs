// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Fork geometry adapter
//!
//! A fork segment's curve describes the trunk. The adapter derives two branch
//! curves that share the trunk's start point and start tangent, so both
//! branches leave the fork origin with the same frame and only separate
//! further along. The commit parameter marks where the branches are one road
//! width apart; inner barriers begin there.
//!
//! Before the commit parameter the two branch roads overlap. The right branch
//! is driven on a [`BranchSurface`] sunk slightly below the left one there, so
//! the overlap has a single visible surface.

use crate::curve::{world_up, Frame, HermiteCurve};
use crate::path::FramePath;
use crate::profile::Side;
use crate::segment::ForkParams;
use nalgebra::{Point3, Rotation3, Unit};
use std::f64::consts::PI;

/// Samples used to locate the commit parameter
const COMMIT_SAMPLES: usize = 64;

/// Depth of the right branch surface under the left one at the fork origin.
/// Larger than the marking lift, so right-branch markings under the left
/// road stay hidden.
pub const MERGE_DROP: f64 = 0.05;

/// Two branch curves diverging from a shared origin frame
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ForkGeometry {
    /// Shared start frame of both branches
    pub origin: Frame,
    pub left: HermiteCurve,
    pub right: HermiteCurve,
    /// First parameter at which the branch centerlines are a road width apart
    pub commit_t: f64,
}

impl ForkGeometry {
    /// Split `trunk` into branches rotated by ∓angle/2 about world up
    pub fn new(trunk: &HermiteCurve, params: &ForkParams, road_width: f64) -> Self {
        let angle = if params.angle.is_finite() {
            params.angle.clamp(0.0, PI)
        } else {
            0.0
        };

        let left = rotate_branch(trunk, -angle * 0.5);
        let right = rotate_branch(trunk, angle * 0.5);

        Self {
            origin: trunk.frame_at(0.0),
            left,
            right,
            commit_t: commit_parameter(&left, &right, road_width),
        }
    }

    pub fn branch(&self, side: Side) -> &HermiteCurve {
        match side {
            Side::Left => &self.left,
            Side::Right => &self.right,
        }
    }

    /// Drivable surface of a branch: the left branch as is, the right branch
    /// sunk by [`MERGE_DROP`] fading out at the commit parameter
    pub fn surface(&self, side: Side) -> BranchSurface<'_> {
        let drop = match side {
            Side::Left => 0.0,
            Side::Right => MERGE_DROP,
        };
        BranchSurface {
            curve: self.branch(side),
            drop,
            commit_t: self.commit_t,
        }
    }

    /// Centerline position of a branch at the commit parameter
    pub fn commit_point(&self, side: Side) -> Point3<f64> {
        self.branch(side).position(self.commit_t)
    }

    /// Whether the branches separate within the segment
    #[inline]
    pub fn separates(&self) -> bool {
        self.commit_t < 1.0
    }
}

/// Branch curve lowered along world up inside the merge zone
#[derive(Debug, Clone, Copy)]
pub struct BranchSurface<'a> {
    curve: &'a HermiteCurve,
    drop: f64,
    commit_t: f64,
}

impl BranchSurface<'_> {
    /// Depth below the branch curve at `t`; zero from the commit parameter on.
    /// Branches that never separate stay sunk over their whole length.
    pub fn drop_at(&self, t: f64) -> f64 {
        if self.commit_t >= 1.0 {
            return self.drop;
        }
        if !(self.commit_t > 0.0) {
            return 0.0;
        }
        let t = if t.is_nan() { 0.0 } else { t };
        self.drop * (1.0 - t / self.commit_t).clamp(0.0, 1.0)
    }
}

impl FramePath for BranchSurface<'_> {
    #[inline]
    fn frame_at(&self, t: f64) -> Frame {
        self.curve.frame_at(t).lifted(-self.drop_at(t))
    }
}

/// Rotate end point and end tangent about world up through P0; P0 and T0 stay
fn rotate_branch(trunk: &HermiteCurve, angle: f64) -> HermiteCurve {
    let rotation = Rotation3::from_axis_angle(&Unit::new_unchecked(world_up()), angle);
    HermiteCurve::new(
        trunk.p0,
        trunk.p0 + rotation * trunk.chord(),
        trunk.t0,
        rotation * trunk.t1,
    )
}

fn commit_parameter(left: &HermiteCurve, right: &HermiteCurve, road_width: f64) -> f64 {
    if !(road_width > 0.0) {
        return 0.0;
    }
    (0..=COMMIT_SAMPLES)
        .map(|i| i as f64 / COMMIT_SAMPLES as f64)
        .find(|&t| (left.position(t) - right.position(t)).norm() >= road_width)
        .unwrap_or(1.0)
}

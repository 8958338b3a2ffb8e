// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Frame paths and arc-length parametrization
//!
//! The extruder sweeps a cross-section along anything that yields a [`Frame`]
//! for a parameter in [0, 1]: the raw segment curve, an overpass deck raised
//! by a sine profile, a sub-range of a fork branch, or a circle for tires.

use crate::curve::{world_up, Frame, HermiteCurve};
use nalgebra::{Point3, Vector3};
use std::f64::consts::{PI, TAU};

/// Default number of chords used to measure arc length
pub const ARC_LENGTH_SAMPLES: usize = 64;

/// Anything that produces a frame for a parameter in [0, 1]
pub trait FramePath {
    /// Frame at parameter `t`
    fn frame_at(&self, t: f64) -> Frame;

    /// Position at parameter `t`
    #[inline]
    fn position_at(&self, t: f64) -> Point3<f64> {
        self.frame_at(t).position
    }
}

impl FramePath for HermiteCurve {
    #[inline]
    fn frame_at(&self, t: f64) -> Frame {
        HermiteCurve::frame_at(self, t)
    }

    #[inline]
    fn position_at(&self, t: f64) -> Point3<f64> {
        self.position(t)
    }
}

impl<P: FramePath + ?Sized> FramePath for &P {
    #[inline]
    fn frame_at(&self, t: f64) -> Frame {
        (**self).frame_at(t)
    }
}

/// Overpass elevation `amplitude · sin(π·t)`, zero at both ends.
///
/// `t` is clamped to [0, 1] so the deck never dips below its base.
#[inline]
pub fn overpass_elevation(amplitude: f64, t: f64) -> f64 {
    let t = if t.is_nan() { 0.0 } else { t.clamp(0.0, 1.0) };
    amplitude * (PI * t).sin()
}

/// Base path raised along world up by the overpass elevation profile
#[derive(Debug, Clone, Copy)]
pub struct ElevatedPath<'a, P: ?Sized> {
    base: &'a P,
    amplitude: f64,
}

impl<'a, P: FramePath + ?Sized> ElevatedPath<'a, P> {
    pub fn new(base: &'a P, amplitude: f64) -> Self {
        Self { base, amplitude }
    }

    /// Elevation offset at `t`
    #[inline]
    pub fn elevation(&self, t: f64) -> f64 {
        overpass_elevation(self.amplitude, t)
    }

    pub fn amplitude(&self) -> f64 {
        self.amplitude
    }

    pub fn base(&self) -> &'a P {
        self.base
    }
}

impl<P: FramePath + ?Sized> FramePath for ElevatedPath<'_, P> {
    #[inline]
    fn frame_at(&self, t: f64) -> Frame {
        self.base.frame_at(t).lifted(self.elevation(t))
    }
}

/// `[t_start, t_end]` of another path, re-parametrized onto [0, 1]
#[derive(Debug, Clone, Copy)]
pub struct SubPath<'a, P: ?Sized> {
    base: &'a P,
    t_start: f64,
    t_end: f64,
}

impl<'a, P: FramePath + ?Sized> SubPath<'a, P> {
    pub fn new(base: &'a P, t_start: f64, t_end: f64) -> Self {
        Self {
            base,
            t_start,
            t_end,
        }
    }

    /// Parameter span covered in the base path
    #[inline]
    pub fn span(&self) -> f64 {
        self.t_end - self.t_start
    }
}

impl<P: FramePath + ?Sized> FramePath for SubPath<'_, P> {
    #[inline]
    fn frame_at(&self, t: f64) -> Frame {
        self.base.frame_at(self.t_start + self.span() * t)
    }
}

/// Full circle around `axis`, starting and ending at the same frame.
///
/// Frames point `right` radially outward, so a ring profile swept along it
/// produces a torus.
#[derive(Debug, Clone, Copy)]
pub struct CirclePath {
    center: Point3<f64>,
    radius: f64,
    u: Vector3<f64>,
    v: Vector3<f64>,
}

impl CirclePath {
    pub fn new(center: Point3<f64>, axis: Vector3<f64>, radius: f64) -> Self {
        let axis = axis.try_normalize(1e-12).unwrap_or_else(world_up);
        let helper = if axis.y.abs() < 0.9 {
            Vector3::y()
        } else {
            Vector3::x()
        };
        // u × v == axis
        let u = helper.cross(&axis).normalize();
        let v = axis.cross(&u);

        Self {
            center,
            radius: radius.max(0.0),
            u,
            v,
        }
    }

    pub fn radius(&self) -> f64 {
        self.radius
    }

    pub fn center(&self) -> Point3<f64> {
        self.center
    }
}

impl FramePath for CirclePath {
    fn frame_at(&self, t: f64) -> Frame {
        let angle = TAU * t;
        let (sin, cos) = angle.sin_cos();
        let radial = self.u * cos + self.v * sin;
        let forward = self.v * cos - self.u * sin;
        Frame {
            position: self.center + radial * self.radius,
            forward,
            right: radial,
            up: forward.cross(&radial),
        }
    }
}

/// Cumulative distance table sampled at uniform parameter steps
#[derive(Debug, Clone, PartialEq)]
pub struct ArcLengthTable {
    /// distances[i] = length from t = 0 to t = i / (len - 1)
    distances: Vec<f64>,
}

impl ArcLengthTable {
    /// Measure `path` with `samples` chords (at least one)
    pub fn build<P: FramePath + ?Sized>(path: &P, samples: usize) -> Self {
        let samples = samples.max(1);
        let mut distances = Vec::with_capacity(samples + 1);
        let mut total = 0.0;
        let mut previous = path.position_at(0.0);
        distances.push(0.0);

        for i in 1..=samples {
            let point = path.position_at(i as f64 / samples as f64);
            total += (point - previous).norm();
            distances.push(total);
            previous = point;
        }

        Self { distances }
    }

    /// Measured length of the whole path
    #[inline]
    pub fn total(&self) -> f64 {
        self.distances.last().copied().unwrap_or(0.0)
    }

    #[inline]
    fn samples(&self) -> usize {
        self.distances.len() - 1
    }

    /// Distance travelled from t = 0 to `t` (clamped to [0, 1])
    pub fn distance_at(&self, t: f64) -> f64 {
        let t = if t.is_nan() { 0.0 } else { t.clamp(0.0, 1.0) };
        let scaled = t * self.samples() as f64;
        let i = (scaled.floor() as usize).min(self.samples() - 1);
        let local = scaled - i as f64;
        self.distances[i] + (self.distances[i + 1] - self.distances[i]) * local
    }

    /// Parameter at which `distance` has been travelled (clamped to the path)
    pub fn t_at_distance(&self, distance: f64) -> f64 {
        let total = self.total();
        if total <= 0.0 || distance.is_nan() || distance <= 0.0 {
            return 0.0;
        }
        if distance >= total {
            return 1.0;
        }

        // First entry not below the requested distance; index 0 holds 0.0
        let upper = self.distances.partition_point(|&d| d < distance).max(1);
        let lower = upper - 1;
        let span = self.distances[upper] - self.distances[lower];
        let local = if span > 0.0 {
            (distance - self.distances[lower]) / span
        } else {
            0.0
        };

        (lower as f64 + local) / self.samples() as f64
    }

    /// Parameter at a fraction of the total length
    #[inline]
    pub fn t_at_fraction(&self, fraction: f64) -> f64 {
        self.t_at_distance(fraction * self.total())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_overpass_elevation_profile() {
        assert_relative_eq!(overpass_elevation(8.0, 0.0), 0.0, epsilon = 1e-12);
        assert_relative_eq!(overpass_elevation(8.0, 0.5), 8.0, epsilon = 1e-12);
        assert_relative_eq!(overpass_elevation(8.0, 1.0), 0.0, epsilon = 1e-12);
        // Clamped outside the segment
        assert_relative_eq!(overpass_elevation(8.0, 1.5), 0.0, epsilon = 1e-12);
    }

    #[test]
    fn test_elevated_path_keeps_basis() {
        let curve = HermiteCurve::straight(Point3::origin(), Point3::new(0.0, 0.0, 100.0));
        let elevated = ElevatedPath::new(&curve, 8.0);
        let base = curve.frame_at(0.5);
        let frame = elevated.frame_at(0.5);
        assert_relative_eq!(frame.position.y, 8.0, epsilon = 1e-12);
        assert_eq!(frame.forward, base.forward);
        assert_eq!(frame.right, base.right);
    }

    #[test]
    fn test_sub_path_remaps_parameters() {
        let curve = HermiteCurve::straight(Point3::origin(), Point3::new(0.0, 0.0, 100.0));
        let sub = SubPath::new(&curve, 0.25, 0.75);
        assert_relative_eq!(sub.position_at(0.0).z, 25.0, epsilon = 1e-9);
        assert_relative_eq!(sub.position_at(1.0).z, 75.0, epsilon = 1e-9);
    }

    #[test]
    fn test_circle_path_is_closed_and_orthonormal() {
        let circle = CirclePath::new(Point3::new(1.0, 2.0, 3.0), Vector3::y(), 0.5);
        let start = circle.frame_at(0.0);
        let end = circle.frame_at(1.0);
        assert_relative_eq!(start.position, end.position, epsilon = 1e-12);

        for i in 0..16 {
            let frame = circle.frame_at(i as f64 / 16.0);
            assert_relative_eq!((frame.position - circle.center()).norm(), 0.5, epsilon = 1e-12);
            assert_relative_eq!(frame.right.cross(&frame.up), frame.forward, epsilon = 1e-12);
        }
    }

    #[test]
    fn test_arc_length_of_straight_line() {
        let curve = HermiteCurve::straight(Point3::origin(), Point3::new(0.0, 0.0, 200.0));
        let table = ArcLengthTable::build(&curve, ARC_LENGTH_SAMPLES);
        assert_relative_eq!(table.total(), 200.0, epsilon = 1e-9);
        assert_relative_eq!(table.distance_at(0.5), 100.0, epsilon = 1e-9);
        assert_relative_eq!(table.t_at_distance(50.0), 0.25, epsilon = 1e-9);
        assert_eq!(table.t_at_distance(-3.0), 0.0);
        assert_eq!(table.t_at_distance(500.0), 1.0);
    }

    #[test]
    fn test_arc_length_round_trip_on_curve() {
        let curve = HermiteCurve::from_endpoints(
            Point3::origin(),
            Vector3::z(),
            Point3::new(80.0, 0.0, 80.0),
            Vector3::x(),
            1.0,
        );
        let table = ArcLengthTable::build(&curve, 128);
        // A quarter-ish bend is longer than its chord
        assert!(table.total() > (curve.p1 - curve.p0).norm());

        for d in [0.0, 10.0, 37.5, 90.0, table.total()] {
            let t = table.t_at_distance(d);
            assert_relative_eq!(table.distance_at(t), d, epsilon = 1e-6);
        }
    }

    #[test]
    fn test_zero_length_path() {
        let p = Point3::new(1.0, 1.0, 1.0);
        let curve = HermiteCurve::straight(p, p);
        let table = ArcLengthTable::build(&curve, 8);
        assert_eq!(table.total(), 0.0);
        assert_eq!(table.t_at_fraction(0.5), 0.0);
    }
}

// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Cubic Hermite curves and the moving reference frame along them
//!
//! A segment's centerline is a cubic Hermite curve given by two endpoints and
//! two tangents (already scaled by segment length and shape factor). Every
//! builder places its cross-sections through [`Frame`]s evaluated here.

use nalgebra::{Point3, Vector3};

/// Below this derivative magnitude the tangent is treated as degenerate
const DERIVATIVE_EPSILON: f64 = 1e-9;

/// Below this cross-product magnitude forward is considered parallel to world up
const PARALLEL_EPSILON: f64 = 1e-6;

/// Parameters are clamped to this magnitude so the cubic stays finite
const PARAMETER_LIMIT: f64 = 1.0e4;

/// World up axis (Y-up)
#[inline]
pub fn world_up() -> Vector3<f64> {
    Vector3::y()
}

/// Heading assumed when neither forward nor the path gives a horizontal one
#[inline]
fn default_heading() -> Vector3<f64> {
    Vector3::z()
}

/// Position plus orthonormal basis at a point on a path.
///
/// Invariant: `up == forward × right`, so `right × up == forward`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Frame {
    pub position: Point3<f64>,
    pub forward: Vector3<f64>,
    pub right: Vector3<f64>,
    pub up: Vector3<f64>,
}

impl Frame {
    /// Build a frame from a position and a forward direction.
    ///
    /// `forward` does not need to be normalized; a zero vector falls back to +Z.
    pub fn from_forward(position: Point3<f64>, forward: Vector3<f64>) -> Self {
        Self::from_forward_heading(position, forward, default_heading())
    }

    /// Like [`Frame::from_forward`], but when `forward` is (anti)parallel to
    /// world up, `right` is taken as `world_up × heading`.
    ///
    /// Passing the path's horizontal travel direction as `heading` makes the
    /// vertical sample agree with its non-vertical neighbours.
    pub fn from_forward_heading(
        position: Point3<f64>,
        forward: Vector3<f64>,
        heading: Vector3<f64>,
    ) -> Self {
        let forward = forward
            .try_normalize(DERIVATIVE_EPSILON)
            .unwrap_or_else(Vector3::z);

        let right = match world_up().cross(&forward).try_normalize(PARALLEL_EPSILON) {
            Some(r) => r,
            None => {
                let hint = world_up()
                    .cross(&heading)
                    .try_normalize(DERIVATIVE_EPSILON)
                    .unwrap_or_else(|| world_up().cross(&default_heading()));
                // Forward is only nearly vertical; drop its component from the hint
                (hint - forward * forward.dot(&hint)).normalize()
            }
        };

        // Orthonormal by construction, no re-normalization of world up needed
        let up = forward.cross(&right);

        Self {
            position,
            forward,
            right,
            up,
        }
    }

    /// Frame at `position` whose up axis is world up, heading along the
    /// horizontal projection of `forward`. Used for vertical fixtures.
    pub fn upright(position: Point3<f64>, forward: Vector3<f64>) -> Self {
        Self::from_forward(position, Vector3::new(forward.x, 0.0, forward.z))
    }

    /// World position of a cross-section offset
    #[inline]
    pub fn offset(&self, lateral: f64, vertical: f64) -> Point3<f64> {
        self.position + self.right * lateral + self.up * vertical
    }

    /// World direction of a cross-section vector
    #[inline]
    pub fn direction(&self, lateral: f64, vertical: f64) -> Vector3<f64> {
        self.right * lateral + self.up * vertical
    }

    /// Same basis, position moved along world up
    #[inline]
    pub fn lifted(&self, height: f64) -> Self {
        Self {
            position: self.position + world_up() * height,
            ..*self
        }
    }
}

/// Cubic Hermite curve: P0, P1 endpoints and T0, T1 tangents
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HermiteCurve {
    pub p0: Point3<f64>,
    pub p1: Point3<f64>,
    pub t0: Vector3<f64>,
    pub t1: Vector3<f64>,
}

impl HermiteCurve {
    pub fn new(p0: Point3<f64>, p1: Point3<f64>, t0: Vector3<f64>, t1: Vector3<f64>) -> Self {
        Self { p0, p1, t0, t1 }
    }

    /// Straight segment: both tangents equal the chord
    pub fn straight(start: Point3<f64>, end: Point3<f64>) -> Self {
        let chord = end - start;
        Self::new(start, end, chord, chord)
    }

    /// Curve from endpoint directions.
    ///
    /// Directions are normalized and scaled by `chord length × alpha`.
    /// A zero direction falls back to the chord direction.
    pub fn from_endpoints(
        start: Point3<f64>,
        start_dir: Vector3<f64>,
        end: Point3<f64>,
        end_dir: Vector3<f64>,
        alpha: f64,
    ) -> Self {
        let chord = end - start;
        let scale = chord.norm() * if alpha.is_finite() { alpha } else { 1.0 };
        let chord_dir = chord
            .try_normalize(DERIVATIVE_EPSILON)
            .unwrap_or_else(Vector3::zeros);

        let t0 = start_dir
            .try_normalize(DERIVATIVE_EPSILON)
            .unwrap_or(chord_dir)
            * scale;
        let t1 = end_dir
            .try_normalize(DERIVATIVE_EPSILON)
            .unwrap_or(chord_dir)
            * scale;

        Self::new(start, end, t0, t1)
    }

    /// Chord vector P1 - P0
    #[inline]
    pub fn chord(&self) -> Vector3<f64> {
        self.p1 - self.p0
    }

    /// Position H(t).
    ///
    /// t = 0 and t = 1 reproduce P0 and P1 exactly.
    #[inline]
    pub fn position(&self, t: f64) -> Point3<f64> {
        let t = sanitize(t);
        let t2 = t * t;
        let t3 = t2 * t;

        let h00 = 2.0 * t3 - 3.0 * t2 + 1.0;
        let h10 = t3 - 2.0 * t2 + t;
        let h01 = -2.0 * t3 + 3.0 * t2;
        let h11 = t3 - t2;

        Point3::from(
            self.p0.coords * h00 + self.t0 * h10 + self.p1.coords * h01 + self.t1 * h11,
        )
    }

    /// Derivative dH/dt
    #[inline]
    pub fn derivative(&self, t: f64) -> Vector3<f64> {
        let t = sanitize(t);
        let t2 = t * t;

        let d00 = 6.0 * t2 - 6.0 * t;
        let d10 = 3.0 * t2 - 4.0 * t + 1.0;
        let d01 = -6.0 * t2 + 6.0 * t;
        let d11 = 3.0 * t2 - 2.0 * t;

        self.p0.coords * d00 + self.t0 * d10 + self.p1.coords * d01 + self.t1 * d11
    }

    /// Unit tangent, falling back to the chord direction for degenerate derivatives
    pub fn forward(&self, t: f64) -> Vector3<f64> {
        self.derivative(t)
            .try_normalize(DERIVATIVE_EPSILON)
            .or_else(|| self.chord().try_normalize(DERIVATIVE_EPSILON))
            .unwrap_or_else(Vector3::z)
    }

    /// Horizontal travel direction of the whole curve: the chord, then the
    /// tangent sum, then +Z
    pub fn heading(&self) -> Vector3<f64> {
        [self.chord(), self.t0 + self.t1]
            .into_iter()
            .map(|v| Vector3::new(v.x, 0.0, v.z))
            .find_map(|v| v.try_normalize(DERIVATIVE_EPSILON))
            .unwrap_or_else(default_heading)
    }

    /// Frame at parameter `t`. Valid for any real `t`.
    #[inline]
    pub fn frame_at(&self, t: f64) -> Frame {
        Frame::from_forward_heading(self.position(t), self.forward(t), self.heading())
    }
}

/// Evaluate the frame of `curve` at `t`
#[inline]
pub fn evaluate(curve: &HermiteCurve, t: f64) -> Frame {
    curve.frame_at(t)
}

#[inline]
fn sanitize(t: f64) -> f64 {
    if t.is_nan() {
        0.0
    } else {
        t.clamp(-PARAMETER_LIMIT, PARAMETER_LIMIT)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn sample_curves() -> Vec<HermiteCurve> {
        vec![
            HermiteCurve::straight(Point3::origin(), Point3::new(0.0, 0.0, 200.0)),
            HermiteCurve::from_endpoints(
                Point3::new(0.0, 0.0, 0.0),
                Vector3::z(),
                Point3::new(60.0, 0.0, 120.0),
                Vector3::x(),
                0.8,
            ),
            HermiteCurve::new(
                Point3::new(-10.0, 2.0, 5.0),
                Point3::new(40.0, 12.0, 90.0),
                Vector3::new(0.0, 30.0, 80.0),
                Vector3::new(50.0, -10.0, 20.0),
            ),
            // S-bend with a climb
            HermiteCurve::from_endpoints(
                Point3::new(0.0, 0.0, 0.0),
                Vector3::new(1.0, 0.2, 1.0),
                Point3::new(0.0, 15.0, 150.0),
                Vector3::new(-1.0, 0.0, 1.0),
                1.2,
            ),
        ]
    }

    #[test]
    fn test_endpoints_are_interpolated_exactly() {
        for curve in sample_curves() {
            let start = evaluate(&curve, 0.0);
            let end = evaluate(&curve, 1.0);
            assert_relative_eq!(start.position, curve.p0, epsilon = 1e-12);
            assert_relative_eq!(end.position, curve.p1, epsilon = 1e-12);
        }
    }

    #[test]
    fn test_frames_are_orthonormal() {
        for curve in sample_curves() {
            for i in 0..=50 {
                let frame = curve.frame_at(i as f64 / 50.0);
                assert_relative_eq!(frame.forward.norm(), 1.0, epsilon = 1e-9);
                assert_relative_eq!(frame.right.norm(), 1.0, epsilon = 1e-9);
                assert_relative_eq!(frame.up.norm(), 1.0, epsilon = 1e-9);
                assert!(frame.forward.dot(&frame.right).abs() < 1e-9);
                assert!(frame.forward.dot(&frame.up).abs() < 1e-9);
                assert!(frame.right.dot(&frame.up).abs() < 1e-9);
                // right × up == forward
                assert_relative_eq!(frame.right.cross(&frame.up), frame.forward, epsilon = 1e-9);
            }
        }
    }

    #[test]
    fn test_straight_curve_along_z_is_monotonic() {
        let curve = HermiteCurve::straight(Point3::origin(), Point3::new(0.0, 0.0, 200.0));
        let mut last_z = f64::NEG_INFINITY;
        for i in 0..=100 {
            let z = curve.position(i as f64 / 100.0).z;
            assert!(z > last_z, "z must strictly increase ({} <= {})", z, last_z);
            last_z = z;
        }

        let frame = curve.frame_at(0.5);
        assert_relative_eq!(frame.forward, Vector3::z(), epsilon = 1e-12);
        assert_relative_eq!(frame.right, Vector3::x(), epsilon = 1e-12);
        assert_relative_eq!(frame.up, Vector3::y(), epsilon = 1e-12);
    }

    #[test]
    fn test_positions_are_continuous() {
        for curve in sample_curves() {
            let bound = curve.chord().norm() + curve.t0.norm() + curve.t1.norm();
            for i in 0..100 {
                let t = i as f64 / 100.0;
                let a = curve.position(t);
                let b = curve.position(t + 0.01);
                // |H'| is bounded by a multiple of the control vectors on [0, 1]
                assert!((b - a).norm() <= 0.01 * 3.0 * bound);
            }
        }
    }

    #[test]
    fn test_zero_tangents_fall_back_to_chord() {
        let curve = HermiteCurve::new(
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(10.0, 0.0, 0.0),
            Vector3::zeros(),
            Vector3::zeros(),
        );
        // At the endpoints the derivative vanishes entirely
        let frame = curve.frame_at(0.0);
        assert_relative_eq!(frame.forward, Vector3::x(), epsilon = 1e-12);
        assert!(frame.up.iter().all(|c| c.is_finite()));
    }

    #[test]
    fn test_fully_degenerate_curve_has_no_nan() {
        let p = Point3::new(3.0, 4.0, 5.0);
        let curve = HermiteCurve::new(p, p, Vector3::zeros(), Vector3::zeros());
        for t in [-2.0, 0.0, 0.5, 1.0, 3.0, f64::NAN, f64::INFINITY] {
            let frame = curve.frame_at(t);
            for v in [frame.forward, frame.right, frame.up] {
                assert!(v.iter().all(|c| c.is_finite()));
                assert_relative_eq!(v.norm(), 1.0, epsilon = 1e-9);
            }
            assert!(frame.position.iter().all(|c| c.is_finite()));
        }
    }

    #[test]
    fn test_vertical_tangent_uses_fallback_axis() {
        let curve = HermiteCurve::straight(Point3::origin(), Point3::new(0.0, 50.0, 0.0));
        let frame = curve.frame_at(0.5);
        assert_relative_eq!(frame.forward, Vector3::y(), epsilon = 1e-12);
        assert_relative_eq!(frame.right, Vector3::x(), epsilon = 1e-12);
        assert!(frame.up.dot(&frame.forward).abs() < 1e-12);
    }

    #[test]
    fn test_up_does_not_flip_through_near_vertical_climb() {
        // Climbing while heading +Z, tilting towards vertical
        let near = Frame::from_forward(Point3::origin(), Vector3::new(0.0, 1.0, 1e-4));
        let vertical = Frame::from_forward(Point3::origin(), Vector3::y());
        assert!(near.right.dot(&vertical.right) > 0.99);
        assert!(near.up.dot(&vertical.up) > 0.99);
    }

    #[test]
    fn test_vertical_start_follows_curve_heading() {
        // Starts straight up, then heads towards -Z
        let curve = HermiteCurve::new(
            Point3::origin(),
            Point3::new(0.0, 20.0, -20.0),
            Vector3::new(0.0, 40.0, 0.0),
            Vector3::new(0.0, 0.0, -40.0),
        );
        let start = curve.frame_at(0.0);
        assert_relative_eq!(start.right, -Vector3::x(), epsilon = 1e-12);
        assert!(start.right.dot(&curve.frame_at(0.01).right) > 0.99);
        assert!(start.up.dot(&curve.frame_at(0.01).up) > 0.9);
    }

    #[test]
    fn test_descent_through_vertical_keeps_right() {
        let near = Frame::from_forward(Point3::origin(), Vector3::new(0.0, -1.0, 1e-4));
        let vertical = Frame::from_forward(Point3::origin(), -Vector3::y());
        assert!(near.right.dot(&vertical.right) > 0.99);
        assert_relative_eq!(vertical.right.cross(&vertical.up), vertical.forward, epsilon = 1e-12);
    }

    #[test]
    fn test_parameters_outside_unit_interval() {
        let curve = sample_curves()[1];
        for t in [-1.5, -0.25, 1.25, 4.0] {
            let frame = curve.frame_at(t);
            assert!(frame.position.iter().all(|c| c.is_finite()));
            assert_relative_eq!(frame.forward.norm(), 1.0, epsilon = 1e-9);
        }
    }

    #[test]
    fn test_from_endpoints_scales_tangents() {
        let curve = HermiteCurve::from_endpoints(
            Point3::origin(),
            Vector3::new(0.0, 0.0, 5.0),
            Point3::new(0.0, 0.0, 100.0),
            Vector3::zeros(),
            0.5,
        );
        assert_relative_eq!(curve.t0, Vector3::new(0.0, 0.0, 50.0), epsilon = 1e-12);
        // Zero end direction falls back to the chord
        assert_relative_eq!(curve.t1, Vector3::new(0.0, 0.0, 50.0), epsilon = 1e-12);
    }
}

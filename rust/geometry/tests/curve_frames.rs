// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Frame properties over a spread of curves, including degenerate ones.

use approx::{assert_abs_diff_eq, assert_relative_eq};
use roadgen_geometry::{evaluate, FramePath, HermiteCurve, Point3, Vector3};

fn curves() -> Vec<HermiteCurve> {
    vec![
        HermiteCurve::straight(Point3::origin(), Point3::new(0.0, 0.0, 200.0)),
        HermiteCurve::from_endpoints(
            Point3::origin(),
            Vector3::z(),
            Point3::new(120.0, 4.0, 150.0),
            Vector3::x(),
            1.2,
        ),
        // S-bend with a climb
        HermiteCurve::new(
            Point3::new(10.0, 0.0, 0.0),
            Point3::new(-30.0, 20.0, 300.0),
            Vector3::new(150.0, 0.0, 200.0),
            Vector3::new(150.0, 10.0, 200.0),
        ),
        // Vertical climb: forward parallel to world up
        HermiteCurve::straight(Point3::origin(), Point3::new(0.0, 50.0, 0.0)),
        // Zero tangents and zero chord
        HermiteCurve::new(Point3::origin(), Point3::origin(), Vector3::zeros(), Vector3::zeros()),
    ]
}

#[test]
fn test_endpoints_are_reproduced() {
    for curve in curves() {
        assert_relative_eq!(evaluate(&curve, 0.0).position, curve.p0, epsilon = 1e-12);
        assert_relative_eq!(evaluate(&curve, 1.0).position, curve.p1, epsilon = 1e-12);
    }
}

#[test]
fn test_frames_are_orthonormal_everywhere() {
    for curve in curves() {
        for k in 0..=100 {
            let frame = evaluate(&curve, k as f64 / 100.0);
            for axis in [frame.forward, frame.right, frame.up] {
                assert!(axis.iter().all(|c| c.is_finite()));
                assert_relative_eq!(axis.norm(), 1.0, epsilon = 1e-9);
            }
            assert_abs_diff_eq!(frame.forward.dot(&frame.right), 0.0, epsilon = 1e-9);
            assert_abs_diff_eq!(frame.forward.dot(&frame.up), 0.0, epsilon = 1e-9);
            assert_abs_diff_eq!(frame.right.dot(&frame.up), 0.0, epsilon = 1e-9);
            assert_relative_eq!(frame.right.cross(&frame.up), frame.forward, epsilon = 1e-9);
        }
    }
}

#[test]
fn test_right_stays_horizontal_on_level_curves() {
    let curve = &curves()[1];
    for k in 0..=20 {
        let frame = evaluate(curve, k as f64 / 20.0);
        // Forward climbs only slightly, right has no vertical component
        assert_abs_diff_eq!(frame.right.y, 0.0, epsilon = 1e-12);
        assert!(frame.up.y > 0.99);
    }
}

#[test]
fn test_out_of_range_parameters_stay_finite() {
    let curve = &curves()[2];
    for t in [-1.0, 2.0, 1.0e9, f64::NAN] {
        let frame = curve.frame_at(t);
        assert!(frame.position.iter().all(|c| c.is_finite()), "t = {}", t);
        assert!(frame.forward.iter().all(|c| c.is_finite()), "t = {}", t);
    }
}

#[test]
fn test_frame_path_matches_evaluate() {
    let curve = &curves()[1];
    for k in 0..=10 {
        let t = k as f64 / 10.0;
        assert_eq!(curve.frame_at(t), evaluate(curve, t));
        assert_relative_eq!(curve.position_at(t), curve.position(t), epsilon = 1e-12);
    }
}

#[test]
fn test_straight_curve_advances_monotonically() {
    let curve = &curves()[0];
    let mut last = f64::NEG_INFINITY;
    for k in 0..=100 {
        let z = evaluate(curve, k as f64 / 100.0).position.z;
        assert!(z > last);
        last = z;
    }
}

#[test]
fn test_adjacent_samples_stay_close() {
    for curve in curves() {
        let bound = (curve.chord().norm() + curve.t0.norm() + curve.t1.norm()) * 0.05 + 1e-9;
        for k in 0..100 {
            let t = k as f64 / 100.0;
            let step = evaluate(&curve, t + 0.01).position - evaluate(&curve, t).position;
            assert!(step.norm() <= bound);
        }
    }
}

#[test]
fn test_vertical_start_matches_following_frames() {
    // Each curve leaves straight up, then bends towards its heading
    let headings = [-Vector3::z(), Vector3::x(), -Vector3::x(), Vector3::z()];
    for heading in headings {
        let curve = HermiteCurve::new(
            Point3::origin(),
            Point3::origin() + Vector3::new(0.0, 20.0, 0.0) + heading * 20.0,
            Vector3::new(0.0, 40.0, 0.0),
            heading * 40.0,
        );
        let start = evaluate(&curve, 0.0);
        assert_relative_eq!(start.forward, Vector3::y(), epsilon = 1e-12);
        for t in [0.001, 0.01, 0.05] {
            let next = evaluate(&curve, t);
            assert!(start.right.dot(&next.right) > 0.99, "heading {:?} at t = {}", heading, t);
            assert!(start.up.dot(&next.up) > 0.0, "heading {:?} at t = {}", heading, t);
        }
    }
}

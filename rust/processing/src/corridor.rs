// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Demonstration corridor
//!
//! A short chain of segments covering every segment kind, used by the
//! preview binary, the benchmark and integration tests. Each segment starts
//! where the previous one ended and keeps its heading.

use roadgen_geometry::path::ARC_LENGTH_SAMPLES;
use roadgen_geometry::{
    ArcLengthTable, FixtureKind, FixturePlacement, ForkParams, HermiteCurve, OverpassParams, Point3,
    SegmentDescriptor, SegmentId, SegmentKind, TunnelParams, Vector3,
};

struct Cursor {
    position: Point3<f64>,
    heading: Vector3<f64>,
    next_id: u64,
    segments: Vec<(HermiteCurve, SegmentDescriptor)>,
}

impl Cursor {
    fn straight(&mut self, length: f64, kind: SegmentKind, lanes: u32) -> &mut SegmentDescriptor {
        let end = self.position + self.heading * length;
        self.push(HermiteCurve::straight(self.position, end), kind, lanes)
    }

    /// Turn by `yaw` radians about world up over `chord` metres
    fn turn(&mut self, chord: f64, yaw: f64, lanes: u32) -> &mut SegmentDescriptor {
        let rotation = nalgebra::Rotation3::from_axis_angle(&Vector3::y_axis(), yaw);
        let half = nalgebra::Rotation3::from_axis_angle(&Vector3::y_axis(), yaw * 0.5);
        let end = self.position + half * self.heading * chord;
        let end_dir = rotation * self.heading;
        let curve = HermiteCurve::from_endpoints(self.position, self.heading, end, end_dir, 1.0);
        self.push(curve, SegmentKind::Curve, lanes)
    }

    fn push(&mut self, curve: HermiteCurve, kind: SegmentKind, lanes: u32) -> &mut SegmentDescriptor {
        let arc_length = ArcLengthTable::build(&curve, ARC_LENGTH_SAMPLES).total();
        let descriptor = SegmentDescriptor::new(SegmentId(self.next_id), kind, arc_length, lanes);
        self.next_id += 1;
        self.position = curve.p1;
        if let Some(heading) = curve.t1.try_normalize(1e-9) {
            self.heading = heading;
        }
        self.segments.push((curve, descriptor));
        let last = self.segments.len() - 1;
        &mut self.segments[last].1
    }
}

/// Straight, curve, tunnel, overpass and fork segments chained along +Z
pub fn demo_corridor() -> Vec<(HermiteCurve, SegmentDescriptor)> {
    let mut cursor = Cursor {
        position: Point3::origin(),
        heading: Vector3::z(),
        next_id: 1,
        segments: Vec::new(),
    };

    cursor
        .straight(200.0, SegmentKind::Straight, 4)
        .fixtures
        .push(FixturePlacement::new(FixtureKind::Cone, 60.0, 4.0));

    let curve = cursor.turn(180.0, std::f64::consts::FRAC_PI_4, 4);
    curve.difficulty = 0.5;
    curve.fixtures.extend([
        FixturePlacement::new(FixtureKind::TireStack, 40.0, -6.0),
        FixturePlacement::new(FixtureKind::Debris, 120.0, 2.0).with_seed(7),
    ]);

    cursor.straight(
        200.0,
        SegmentKind::Tunnel(TunnelParams {
            height: 5.0,
            width: 20.0,
        }),
        4,
    );
    cursor.straight(200.0, SegmentKind::Overpass(OverpassParams { amplitude: 8.0 }), 2);
    cursor.straight(150.0, SegmentKind::Fork(ForkParams { angle: 0.5 }), 2);

    cursor.segments
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_corridor_covers_every_kind() {
        let corridor = demo_corridor();
        let kinds: Vec<&str> = corridor.iter().map(|(_, d)| d.kind.name()).collect();
        assert_eq!(kinds, ["straight", "curve", "tunnel", "overpass", "fork"]);
    }

    #[test]
    fn test_segments_are_chained() {
        let corridor = demo_corridor();
        for pair in corridor.windows(2) {
            assert_relative_eq!(pair[0].0.p1, pair[1].0.p0, epsilon = 1e-9);
        }
        assert_relative_eq!(corridor[0].1.arc_length, 200.0, epsilon = 1e-6);
    }
}

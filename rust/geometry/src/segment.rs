// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Segment descriptors produced by the track topology layer

use std::fmt;

/// Stable id assigned by the topology layer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SegmentId(pub u64);

impl fmt::Display for SegmentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "segment#{}", self.0)
    }
}

/// Tunnel dimensions
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TunnelParams {
    /// Height of the vertical walls; the vault adds `width / 4` on top
    pub height: f64,
    /// Wall-to-wall width
    pub width: f64,
}

/// Overpass elevation profile
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct OverpassParams {
    /// Peak elevation at the segment midpoint
    pub amplitude: f64,
}

/// Fork divergence
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ForkParams {
    /// Full angle between the two branches, in radians
    pub angle: f64,
}

/// Segment type with only the parameters that type needs
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum SegmentKind {
    Straight,
    Curve,
    Tunnel(TunnelParams),
    Overpass(OverpassParams),
    Fork(ForkParams),
}

impl SegmentKind {
    pub fn name(&self) -> &'static str {
        match self {
            SegmentKind::Straight => "straight",
            SegmentKind::Curve => "curve",
            SegmentKind::Tunnel(_) => "tunnel",
            SegmentKind::Overpass(_) => "overpass",
            SegmentKind::Fork(_) => "fork",
        }
    }

    /// Open-air segments get street lights
    #[inline]
    pub fn is_lit_by_poles(&self) -> bool {
        matches!(self, SegmentKind::Straight | SegmentKind::Curve | SegmentKind::Overpass(_))
    }
}

/// Discrete roadside or on-road fixture
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum FixtureKind {
    Cone,
    TireStack,
    Debris,
}

/// Fixture placed at an arc-length distance and lateral offset
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct FixturePlacement {
    pub kind: FixtureKind,
    /// Metres from the segment start
    pub distance: f64,
    /// Metres right of the centerline (negative = left)
    pub lateral: f64,
    /// Seed for shape variation
    pub seed: u64,
}

impl FixturePlacement {
    pub fn new(kind: FixtureKind, distance: f64, lateral: f64) -> Self {
        Self {
            kind,
            distance,
            lateral,
            seed: 0,
        }
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }
}

/// Everything the geometry pipeline reads about a segment besides its curve
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SegmentDescriptor {
    pub id: SegmentId,
    pub kind: SegmentKind,
    /// Physical length in metres
    pub arc_length: f64,
    pub lane_count: u32,
    /// 0.0 (calm) to 1.0 (hardest); scales debris density
    pub difficulty: f32,
    #[cfg_attr(feature = "serde", serde(default))]
    pub fixtures: Vec<FixturePlacement>,
}

impl SegmentDescriptor {
    pub fn new(id: SegmentId, kind: SegmentKind, arc_length: f64, lane_count: u32) -> Self {
        Self {
            id,
            kind,
            arc_length,
            lane_count,
            difficulty: 0.0,
            fixtures: Vec::new(),
        }
    }

    pub fn with_difficulty(mut self, difficulty: f32) -> Self {
        self.difficulty = difficulty;
        self
    }

    pub fn with_fixture(mut self, fixture: FixturePlacement) -> Self {
        self.fixtures.push(fixture);
        self
    }

    /// Lane count, never below one
    #[inline]
    pub fn lanes(&self) -> u32 {
        self.lane_count.max(1)
    }

    /// Arc length, zero for negative or non-finite input
    #[inline]
    pub fn length(&self) -> f64 {
        if self.arc_length.is_finite() {
            self.arc_length.max(0.0)
        } else {
            0.0
        }
    }
}

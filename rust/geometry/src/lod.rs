// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Level-of-detail tiers and their tessellation densities

use crate::config::LodConfig;

/// Detail tier requested for a segment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum LodTier {
    #[default]
    High,
    Medium,
    Low,
}

/// Segment counts used by the builders
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Tessellation {
    /// Cross-sections along the segment, minus one
    pub length_segments: u32,
    /// Subdivisions across the road surface
    pub width_segments: u32,
    /// Subdivisions of curved profiles (tunnel vault)
    pub radial_segments: u32,
}

impl LodTier {
    pub const ALL: [LodTier; 3] = [LodTier::High, LodTier::Medium, LodTier::Low];

    #[inline]
    pub fn length_segments(self) -> u32 {
        match self {
            LodTier::High => 40,
            LodTier::Medium => 20,
            LodTier::Low => 10,
        }
    }

    #[inline]
    pub fn width_segments(self) -> u32 {
        match self {
            LodTier::High => 8,
            LodTier::Medium => 4,
            LodTier::Low => 2,
        }
    }

    #[inline]
    pub fn radial_segments(self) -> u32 {
        match self {
            LodTier::High => 12,
            LodTier::Medium => 8,
            LodTier::Low => 6,
        }
    }

    pub fn tessellation(self) -> Tessellation {
        Tessellation {
            length_segments: self.length_segments(),
            width_segments: self.width_segments(),
            radial_segments: self.radial_segments(),
        }
    }

    /// Pick a tier from the camera distance to the segment
    pub fn from_distance(distance: f64, config: &LodConfig) -> Self {
        if distance.is_nan() || distance <= config.high_distance {
            LodTier::High
        } else if distance <= config.medium_distance {
            LodTier::Medium
        } else {
            LodTier::Low
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tier_densities() {
        assert_eq!(LodTier::High.length_segments(), 40);
        assert_eq!(LodTier::Medium.length_segments(), 20);
        assert_eq!(LodTier::Low.length_segments(), 10);
        assert_eq!(LodTier::High.width_segments(), 8);
    }

    #[test]
    fn test_tier_from_distance() {
        let config = LodConfig::default();
        assert_eq!(LodTier::from_distance(0.0, &config), LodTier::High);
        assert_eq!(LodTier::from_distance(config.high_distance + 1.0, &config), LodTier::Medium);
        assert_eq!(LodTier::from_distance(config.medium_distance + 1.0, &config), LodTier::Low);
        assert_eq!(LodTier::from_distance(f64::INFINITY, &config), LodTier::Low);
    }
}

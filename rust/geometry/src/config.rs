// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Builder configuration
//!
//! Builders are pure functions of (curve, descriptor, config); every
//! dimension and color they use comes from these structs. Defaults describe
//! a four-lane highway in metres.

/// Road surface dimensions and colors
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize), serde(default))]
pub struct RoadConfig {
    pub lane_width: f64,
    pub shoulder_width: f64,
    /// Metres of road per texture repeat along v
    pub uv_tile_length: f64,
    pub surface_color: [f32; 4],
    pub shoulder_color: [f32; 4],
}

impl RoadConfig {
    /// Width of the driving lanes only
    #[inline]
    pub fn lanes_width(&self, lane_count: u32) -> f64 {
        self.lane_width * lane_count.max(1) as f64
    }

    /// Lanes plus both shoulders
    #[inline]
    pub fn total_width(&self, lane_count: u32) -> f64 {
        self.lanes_width(lane_count) + 2.0 * self.shoulder_width
    }

    #[inline]
    pub fn half_width(&self, lane_count: u32) -> f64 {
        self.total_width(lane_count) * 0.5
    }
}

impl Default for RoadConfig {
    fn default() -> Self {
        Self {
            lane_width: 3.6,
            shoulder_width: 1.5,
            uv_tile_length: 10.0,
            surface_color: [0.22, 0.22, 0.24, 1.0],
            shoulder_color: [0.30, 0.29, 0.28, 1.0],
        }
    }
}

/// Roadside barrier rails
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize), serde(default))]
pub struct BarrierConfig {
    pub height: f64,
    pub thickness: f64,
    /// Gap between the road edge and the inner face
    pub edge_gap: f64,
    pub color: [f32; 4],
}

impl BarrierConfig {
    /// Lateral distance of the outer face from the centerline
    #[inline]
    pub fn outer_offset(&self, road_half_width: f64) -> f64 {
        road_half_width + self.edge_gap + self.thickness
    }
}

impl Default for BarrierConfig {
    fn default() -> Self {
        Self {
            height: 0.9,
            thickness: 0.3,
            edge_gap: 0.1,
            color: [0.62, 0.62, 0.60, 1.0],
        }
    }
}

/// Lane markings
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize), serde(default))]
pub struct MarkingConfig {
    pub dash_length: f64,
    pub gap_length: f64,
    pub line_width: f64,
    /// Distance of the solid edge lines from the lane edge, towards the shoulder
    pub edge_inset: f64,
    /// Height above the road surface, avoids z-fighting
    pub lift: f64,
    /// Solid lines are emitted as consecutive quads of this length
    pub solid_piece_length: f64,
    pub dashed_color: [f32; 4],
    pub edge_color: [f32; 4],
}

impl Default for MarkingConfig {
    fn default() -> Self {
        Self {
            dash_length: 3.0,
            gap_length: 6.0,
            line_width: 0.15,
            edge_inset: 0.2,
            lift: 0.02,
            solid_piece_length: 5.0,
            dashed_color: [0.95, 0.95, 0.95, 1.0],
            edge_color: [0.95, 0.85, 0.25, 1.0],
        }
    }
}

/// Tunnel walls, vault and ceiling lamps
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize), serde(default))]
pub struct TunnelConfig {
    /// Minimum gap between the road edge and the walls
    pub wall_clearance: f64,
    pub lamp_spacing: f64,
    /// Lamps hang this far below the vault apex
    pub lamp_drop: f64,
    pub wall_color: [f32; 4],
    pub vault_color: [f32; 4],
}

impl Default for TunnelConfig {
    fn default() -> Self {
        Self {
            wall_clearance: 0.5,
            lamp_spacing: 25.0,
            lamp_drop: 0.3,
            wall_color: [0.55, 0.53, 0.50, 1.0],
            vault_color: [0.45, 0.44, 0.42, 1.0],
        }
    }
}

/// Overpass deck and pillars
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize), serde(default))]
pub struct OverpassConfig {
    pub deck_thickness: f64,
    /// World-space distance between pillars
    pub pillar_spacing: f64,
    pub pillar_half_width: f64,
    /// Pillars with less visible height than this are omitted
    pub min_pillar_height: f64,
    pub deck_color: [f32; 4],
    pub pillar_color: [f32; 4],
}

impl Default for OverpassConfig {
    fn default() -> Self {
        Self {
            deck_thickness: 1.2,
            pillar_spacing: 20.0,
            pillar_half_width: 0.8,
            min_pillar_height: 0.5,
            deck_color: [0.58, 0.57, 0.55, 1.0],
            pillar_color: [0.52, 0.51, 0.50, 1.0],
        }
    }
}

/// Hazards and street lights
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize), serde(default))]
pub struct FixtureConfig {
    pub cone_radius: f64,
    pub cone_height: f64,
    pub cone_base_size: f64,
    pub cone_segments: u32,
    pub cone_color: [f32; 4],

    pub tire_radius: f64,
    pub tire_tube_radius: f64,
    pub tire_stack_height: u32,
    pub tire_ring_segments: u32,
    pub tire_sweep_segments: u32,
    pub tire_color: [f32; 4],

    /// Pieces at difficulty 0; difficulty 1 doubles it
    pub debris_pieces: u32,
    pub debris_size: f64,
    pub debris_spread: f64,
    pub debris_color: [f32; 4],

    pub light_spacing: f64,
    /// Distance from the barrier outer face to the pole
    pub light_setback: f64,
    pub pole_height: f64,
    pub pole_width: f64,
    pub arm_length: f64,
    pub emitter_size: f64,
    pub pole_color: [f32; 4],
    pub emitter_color: [f32; 4],
}

impl Default for FixtureConfig {
    fn default() -> Self {
        Self {
            cone_radius: 0.18,
            cone_height: 0.7,
            cone_base_size: 0.4,
            cone_segments: 12,
            cone_color: [1.0, 0.45, 0.05, 1.0],

            tire_radius: 0.32,
            tire_tube_radius: 0.11,
            tire_stack_height: 3,
            tire_ring_segments: 8,
            tire_sweep_segments: 12,
            tire_color: [0.06, 0.06, 0.06, 1.0],

            debris_pieces: 4,
            debris_size: 0.5,
            debris_spread: 1.5,
            debris_color: [0.35, 0.30, 0.26, 1.0],

            light_spacing: 40.0,
            light_setback: 1.0,
            pole_height: 9.0,
            pole_width: 0.2,
            arm_length: 2.0,
            emitter_size: 0.35,
            pole_color: [0.40, 0.42, 0.45, 1.0],
            emitter_color: [1.0, 0.92, 0.70, 1.0],
        }
    }
}

/// Low-poly vehicle body
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize), serde(default))]
pub struct VehicleConfig {
    pub length: f64,
    pub width: f64,
    pub body_height: f64,
    pub cabin_height: f64,
    /// Cabin length as a fraction of the body
    pub cabin_fraction: f64,
    pub ground_clearance: f64,
    pub wheel_radius: f64,
    pub wheel_width: f64,
    pub wheel_segments: u32,
    pub body_color: [f32; 4],
    pub wheel_color: [f32; 4],
    pub head_light_color: [f32; 4],
    pub tail_light_color: [f32; 4],
}

impl Default for VehicleConfig {
    fn default() -> Self {
        Self {
            length: 4.4,
            width: 1.8,
            body_height: 0.7,
            cabin_height: 0.55,
            cabin_fraction: 0.5,
            ground_clearance: 0.18,
            wheel_radius: 0.33,
            wheel_width: 0.22,
            wheel_segments: 12,
            body_color: [0.15, 0.35, 0.75, 1.0],
            wheel_color: [0.05, 0.05, 0.05, 1.0],
            head_light_color: [1.0, 0.98, 0.85, 1.0],
            tail_light_color: [0.9, 0.05, 0.05, 1.0],
        }
    }
}

/// Camera distance thresholds for LOD tiers
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize), serde(default))]
pub struct LodConfig {
    /// At or below this distance: high
    pub high_distance: f64,
    /// At or below this distance: medium, beyond: low
    pub medium_distance: f64,
}

impl Default for LodConfig {
    fn default() -> Self {
        Self {
            high_distance: 150.0,
            medium_distance: 400.0,
        }
    }
}

/// Culling volume padding
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize), serde(default))]
pub struct BoundsConfig {
    /// Curve positions sampled per segment
    pub samples: u32,
    /// Padding below the road surface
    pub ground_clearance: f64,
    /// Extra padding above the tallest structure
    pub vertical_padding: f64,
}

impl Default for BoundsConfig {
    fn default() -> Self {
        Self {
            samples: 10,
            ground_clearance: 1.0,
            vertical_padding: 0.5,
        }
    }
}

/// All builder configuration
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize), serde(default))]
pub struct GeometryConfig {
    pub road: RoadConfig,
    pub barrier: BarrierConfig,
    pub markings: MarkingConfig,
    pub tunnel: TunnelConfig,
    pub overpass: OverpassConfig,
    pub fixtures: FixtureConfig,
    pub vehicle: VehicleConfig,
    pub lod: LodConfig,
    pub bounds: BoundsConfig,
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_four_lane_widths() {
        let road = RoadConfig::default();
        assert_relative_eq!(road.lanes_width(4), 14.4, epsilon = 1e-12);
        assert_relative_eq!(road.total_width(4), 17.4, epsilon = 1e-12);
        assert_relative_eq!(road.half_width(4), 8.7, epsilon = 1e-12);
        // Zero lanes is treated as one
        assert_relative_eq!(road.lanes_width(0), 3.6, epsilon = 1e-12);
    }
}

// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Road surface: a flat strip across lanes and shoulders

use crate::buffer::{GeometryBuffer, SubMeshRange};
use crate::config::RoadConfig;
use crate::error::Result;
use crate::extrusion::{extrude, UvMapping};
use crate::material::MaterialId;
use crate::path::{ArcLengthTable, FramePath, ARC_LENGTH_SAMPLES};
use crate::profile::{flat_strip, CrossSection};

/// Strip of `width_segments + 1` points across the full width.
///
/// Points beyond the outer lane edges take the shoulder color.
pub fn road_profile(lane_count: u32, width_segments: u32, config: &RoadConfig) -> CrossSection {
    let half = config.half_width(lane_count);
    let lanes_half = config.lanes_width(lane_count) * 0.5;

    let mut profile = flat_strip(
        MaterialId::RoadSurface,
        -half,
        half,
        width_segments,
        0.0,
        config.surface_color,
    );
    for point in profile.points.iter_mut() {
        if point.lateral.abs() > lanes_half + 1e-9 {
            point.color = config.shoulder_color;
        }
    }
    profile
}

/// Extrude the road surface along `path` with arc-length-tiled v coordinates
pub fn build_road<P: FramePath + ?Sized>(
    buffer: &mut GeometryBuffer,
    path: &P,
    lane_count: u32,
    length_segments: u32,
    width_segments: u32,
    config: &RoadConfig,
) -> Result<SubMeshRange> {
    let table = ArcLengthTable::build(path, ARC_LENGTH_SAMPLES);
    let profile = road_profile(lane_count, width_segments, config);
    extrude(
        buffer,
        path,
        &profile,
        length_segments,
        UvMapping::ArcLength {
            table: &table,
            tile_length: config.uv_tile_length,
        },
    )
}

// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Shoulder barriers: one rail ribbon per side, just outside the road edge

use crate::buffer::{GeometryBuffer, SubMeshRange};
use crate::config::BarrierConfig;
use crate::error::Result;
use crate::extrusion::{extrude, UvMapping};
use crate::material::MaterialId;
use crate::path::FramePath;
use crate::profile::{barrier_rail, Side};

/// Extrude the rail on one side of a road with half width `road_half_width`
pub fn build_barrier<P: FramePath + ?Sized>(
    buffer: &mut GeometryBuffer,
    path: &P,
    side: Side,
    road_half_width: f64,
    length_segments: u32,
    config: &BarrierConfig,
) -> Result<SubMeshRange> {
    let profile = barrier_rail(
        MaterialId::Barrier,
        side,
        road_half_width + config.edge_gap,
        config.thickness,
        config.height,
        config.color,
    );
    extrude(buffer, path, &profile, length_segments, UvMapping::default())
}

/// Both rails; they share one material range
pub fn build_barriers<P: FramePath + ?Sized>(
    buffer: &mut GeometryBuffer,
    path: &P,
    road_half_width: f64,
    length_segments: u32,
    config: &BarrierConfig,
) -> Result<[SubMeshRange; 2]> {
    let left = build_barrier(buffer, path, Side::Left, road_half_width, length_segments, config)?;
    let right = build_barrier(buffer, path, Side::Right, road_half_width, length_segments, config)?;
    Ok([left, right])
}

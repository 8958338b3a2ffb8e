// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Tunnel shell: two inward-facing walls and an elliptical vault

use crate::auxiliary::{AuxiliaryDescriptor, AuxiliaryRecord};
use crate::buffer::{GeometryBuffer, SubMeshRange};
use crate::config::TunnelConfig;
use crate::curve::HermiteCurve;
use crate::error::Result;
use crate::extrusion::{extrude, UvMapping};
use crate::material::MaterialId;
use crate::path::{ArcLengthTable, FramePath, ARC_LENGTH_SAMPLES};
use crate::profile::{elliptical_arch, inward_wall, Side};
use crate::segment::{SegmentId, TunnelParams};

/// Half the wall-to-wall distance, never closer to the road than the clearance
pub fn tunnel_span(params: &TunnelParams, road_width: f64, config: &TunnelConfig) -> f64 {
    let requested = if params.width.is_finite() { params.width } else { 0.0 };
    requested.max(road_width + 2.0 * config.wall_clearance) * 0.5
}

/// Height of the vault apex above the road
#[inline]
pub fn apex_height(params: &TunnelParams, span: f64) -> f64 {
    params.height.max(0.0) + span * 0.5
}

/// Walls then vault, all tagged `TunnelWall`
pub fn build_tunnel_shell(
    buffer: &mut GeometryBuffer,
    curve: &HermiteCurve,
    params: &TunnelParams,
    road_width: f64,
    length_segments: u32,
    radial_segments: u32,
    config: &TunnelConfig,
) -> Result<SubMeshRange> {
    let span = tunnel_span(params, road_width, config);
    let wall_height = params.height.max(0.0);
    let start = buffer.index_count() as u32;

    for side in Side::BOTH {
        let wall = inward_wall(
            MaterialId::TunnelWall,
            side.sign() * span,
            0.0,
            wall_height,
            config.wall_color,
        );
        extrude(buffer, curve, &wall, length_segments, UvMapping::default())?;
    }

    let vault = elliptical_arch(
        MaterialId::TunnelWall,
        span,
        wall_height,
        radial_segments,
        config.vault_color,
    );
    extrude(buffer, curve, &vault, length_segments, UvMapping::default())?;

    Ok(buffer.range_since(start))
}

/// Ceiling lamps every `lamp_spacing` metres, offset half a spacing from the portals
pub fn tunnel_lamps(
    owner: SegmentId,
    curve: &HermiteCurve,
    params: &TunnelParams,
    road_width: f64,
    config: &TunnelConfig,
) -> Vec<AuxiliaryRecord> {
    if !(config.lamp_spacing > 0.0) {
        return Vec::new();
    }
    let span = tunnel_span(params, road_width, config);
    let hang = apex_height(params, span) - config.lamp_drop;
    let table = ArcLengthTable::build(curve, ARC_LENGTH_SAMPLES);
    let length = table.total();

    let mut lamps = Vec::new();
    let mut distance = config.lamp_spacing * 0.5;
    while distance < length {
        let frame = curve.frame_at(table.t_at_distance(distance));
        lamps.push(AuxiliaryRecord::new(
            owner,
            AuxiliaryDescriptor::TunnelLamp {
                position: frame.offset(0.0, hang),
                facing: -frame.up,
            },
        ));
        distance += config.lamp_spacing;
    }
    lamps
}

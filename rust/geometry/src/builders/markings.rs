// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Lane markings
//!
//! Markings are independent quads rather than ribbons. Distances are walked
//! along the segment's arc length and mapped back to curve parameters through
//! an [`ArcLengthTable`], so dashes keep their physical length on bends.

use crate::buffer::{GeometryBuffer, SubMeshRange};
use crate::config::{MarkingConfig, RoadConfig};
use crate::error::Result;
use crate::material::MaterialId;
use crate::path::{ArcLengthTable, FramePath, ARC_LENGTH_SAMPLES};

/// Dashes shorter than this after clipping are dropped
const MIN_DASH_LENGTH: f64 = 1e-3;

/// Line style at one lateral offset
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineStyle {
    /// Between two lanes
    Dashed,
    /// Outer edge of the driving lanes
    Solid,
}

/// One marking line
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MarkingLine {
    /// Metres right of the centerline
    pub lateral: f64,
    pub style: LineStyle,
}

/// Interior lane boundaries (dashed) and both lane edges (solid)
pub fn marking_lines(lane_count: u32, road: &RoadConfig, markings: &MarkingConfig) -> Vec<MarkingLine> {
    let lanes = lane_count.max(1);
    let lanes_half = road.lanes_width(lanes) * 0.5;
    let edge = lanes_half + markings.edge_inset;

    let mut lines = Vec::with_capacity(lanes as usize + 1);
    lines.push(MarkingLine {
        lateral: -edge,
        style: LineStyle::Solid,
    });
    lines.extend((1..lanes).map(|k| MarkingLine {
        lateral: -lanes_half + k as f64 * road.lane_width,
        style: LineStyle::Dashed,
    }));
    lines.push(MarkingLine {
        lateral: edge,
        style: LineStyle::Solid,
    });
    lines
}

/// `(start, end)` distances of the dashes along `arc_length`.
///
/// Walks dash/gap cycles from zero; the final dash is clipped to the arc
/// length. Zero, negative or non-finite inputs yield no dashes.
pub fn dash_intervals(arc_length: f64, dash_length: f64, gap_length: f64) -> Vec<(f64, f64)> {
    if !arc_length.is_finite() || arc_length <= 0.0 {
        return Vec::new();
    }
    if !dash_length.is_finite() || dash_length < MIN_DASH_LENGTH {
        return Vec::new();
    }
    let gap = if gap_length.is_finite() { gap_length.max(0.0) } else { 0.0 };
    let cycle = dash_length + gap;

    let count = (arc_length / cycle).ceil() as usize;
    let mut dashes = Vec::with_capacity(count);
    let mut start = 0.0;
    while start < arc_length {
        let end = (start + dash_length).min(arc_length);
        if end - start >= MIN_DASH_LENGTH {
            dashes.push((start, end));
        }
        start += cycle;
    }
    dashes
}

/// Consecutive pieces covering the whole arc length
pub fn solid_intervals(arc_length: f64, piece_length: f64) -> Vec<(f64, f64)> {
    dash_intervals(arc_length, piece_length, 0.0)
}

/// Emit every marking quad for one road path.
///
/// `arc_length` is the physical length the dash pattern is walked over.
/// Returns `None` when nothing was emitted.
pub fn build_markings<P: FramePath + ?Sized>(
    buffer: &mut GeometryBuffer,
    path: &P,
    arc_length: f64,
    lane_count: u32,
    road: &RoadConfig,
    config: &MarkingConfig,
) -> Result<Option<SubMeshRange>> {
    let lines = marking_lines(lane_count, road, config);
    build_marking_lines(buffer, path, arc_length, &lines, config)
}

/// Emit the quads of the given `lines` only; see [`build_markings`]
pub fn build_marking_lines<P: FramePath + ?Sized>(
    buffer: &mut GeometryBuffer,
    path: &P,
    arc_length: f64,
    lines: &[MarkingLine],
    config: &MarkingConfig,
) -> Result<Option<SubMeshRange>> {
    let dashed = dash_intervals(arc_length, config.dash_length, config.gap_length);
    let solid = solid_intervals(arc_length, config.solid_piece_length);

    let quad_count: usize = lines
        .iter()
        .map(|line| match line.style {
            LineStyle::Dashed => dashed.len(),
            LineStyle::Solid => solid.len(),
        })
        .sum();
    if quad_count == 0 {
        return Ok(None);
    }
    buffer.reserve(quad_count * 4, quad_count * 6)?;

    let table = ArcLengthTable::build(path, ARC_LENGTH_SAMPLES);
    buffer.set_material(MaterialId::LaneMarking);
    let start = buffer.index_count() as u32;

    for line in lines {
        let (intervals, color) = match line.style {
            LineStyle::Dashed => (&dashed, config.dashed_color),
            LineStyle::Solid => (&solid, config.edge_color),
        };
        for &(from, to) in intervals {
            let t0 = table.t_at_fraction(from / arc_length);
            let t1 = table.t_at_fraction(to / arc_length);
            add_marking_quad(buffer, path, line.lateral, t0, t1, config, color);
        }
    }

    Ok(Some(buffer.range_since(start)))
}

fn add_marking_quad<P: FramePath + ?Sized>(
    buffer: &mut GeometryBuffer,
    path: &P,
    lateral: f64,
    t0: f64,
    t1: f64,
    config: &MarkingConfig,
    color: [f32; 4],
) {
    let half = config.line_width * 0.5;
    let near = path.frame_at(t0);
    let far = path.frame_at(t1);

    let base = buffer.vertex_count() as u32;
    buffer.add_vertex(near.offset(lateral - half, config.lift), near.up, [0.0, 0.0], color);
    buffer.add_vertex(near.offset(lateral + half, config.lift), near.up, [1.0, 0.0], color);
    buffer.add_vertex(far.offset(lateral + half, config.lift), far.up, [1.0, 1.0], color);
    buffer.add_vertex(far.offset(lateral - half, config.lift), far.up, [0.0, 1.0], color);
    buffer.add_quad_facing([base, base + 1, base + 2, base + 3], near.up + far.up);
}

// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Overpass deck slab and support pillars
//!
//! The road and barriers of an overpass are the regular builders run along an
//! [`ElevatedPath`]. This module adds the slab under the deck and the pillars
//! that carry it.

use crate::auxiliary::{AuxiliaryDescriptor, AuxiliaryRecord};
use crate::buffer::{GeometryBuffer, SubMeshRange};
use crate::config::OverpassConfig;
use crate::curve::{Frame, HermiteCurve};
use crate::error::Result;
use crate::extrusion::{extrude, UvMapping};
use crate::material::MaterialId;
use crate::path::{overpass_elevation, ArcLengthTable, ElevatedPath, FramePath, ARC_LENGTH_SAMPLES};
use crate::profile::deck_slab;
use crate::segment::SegmentId;
use crate::shapes::add_box;
use nalgebra::{Point3, Vector3};

/// Where a pillar stands
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PillarPlacement {
    /// Curve parameter of the placement
    pub t: f64,
    /// Ground point on the unelevated curve
    pub base: Point3<f64>,
    pub forward: Vector3<f64>,
    /// Deck elevation h(t) at the placement
    pub elevation: f64,
}

impl PillarPlacement {
    /// Height from the ground to the underside of the deck slab
    #[inline]
    pub fn visible_height(&self, config: &OverpassConfig) -> f64 {
        self.elevation - config.deck_thickness
    }
}

/// Slab hanging under the elevated surface, `half_width` to each side
pub fn build_deck(
    buffer: &mut GeometryBuffer,
    deck: &ElevatedPath<'_, HermiteCurve>,
    half_width: f64,
    length_segments: u32,
    config: &OverpassConfig,
) -> Result<SubMeshRange> {
    let profile = deck_slab(MaterialId::Overpass, half_width, config.deck_thickness, config.deck_color);
    extrude(buffer, deck, &profile, length_segments, UvMapping::default())
}

/// Walk the base curve at fixed world-space spacing, skipping both ends
pub fn pillar_placements(curve: &HermiteCurve, amplitude: f64, config: &OverpassConfig) -> Vec<PillarPlacement> {
    if !(config.pillar_spacing > 0.0) {
        return Vec::new();
    }
    let table = ArcLengthTable::build(curve, ARC_LENGTH_SAMPLES);
    let length = table.total();

    // Nothing within half a spacing of the far abutment
    let last = length - config.pillar_spacing * 0.5;
    let mut placements = Vec::new();
    let mut distance = config.pillar_spacing;
    while distance <= last {
        let t = table.t_at_distance(distance);
        let frame = curve.frame_at(t);
        placements.push(PillarPlacement {
            t,
            base: frame.position,
            forward: frame.forward,
            elevation: overpass_elevation(amplitude, t),
        });
        distance += config.pillar_spacing;
    }
    placements
}

/// Emit one box per placement tall enough to be visible under the slab
pub fn build_pillars(
    buffer: &mut GeometryBuffer,
    owner: SegmentId,
    placements: &[PillarPlacement],
    config: &OverpassConfig,
) -> Result<Vec<AuxiliaryRecord>> {
    buffer.set_material(MaterialId::Overpass);
    let mut records = Vec::with_capacity(placements.len());

    for placement in placements {
        let visible = placement.visible_height(config);
        if visible < config.min_pillar_height {
            continue;
        }
        let basis = Frame::upright(placement.base, placement.forward);
        let half = config.pillar_half_width;
        add_box(
            buffer,
            &basis,
            basis.offset(0.0, visible * 0.5),
            Vector3::new(half, visible * 0.5, half),
            config.pillar_color,
        )?;
        records.push(AuxiliaryRecord::new(
            owner,
            AuxiliaryDescriptor::SupportPillar {
                base: placement.base,
                height: visible,
            },
        ));
    }

    Ok(records)
}

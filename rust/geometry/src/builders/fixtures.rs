// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Hazards and street lights
//!
//! Cones, tire stacks and debris are placed from the descriptor's fixture
//! list and share the `Hazard` material. Light poles are spaced along the arc
//! length of open-air segments, alternating sides.

use crate::auxiliary::{AuxiliaryDescriptor, AuxiliaryRecord};
use crate::buffer::{GeometryBuffer, SubMeshRange};
use crate::config::FixtureConfig;
use crate::curve::Frame;
use crate::error::Result;
use crate::extrusion::{extrude, UvMapping};
use crate::material::MaterialId;
use crate::path::{ArcLengthTable, CirclePath, FramePath, ARC_LENGTH_SAMPLES};
use crate::profile::{ring, Side};
use crate::segment::{FixtureKind, FixturePlacement, SegmentId};
use crate::shapes::{add_box, add_cone};
use nalgebra::{Point3, Rotation3, Vector2, Vector3};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use std::f64::consts::TAU;

/// Thickness of the cone base plate
const CONE_PLATE_THICKNESS: f64 = 0.03;

/// Traffic cone: square base plate plus the cone itself
pub fn build_cone(buffer: &mut GeometryBuffer, basis: &Frame, config: &FixtureConfig) -> Result<()> {
    let half = config.cone_base_size * 0.5;
    let plate = CONE_PLATE_THICKNESS * 0.5;
    add_box(
        buffer,
        basis,
        basis.offset(0.0, plate),
        Vector3::new(half, plate, half),
        config.cone_color,
    )?;
    add_cone(
        buffer,
        basis,
        basis.offset(0.0, CONE_PLATE_THICKNESS),
        config.cone_radius,
        config.cone_height,
        config.cone_segments,
        config.cone_color,
    )
}

/// Stacked tires, each a ring swept around the basis up axis
pub fn build_tire_stack(buffer: &mut GeometryBuffer, basis: &Frame, config: &FixtureConfig) -> Result<()> {
    let tube = config.tire_tube_radius.max(0.0);
    let profile = ring(
        MaterialId::Hazard,
        Vector2::zeros(),
        tube,
        config.tire_ring_segments,
        config.tire_color,
    );

    for level in 0..config.tire_stack_height {
        let center = basis.offset(0.0, tube + level as f64 * 2.0 * tube);
        let sweep = CirclePath::new(center, basis.up, config.tire_radius);
        extrude(buffer, &sweep, &profile, config.tire_sweep_segments, UvMapping::default())?;
    }
    Ok(())
}

/// Number of debris pieces at a difficulty in [0, 1]
#[inline]
pub fn debris_piece_count(difficulty: f32, config: &FixtureConfig) -> u32 {
    let difficulty = if difficulty.is_finite() {
        difficulty.clamp(0.0, 1.0)
    } else {
        0.0
    };
    (config.debris_pieces as f32 * (1.0 + difficulty)).round() as u32
}

/// Jittered boxes; identical for identical seeds
pub fn build_debris(
    buffer: &mut GeometryBuffer,
    basis: &Frame,
    seed: u64,
    difficulty: f32,
    config: &FixtureConfig,
) -> Result<()> {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    let spread = config.debris_spread.abs().max(1e-3);

    for _ in 0..debris_piece_count(difficulty, config) {
        let lateral = rng.gen_range(-spread..spread);
        let along = rng.gen_range(-spread..spread);
        let size = config.debris_size * rng.gen_range(0.4..1.0);
        let flatness = rng.gen_range(0.2..0.5);
        let yaw = rng.gen_range(0.0..TAU);

        let heading = Rotation3::from_axis_angle(&Vector3::y_axis(), yaw) * basis.forward;
        let position = basis.position + basis.right * lateral + basis.forward * along;
        let piece = Frame::upright(position, heading);
        let half_height = size * flatness * 0.5;
        add_box(
            buffer,
            &piece,
            piece.offset(0.0, half_height),
            Vector3::new(size * 0.5, half_height, size * 0.35),
            config.debris_color,
        )?;
    }
    Ok(())
}

/// Emit every fixture placement along `path`.
///
/// Placement distances are clamped to `[0, arc_length]` and mapped to curve
/// parameters by arc length.
pub fn build_fixtures<P: FramePath + ?Sized>(
    buffer: &mut GeometryBuffer,
    path: &P,
    arc_length: f64,
    fixtures: &[FixturePlacement],
    difficulty: f32,
    config: &FixtureConfig,
) -> Result<Option<SubMeshRange>> {
    if fixtures.is_empty() {
        return Ok(None);
    }

    let table = ArcLengthTable::build(path, ARC_LENGTH_SAMPLES);
    buffer.set_material(MaterialId::Hazard);
    let start = buffer.index_count() as u32;

    for placement in fixtures {
        let fraction = if arc_length > 0.0 && placement.distance.is_finite() {
            (placement.distance / arc_length).clamp(0.0, 1.0)
        } else {
            0.0
        };
        let frame = path.frame_at(table.t_at_fraction(fraction));
        let lateral = if placement.lateral.is_finite() { placement.lateral } else { 0.0 };
        let basis = Frame::upright(frame.offset(lateral, 0.0), frame.forward);

        match placement.kind {
            FixtureKind::Cone => build_cone(buffer, &basis, config)?,
            FixtureKind::TireStack => build_tire_stack(buffer, &basis, config)?,
            FixtureKind::Debris => build_debris(buffer, &basis, placement.seed, difficulty, config)?,
        }
    }

    Ok(Some(buffer.range_since(start)))
}

/// Foot of a light pole
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LightPoleSite {
    /// Upright frame at the pole foot
    pub basis: Frame,
    pub side: Side,
}

/// Sites every `light_spacing` metres, half a spacing in from the segment
/// start, alternating right and left, `reach` metres from the centerline
pub fn light_pole_sites<P: FramePath + ?Sized>(path: &P, reach: f64, config: &FixtureConfig) -> Vec<LightPoleSite> {
    if !(config.light_spacing > 0.0) {
        return Vec::new();
    }
    let table = ArcLengthTable::build(path, ARC_LENGTH_SAMPLES);
    let length = table.total();

    let mut sites = Vec::new();
    let mut side = Side::Right;
    let mut distance = config.light_spacing * 0.5;
    while distance < length {
        let frame = path.frame_at(table.t_at_distance(distance));
        let foot = frame.offset(side.sign() * (reach + config.light_setback), 0.0);
        sites.push(LightPoleSite {
            basis: Frame::upright(foot, frame.forward),
            side,
        });
        side = side.opposite();
        distance += config.light_spacing;
    }
    sites
}

/// Lamp head center of a pole: under the arm tip, over the road
pub fn emitter_position(site: &LightPoleSite, config: &FixtureConfig) -> Point3<f64> {
    let inward = -site.side.sign();
    site.basis.offset(
        inward * config.arm_length,
        config.pole_height - config.pole_width - config.emitter_size * 0.25,
    )
}

/// Pole and arm in `LightStructure`, then every lamp head in `LightEmitter`
pub fn build_light_poles(
    buffer: &mut GeometryBuffer,
    owner: SegmentId,
    sites: &[LightPoleSite],
    config: &FixtureConfig,
) -> Result<Vec<AuxiliaryRecord>> {
    if sites.is_empty() {
        return Ok(Vec::new());
    }

    let w = config.pole_width * 0.5;
    buffer.set_material(MaterialId::LightStructure);
    for site in sites {
        let basis = &site.basis;
        add_box(
            buffer,
            basis,
            basis.offset(0.0, config.pole_height * 0.5),
            Vector3::new(w, config.pole_height * 0.5, w),
            config.pole_color,
        )?;
        let inward = -site.side.sign();
        add_box(
            buffer,
            basis,
            basis.offset(inward * config.arm_length * 0.5, config.pole_height - w),
            Vector3::new(config.arm_length * 0.5, w, w),
            config.pole_color,
        )?;
    }

    buffer.set_material(MaterialId::LightEmitter);
    let e = config.emitter_size * 0.5;
    let mut records = Vec::with_capacity(sites.len());
    for site in sites {
        let emitter = emitter_position(site, config);
        add_box(
            buffer,
            &site.basis,
            emitter,
            Vector3::new(e, e * 0.5, e),
            config.emitter_color,
        )?;
        records.push(AuxiliaryRecord::new(
            owner,
            AuxiliaryDescriptor::LightPole {
                base: site.basis.position,
                emitter,
            },
        ));
    }

    Ok(records)
}

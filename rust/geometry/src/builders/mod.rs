// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Segment builders
//!
//! [`build_structure`] dispatches on the segment kind and runs every builder
//! that belongs to the structure pass: road surface, barriers, tunnel shell,
//! overpass deck and pillars, fork branches, light poles and fixtures.
//! [`build_markings`] is the second pass and only appends lane markings.
//!
//! Both are pure functions of (curve, descriptor, tier, config) writing into
//! the segment's buffer. Degenerate profiles skip the affected ribbon with a
//! warning; capacity errors propagate.

pub mod barrier;
pub mod fixtures;
pub mod markings;
pub mod overpass;
pub mod road;
pub mod tunnel;
pub mod vehicle;

use crate::auxiliary::AuxiliaryRecord;
use crate::buffer::{GeometryBuffer, SubMeshRange};
use crate::config::GeometryConfig;
use crate::curve::HermiteCurve;
use crate::error::Result;
use crate::extrusion::ribbon_counts;
use crate::fork::ForkGeometry;
use crate::lod::{LodTier, Tessellation};
use crate::path::{ArcLengthTable, ElevatedPath, FramePath, SubPath, ARC_LENGTH_SAMPLES};
use crate::profile::Side;
use crate::segment::{FixtureKind, SegmentDescriptor, SegmentId, SegmentKind};
use crate::shapes::{cone_counts, BOX_COUNTS};

/// Everything the structure pass produced besides buffer contents
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StructureOutput {
    /// Ranges touched by the pass, in buffer order
    pub ranges: Vec<SubMeshRange>,
    /// Entities for the runtime to instantiate
    pub auxiliary: Vec<AuxiliaryRecord>,
}

/// Turn a degenerate-input error into a skipped part
fn recover<T>(result: Result<T>, owner: SegmentId, part: &str) -> Result<Option<T>> {
    match result {
        Ok(value) => Ok(Some(value)),
        Err(e) if e.is_degenerate_input() => {
            tracing::warn!(segment = %owner, part, error = %e, "skipping degenerate geometry");
            Ok(None)
        }
        Err(e) => Err(e),
    }
}

/// Ranges of `buffer` that cover indices from `start` on
fn ranges_since(buffer: &GeometryBuffer, start: u32) -> Vec<SubMeshRange> {
    buffer
        .sub_meshes()
        .iter()
        .filter(|r| r.end() > start)
        .copied()
        .collect()
}

/// Structure pass for one segment
pub fn build_structure(
    buffer: &mut GeometryBuffer,
    curve: &HermiteCurve,
    descriptor: &SegmentDescriptor,
    lod: LodTier,
    config: &GeometryConfig,
) -> Result<StructureOutput> {
    let owner = descriptor.id;
    let tess = lod.tessellation();
    let lanes = descriptor.lanes();
    let half_width = config.road.half_width(lanes);
    let start = buffer.index_count() as u32;
    let mut auxiliary = Vec::new();

    match descriptor.kind {
        SegmentKind::Straight | SegmentKind::Curve => {
            open_road(buffer, curve, descriptor, tess, config)?;
            auxiliary.extend(street_lights(buffer, curve, descriptor, config)?);
        }
        SegmentKind::Tunnel(params) => {
            open_road(buffer, curve, descriptor, tess, config)?;
            recover(
                tunnel::build_tunnel_shell(
                    buffer,
                    curve,
                    &params,
                    half_width * 2.0,
                    tess.length_segments,
                    tess.radial_segments,
                    &config.tunnel,
                ),
                owner,
                "tunnel shell",
            )?;
            auxiliary.extend(tunnel::tunnel_lamps(owner, curve, &params, half_width * 2.0, &config.tunnel));
        }
        SegmentKind::Overpass(params) => {
            let deck = ElevatedPath::new(curve, params.amplitude);
            open_road(buffer, &deck, descriptor, tess, config)?;
            recover(
                overpass::build_deck(
                    buffer,
                    &deck,
                    config.barrier.outer_offset(half_width),
                    tess.length_segments,
                    &config.overpass,
                ),
                owner,
                "overpass deck",
            )?;
            let placements = overpass::pillar_placements(curve, params.amplitude, &config.overpass);
            auxiliary.extend(overpass::build_pillars(buffer, owner, &placements, &config.overpass)?);
            auxiliary.extend(street_lights(buffer, &deck, descriptor, config)?);
        }
        SegmentKind::Fork(params) => {
            let fork = ForkGeometry::new(curve, &params, half_width * 2.0);
            build_fork(buffer, &fork, descriptor, tess, config)?;
        }
    }

    let placed = match descriptor.kind {
        SegmentKind::Overpass(params) => fixtures::build_fixtures(
            buffer,
            &ElevatedPath::new(curve, params.amplitude),
            descriptor.length(),
            &descriptor.fixtures,
            descriptor.difficulty,
            &config.fixtures,
        ),
        _ => fixtures::build_fixtures(
            buffer,
            curve,
            descriptor.length(),
            &descriptor.fixtures,
            descriptor.difficulty,
            &config.fixtures,
        ),
    };
    recover(placed, owner, "fixtures")?;

    let output = StructureOutput {
        ranges: ranges_since(buffer, start),
        auxiliary,
    };
    tracing::debug!(
        segment = %owner,
        kind = descriptor.kind.name(),
        ?lod,
        vertices = buffer.vertex_count(),
        indices = buffer.index_count(),
        ranges = output.ranges.len(),
        auxiliary = output.auxiliary.len(),
        "built structure"
    );
    Ok(output)
}

/// Road surface plus both barriers along `path`
fn open_road<P: FramePath + ?Sized>(
    buffer: &mut GeometryBuffer,
    path: &P,
    descriptor: &SegmentDescriptor,
    tess: Tessellation,
    config: &GeometryConfig,
) -> Result<()> {
    let lanes = descriptor.lanes();
    road::build_road(
        buffer,
        path,
        lanes,
        tess.length_segments,
        tess.width_segments,
        &config.road,
    )?;
    recover(
        barrier::build_barriers(
            buffer,
            path,
            config.road.half_width(lanes),
            tess.length_segments,
            &config.barrier,
        ),
        descriptor.id,
        "barriers",
    )?;
    Ok(())
}

fn street_lights<P: FramePath + ?Sized>(
    buffer: &mut GeometryBuffer,
    path: &P,
    descriptor: &SegmentDescriptor,
    config: &GeometryConfig,
) -> Result<Vec<AuxiliaryRecord>> {
    if !descriptor.kind.is_lit_by_poles() {
        return Ok(Vec::new());
    }
    let reach = config.barrier.outer_offset(config.road.half_width(descriptor.lanes()));
    let sites = fixtures::light_pole_sites(path, reach, &config.fixtures);
    fixtures::build_light_poles(buffer, descriptor.id, &sites, &config.fixtures)
}

/// Both branch roads, then barriers: outer rails over the full branch, inner
/// rails only from the commit parameter on. Everything follows the branch
/// surfaces, so the right branch sits under the left in the merge zone.
fn build_fork(
    buffer: &mut GeometryBuffer,
    fork: &ForkGeometry,
    descriptor: &SegmentDescriptor,
    tess: Tessellation,
    config: &GeometryConfig,
) -> Result<()> {
    let lanes = descriptor.lanes();
    let half_width = config.road.half_width(lanes);

    for side in Side::BOTH {
        road::build_road(
            buffer,
            &fork.surface(side),
            lanes,
            tess.length_segments,
            tess.width_segments,
            &config.road,
        )?;
    }

    for side in Side::BOTH {
        recover(
            barrier::build_barrier(
                buffer,
                &fork.surface(side),
                side,
                half_width,
                tess.length_segments,
                &config.barrier,
            ),
            descriptor.id,
            "fork outer barrier",
        )?;
    }

    if fork.separates() {
        let segments = inner_barrier_segments(fork.commit_t, tess.length_segments);
        for side in Side::BOTH {
            let surface = fork.surface(side);
            let tail = SubPath::new(&surface, fork.commit_t, 1.0);
            recover(
                barrier::build_barrier(
                    buffer,
                    &tail,
                    side.opposite(),
                    half_width,
                    segments,
                    &config.barrier,
                ),
                descriptor.id,
                "fork inner barrier",
            )?;
        }
    }
    Ok(())
}

/// Branch markings. The left branch is marked in full. Inside the merge zone
/// the right branch only draws its outer edge, since its other lines would
/// duplicate or cross the left branch's; the rest starts at the commit point.
fn build_fork_markings(
    buffer: &mut GeometryBuffer,
    fork: &ForkGeometry,
    length: f64,
    lanes: u32,
    config: &GeometryConfig,
) -> Result<()> {
    let left = fork.surface(Side::Left);
    markings::build_markings(buffer, &left, length, lanes, &config.road, &config.markings)?;

    let right = fork.surface(Side::Right);
    let lines = markings::marking_lines(lanes, &config.road, &config.markings);
    let commit = fork.commit_t.clamp(0.0, 1.0);
    let table = ArcLengthTable::build(&right, ARC_LENGTH_SAMPLES);
    let merge_length = if table.total() > 0.0 {
        length * table.distance_at(commit) / table.total()
    } else {
        0.0
    };

    if commit > 0.0 {
        let head = SubPath::new(&right, 0.0, commit);
        let outer = &lines[lines.len() - 1..];
        markings::build_marking_lines(buffer, &head, merge_length, outer, &config.markings)?;
    }
    if commit < 1.0 {
        let tail = SubPath::new(&right, commit, 1.0);
        markings::build_marking_lines(buffer, &tail, length - merge_length, &lines, &config.markings)?;
    }
    Ok(())
}

#[inline]
fn inner_barrier_segments(commit_t: f64, length_segments: u32) -> u32 {
    ((length_segments as f64 * (1.0 - commit_t)).ceil() as u32).max(1)
}

/// Markings pass for one segment; appends after the structure
pub fn build_markings(
    buffer: &mut GeometryBuffer,
    curve: &HermiteCurve,
    descriptor: &SegmentDescriptor,
    config: &GeometryConfig,
) -> Result<Vec<SubMeshRange>> {
    let start = buffer.index_count() as u32;
    let lanes = descriptor.lanes();
    let length = descriptor.length();

    match descriptor.kind {
        SegmentKind::Straight | SegmentKind::Curve | SegmentKind::Tunnel(_) => {
            markings::build_markings(buffer, curve, length, lanes, &config.road, &config.markings)?;
        }
        SegmentKind::Overpass(params) => {
            let deck = ElevatedPath::new(curve, params.amplitude);
            markings::build_markings(buffer, &deck, length, lanes, &config.road, &config.markings)?;
        }
        SegmentKind::Fork(params) => {
            let fork = ForkGeometry::new(curve, &params, config.road.total_width(lanes));
            build_fork_markings(buffer, &fork, length, lanes, config)?;
        }
    }

    let ranges = ranges_since(buffer, start);
    tracing::debug!(
        segment = %descriptor.id,
        kind = descriptor.kind.name(),
        indices = buffer.index_count() - start as usize,
        "built markings"
    );
    Ok(ranges)
}

/// Expected (vertices, indices) of the structure pass, used to size the
/// segment buffer once up front
pub fn estimate_structure_capacity(
    descriptor: &SegmentDescriptor,
    lod: LodTier,
    config: &GeometryConfig,
) -> (usize, usize) {
    let tess = lod.tessellation();
    let n = tess.length_segments;
    let road = ribbon_counts(tess.width_segments as usize + 1, false, n);
    let rail = ribbon_counts(4, false, n);
    let add = |acc: (usize, usize), part: (usize, usize), times: usize| {
        (acc.0 + part.0 * times, acc.1 + part.1 * times)
    };

    let mut total = add(road, rail, 2);
    let length = descriptor.length();
    let poles = |spacing: f64| -> usize {
        if spacing > 0.0 {
            (length / spacing).ceil() as usize
        } else {
            0
        }
    };

    match descriptor.kind {
        SegmentKind::Straight | SegmentKind::Curve => {}
        SegmentKind::Tunnel(_) => {
            total = add(total, ribbon_counts(2, false, n), 2);
            total = add(total, ribbon_counts(tess.radial_segments as usize + 1, false, n), 1);
        }
        SegmentKind::Overpass(_) => {
            total = add(total, ribbon_counts(4, false, n), 1);
            total = add(total, BOX_COUNTS, poles(config.overpass.pillar_spacing));
        }
        SegmentKind::Fork(_) => {
            // Second road, second pair of outer rails, bounded inner rails
            total = add(total, road, 1);
            total = add(total, rail, 2);
        }
    }

    if descriptor.kind.is_lit_by_poles() {
        total = add(total, BOX_COUNTS, 3 * poles(config.fixtures.light_spacing));
    }

    let fx = &config.fixtures;
    for placement in &descriptor.fixtures {
        let part = match placement.kind {
            FixtureKind::Cone => {
                let cone = cone_counts(fx.cone_segments);
                (BOX_COUNTS.0 + cone.0, BOX_COUNTS.1 + cone.1)
            }
            FixtureKind::TireStack => {
                let ring = ribbon_counts(fx.tire_ring_segments.max(3) as usize, true, fx.tire_sweep_segments);
                (ring.0 * fx.tire_stack_height as usize, ring.1 * fx.tire_stack_height as usize)
            }
            FixtureKind::Debris => {
                let pieces = fixtures::debris_piece_count(descriptor.difficulty, fx) as usize;
                (BOX_COUNTS.0 * pieces, BOX_COUNTS.1 * pieces)
            }
        };
        total = add(total, part, 1);
    }

    total
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use crate::segment::{FixturePlacement, ForkParams, OverpassParams, TunnelParams};
    use nalgebra::Point3;

    fn straight() -> HermiteCurve {
        HermiteCurve::straight(Point3::origin(), Point3::new(0.0, 0.0, 200.0))
    }

    fn kinds() -> Vec<SegmentKind> {
        vec![
            SegmentKind::Straight,
            SegmentKind::Curve,
            SegmentKind::Tunnel(TunnelParams {
                height: 6.0,
                width: 20.0,
            }),
            SegmentKind::Overpass(OverpassParams { amplitude: 8.0 }),
            SegmentKind::Fork(ForkParams { angle: 0.4 }),
        ]
    }

    #[test]
    fn test_recover_only_swallows_degenerate_input() {
        let owner = SegmentId(1);
        let skipped: Result<Option<()>> = recover(Err(Error::InvalidProfile("x".into())), owner, "test");
        assert_eq!(skipped, Ok(None));
        let fatal: Result<Option<()>> = recover(
            Err(Error::CapacityExhausted {
                vertices: 1,
                indices: 1,
            }),
            owner,
            "test",
        );
        assert!(fatal.is_err());
    }

    #[test]
    fn test_estimate_covers_structure() {
        let config = GeometryConfig::default();
        for kind in kinds() {
            for lod in LodTier::ALL {
                let descriptor = SegmentDescriptor::new(SegmentId(7), kind, 200.0, 3)
                    .with_difficulty(0.5)
                    .with_fixture(FixturePlacement::new(FixtureKind::Cone, 20.0, 1.0))
                    .with_fixture(FixturePlacement::new(FixtureKind::TireStack, 40.0, -6.0))
                    .with_fixture(FixturePlacement::new(FixtureKind::Debris, 60.0, 0.0).with_seed(3));
                let (vertices, indices) = estimate_structure_capacity(&descriptor, lod, &config);

                let mut buffer = GeometryBuffer::new();
                build_structure(&mut buffer, &straight(), &descriptor, lod, &config).unwrap();
                assert!(
                    buffer.vertex_count() <= vertices && buffer.index_count() <= indices,
                    "{} at {:?}: built {}/{}, estimated {}/{}",
                    kind.name(),
                    lod,
                    buffer.vertex_count(),
                    buffer.index_count(),
                    vertices,
                    indices
                );
            }
        }
    }

    #[test]
    fn test_inner_barrier_segments() {
        assert_eq!(inner_barrier_segments(0.5, 40), 20);
        assert_eq!(inner_barrier_segments(0.99, 10), 1);
        assert_eq!(inner_barrier_segments(1.0, 10), 1);
    }
}

// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Cross-section extrusion - sweeping a profile along a frame path
//!
//! Every ribbon-like surface (road, barriers, tunnel walls and vault, deck
//! slabs, tire tori) is one call into [`extrude`] with a different profile.

use crate::buffer::{GeometryBuffer, SubMeshRange};
use crate::error::{Error, Result};
use crate::path::{ArcLengthTable, FramePath};
use crate::profile::CrossSection;
use nalgebra::Vector2;

/// How the texture v coordinate follows the sweep
#[derive(Debug, Clone, Copy)]
pub enum UvMapping<'a> {
    /// v = t · scale
    Parameter { scale: f64 },
    /// v = distance travelled / tile length, correct under varying curvature
    ArcLength {
        table: &'a ArcLengthTable,
        tile_length: f64,
    },
}

impl UvMapping<'_> {
    #[inline]
    fn v_at(&self, t: f64) -> f32 {
        match *self {
            UvMapping::Parameter { scale } => (t * scale) as f32,
            UvMapping::ArcLength { table, tile_length } => {
                if tile_length > 0.0 {
                    (table.distance_at(t) / tile_length) as f32
                } else {
                    0.0
                }
            }
        }
    }
}

impl Default for UvMapping<'_> {
    fn default() -> Self {
        UvMapping::Parameter { scale: 1.0 }
    }
}

/// Vertex and index counts of a ribbon
#[inline]
pub fn ribbon_counts(profile_len: usize, closed: bool, segment_count: u32) -> (usize, usize) {
    let segments = segment_count.max(1) as usize;
    let edges = match (closed, profile_len) {
        (_, 0) | (_, 1) => 0,
        (true, n) => n,
        (false, n) => n - 1,
    };
    ((segments + 1) * profile_len, segments * edges * 6)
}

/// Sweep `profile` along `path` with `segment_count` steps.
///
/// Emits `(segment_count + 1) × points` vertices and `segment_count × edges × 6`
/// indices tagged with the profile material. A segment count of zero is
/// treated as one. Each strip between profile points `i` and `i + 1` is
/// wound so its geometric normal agrees with the averaged normal hints.
pub fn extrude<P: FramePath + ?Sized>(
    buffer: &mut GeometryBuffer,
    path: &P,
    profile: &CrossSection,
    segment_count: u32,
    uv: UvMapping<'_>,
) -> Result<SubMeshRange> {
    if profile.len() < 2 {
        return Err(Error::InvalidProfile(format!(
            "ribbon needs at least 2 profile points, got {}",
            profile.len()
        )));
    }

    let segments = segment_count.max(1);
    let (vertex_count, index_count) = ribbon_counts(profile.len(), profile.closed, segments);
    buffer.reserve(vertex_count, index_count)?;
    buffer.set_material(profile.material);

    let start = buffer.index_count() as u32;
    let base = buffer.vertex_count() as u32;

    // Cross-sections
    for z in 0..=segments {
        let t = z as f64 / segments as f64;
        let frame = path.frame_at(t);
        let v = uv.v_at(t);

        for point in &profile.points {
            let position = frame.offset(point.lateral, point.vertical);
            let normal = frame
                .direction(point.normal.x, point.normal.y)
                .try_normalize(1e-12)
                .unwrap_or(frame.up);
            buffer.add_vertex(position, normal, [point.u, v], point.color);
        }
    }

    // Winding per strip. With b - a along forward and c - a along the profile
    // edge e, (b - a) × (c - a) maps to (-e.vertical, e.lateral) in the
    // profile plane because up = forward × right.
    let n = profile.len();
    let strips: Vec<(u32, u32, bool)> = (0..profile.edge_count())
        .map(|i| {
            let j = (i + 1) % n;
            let p = &profile.points[i];
            let q = &profile.points[j];
            let geometric = Vector2::new(-(q.vertical - p.vertical), q.lateral - p.lateral);
            let hint = p.normal + q.normal;
            (i as u32, j as u32, geometric.dot(&hint) < 0.0)
        })
        .collect();

    let stride = n as u32;
    for z in 0..segments {
        let row = base + z * stride;
        let next = row + stride;
        for &(i, j, flip) in &strips {
            let a = row + i;
            let c = row + j;
            let b = next + i;
            let d = next + j;
            if flip {
                buffer.add_triangle(a, c, b);
                buffer.add_triangle(c, d, b);
            } else {
                buffer.add_triangle(a, b, c);
                buffer.add_triangle(c, b, d);
            }
        }
    }

    Ok(buffer.range_since(start))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::curve::HermiteCurve;
    use crate::material::MaterialId;
    use crate::path::CirclePath;
    use crate::profile::{barrier_rail, flat_strip, ring, ProfilePoint, Side};
    use nalgebra::{Point3, Vector3};

    const GREY: [f32; 4] = [0.3, 0.3, 0.3, 1.0];

    fn straight() -> HermiteCurve {
        HermiteCurve::straight(Point3::origin(), Point3::new(0.0, 0.0, 100.0))
    }

    /// Every triangle's geometric normal agrees with its vertex normals
    fn assert_winding_matches_normals(buffer: &GeometryBuffer) {
        for tri in buffer.indices().chunks_exact(3) {
            let [a, b, c] = [tri[0], tri[1], tri[2]].map(|i| buffer.vertices()[i as usize]);
            let geometric = (b.position_f64() - a.position_f64())
                .cross(&(c.position_f64() - a.position_f64()));
            if geometric.norm() < 1e-9 {
                continue;
            }
            let hint = a.normal_f64() + b.normal_f64() + c.normal_f64();
            assert!(
                geometric.dot(&hint) > 0.0,
                "triangle {:?} faces away from its normals",
                tri
            );
        }
    }

    #[test]
    fn test_open_profile_counts() {
        let mut buffer = GeometryBuffer::new();
        let profile = flat_strip(MaterialId::RoadSurface, -5.0, 5.0, 4, 0.0, GREY);
        let range = extrude(&mut buffer, &straight(), &profile, 10, UvMapping::default()).unwrap();

        assert_eq!(buffer.vertex_count(), 11 * 5);
        assert_eq!(buffer.index_count(), 10 * 4 * 6);
        assert_eq!(range.start, 0);
        assert_eq!(range.count as usize, buffer.index_count());
        assert_eq!(range.material, MaterialId::RoadSurface);
        assert_eq!(ribbon_counts(5, false, 10), (55, 240));
    }

    #[test]
    fn test_closed_profile_counts() {
        let mut buffer = GeometryBuffer::new();
        let profile = ring(MaterialId::Hazard, Vector2::zeros(), 0.1, 8, GREY);
        let circle = CirclePath::new(Point3::origin(), Vector3::y(), 0.3);
        extrude(&mut buffer, &circle, &profile, 12, UvMapping::default()).unwrap();

        assert_eq!(buffer.vertex_count(), 13 * 8);
        assert_eq!(buffer.index_count(), 12 * 8 * 6);
        assert_winding_matches_normals(&buffer);
    }

    #[test]
    fn test_road_faces_up() {
        let mut buffer = GeometryBuffer::new();
        let profile = flat_strip(MaterialId::RoadSurface, -5.0, 5.0, 4, 0.0, GREY);
        extrude(&mut buffer, &straight(), &profile, 4, UvMapping::default()).unwrap();

        for tri in buffer.indices().chunks_exact(3) {
            let [a, b, c] = [tri[0], tri[1], tri[2]].map(|i| buffer.vertices()[i as usize]);
            let n = (b.position_f64() - a.position_f64()).cross(&(c.position_f64() - a.position_f64()));
            assert!(n.y > 0.0);
        }
    }

    #[test]
    fn test_barrier_faces_match_hints() {
        let mut buffer = GeometryBuffer::new();
        let curve = HermiteCurve::from_endpoints(
            Point3::origin(),
            Vector3::z(),
            Point3::new(40.0, 3.0, 90.0),
            Vector3::x(),
            0.9,
        );
        for side in Side::BOTH {
            let profile = barrier_rail(MaterialId::Barrier, side, 9.0, 0.3, 0.9, GREY);
            extrude(&mut buffer, &curve, &profile, 20, UvMapping::default()).unwrap();
        }
        assert_winding_matches_normals(&buffer);
        assert_eq!(buffer.sub_meshes().len(), 1);
        assert!(buffer.validate().is_ok());
    }

    #[test]
    fn test_zero_segments_clamps_to_one() {
        let mut buffer = GeometryBuffer::new();
        let profile = flat_strip(MaterialId::RoadSurface, -1.0, 1.0, 1, 0.0, GREY);
        extrude(&mut buffer, &straight(), &profile, 0, UvMapping::default()).unwrap();
        assert_eq!(buffer.vertex_count(), 4);
        assert_eq!(buffer.index_count(), 6);
    }

    #[test]
    fn test_single_point_profile_is_rejected() {
        let mut buffer = GeometryBuffer::new();
        let profile = CrossSection::open(
            MaterialId::Barrier,
            [ProfilePoint::new(0.0, 0.0, Vector2::y(), GREY, 0.0)],
        );
        let result = extrude(&mut buffer, &straight(), &profile, 4, UvMapping::default());
        assert!(matches!(result, Err(Error::InvalidProfile(_))));
        assert!(buffer.is_empty());
    }

    #[test]
    fn test_arc_length_uvs() {
        let curve = straight();
        let table = ArcLengthTable::build(&curve, 32);
        let mut buffer = GeometryBuffer::new();
        let profile = flat_strip(MaterialId::RoadSurface, -1.0, 1.0, 1, 0.0, GREY);
        extrude(
            &mut buffer,
            &curve,
            &profile,
            4,
            UvMapping::ArcLength {
                table: &table,
                tile_length: 10.0,
            },
        )
        .unwrap();

        // Last cross-section sits 100 m along: ten tiles
        let last = buffer.vertices()[buffer.vertex_count() - 1];
        assert!((last.uv[1] - 10.0).abs() < 1e-4);
    }

    #[test]
    fn test_consecutive_extrusions_reference_their_own_vertices() {
        let mut buffer = GeometryBuffer::new();
        let road = flat_strip(MaterialId::RoadSurface, -5.0, 5.0, 2, 0.0, GREY);
        let rail = barrier_rail(MaterialId::Barrier, Side::Left, 5.1, 0.3, 0.9, GREY);

        extrude(&mut buffer, &straight(), &road, 5, UvMapping::default()).unwrap();
        let first_vertices = buffer.vertex_count() as u32;
        let range = extrude(&mut buffer, &straight(), &rail, 5, UvMapping::default()).unwrap();

        let slice = &buffer.indices()[range.start as usize..range.end() as usize];
        assert!(slice.iter().all(|&i| i >= first_vertices));
        assert_eq!(buffer.sub_meshes().len(), 2);
        assert!(buffer.validate().is_ok());
    }
}

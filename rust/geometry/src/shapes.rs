// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Discrete shapes appended directly to a buffer
//!
//! Fixtures (cones, debris, light poles, pillars, vehicle parts) do not go
//! through the extruder. Shapes are placed in the basis of a [`Frame`] and
//! use the buffer's current material.

use crate::buffer::GeometryBuffer;
use crate::curve::Frame;
use crate::error::Result;
use nalgebra::{Point3, Vector3};
use std::f64::consts::TAU;

/// Vertex and index counts of [`add_box`]
pub const BOX_COUNTS: (usize, usize) = (24, 36);

/// Vertex and index counts of [`add_cone`]
#[inline]
pub fn cone_counts(segments: u32) -> (usize, usize) {
    let n = segments.max(3) as usize;
    // Side ring with a seam duplicate, one apex per segment, cap center + ring
    ((n + 1) + n + (1 + n), n * 3 * 2)
}

/// Axis-aligned box in the basis of `basis`.
///
/// `half_extents` are measured along (right, up, forward). Each face gets
/// its own four vertices so normals stay flat.
pub fn add_box(
    buffer: &mut GeometryBuffer,
    basis: &Frame,
    center: Point3<f64>,
    half_extents: Vector3<f64>,
    color: [f32; 4],
) -> Result<()> {
    buffer.reserve(BOX_COUNTS.0, BOX_COUNTS.1)?;

    let r = basis.right * half_extents.x;
    let u = basis.up * half_extents.y;
    let f = basis.forward * half_extents.z;

    // (normal, first tangent, second tangent) with tangent1 × tangent2 == normal
    let faces = [
        (r, u, f),
        (-r, f, u),
        (u, f, r),
        (-u, r, f),
        (f, r, u),
        (-f, u, r),
    ];

    for (normal, t1, t2) in faces {
        let n = normal.try_normalize(1e-12).unwrap_or(basis.up);
        let face_center = center + normal;
        let base = buffer.vertex_count() as u32;
        for (s1, s2, uv) in [
            (-1.0, -1.0, [0.0, 0.0]),
            (1.0, -1.0, [1.0, 0.0]),
            (1.0, 1.0, [1.0, 1.0]),
            (-1.0, 1.0, [0.0, 1.0]),
        ] {
            buffer.add_vertex(face_center + t1 * s1 + t2 * s2, n, uv, color);
        }
        buffer.add_triangle(base, base + 1, base + 2);
        buffer.add_triangle(base, base + 2, base + 3);
    }

    Ok(())
}

/// Cone standing on `base_center`, axis along the basis up vector, with a
/// bottom cap.
pub fn add_cone(
    buffer: &mut GeometryBuffer,
    basis: &Frame,
    base_center: Point3<f64>,
    radius: f64,
    height: f64,
    segments: u32,
    color: [f32; 4],
) -> Result<()> {
    let n = segments.max(3);
    let (vertex_count, index_count) = cone_counts(n);
    buffer.reserve(vertex_count, index_count)?;

    let up = basis.up;
    let apex = base_center + up * height;
    let radial = |k: u32| {
        let (sin, cos) = (TAU * k as f64 / n as f64).sin_cos();
        basis.right * cos + basis.forward * sin
    };
    // Slanted side normal: radial·h + up·r
    let side_normal = |dir: Vector3<f64>| {
        (dir * height + up * radius)
            .try_normalize(1e-12)
            .unwrap_or(up)
    };

    // Side
    let ring = buffer.vertex_count() as u32;
    for k in 0..=n {
        let dir = radial(k);
        buffer.add_vertex(
            base_center + dir * radius,
            side_normal(dir),
            [k as f32 / n as f32, 0.0],
            color,
        );
    }
    let apexes = buffer.vertex_count() as u32;
    for k in 0..n {
        let mid = radial(k) + radial(k + 1);
        buffer.add_vertex(
            apex,
            side_normal(mid.try_normalize(1e-12).unwrap_or(basis.right)),
            [(k as f32 + 0.5) / n as f32, 1.0],
            color,
        );
    }
    for k in 0..n {
        let outward = radial(k) + radial(k + 1) + up;
        buffer.add_triangle_facing(ring + k, ring + k + 1, apexes + k, outward);
    }

    // Bottom cap
    let center = buffer.add_vertex(base_center, -up, [0.5, 0.5], color);
    let cap = buffer.vertex_count() as u32;
    for k in 0..n {
        let dir = radial(k);
        buffer.add_vertex(
            base_center + dir * radius,
            -up,
            [0.5 + dir.dot(&basis.right) as f32 * 0.5, 0.5 + dir.dot(&basis.forward) as f32 * 0.5],
            color,
        );
    }
    for k in 0..n {
        buffer.add_triangle_facing(center, cap + k, cap + (k + 1) % n, -up);
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::material::MaterialId;
    use approx::assert_relative_eq;

    fn origin_frame() -> Frame {
        Frame::from_forward(Point3::origin(), Vector3::z())
    }

    fn assert_faces_outward(buffer: &GeometryBuffer, center: Point3<f64>) {
        for tri in buffer.indices().chunks_exact(3) {
            let [a, b, c] = [tri[0], tri[1], tri[2]].map(|i| buffer.vertices()[i as usize].position_f64());
            let normal = (b - a).cross(&(c - a));
            let centroid = Point3::from((a.coords + b.coords + c.coords) / 3.0);
            assert!(normal.dot(&(centroid - center)) > 0.0, "triangle {:?} faces inward", tri);
        }
    }

    #[test]
    fn test_box_counts_and_winding() {
        let mut buffer = GeometryBuffer::new();
        buffer.set_material(MaterialId::Overpass);
        let center = Point3::new(1.0, 2.0, 3.0);
        add_box(&mut buffer, &origin_frame(), center, Vector3::new(0.5, 1.0, 2.0), [1.0; 4]).unwrap();

        assert_eq!((buffer.vertex_count(), buffer.index_count()), BOX_COUNTS);
        assert_faces_outward(&buffer, center);

        let top = buffer
            .vertices()
            .iter()
            .map(|v| v.position[1])
            .fold(f32::MIN, f32::max);
        assert_relative_eq!(top, 3.0);
    }

    #[test]
    fn test_cone_counts_and_winding() {
        let mut buffer = GeometryBuffer::new();
        buffer.set_material(MaterialId::Hazard);
        add_cone(&mut buffer, &origin_frame(), Point3::origin(), 0.2, 0.7, 12, [1.0; 4]).unwrap();

        assert_eq!((buffer.vertex_count(), buffer.index_count()), cone_counts(12));
        // Centroid of the solid sits a quarter of the way up
        assert_faces_outward(&buffer, Point3::new(0.0, 0.175, 0.0));
        assert!(buffer.validate().is_ok());
    }
}

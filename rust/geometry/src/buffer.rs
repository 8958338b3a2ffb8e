// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Geometry buffer shared by every builder of a segment
//!
//! One append-only vertex list, one index list and an ordered list of
//! material ranges over the index list. Builders select a material and emit
//! triangles; consecutive triangles with the same material extend the last
//! range, so ranges are contiguous and never overlap.

use crate::error::{Error, Result};
use crate::material::MaterialId;
use nalgebra::{Point3, Vector3};

/// Interleaved vertex as consumed by the renderer
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Vertex {
    pub position: [f32; 3],
    pub normal: [f32; 3],
    pub uv: [f32; 2],
    pub color: [f32; 4],
}

impl Vertex {
    /// Build a vertex from f64 geometry, converting to f32 at the last moment
    #[inline]
    pub fn new(position: Point3<f64>, normal: Vector3<f64>, uv: [f32; 2], color: [f32; 4]) -> Self {
        Self {
            position: [position.x as f32, position.y as f32, position.z as f32],
            normal: [normal.x as f32, normal.y as f32, normal.z as f32],
            uv,
            color,
        }
    }

    #[inline]
    pub fn position_f64(&self) -> Point3<f64> {
        Point3::new(
            self.position[0] as f64,
            self.position[1] as f64,
            self.position[2] as f64,
        )
    }

    #[inline]
    pub fn normal_f64(&self) -> Vector3<f64> {
        Vector3::new(
            self.normal[0] as f64,
            self.normal[1] as f64,
            self.normal[2] as f64,
        )
    }
}

/// Contiguous slice of the index list drawn with one material
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubMeshRange {
    /// First index (offset into the index list)
    pub start: u32,
    /// Number of indices
    pub count: u32,
    pub material: MaterialId,
}

impl SubMeshRange {
    /// One past the last index
    #[inline]
    pub fn end(&self) -> u32 {
        self.start + self.count
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    #[inline]
    pub fn triangle_count(&self) -> u32 {
        self.count / 3
    }
}

/// Append-only multi-material triangle buffer
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GeometryBuffer {
    vertices: Vec<Vertex>,
    indices: Vec<u32>,
    sub_meshes: Vec<SubMeshRange>,
    material: MaterialId,
}

impl GeometryBuffer {
    /// Create a new empty buffer
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a buffer with capacity
    pub fn with_capacity(vertex_count: usize, index_count: usize) -> Self {
        Self {
            vertices: Vec::with_capacity(vertex_count),
            indices: Vec::with_capacity(index_count),
            ..Self::default()
        }
    }

    /// Reserve room for `vertices` more vertices and `indices` more indices.
    ///
    /// Fails loudly if allocation fails or if the vertex count would no longer
    /// be addressable by 32-bit indices.
    pub fn reserve(&mut self, vertices: usize, indices: usize) -> Result<()> {
        let exhausted = || Error::CapacityExhausted { vertices, indices };

        let total_vertices = self
            .vertices
            .len()
            .checked_add(vertices)
            .ok_or_else(exhausted)?;
        if total_vertices > u32::MAX as usize {
            return Err(exhausted());
        }

        self.vertices.try_reserve(vertices).map_err(|_| exhausted())?;
        self.indices.try_reserve(indices).map_err(|_| exhausted())?;
        Ok(())
    }

    /// Material applied to subsequently emitted triangles
    #[inline]
    pub fn set_material(&mut self, material: MaterialId) {
        self.material = material;
    }

    #[inline]
    pub fn material(&self) -> MaterialId {
        self.material
    }

    /// Append a vertex and return its index
    #[inline]
    pub fn push_vertex(&mut self, vertex: Vertex) -> u32 {
        let index = self.vertices.len() as u32;
        self.vertices.push(vertex);
        index
    }

    /// Append a vertex from f64 geometry and return its index
    #[inline]
    pub fn add_vertex(
        &mut self,
        position: Point3<f64>,
        normal: Vector3<f64>,
        uv: [f32; 2],
        color: [f32; 4],
    ) -> u32 {
        self.push_vertex(Vertex::new(position, normal, uv, color))
    }

    /// Add a triangle with the current material
    #[inline]
    pub fn add_triangle(&mut self, i0: u32, i1: u32, i2: u32) {
        debug_assert!(
            (i0.max(i1).max(i2) as usize) < self.vertices.len(),
            "triangle references a vertex that does not exist"
        );
        self.indices.push(i0);
        self.indices.push(i1);
        self.indices.push(i2);
        self.extend_range(3);
    }

    /// Add a triangle wound so its geometric normal points along `facing`
    pub fn add_triangle_facing(&mut self, i0: u32, i1: u32, i2: u32, facing: Vector3<f64>) {
        let a = self.vertices[i0 as usize].position_f64();
        let b = self.vertices[i1 as usize].position_f64();
        let c = self.vertices[i2 as usize].position_f64();
        let geometric = (b - a).cross(&(c - a));

        if geometric.dot(&facing) < 0.0 {
            self.add_triangle(i0, i2, i1);
        } else {
            self.add_triangle(i0, i1, i2);
        }
    }

    /// Add a quad (v0, v1, v2, v3 in ring order) as two triangles facing `facing`
    pub fn add_quad_facing(&mut self, quad: [u32; 4], facing: Vector3<f64>) {
        self.add_triangle_facing(quad[0], quad[1], quad[2], facing);
        self.add_triangle_facing(quad[0], quad[2], quad[3], facing);
    }

    fn extend_range(&mut self, added: u32) {
        let start = self.indices.len() as u32 - added;
        match self.sub_meshes.last_mut() {
            Some(last) if last.material == self.material && last.end() == start => {
                last.count += added;
            }
            _ => self.sub_meshes.push(SubMeshRange {
                start,
                count: added,
                material: self.material,
            }),
        }
    }

    /// Range covering everything emitted since index offset `start`,
    /// tagged with the current material
    #[inline]
    pub fn range_since(&self, start: u32) -> SubMeshRange {
        SubMeshRange {
            start,
            count: self.index_count() as u32 - start,
            material: self.material,
        }
    }

    #[inline]
    pub fn vertices(&self) -> &[Vertex] {
        &self.vertices
    }

    #[inline]
    pub fn indices(&self) -> &[u32] {
        &self.indices
    }

    #[inline]
    pub fn sub_meshes(&self) -> &[SubMeshRange] {
        &self.sub_meshes
    }

    #[inline]
    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    #[inline]
    pub fn index_count(&self) -> usize {
        self.indices.len()
    }

    #[inline]
    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.vertices.is_empty()
    }

    /// Total index count of all ranges tagged `material`
    pub fn material_index_count(&self, material: MaterialId) -> usize {
        self.sub_meshes
            .iter()
            .filter(|r| r.material == material)
            .map(|r| r.count as usize)
            .sum()
    }

    /// Check index and range invariants
    pub fn validate(&self) -> Result<()> {
        validate_layout(&self.vertices, &self.indices, &self.sub_meshes)
    }

    /// Finish generation; the result is read-only
    pub fn freeze(self) -> FrozenGeometry {
        FrozenGeometry {
            vertices: self.vertices.into_boxed_slice(),
            indices: self.indices.into_boxed_slice(),
            sub_meshes: self.sub_meshes.into_boxed_slice(),
        }
    }
}

/// Read-only geometry handed to the renderer
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FrozenGeometry {
    vertices: Box<[Vertex]>,
    indices: Box<[u32]>,
    sub_meshes: Box<[SubMeshRange]>,
}

impl FrozenGeometry {
    #[inline]
    pub fn vertices(&self) -> &[Vertex] {
        &self.vertices
    }

    #[inline]
    pub fn indices(&self) -> &[u32] {
        &self.indices
    }

    #[inline]
    pub fn sub_meshes(&self) -> &[SubMeshRange] {
        &self.sub_meshes
    }

    /// Indices of one range
    #[inline]
    pub fn range_indices(&self, range: &SubMeshRange) -> &[u32] {
        &self.indices[range.start as usize..range.end() as usize]
    }

    #[inline]
    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    #[inline]
    pub fn index_count(&self) -> usize {
        self.indices.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.vertices.is_empty()
    }

    pub fn validate(&self) -> Result<()> {
        validate_layout(&self.vertices, &self.indices, &self.sub_meshes)
    }
}

fn validate_layout(vertices: &[Vertex], indices: &[u32], sub_meshes: &[SubMeshRange]) -> Result<()> {
    if indices.len() % 3 != 0 {
        return Err(Error::InvalidSubMesh(format!(
            "index count {} is not a multiple of 3",
            indices.len()
        )));
    }

    if let Some(bad) = indices.iter().find(|&&i| i as usize >= vertices.len()) {
        return Err(Error::InvalidSubMesh(format!(
            "index {} out of bounds for {} vertices",
            bad,
            vertices.len()
        )));
    }

    let mut cursor = 0u32;
    let mut total = 0usize;
    for range in sub_meshes {
        if range.start < cursor {
            return Err(Error::InvalidSubMesh(format!(
                "range {:?} overlaps the previous range ending at {}",
                range, cursor
            )));
        }
        if range.end() as usize > indices.len() {
            return Err(Error::InvalidSubMesh(format!(
                "range {:?} exceeds index count {}",
                range,
                indices.len()
            )));
        }
        cursor = range.end();
        total += range.count as usize;
    }

    if total != indices.len() {
        return Err(Error::InvalidSubMesh(format!(
            "ranges cover {} of {} indices",
            total,
            indices.len()
        )));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn quad(buffer: &mut GeometryBuffer, z: f64) {
        let base = buffer.vertex_count() as u32;
        for (x, y) in [(0.0, 0.0), (1.0, 0.0), (1.0, 1.0), (0.0, 1.0)] {
            buffer.add_vertex(Point3::new(x, y, z), Vector3::z(), [0.0, 0.0], [1.0; 4]);
        }
        buffer.add_quad_facing([base, base + 1, base + 2, base + 3], Vector3::z());
    }

    #[test]
    fn test_buffer_creation() {
        let buffer = GeometryBuffer::new();
        assert!(buffer.is_empty());
        assert_eq!(buffer.vertex_count(), 0);
        assert_eq!(buffer.triangle_count(), 0);
        assert!(buffer.validate().is_ok());
    }

    #[test]
    fn test_same_material_extends_range() {
        let mut buffer = GeometryBuffer::new();
        buffer.set_material(MaterialId::Barrier);
        quad(&mut buffer, 0.0);
        quad(&mut buffer, 1.0);

        assert_eq!(buffer.sub_meshes().len(), 1);
        assert_eq!(buffer.sub_meshes()[0].count, 12);
        assert_eq!(buffer.sub_meshes()[0].material, MaterialId::Barrier);
    }

    #[test]
    fn test_material_switch_opens_new_range() {
        let mut buffer = GeometryBuffer::new();
        buffer.set_material(MaterialId::RoadSurface);
        quad(&mut buffer, 0.0);
        buffer.set_material(MaterialId::LaneMarking);
        quad(&mut buffer, 0.1);
        buffer.set_material(MaterialId::RoadSurface);
        quad(&mut buffer, 0.2);

        let ranges = buffer.sub_meshes();
        assert_eq!(ranges.len(), 3);
        assert_eq!(ranges[1].start, 6);
        assert_eq!(ranges[2].material, MaterialId::RoadSurface);
        assert_eq!(buffer.material_index_count(MaterialId::RoadSurface), 12);
        assert!(buffer.validate().is_ok());
    }

    #[test]
    fn test_setting_material_without_triangles_leaves_no_empty_range() {
        let mut buffer = GeometryBuffer::new();
        buffer.set_material(MaterialId::Hazard);
        buffer.set_material(MaterialId::Barrier);
        quad(&mut buffer, 0.0);
        assert_eq!(buffer.sub_meshes().len(), 1);
        assert_eq!(buffer.sub_meshes()[0].material, MaterialId::Barrier);
    }

    #[test]
    fn test_facing_flips_winding() {
        let mut buffer = GeometryBuffer::new();
        let a = buffer.add_vertex(Point3::new(0.0, 0.0, 0.0), Vector3::y(), [0.0; 2], [1.0; 4]);
        let b = buffer.add_vertex(Point3::new(1.0, 0.0, 0.0), Vector3::y(), [0.0; 2], [1.0; 4]);
        let c = buffer.add_vertex(Point3::new(0.0, 0.0, 1.0), Vector3::y(), [0.0; 2], [1.0; 4]);

        // (b - a) × (c - a) = X × Z = -Y, so the facing request flips it
        buffer.add_triangle_facing(a, b, c, Vector3::y());
        assert_eq!(buffer.indices(), &[a, c, b]);
    }

    #[test]
    fn test_validate_detects_out_of_range_index() {
        let mut buffer = GeometryBuffer::new();
        quad(&mut buffer, 0.0);
        let mut broken = buffer.clone();
        broken.indices[0] = 99;
        assert!(matches!(broken.validate(), Err(Error::InvalidSubMesh(_))));
    }

    #[test]
    fn test_validate_detects_uncovered_indices() {
        let mut buffer = GeometryBuffer::new();
        quad(&mut buffer, 0.0);
        buffer.sub_meshes[0].count = 3;
        assert!(buffer.validate().is_err());
    }

    #[test]
    fn test_reserve_rejects_index_overflow() {
        let mut buffer = GeometryBuffer::new();
        let result = buffer.reserve(u32::MAX as usize + 1, 0);
        assert!(matches!(result, Err(Error::CapacityExhausted { .. })));
    }

    #[test]
    fn test_freeze_preserves_contents() {
        let mut buffer = GeometryBuffer::new();
        buffer.set_material(MaterialId::Overpass);
        quad(&mut buffer, 0.0);
        let vertices = buffer.vertices().to_vec();

        let frozen = buffer.freeze();
        assert_eq!(frozen.vertices(), vertices.as_slice());
        assert_eq!(frozen.index_count(), 6);
        let range = frozen.sub_meshes()[0];
        assert_eq!(frozen.range_indices(&range).len(), 6);
        assert!(frozen.validate().is_ok());
    }
}

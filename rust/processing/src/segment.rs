// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! A segment inside the streaming window
//!
//! Owns the immutable curve and descriptor, the generation state and the
//! segment's geometry buffer. The buffer is an arena for the segment: it is
//! reserved once from the capacity estimate, grows through both passes,
//! is frozen after the markings pass and is dropped as a unit on leave.

use crate::error::{Error, Result};
use crate::state::{GenerationState, PassOutcome};
use roadgen_geometry::{
    build_markings, build_structure, estimate_structure_capacity, segment_bounds, AuxiliaryRecord,
    Bounds, FrozenGeometry, GeometryBuffer, GeometryConfig, HermiteCurve, LodTier, SegmentDescriptor,
    SegmentId,
};
use std::time::Instant;

/// Geometry lifecycle of one segment
#[derive(Debug, Clone, Default)]
pub enum SegmentGeometry {
    /// Nothing generated yet
    #[default]
    Empty,
    /// Structure done, markings pending
    Building(GeometryBuffer),
    /// Both passes done, read-only
    Frozen(FrozenGeometry),
}

/// Streamed segment with its generation state
#[derive(Debug, Clone)]
pub struct StreamedSegment {
    curve: HermiteCurve,
    descriptor: SegmentDescriptor,
    state: GenerationState,
    geometry: SegmentGeometry,
    bounds: Bounds,
    auxiliary: Vec<AuxiliaryRecord>,
}

impl StreamedSegment {
    pub fn new(curve: HermiteCurve, descriptor: SegmentDescriptor, lod: LodTier, config: &GeometryConfig) -> Self {
        let bounds = segment_bounds(&curve, &descriptor, config);
        Self {
            curve,
            descriptor,
            state: GenerationState::new(lod),
            geometry: SegmentGeometry::Empty,
            bounds,
            auxiliary: Vec::new(),
        }
    }

    #[inline]
    pub fn id(&self) -> SegmentId {
        self.descriptor.id
    }

    pub fn curve(&self) -> &HermiteCurve {
        &self.curve
    }

    pub fn descriptor(&self) -> &SegmentDescriptor {
        &self.descriptor
    }

    pub fn state(&self) -> &GenerationState {
        &self.state
    }

    #[inline]
    pub fn lod(&self) -> LodTier {
        self.state.lod()
    }

    pub fn bounds(&self) -> Bounds {
        self.bounds
    }

    /// Finished geometry, once both passes ran
    pub fn geometry(&self) -> Option<&FrozenGeometry> {
        match &self.geometry {
            SegmentGeometry::Frozen(frozen) => Some(frozen),
            _ => None,
        }
    }

    /// Buffer between the two passes
    pub fn pending_buffer(&self) -> Option<&GeometryBuffer> {
        match &self.geometry {
            SegmentGeometry::Building(buffer) => Some(buffer),
            _ => None,
        }
    }

    /// Records produced by the structure pass and not yet handed out
    pub fn take_auxiliary(&mut self) -> Vec<AuxiliaryRecord> {
        std::mem::take(&mut self.auxiliary)
    }

    /// Structure pass, at most once per lifetime
    pub fn try_generate_structure(&mut self, config: &GeometryConfig) -> Result<PassOutcome> {
        let Self {
            curve,
            descriptor,
            state,
            geometry,
            auxiliary,
            ..
        } = self;
        let lod = state.lod();

        state.try_structure::<Error>(|| {
            let started = Instant::now();
            let (vertices, indices) = estimate_structure_capacity(descriptor, lod, config);
            let mut buffer = GeometryBuffer::new();
            buffer.reserve(vertices, indices)?;

            let output = build_structure(&mut buffer, curve, descriptor, lod, config)?;
            tracing::debug!(
                segment = %descriptor.id,
                kind = descriptor.kind.name(),
                ?lod,
                vertices = buffer.vertex_count(),
                indices = buffer.index_count(),
                elapsed_us = started.elapsed().as_micros() as u64,
                "structure pass"
            );

            auxiliary.extend(output.auxiliary);
            *geometry = SegmentGeometry::Building(buffer);
            Ok(())
        })
    }

    /// Markings pass: appends to the structure buffer, then freezes it
    pub fn try_generate_markings(&mut self, config: &GeometryConfig) -> Result<PassOutcome> {
        let Self {
            curve,
            descriptor,
            state,
            geometry,
            ..
        } = self;

        state.try_markings::<Error>(|| {
            let started = Instant::now();
            let SegmentGeometry::Building(mut buffer) = std::mem::take(geometry) else {
                // The structure flag is only ever set together with a buffer
                return Err(roadgen_geometry::Error::InvalidSubMesh(format!(
                    "{} has no structure buffer to append markings to",
                    descriptor.id
                ))
                .into());
            };

            let result = build_markings(&mut buffer, curve, descriptor, config);
            if let Err(e) = result {
                // Keep the structure so a retry can append to it
                *geometry = SegmentGeometry::Building(buffer);
                return Err(e.into());
            }

            tracing::debug!(
                segment = %descriptor.id,
                vertices = buffer.vertex_count(),
                indices = buffer.index_count(),
                elapsed_us = started.elapsed().as_micros() as u64,
                "markings pass"
            );
            *geometry = SegmentGeometry::Frozen(buffer.freeze());
            Ok(())
        })
    }

    /// Discard geometry and state to regenerate at `lod`
    pub fn reset_for_lod(&mut self, lod: LodTier) {
        self.state.reset_for_lod(lod);
        self.geometry = SegmentGeometry::Empty;
        self.auxiliary.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use roadgen_geometry::{MaterialId, Point3, SegmentKind};

    fn segment() -> StreamedSegment {
        let curve = HermiteCurve::straight(Point3::origin(), Point3::new(0.0, 0.0, 200.0));
        let descriptor = SegmentDescriptor::new(SegmentId(1), SegmentKind::Straight, 200.0, 4);
        StreamedSegment::new(curve, descriptor, LodTier::High, &GeometryConfig::default())
    }

    #[test]
    fn test_passes_in_order() {
        let config = GeometryConfig::default();
        let mut segment = segment();

        assert_eq!(segment.try_generate_markings(&config).unwrap(), PassOutcome::Deferred);
        assert_eq!(segment.try_generate_structure(&config).unwrap(), PassOutcome::Built);
        assert!(segment.pending_buffer().is_some());
        assert!(segment.geometry().is_none());

        assert_eq!(segment.try_generate_markings(&config).unwrap(), PassOutcome::Built);
        let geometry = segment.geometry().unwrap();
        assert!(geometry.validate().is_ok());
        assert!(geometry
            .sub_meshes()
            .iter()
            .any(|r| r.material == MaterialId::LaneMarking));
    }

    #[test]
    fn test_structure_twice_leaves_buffer_unchanged() {
        let config = GeometryConfig::default();
        let mut segment = segment();
        segment.try_generate_structure(&config).unwrap();
        let first = segment.pending_buffer().cloned().unwrap();

        assert_eq!(segment.try_generate_structure(&config).unwrap(), PassOutcome::AlreadyDone);
        assert_eq!(segment.pending_buffer(), Some(&first));
    }

    #[test]
    fn test_reset_drops_geometry() {
        let config = GeometryConfig::default();
        let mut segment = segment();
        segment.try_generate_structure(&config).unwrap();
        segment.try_generate_markings(&config).unwrap();
        assert!(!segment.take_auxiliary().is_empty());

        segment.reset_for_lod(LodTier::Low);
        assert!(segment.geometry().is_none());
        assert!(!segment.state().is_structure_generated());
        assert_eq!(segment.lod(), LodTier::Low);
    }
}

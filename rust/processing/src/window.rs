// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Streaming window
//!
//! Holds the segments currently near the camera. Segments enter when the
//! topology layer hands them over and leave when they fall behind the
//! trailing edge; their buffers are dropped with them. Generation runs in
//! two parallel rounds, all structure passes and then all markings passes,
//! so no segment reads another segment's data.

use crate::config::PipelineConfig;
use crate::error::{Error, Result};
use crate::segment::StreamedSegment;
use crate::state::{GenerationState, PassOutcome};
use rayon::prelude::*;
use roadgen_geometry::{
    AuxiliaryRecord, Bounds, FrozenGeometry, GeometryConfig, HermiteCurve, LodTier, Point3,
    SegmentDescriptor, SegmentId,
};
use rustc_hash::FxHashMap;
use std::time::Instant;

/// Counts for one [`StreamingWindow::generate`] round
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct GenerationReport {
    pub structures_built: usize,
    pub markings_built: usize,
    pub failures: usize,
}

/// Segments in the window with their geometry
#[derive(Debug)]
pub struct StreamingWindow {
    config: GeometryConfig,
    segments: FxHashMap<SegmentId, StreamedSegment>,
    pool: Option<rayon::ThreadPool>,
    camera: Option<Point3<f64>>,
    auxiliary: Vec<AuxiliaryRecord>,
}

impl StreamingWindow {
    /// Create an empty window. A dedicated pool is built when
    /// `worker_threads` is set, otherwise the global rayon pool is used.
    pub fn new(config: PipelineConfig) -> Result<Self> {
        let pool = match config.worker_threads {
            Some(threads) => Some(
                rayon::ThreadPoolBuilder::new()
                    .num_threads(threads)
                    .thread_name(|i| format!("roadgen-worker-{i}"))
                    .build()?,
            ),
            None => None,
        };

        Ok(Self {
            config: config.geometry,
            segments: FxHashMap::default(),
            pool,
            camera: None,
            auxiliary: Vec::new(),
        })
    }

    pub fn config(&self) -> &GeometryConfig {
        &self.config
    }

    /// Add a segment. Returns `false` and keeps the existing entry when the
    /// id is already in the window.
    pub fn enter(&mut self, curve: HermiteCurve, descriptor: SegmentDescriptor) -> bool {
        let id = descriptor.id;
        if self.segments.contains_key(&id) {
            tracing::debug!(segment = %id, "segment already in window");
            return false;
        }

        let mut segment = StreamedSegment::new(curve, descriptor, LodTier::High, &self.config);
        let lod = self.tier_for(&segment.bounds());
        if lod != segment.lod() {
            segment.reset_for_lod(lod);
        }

        tracing::debug!(segment = %id, kind = segment.descriptor().kind.name(), ?lod, "segment entered");
        self.segments.insert(id, segment);
        true
    }

    /// Remove a segment and free its geometry
    pub fn leave(&mut self, id: SegmentId) -> Result<()> {
        self.segments.remove(&id).ok_or(Error::UnknownSegment(id))?;
        self.auxiliary.retain(|record| record.owner != id);
        tracing::debug!(segment = %id, "segment left");
        Ok(())
    }

    /// Re-evaluate tiers from a new camera position. Segments whose tier
    /// changed lose their geometry and are regenerated by the next
    /// [`generate`](Self::generate). Returns how many were reset.
    pub fn refresh_lod(&mut self, camera: Point3<f64>) -> usize {
        self.camera = Some(camera);
        let lod_config = &self.config.lod;

        let mut changed = Vec::new();
        for (id, segment) in self.segments.iter_mut() {
            let distance = segment.bounds().distance_to(&camera);
            let lod = LodTier::from_distance(distance, lod_config);
            if lod != segment.lod() {
                tracing::debug!(segment = %id, from = ?segment.lod(), to = ?lod, distance, "lod changed");
                segment.reset_for_lod(lod);
                changed.push(*id);
            }
        }

        if !changed.is_empty() {
            self.auxiliary.retain(|record| !changed.contains(&record.owner));
        }
        changed.len()
    }

    /// Run the structure pass then the markings pass over every segment.
    ///
    /// Segments that are already generated are skipped. A failing segment
    /// does not stop the others; its passes stay pending and the first
    /// error (by segment id) is returned after the round.
    pub fn generate(&mut self) -> Result<GenerationReport> {
        let started = Instant::now();
        let config = &self.config;
        let segments = &mut self.segments;

        let (report, mut failures) = match &self.pool {
            Some(pool) => pool.install(|| generate_round(segments, config)),
            None => generate_round(segments, config),
        };

        let mut records: Vec<AuxiliaryRecord> = self
            .segments
            .values_mut()
            .flat_map(|segment| segment.take_auxiliary())
            .collect();
        records.sort_by_key(|record| record.owner);
        self.auxiliary.extend(records);

        tracing::info!(
            segments = self.segments.len(),
            structures = report.structures_built,
            markings = report.markings_built,
            failures = report.failures,
            elapsed_ms = started.elapsed().as_millis() as u64,
            "generation round"
        );

        if failures.is_empty() {
            Ok(report)
        } else {
            failures.sort_by_key(|(id, _)| *id);
            let (_, first) = failures.swap_remove(0);
            Err(first)
        }
    }

    /// Finished geometry of a segment
    pub fn geometry(&self, id: SegmentId) -> Option<&FrozenGeometry> {
        self.segments.get(&id)?.geometry()
    }

    pub fn bounds(&self, id: SegmentId) -> Option<Bounds> {
        self.segments.get(&id).map(StreamedSegment::bounds)
    }

    pub fn state(&self, id: SegmentId) -> Option<&GenerationState> {
        self.segments.get(&id).map(StreamedSegment::state)
    }

    pub fn segment(&self, id: SegmentId) -> Option<&StreamedSegment> {
        self.segments.get(&id)
    }

    /// Hand out the auxiliary records produced since the last drain
    pub fn drain_auxiliary(&mut self) -> Vec<AuxiliaryRecord> {
        std::mem::take(&mut self.auxiliary)
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.segments.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    /// Segment ids in ascending order
    pub fn ids(&self) -> Vec<SegmentId> {
        let mut ids: Vec<SegmentId> = self.segments.keys().copied().collect();
        ids.sort_unstable();
        ids
    }

    fn tier_for(&self, bounds: &Bounds) -> LodTier {
        match self.camera {
            Some(camera) => LodTier::from_distance(bounds.distance_to(&camera), &self.config.lod),
            None => LodTier::High,
        }
    }
}

fn generate_round(
    segments: &mut FxHashMap<SegmentId, StreamedSegment>,
    config: &GeometryConfig,
) -> (GenerationReport, Vec<(SegmentId, Error)>) {
    let mut report = GenerationReport::default();
    let mut failures = Vec::new();

    let structure: Vec<(SegmentId, Result<PassOutcome>)> = segments
        .par_iter_mut()
        .map(|(id, segment)| (*id, segment.try_generate_structure(config)))
        .collect();
    tally(structure, &mut report.structures_built, &mut failures);

    let markings: Vec<(SegmentId, Result<PassOutcome>)> = segments
        .par_iter_mut()
        .map(|(id, segment)| (*id, segment.try_generate_markings(config)))
        .collect();
    tally(markings, &mut report.markings_built, &mut failures);

    report.failures = failures.len();
    (report, failures)
}

fn tally(
    outcomes: Vec<(SegmentId, Result<PassOutcome>)>,
    built: &mut usize,
    failures: &mut Vec<(SegmentId, Error)>,
) {
    for (id, outcome) in outcomes {
        match outcome {
            Ok(outcome) => *built += usize::from(outcome.was_built()),
            Err(e) => {
                tracing::warn!(segment = %id, error = %e, "segment generation failed");
                failures.push((id, e));
            }
        }
    }
}

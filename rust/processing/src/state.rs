// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Per-segment generation state
//!
//! Two one-way flags: structure generated, markings generated. A pass runs
//! at most once per segment lifetime. Markings wait until the structure pass
//! has succeeded. The only way back is [`GenerationState::reset_for_lod`],
//! which stands for destroying and recreating the segment at another tier.

use roadgen_geometry::{LodTier, Tessellation};

/// Outcome of a gated pass
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PassOutcome {
    /// The builder ran and succeeded
    Built,
    /// Already generated, the builder was not called
    AlreadyDone,
    /// Markings requested before the structure exists
    Deferred,
}

impl PassOutcome {
    #[inline]
    pub fn was_built(self) -> bool {
        self == PassOutcome::Built
    }
}

/// Generation flags plus the tier they were generated at
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GenerationState {
    structure_generated: bool,
    markings_generated: bool,
    lod: LodTier,
    tessellation: Tessellation,
}

impl GenerationState {
    pub fn new(lod: LodTier) -> Self {
        Self {
            structure_generated: false,
            markings_generated: false,
            lod,
            tessellation: lod.tessellation(),
        }
    }

    #[inline]
    pub fn is_structure_generated(&self) -> bool {
        self.structure_generated
    }

    #[inline]
    pub fn is_markings_generated(&self) -> bool {
        self.markings_generated
    }

    /// Both passes done
    #[inline]
    pub fn is_complete(&self) -> bool {
        self.structure_generated && self.markings_generated
    }

    #[inline]
    pub fn lod(&self) -> LodTier {
        self.lod
    }

    #[inline]
    pub fn tessellation(&self) -> Tessellation {
        self.tessellation
    }

    /// Run `build` unless the structure already exists. The flag is set only
    /// when `build` succeeds, so a failed pass may be retried.
    pub fn try_structure<E>(&mut self, build: impl FnOnce() -> Result<(), E>) -> Result<PassOutcome, E> {
        if self.structure_generated {
            return Ok(PassOutcome::AlreadyDone);
        }
        build()?;
        self.structure_generated = true;
        Ok(PassOutcome::Built)
    }

    /// Run `build` once, and only after the structure pass
    pub fn try_markings<E>(&mut self, build: impl FnOnce() -> Result<(), E>) -> Result<PassOutcome, E> {
        if !self.structure_generated {
            return Ok(PassOutcome::Deferred);
        }
        if self.markings_generated {
            return Ok(PassOutcome::AlreadyDone);
        }
        build()?;
        self.markings_generated = true;
        Ok(PassOutcome::Built)
    }

    /// Forget both passes and adopt a new tier
    pub fn reset_for_lod(&mut self, lod: LodTier) {
        *self = Self::new(lod);
    }
}

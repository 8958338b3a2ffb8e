// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Auxiliary entity records
//!
//! Structure generation does not create runtime entities. It returns plain
//! records that the streaming layer instantiates (lights, colliders, ...).

use crate::segment::SegmentId;
use nalgebra::{Point3, Vector3};

/// What the runtime should instantiate
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum AuxiliaryDescriptor {
    /// Ceiling lamp under a tunnel vault
    TunnelLamp {
        position: Point3<f64>,
        facing: Vector3<f64>,
    },
    /// Overpass support pillar standing on `base`.
    ///
    /// `height` is the emitted box height: the deck elevation h(t) minus the
    /// slab thickness, so the pillar ends at the underside of the deck.
    SupportPillar { base: Point3<f64>, height: f64 },
    /// Street light; `emitter` is the lamp head position
    LightPole {
        base: Point3<f64>,
        emitter: Point3<f64>,
    },
}

/// Descriptor plus the segment that owns it
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AuxiliaryRecord {
    pub owner: SegmentId,
    pub descriptor: AuxiliaryDescriptor,
}

impl AuxiliaryRecord {
    pub fn new(owner: SegmentId, descriptor: AuxiliaryDescriptor) -> Self {
        Self { owner, descriptor }
    }
}

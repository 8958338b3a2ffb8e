// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Roadgen Geometry
//!
//! Procedural road geometry from Hermite curve segments: frames along the
//! curve, a generic cross-section extruder, and the builders for road
//! surfaces, barriers, lane markings, tunnels, overpasses, forks and
//! fixtures. All math is done in f64 with nalgebra and converted to f32 only
//! when vertices are written.

pub mod auxiliary;
pub mod bounds;
pub mod buffer;
pub mod builders;
pub mod config;
pub mod curve;
pub mod error;
pub mod extrusion;
pub mod fork;
pub mod lod;
pub mod material;
pub mod path;
pub mod profile;
pub mod segment;
pub mod shapes;

// Re-export nalgebra types for convenience
pub use nalgebra::{Point3, Vector2, Vector3};

pub use auxiliary::{AuxiliaryDescriptor, AuxiliaryRecord};
pub use bounds::{geometry_bounds, segment_bounds, Bounds};
pub use buffer::{FrozenGeometry, GeometryBuffer, SubMeshRange, Vertex};
pub use builders::{build_markings, build_structure, estimate_structure_capacity, StructureOutput};
pub use config::{
    BarrierConfig, BoundsConfig, FixtureConfig, GeometryConfig, LodConfig, MarkingConfig,
    OverpassConfig, RoadConfig, TunnelConfig, VehicleConfig,
};
pub use curve::{evaluate, world_up, Frame, HermiteCurve};
pub use error::{Error, Result};
pub use extrusion::{extrude, UvMapping};
pub use fork::{BranchSurface, ForkGeometry, MERGE_DROP};
pub use lod::{LodTier, Tessellation};
pub use material::MaterialId;
pub use path::{ArcLengthTable, CirclePath, ElevatedPath, FramePath, SubPath};
pub use profile::{CrossSection, ProfilePoint, Side};
pub use segment::{
    FixtureKind, FixturePlacement, ForkParams, OverpassParams, SegmentDescriptor, SegmentId,
    SegmentKind, TunnelParams,
};

// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Roadgen Processing
//!
//! Streaming side of the road pipeline. Segments enter and leave a window,
//! each owning its geometry buffer and a generation state that lets the
//! structure and markings passes run exactly once. Generation is parallel
//! across segments with rayon.

pub mod config;
pub mod corridor;
pub mod error;
pub mod segment;
pub mod state;
pub mod window;

pub use config::{PipelineConfig, CONFIG_ENV};
pub use corridor::demo_corridor;
pub use error::{Error, Result};
pub use segment::{SegmentGeometry, StreamedSegment};
pub use state::{GenerationState, PassOutcome};
pub use window::{GenerationReport, StreamingWindow};

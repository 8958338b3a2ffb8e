// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use thiserror::Error;

/// Result type for geometry operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur during geometry generation
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// A cross-section needs at least two points to form a ribbon.
    #[error("Invalid profile: {0}")]
    InvalidProfile(String),

    /// Buffer growth failed or would overflow 32-bit indices.
    /// Always indicates a sizing bug, never recovered from.
    #[error("Geometry buffer capacity exhausted: requested {vertices} vertices / {indices} indices")]
    CapacityExhausted { vertices: usize, indices: usize },

    /// Index or sub-mesh bookkeeping is inconsistent.
    #[error("Invalid sub-mesh layout: {0}")]
    InvalidSubMesh(String),
}

impl Error {
    /// Whether this error comes from degenerate input that a builder may skip.
    #[inline]
    pub fn is_degenerate_input(&self) -> bool {
        matches!(self, Error::InvalidProfile(_))
    }
}

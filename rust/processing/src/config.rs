// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Pipeline configuration loaded from JSON.

use crate::error::Result;
use roadgen_geometry::GeometryConfig;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Environment variable holding the path of a JSON config file
pub const CONFIG_ENV: &str = "ROADGEN_CONFIG";

/// Pipeline configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Builder dimensions, colors and LOD thresholds.
    pub geometry: GeometryConfig,
    /// Size of the dedicated generation pool; `None` uses the global rayon pool.
    pub worker_threads: Option<usize>,
}

impl PipelineConfig {
    /// Parse from a JSON document. Missing fields keep their defaults.
    pub fn from_json_str(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Load from a JSON file.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_json_str(&text)
    }

    /// Load from the file named by `ROADGEN_CONFIG`, or defaults when unset.
    pub fn from_env() -> Result<Self> {
        match std::env::var_os(CONFIG_ENV) {
            Some(path) => Self::from_path(path),
            None => Ok(Self::default()),
        }
    }

    pub fn to_json_string(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

//! `pkg.json` manifest decoding.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::error::ApmError;
use crate::runtime::Runtime;

/// Per-package manifest stored as `pkg.json`.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq, Default)]
pub struct Manifest {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub deps: Vec<Dependency>,
}

/// A declared dependency.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct Dependency {
    pub url: String,
    pub version: String,
}

impl Manifest {
    /// Parses manifest JSON; `path` is only used for the error.
    pub fn parse(content: &str, path: &Path) -> Result<Self, ApmError> {
        serde_json::from_str(content).map_err(|source| ApmError::ManifestParse {
            path: path.to_path_buf(),
            source,
        })
    }

    #[tracing::instrument(skip(runtime))]
    pub fn load<R: Runtime>(runtime: &R, path: &Path) -> Result<Self> {
        if !runtime.exists(path) {
            return Err(ApmError::ManifestMissing(path.to_path_buf()).into());
        }
        let content = runtime
            .read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        Ok(Self::parse(&content, path)?)
    }
}

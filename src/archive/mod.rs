mod tar_gz;

use crate::runtime::Runtime;
use anyhow::Result;
use std::path::{Path, PathBuf};

pub use tar_gz::TarGzExtractor;

/// Unpacks a release archive held in memory.
#[cfg_attr(test, mockall::automock)]
pub trait ArchiveExtractor: Send + Sync {
    /// Extract `archive` into `extract_to` and return the path of the
    /// archive's single top-level directory.
    fn extract<R: Runtime + 'static>(
        &self,
        runtime: &R,
        archive: &[u8],
        extract_to: &Path,
    ) -> Result<PathBuf>;
}

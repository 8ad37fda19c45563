//! Release lookup for hosted repositories.
//!
//! A [`ReleaseLocator`] turns `author/repo` plus an optional tag into a
//! downloadable archive. Locators are registered per host in a
//! [`LocatorRegistry`].

mod github;
mod registry;

use anyhow::Result;
use async_trait::async_trait;

pub use github::{DEFAULT_GITHUB_API_URL, GitHubLocator};
pub use registry::LocatorRegistry;

/// A resolved, installable release.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReleaseDescriptor {
    /// Version tag (e.g., "v1.0.0")
    pub tag_name: String,
    /// URL of the gzip-tar source archive
    pub archive_url: String,
}

/// Trait for hosting providers that publish releases.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ReleaseLocator: Send + Sync {
    /// Resolve the most recent release.
    async fn resolve_latest(&self, author: &str, repo: &str) -> Result<ReleaseDescriptor>;

    /// Resolve the release tagged exactly `tag`.
    async fn resolve_version(
        &self,
        author: &str,
        repo: &str,
        tag: &str,
    ) -> Result<ReleaseDescriptor>;
}

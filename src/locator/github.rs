//! GitHub release locator.

use anyhow::{Context, Result};
use async_trait::async_trait;
use log::debug;

use crate::error::ApmError;
use crate::http::{HttpClient, NonRetryableError};

use super::{ReleaseDescriptor, ReleaseLocator};

pub const DEFAULT_GITHUB_API_URL: &str = "https://api.github.com";

/// GitHub API response types (internal).
mod api {
    use serde::Deserialize;

    #[derive(Deserialize, Debug)]
    pub struct Release {
        pub tag_name: String,
        pub tarball_url: String,
    }
}

impl From<api::Release> for ReleaseDescriptor {
    fn from(r: api::Release) -> Self {
        ReleaseDescriptor {
            tag_name: r.tag_name,
            archive_url: r.tarball_url,
        }
    }
}

/// Resolves releases through the GitHub REST API.
pub struct GitHubLocator {
    http_client: HttpClient,
    api_url: String,
}

impl GitHubLocator {
    pub fn new(http_client: HttpClient, api_url: &str) -> Self {
        Self {
            http_client,
            api_url: api_url.trim_end_matches('/').to_string(),
        }
    }

    pub fn api_url(&self) -> &str {
        &self.api_url
    }

    fn releases_url(&self, author: &str, repo: &str) -> String {
        format!("{}/repos/{}/{}/releases", self.api_url, author, repo)
    }

    /// `.../releases/tags/<tag>`, with the tag percent-encoded as one segment.
    fn release_by_tag_url(&self, author: &str, repo: &str, tag: &str) -> Result<String> {
        let base = format!("{}/tags", self.releases_url(author, repo));
        let mut url = reqwest::Url::parse(&base)
            .with_context(|| format!("Invalid API URL {}", self.api_url))?;
        url.path_segments_mut()
            .map_err(|_| anyhow::anyhow!("Invalid API URL {}", self.api_url))?
            .push(tag);
        Ok(url.to_string())
    }

    async fn fetch_release(
        &self,
        url: &str,
        repo: String,
        version: &str,
    ) -> Result<ReleaseDescriptor> {
        debug!("Fetching release from {}...", url);

        match self.http_client.get_json::<api::Release>(url).await {
            Ok(release) => Ok(release.into()),
            Err(e) if is_not_found(&e) => Err(ApmError::ReleaseNotFound {
                repo,
                version: version.to_string(),
            }
            .into()),
            Err(e) => {
                Err(e).with_context(|| format!("Failed to fetch release {} of {}", version, repo))
            }
        }
    }
}

fn is_not_found(err: &anyhow::Error) -> bool {
    matches!(
        err.downcast_ref::<NonRetryableError>(),
        Some(NonRetryableError::NotFound(_))
    )
}

#[async_trait]
impl ReleaseLocator for GitHubLocator {
    #[tracing::instrument(skip(self))]
    async fn resolve_latest(&self, author: &str, repo: &str) -> Result<ReleaseDescriptor> {
        let url = format!("{}/latest", self.releases_url(author, repo));
        self.fetch_release(&url, format!("{}/{}", author, repo), "latest")
            .await
    }

    #[tracing::instrument(skip(self))]
    async fn resolve_version(
        &self,
        author: &str,
        repo: &str,
        tag: &str,
    ) -> Result<ReleaseDescriptor> {
        let url = self.release_by_tag_url(author, repo, tag)?;
        self.fetch_release(&url, format!("{}/{}", author, repo), tag)
            .await
    }
}

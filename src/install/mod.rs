//! Archive installation.
//!
//! An install is staged under `<root>/staging/...` and only renamed into
//! `<root>/packages/...` once the whole archive has been extracted and its
//! manifest validated. The staging directory doubles as a lock: a second
//! install of the same package fails while it exists.

use anyhow::{Context, Result};
use log::{debug, info};
use std::path::{Path, PathBuf};

use crate::archive::ArchiveExtractor;
use crate::cleanup::{CleanupGuard, SharedCleanupContext};
use crate::error::ApmError;
use crate::http::HttpClient;
use crate::package::{MANIFEST_FILE, Manifest, PackageLayout, name_at_version};
use crate::runtime::Runtime;

/// Downloads release archives and installs them as `name@version`.
pub struct ArchiveInstaller<'a, R: Runtime + 'static, E: ArchiveExtractor> {
    runtime: &'a R,
    http_client: HttpClient,
    extractor: E,
    layout: PackageLayout,
}

impl<'a, R: Runtime + 'static, E: ArchiveExtractor> ArchiveInstaller<'a, R, E> {
    pub fn new(runtime: &'a R, http_client: HttpClient, extractor: E, layout: PackageLayout) -> Self {
        Self {
            runtime,
            http_client,
            extractor,
            layout,
        }
    }

    /// Install the archive at `archive_url` as
    /// `<root>/packages/<host>/<author>/<repo_name>@<version>`.
    ///
    /// Returns the installed directory. Fails with
    /// [`ApmError::AlreadyInstalled`] if that directory already exists.
    #[tracing::instrument(skip(self, cleanup_ctx))]
    pub async fn install(
        &self,
        archive_url: &str,
        host: &str,
        author: &str,
        repo_name: &str,
        version: &str,
        cleanup_ctx: SharedCleanupContext,
    ) -> Result<PathBuf> {
        let package = format!("{}/{}/{}", host, author, name_at_version(repo_name, version));
        let target = self.layout.package_dir(host, author, repo_name, version);
        if self.runtime.exists(&target) {
            return Err(ApmError::AlreadyInstalled { package }.into());
        }

        let staging = self.layout.staging_dir(host, author, repo_name, version);
        let _staging_guard = self.claim_staging(&staging, cleanup_ctx)?;

        info!("Downloading {}...", archive_url);
        let archive = self
            .http_client
            .get_bytes(archive_url)
            .await
            .with_context(|| format!("Failed to download archive from {}", archive_url))?;

        let extracted_root = self
            .extractor
            .extract(self.runtime, &archive, &staging)
            .with_context(|| format!("Failed to extract archive from {}", archive_url))?;

        let manifest_path = extracted_root.join(MANIFEST_FILE);
        Manifest::load(self.runtime, &manifest_path)
            .with_context(|| format!("{} does not contain a valid manifest", archive_url))?;

        let author_dir = self.layout.author_dir(host, author);
        self.runtime
            .create_dir_all(&author_dir)
            .with_context(|| format!("Failed to create {}", author_dir.display()))?;

        // Never replace an install that appeared while we were downloading
        if self.runtime.exists(&target) {
            return Err(ApmError::AlreadyInstalled { package }.into());
        }

        debug!("Renaming {:?} to {:?}", extracted_root, target);
        self.runtime
            .rename(&extracted_root, &target)
            .with_context(|| {
                format!(
                    "Failed to move {} into {}",
                    extracted_root.display(),
                    target.display()
                )
            })?;

        info!("Installed {} to {}", package, target.display());
        Ok(target)
    }

    /// Create the staging directory, which must not exist yet.
    fn claim_staging(&self, staging: &Path, cleanup_ctx: SharedCleanupContext) -> Result<CleanupGuard> {
        if let Some(parent) = staging.parent() {
            self.runtime
                .create_dir_all(parent)
                .with_context(|| format!("Failed to create {}", parent.display()))?;
        }

        if let Err(e) = self.runtime.create_dir(staging) {
            let exists = e
                .downcast_ref::<std::io::Error>()
                .is_some_and(|io| io.kind() == std::io::ErrorKind::AlreadyExists);
            if exists {
                return Err(ApmError::InstallInProgress {
                    path: staging.to_path_buf(),
                }
                .into());
            }
            return Err(e.context(format!("Failed to create {}", staging.display())));
        }

        Ok(CleanupGuard::new(cleanup_ctx, staging.to_path_buf()))
    }
}

//! Get use case - resolve a release and install it.

use std::path::PathBuf;

use anyhow::Result;
use log::{debug, info};

use crate::archive::ArchiveExtractor;
use crate::cleanup::SharedCleanupContext;
use crate::error::ApmError;
use crate::identifier::Identifier;
use crate::install::ArchiveInstaller;
use crate::locator::LocatorRegistry;
use crate::package::{PackageRegistry, name_at_version};
use crate::runtime::Runtime;

/// Outcome of a successful get.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Installed {
    /// The identifier, pinned to the resolved tag
    pub identifier: Identifier,
    /// Canonical package directory
    pub path: PathBuf,
}

/// Get use case: identifier in, installed package directory out.
pub struct GetUseCase<'a, R: Runtime + 'static, E: ArchiveExtractor> {
    locators: &'a LocatorRegistry,
    registry: PackageRegistry<'a, R>,
    installer: ArchiveInstaller<'a, R, E>,
}

impl<'a, R: Runtime + 'static, E: ArchiveExtractor> GetUseCase<'a, R, E> {
    pub fn new(
        locators: &'a LocatorRegistry,
        registry: PackageRegistry<'a, R>,
        installer: ArchiveInstaller<'a, R, E>,
    ) -> Self {
        Self {
            locators,
            registry,
            installer,
        }
    }

    /// Install `identifier` (`host/author/repo[@version]`).
    ///
    /// Without a version the latest release is installed, under its tag.
    #[tracing::instrument(skip(self, cleanup_ctx))]
    pub async fn get(&self, identifier: &str, cleanup_ctx: SharedCleanupContext) -> Result<Installed> {
        let id: Identifier = identifier.parse()?;
        let locator = self.locators.resolve(&id.host)?;

        let release = match &id.version {
            None => locator.resolve_latest(&id.author, &id.repo_name).await?,
            Some(tag) => {
                locator
                    .resolve_version(&id.author, &id.repo_name, tag)
                    .await?
            }
        };
        debug!("Resolved {} to {}", id, release.tag_name);

        let resolved = id.with_version(&release.tag_name);
        if self
            .registry
            .is_version_installed(&id.host, &id.author, &id.repo_name, &release.tag_name)
        {
            return Err(ApmError::AlreadyInstalled {
                package: resolved.to_string(),
            }
            .into());
        }

        info!(
            "Installing {} from {}",
            name_at_version(&id.repo_name, &release.tag_name),
            release.archive_url
        );
        let path = self
            .installer
            .install(
                &release.archive_url,
                &id.host,
                &id.author,
                &id.repo_name,
                &release.tag_name,
                cleanup_ctx,
            )
            .await?;

        Ok(Installed {
            identifier: resolved,
            path,
        })
    }
}

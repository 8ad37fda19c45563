//! Registry of installed packages.
//!
//! There is no index file: every query walks
//! `<root>/packages/<host>/<author>/<name>@<version>` and loads `pkg.json`.

use anyhow::{Context, Result};
use log::warn;
use std::path::Path;

use crate::runtime::Runtime;

use super::{Manifest, PackageLayout, Repository, split_name_at_version};

/// Read-only view of the packages installed under a [`PackageLayout`].
pub struct PackageRegistry<'a, R: Runtime> {
    runtime: &'a R,
    layout: PackageLayout,
}

impl<'a, R: Runtime> PackageRegistry<'a, R> {
    pub fn new(runtime: &'a R, layout: PackageLayout) -> Self {
        Self { runtime, layout }
    }

    pub fn layout(&self) -> &PackageLayout {
        &self.layout
    }

    /// Sorted names of the subdirectories of `dir`. Files are ignored.
    fn list_subdirs(&self, dir: &Path) -> Result<Vec<String>> {
        let entries = self
            .runtime
            .read_dir(dir)
            .with_context(|| format!("Failed to read directory {}", dir.display()))?;

        let mut names: Vec<String> = entries
            .into_iter()
            .filter(|entry| self.runtime.is_dir(entry))
            .filter_map(|entry| match entry.file_name().map(|n| n.to_str()) {
                Some(Some(name)) => Some(name.to_string()),
                Some(None) => {
                    warn!(
                        "Skipping non-UTF-8 entry {:?} in {}",
                        entry,
                        dir.display()
                    );
                    None
                }
                None => None,
            })
            .collect();
        names.sort();
        Ok(names)
    }

    /// Hosts with at least one install, e.g. `github.com`.
    ///
    /// An absent `packages` directory means nothing is installed.
    #[tracing::instrument(skip(self))]
    pub fn list_hosts(&self) -> Result<Vec<String>> {
        let packages_dir = self.layout.packages_dir();
        if !self.runtime.exists(&packages_dir) {
            return Ok(vec![]);
        }
        self.list_subdirs(&packages_dir)
    }

    #[tracing::instrument(skip(self))]
    pub fn list_authors(&self, host: &str) -> Result<Vec<String>> {
        self.list_subdirs(&self.layout.host_dir(host))
    }

    /// Raw `name@version` directory names under an author.
    #[tracing::instrument(skip(self))]
    pub fn list_name_at_versions(&self, host: &str, author: &str) -> Result<Vec<String>> {
        self.list_subdirs(&self.layout.author_dir(host, author))
    }

    /// Loads one installed package.
    ///
    /// The `name@version` format is validated before any filesystem access.
    #[tracing::instrument(skip(self))]
    pub fn get_installed(
        &self,
        host: &str,
        author: &str,
        name_at_version: &str,
    ) -> Result<Repository> {
        let (name, version) = split_name_at_version(name_at_version)?;

        let manifest_path = self.layout.manifest_path(host, author, name_at_version);
        let manifest = Manifest::load(self.runtime, &manifest_path)?;

        Ok(Repository {
            host: host.to_string(),
            author: author.to_string(),
            name: name.to_string(),
            version: version.to_string(),
            deps: manifest.deps,
        })
    }

    /// Every package installed under `host/author`. Fails as a whole if
    /// any single entry cannot be loaded.
    #[tracing::instrument(skip(self))]
    pub fn list_installed_by_author(&self, host: &str, author: &str) -> Result<Vec<Repository>> {
        self.list_name_at_versions(host, author)
            .context("Failed to list installed repositories")?
            .iter()
            .map(|entry| {
                self.get_installed(host, author, entry)
                    .with_context(|| format!("Failed to load {}/{}/{}", host, author, entry))
            })
            .collect()
    }

    /// Every installed version of `host/author/name`.
    pub fn list_versions_by_name(
        &self,
        host: &str,
        author: &str,
        name: &str,
    ) -> Result<Vec<Repository>> {
        Ok(self
            .list_installed_by_author(host, author)?
            .into_iter()
            .filter(|repo| repo.name == name)
            .collect())
    }

    /// True if `host/author` has a directory. Says nothing about its entries.
    pub fn has_author(&self, host: &str, author: &str) -> bool {
        self.runtime.exists(&self.layout.host_dir(host))
            && self.runtime.exists(&self.layout.author_dir(host, author))
    }

    /// True if the `name@version` directory itself exists, loadable or not.
    pub fn has_entry(&self, host: &str, author: &str, name_at_version: &str) -> bool {
        self.runtime
            .is_dir(&self.layout.entry_dir(host, author, name_at_version))
    }

    /// True if any version of `host/author/name` is installed.
    ///
    /// Listing errors are logged and reported as "not installed".
    pub fn is_any_version_installed(&self, host: &str, author: &str, name: &str) -> bool {
        if !self.has_author(host, author) {
            return false;
        }

        match self.list_installed_by_author(host, author) {
            Ok(repos) => repos.iter().any(|repo| repo.name == name),
            Err(e) => {
                warn!("Treating {}/{}/{} as not installed: {:#}", host, author, name, e);
                false
            }
        }
    }

    /// True if exactly `host/author/name@version` is installed.
    pub fn is_version_installed(&self, host: &str, author: &str, name: &str, version: &str) -> bool {
        if !self.is_any_version_installed(host, author, name) {
            return false;
        }

        match self.list_versions_by_name(host, author, name) {
            Ok(repos) => repos.iter().any(|repo| repo.version == version),
            Err(e) => {
                warn!(
                    "Treating {}/{}/{}@{} as not installed: {:#}",
                    host, author, name, version, e
                );
                false
            }
        }
    }

    /// Every installed package across all hosts and authors.
    #[tracing::instrument(skip(self))]
    pub fn list_all(&self) -> Result<Vec<Repository>> {
        let mut repos = Vec::new();
        for host in self.list_hosts()? {
            for author in self.list_authors(&host)? {
                repos.extend(self.list_installed_by_author(&host, &author)?);
            }
        }
        Ok(repos)
    }
}

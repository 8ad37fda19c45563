//! On-disk layout of the package root.
//!
//! ```text
//! <root>/packages/<host>/<author>/<name>@<version>/pkg.json
//! <root>/staging/<host>/<author>/<name>@<version>/   (transient)
//! ```

use std::path::{Path, PathBuf};

use crate::error::ApmError;

/// Manifest file name at the top of every installed package.
pub const MANIFEST_FILE: &str = "pkg.json";

const PACKAGES_DIR: &str = "packages";
const STAGING_DIR: &str = "staging";

/// Formats the directory name of an installed package.
pub fn name_at_version(name: &str, version: &str) -> String {
    format!("{}@{}", name, version)
}

/// Splits a `name@version` directory name.
///
/// Exactly one `@` with non-empty halves is required.
pub fn split_name_at_version(name_at_version: &str) -> Result<(&str, &str), ApmError> {
    let invalid = || {
        ApmError::Parse(format!(
            "invalid package directory name, expected 'name@version' but got '{}'",
            name_at_version
        ))
    };

    let (name, version) = name_at_version.split_once('@').ok_or_else(invalid)?;
    if name.is_empty() || version.is_empty() || version.contains('@') {
        return Err(invalid());
    }
    Ok((name, version))
}

/// Path construction for everything under the package root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackageLayout {
    root: PathBuf,
}

impl PackageLayout {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// `<root>/packages`
    pub fn packages_dir(&self) -> PathBuf {
        self.root.join(PACKAGES_DIR)
    }

    /// `<root>/packages/<host>`
    pub fn host_dir(&self, host: &str) -> PathBuf {
        self.packages_dir().join(host)
    }

    /// `<root>/packages/<host>/<author>`
    pub fn author_dir(&self, host: &str, author: &str) -> PathBuf {
        self.host_dir(host).join(author)
    }

    /// `<root>/packages/<host>/<author>/<name_at_version>`
    pub fn entry_dir(&self, host: &str, author: &str, name_at_version: &str) -> PathBuf {
        self.author_dir(host, author).join(name_at_version)
    }

    /// `<root>/packages/<host>/<author>/<name>@<version>`
    pub fn package_dir(&self, host: &str, author: &str, name: &str, version: &str) -> PathBuf {
        self.entry_dir(host, author, &name_at_version(name, version))
    }

    /// `<root>/packages/<host>/<author>/<name_at_version>/pkg.json`
    pub fn manifest_path(&self, host: &str, author: &str, name_at_version: &str) -> PathBuf {
        self.entry_dir(host, author, name_at_version)
            .join(MANIFEST_FILE)
    }

    /// `<root>/staging/<host>/<author>/<name>@<version>`
    ///
    /// Lives outside `packages/` so registry scans never see it.
    pub fn staging_dir(&self, host: &str, author: &str, name: &str, version: &str) -> PathBuf {
        self.root
            .join(STAGING_DIR)
            .join(host)
            .join(author)
            .join(name_at_version(name, version))
    }
}

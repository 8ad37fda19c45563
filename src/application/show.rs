//! Show action - retrieves installed package records.

use anyhow::{Result, bail};

use crate::error::{ApmError, apm_error};
use crate::identifier::Identifier;
use crate::package::{PackageLayout, PackageRegistry, Repository, name_at_version};
use crate::runtime::Runtime;

/// Show action - looks up installed packages by identifier
pub struct ShowAction<'a, R: Runtime> {
    registry: PackageRegistry<'a, R>,
}

impl<'a, R: Runtime> ShowAction<'a, R> {
    pub fn new(runtime: &'a R, layout: PackageLayout) -> Self {
        Self {
            registry: PackageRegistry::new(runtime, layout),
        }
    }

    /// Records for `identifier`.
    ///
    /// A pinned identifier yields exactly that install; an unpinned one
    /// yields every installed version of the repository.
    #[tracing::instrument(skip(self))]
    pub fn show(&self, identifier: &str) -> Result<Vec<Repository>> {
        let id: Identifier = identifier.parse()?;

        match &id.version {
            Some(version) => {
                let entry = name_at_version(&id.repo_name, version);
                match self.registry.get_installed(&id.host, &id.author, &entry) {
                    Ok(repo) => Ok(vec![repo]),
                    Err(e)
                        if matches!(apm_error(&e), Some(ApmError::ManifestMissing(_)))
                            && !self.registry.has_entry(&id.host, &id.author, &entry) =>
                    {
                        bail!("Package {} is not installed.", id)
                    }
                    Err(e) => Err(e),
                }
            }
            None => {
                if !self.registry.has_author(&id.host, &id.author) {
                    bail!("Package {} is not installed.", id);
                }
                let repos =
                    self.registry
                        .list_versions_by_name(&id.host, &id.author, &id.repo_name)?;
                if repos.is_empty() {
                    bail!("Package {} is not installed.", id);
                }
                Ok(repos)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::runtime::RealRuntime;
    use std::fs;
    use std::path::Path;
    use tempfile::tempdir;

    fn install_fixture(root: &Path, name_at_version: &str, manifest: &str) {
        let dir = root.join("packages/github.com/acme").join(name_at_version);
        fs::create_dir_all(&dir).unwrap();
        fs::write(dir.join("pkg.json"), manifest).unwrap();
    }

    #[test]
    fn test_show_pinned_version() {
        let dir = tempdir().unwrap();
        install_fixture(
            dir.path(),
            "widget@v1.0.0",
            r#"{"deps":[{"url":"github.com/acme/gears","version":"v0.1.0"}]}"#,
        );
        install_fixture(dir.path(), "widget@v1.1.0", "{}");

        let runtime = RealRuntime;
        let action = ShowAction::new(&runtime, PackageLayout::new(dir.path()));
        let repos = action.show("github.com/acme/widget@v1.0.0").unwrap();

        assert_eq!(repos.len(), 1);
        assert_eq!(repos[0].version, "v1.0.0");
        assert_eq!(repos[0].deps.len(), 1);
        assert_eq!(repos[0].deps[0].url, "github.com/acme/gears");
    }

    #[test]
    fn test_show_all_versions() {
        let dir = tempdir().unwrap();
        install_fixture(dir.path(), "widget@v1.1.0", "{}");
        install_fixture(dir.path(), "widget@v1.0.0", "{}");
        install_fixture(dir.path(), "gears@v0.1.0", "{}");

        let runtime = RealRuntime;
        let action = ShowAction::new(&runtime, PackageLayout::new(dir.path()));
        let versions: Vec<String> = action
            .show("github.com/acme/widget")
            .unwrap()
            .into_iter()
            .map(|r| r.version)
            .collect();

        assert_eq!(versions, vec!["v1.0.0", "v1.1.0"]);
    }

    #[test]
    fn test_show_pinned_version_ignores_broken_sibling() {
        let dir = tempdir().unwrap();
        install_fixture(dir.path(), "widget@v1.0.0", "{}");
        fs::create_dir_all(dir.path().join("packages/github.com/acme/gears@v0.1.0")).unwrap();

        let runtime = RealRuntime;
        let action = ShowAction::new(&runtime, PackageLayout::new(dir.path()));
        let repos = action.show("github.com/acme/widget@v1.0.0").unwrap();

        assert_eq!(repos.len(), 1);
        assert_eq!(repos[0].to_string(), "github.com/acme/widget@v1.0.0");
    }

    #[test]
    fn test_show_all_versions_reports_broken_sibling() {
        let dir = tempdir().unwrap();
        install_fixture(dir.path(), "widget@v1.0.0", "{}");
        fs::create_dir_all(dir.path().join("packages/github.com/acme/gears@v0.1.0")).unwrap();

        let runtime = RealRuntime;
        let action = ShowAction::new(&runtime, PackageLayout::new(dir.path()));
        let err = action.show("github.com/acme/widget").unwrap_err();

        assert!(!err.to_string().contains("is not installed"));
        assert!(format!("{:#}", err).contains("gears@v0.1.0"));
    }

    #[test]
    fn test_show_installed_dir_without_manifest_is_an_error() {
        let dir = tempdir().unwrap();
        fs::create_dir_all(dir.path().join("packages/github.com/acme/widget@v1.0.0")).unwrap();

        let runtime = RealRuntime;
        let action = ShowAction::new(&runtime, PackageLayout::new(dir.path()));
        let err = action.show("github.com/acme/widget@v1.0.0").unwrap_err();

        assert!(matches!(
            apm_error(&err),
            Some(ApmError::ManifestMissing(_))
        ));
    }

    #[test]
    fn test_show_other_name_only_is_not_installed() {
        let dir = tempdir().unwrap();
        install_fixture(dir.path(), "gears@v0.1.0", "{}");

        let runtime = RealRuntime;
        let action = ShowAction::new(&runtime, PackageLayout::new(dir.path()));
        let err = action.show("github.com/acme/widget").unwrap_err();
        assert!(err.to_string().contains("is not installed"));
    }

    #[test]
    fn test_show_not_installed() {
        let dir = tempdir().unwrap();
        let runtime = RealRuntime;
        let action = ShowAction::new(&runtime, PackageLayout::new(dir.path()));

        let err = action.show("github.com/acme/widget@v1.0.0").unwrap_err();
        assert!(err.to_string().contains("is not installed"));
    }

    #[test]
    fn test_show_malformed_identifier() {
        let dir = tempdir().unwrap();
        let runtime = RealRuntime;
        let action = ShowAction::new(&runtime, PackageLayout::new(dir.path()));

        let err = action.show("widget@v1.0.0").unwrap_err();
        assert!(matches!(apm_error(&err), Some(ApmError::Parse(_))));
    }
}

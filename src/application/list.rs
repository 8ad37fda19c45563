//! List action - retrieves installed packages.

use anyhow::Result;

use crate::package::{PackageLayout, PackageRegistry, Repository};
use crate::runtime::Runtime;

/// List action - queries installed packages
pub struct ListAction<'a, R: Runtime> {
    registry: PackageRegistry<'a, R>,
}

impl<'a, R: Runtime> ListAction<'a, R> {
    pub fn new(runtime: &'a R, layout: PackageLayout) -> Self {
        Self {
            registry: PackageRegistry::new(runtime, layout),
        }
    }

    /// All installed packages, sorted by host, author, then `name@version`.
    pub fn list_packages(&self) -> Result<Vec<Repository>> {
        self.registry.list_all()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::runtime::MockRuntime;
    use mockall::predicate::eq;
    use std::path::PathBuf;

    #[test]
    fn test_list_packages_without_packages_dir() {
        let mut runtime = MockRuntime::new();
        runtime
            .expect_exists()
            .with(eq(PathBuf::from("/apm/packages")))
            .returning(|_| false);

        let action = ListAction::new(&runtime, PackageLayout::new("/apm"));
        assert!(action.list_packages().unwrap().is_empty());
    }

    #[test]
    fn test_list_packages_with_packages() {
        let mut runtime = MockRuntime::new();
        let packages = PathBuf::from("/apm/packages");
        let host = packages.join("github.com");
        let author = host.join("acme");
        let widget = author.join("widget@v1.0.0");

        runtime
            .expect_exists()
            .with(eq(packages.clone()))
            .returning(|_| true);
        runtime.expect_is_dir().returning(|_| true);

        let host_entry = host.clone();
        runtime
            .expect_read_dir()
            .with(eq(packages))
            .returning(move |_| Ok(vec![host_entry.clone()]));
        let author_entry = author.clone();
        runtime
            .expect_read_dir()
            .with(eq(host))
            .returning(move |_| Ok(vec![author_entry.clone()]));
        let widget_entry = widget.clone();
        runtime
            .expect_read_dir()
            .with(eq(author))
            .returning(move |_| Ok(vec![widget_entry.clone()]));

        runtime
            .expect_exists()
            .with(eq(widget.join("pkg.json")))
            .returning(|_| true);
        runtime
            .expect_read_to_string()
            .with(eq(widget.join("pkg.json")))
            .returning(|_| Ok(r#"{"deps":[]}"#.to_string()));

        let action = ListAction::new(&runtime, PackageLayout::new("/apm"));
        let result = action.list_packages().unwrap();

        assert_eq!(result.len(), 1);
        assert_eq!(result[0].to_string(), "github.com/acme/widget@v1.0.0");
        assert!(result[0].deps.is_empty());
    }
}

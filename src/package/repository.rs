//! The installed-package record.

use serde::Serialize;

use super::Dependency;

/// One installed package, assembled from its directory name and `pkg.json`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Repository {
    pub host: String,
    pub author: String,
    pub name: String,
    pub version: String,
    pub deps: Vec<Dependency>,
}

impl std::fmt::Display for Repository {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}/{}/{}@{}",
            self.host, self.author, self.name, self.version
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_is_identifier() {
        let repo = Repository {
            host: "github.com".into(),
            author: "acme".into(),
            name: "widget".into(),
            version: "v1.0.0".into(),
            deps: vec![],
        };
        assert_eq!(repo.to_string(), "github.com/acme/widget@v1.0.0");
    }
}

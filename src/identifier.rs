//! Package identifier parsing.

use std::str::FromStr;

use crate::error::ApmError;

/// A hosted repository, optionally pinned to a version.
/// Format: "host/author/repo" or "host/author/repo@version"
#[derive(Debug, PartialEq, Eq, Clone)]
pub struct Identifier {
    pub host: String,
    pub author: String,
    pub repo_name: String,
    /// `None` resolves to the latest release
    pub version: Option<String>,
}

impl Identifier {
    /// The same identifier pinned to `version`.
    pub fn with_version(&self, version: impl Into<String>) -> Self {
        Self {
            version: Some(version.into()),
            ..self.clone()
        }
    }
}

impl std::fmt::Display for Identifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}/{}", self.host, self.author, self.repo_name)?;
        if let Some(v) = &self.version {
            write!(f, "@{}", v)?;
        }
        Ok(())
    }
}

impl FromStr for Identifier {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let parse_error = |reason: &str| {
            anyhow::Error::from(ApmError::Parse(format!(
                "invalid identifier '{}': {}. Expected 'host/author/repo[@version]'.",
                s, reason
            )))
        };

        let (path, version) = match s.split_once('@') {
            Some((path, version)) => {
                if version.is_empty() {
                    return Err(parse_error("version after @ cannot be empty"));
                }
                if version.contains('@') || version.contains('/') || version.contains('\\') {
                    return Err(parse_error("version contains a reserved character"));
                }
                (path, Some(version.to_string()))
            }
            None => (s, None),
        };

        let segments: Vec<&str> = path.split('/').collect();
        if segments.len() != 3 {
            return Err(parse_error("expected exactly three '/'-separated segments"));
        }
        if segments
            .iter()
            .any(|seg| seg.is_empty() || *seg == "." || *seg == ".." || seg.contains('\\'))
        {
            return Err(parse_error("segments must be non-empty path names"));
        }
        if version.as_deref() == Some("..") || version.as_deref() == Some(".") {
            return Err(parse_error("version must be a plain name"));
        }

        Ok(Identifier {
            host: segments[0].to_string(),
            author: segments[1].to_string(),
            repo_name: segments[2].to_string(),
            version,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::apm_error;

    #[test]
    fn test_parse_without_version() {
        let id: Identifier = "github.com/acme/widget".parse().unwrap();
        assert_eq!(id.host, "github.com");
        assert_eq!(id.author, "acme");
        assert_eq!(id.repo_name, "widget");
        assert_eq!(id.version, None);
    }

    #[test]
    fn test_parse_with_version() {
        let id: Identifier = "github.com/x0y14/arrietty_json@v0.0.1".parse().unwrap();
        assert_eq!(id.author, "x0y14");
        assert_eq!(id.repo_name, "arrietty_json");
        assert_eq!(id.version.as_deref(), Some("v0.0.1"));
    }

    #[test]
    fn test_display_round_trips() {
        for s in [
            "github.com/acme/widget",
            "github.com/acme/widget@v1.0.0",
            "github.com/bach-sh/bach@0.7.2",
        ] {
            let id: Identifier = s.parse().unwrap();
            assert_eq!(id.to_string(), s);
        }
    }

    #[test]
    fn test_with_version() {
        let id: Identifier = "github.com/acme/widget".parse().unwrap();
        let pinned = id.with_version("v2.0.0");
        assert_eq!(pinned.to_string(), "github.com/acme/widget@v2.0.0");
        assert_eq!(pinned.repo_name, "widget");
    }

    #[test]
    fn test_wrong_segment_count_is_parse_error() {
        for s in [
            "acme/widget",
            "widget@v1",
            "github.com/acme/widget/extra",
            "",
        ] {
            let err = s.parse::<Identifier>().unwrap_err();
            assert!(
                matches!(apm_error(&err), Some(ApmError::Parse(_))),
                "expected parse error for {:?}",
                s
            );
        }
    }

    #[test]
    fn test_empty_segments_rejected() {
        assert!("github.com//widget".parse::<Identifier>().is_err());
        assert!("/acme/widget".parse::<Identifier>().is_err());
        assert!("github.com/acme/".parse::<Identifier>().is_err());
    }

    #[test]
    fn test_bad_version_rejected() {
        let err = "github.com/acme/widget@".parse::<Identifier>().unwrap_err();
        assert!(err.to_string().contains("cannot be empty"));

        assert!("github.com/acme/widget@v1@v2".parse::<Identifier>().is_err());
        assert!("github.com/acme/widget@..".parse::<Identifier>().is_err());
    }

    #[test]
    fn test_traversal_segments_rejected() {
        assert!("github.com/../widget".parse::<Identifier>().is_err());
        assert!("./acme/widget".parse::<Identifier>().is_err());
    }
}

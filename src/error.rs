//! Domain errors for package resolution, installation, and lookup.
//!
//! These are carried inside `anyhow::Error` like the HTTP module's
//! `NonRetryableError`, so callers can `downcast_ref::<ApmError>()` to
//! tell the failure kinds apart.

use std::path::PathBuf;

/// Errors raised by the package manager itself (as opposed to transport
/// or filesystem errors, which keep their original types).
#[derive(Debug)]
pub enum ApmError {
    /// Malformed identifier or `name@version` directory entry
    Parse(String),
    /// No release locator is registered for this host
    UnsupportedHost(String),
    /// The locator found no release for the requested repository/version
    ReleaseNotFound { repo: String, version: String },
    /// The exact version is already present on disk
    AlreadyInstalled { package: String },
    /// A staging directory for the same package already exists
    InstallInProgress { path: PathBuf },
    /// Unexpected tar entry type, corrupt stream, or bad archive layout
    ArchiveFormat(String),
    /// `pkg.json` is absent from an installed package
    ManifestMissing(PathBuf),
    /// `pkg.json` exists but is not valid
    ManifestParse {
        path: PathBuf,
        source: serde_json::Error,
    },
    /// No package root was configured
    RootNotSet,
}

impl std::fmt::Display for ApmError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ApmError::Parse(msg) => write!(f, "Parse error: {}", msg),
            ApmError::UnsupportedHost(host) => write!(f, "Unsupported host: {}", host),
            ApmError::ReleaseNotFound { repo, version } => {
                write!(f, "Release not found: {} @ {}", repo, version)
            }
            ApmError::AlreadyInstalled { package } => {
                write!(f, "{} is already installed", package)
            }
            ApmError::InstallInProgress { path } => write!(
                f,
                "Another install is in progress (staging directory {} exists). \
                 Remove it if no other apm process is running.",
                path.display()
            ),
            ApmError::ArchiveFormat(msg) => write!(f, "Invalid archive: {}", msg),
            ApmError::ManifestMissing(path) => {
                write!(f, "pkg.json not found: {}", path.display())
            }
            ApmError::ManifestParse { path, source } => {
                write!(f, "Failed to parse {}: {}", path.display(), source)
            }
            ApmError::RootNotSet => write!(
                f,
                "Package root is not set. Pass --root or set ARRIETTY_PM_PATH."
            ),
        }
    }
}

impl std::error::Error for ApmError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ApmError::ManifestParse { source, .. } => Some(source),
            _ => None,
        }
    }
}

/// Returns the `ApmError` carried by an `anyhow::Error`, if any.
pub fn apm_error(err: &anyhow::Error) -> Option<&ApmError> {
    err.downcast_ref::<ApmError>()
}

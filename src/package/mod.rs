//! Installed package management
//!
//! This module owns the on-disk layout, the `pkg.json` manifest, and the
//! directory-scanning registry that reconstructs installed packages.

mod layout;
mod manifest;
mod registry;
mod repository;

pub use layout::{MANIFEST_FILE, PackageLayout, name_at_version, split_name_at_version};
pub use manifest::{Dependency, Manifest};
pub use registry::PackageRegistry;
pub use repository::Repository;

use crate::error::ApmError;
use crate::runtime::Runtime;
use anyhow::{Context, Result};
use flate2::read::GzDecoder;
use log::debug;
use std::path::{Component, Path, PathBuf};
use tar::{Archive, EntryType};

use super::ArchiveExtractor;

/// Extractor for gzip-compressed tar archives (`tarball_url` releases)
pub struct TarGzExtractor;

fn format_error(msg: String) -> anyhow::Error {
    ApmError::ArchiveFormat(msg).into()
}

/// Reduces an entry path to its normal components, rejecting anything
/// that could escape the extraction directory.
fn relative_entry_path(path: &Path) -> Result<PathBuf> {
    let mut relative = PathBuf::new();
    for component in path.components() {
        match component {
            Component::Normal(part) => relative.push(part),
            Component::CurDir => {}
            _ => {
                return Err(format_error(format!(
                    "entry path escapes the archive root: {}",
                    path.display()
                )));
            }
        }
    }
    if relative.as_os_str().is_empty() {
        return Err(format_error(format!(
            "entry has an empty path: {:?}",
            path
        )));
    }
    Ok(relative)
}

impl ArchiveExtractor for TarGzExtractor {
    #[tracing::instrument(skip(self, runtime, archive))]
    fn extract<R: Runtime + 'static>(
        &self,
        runtime: &R,
        archive: &[u8],
        extract_to: &Path,
    ) -> Result<PathBuf> {
        debug!("Extracting tar.gz archive to {:?}...", extract_to);

        let mut tar = Archive::new(GzDecoder::new(archive));
        let entries = tar
            .entries()
            .map_err(|e| format_error(format!("failed to read tar stream: {}", e)))?;

        let mut top_level: Option<PathBuf> = None;

        for entry in entries {
            let mut entry =
                entry.map_err(|e| format_error(format!("failed to read tar entry: {}", e)))?;
            let entry_type = entry.header().entry_type();

            // git archive writes a pax_global_header carrying the commit id
            if entry_type == EntryType::XGlobalHeader {
                debug!("Skipping global extended header");
                continue;
            }

            let raw_path = entry
                .path()
                .map_err(|e| format_error(format!("invalid entry path: {}", e)))?
                .into_owned();
            let relative = relative_entry_path(&raw_path)?;

            let root: PathBuf = relative.components().take(1).collect();
            match &top_level {
                None => top_level = Some(root),
                Some(existing) if *existing != root => {
                    return Err(format_error(format!(
                        "multiple top-level entries: {} and {}",
                        existing.display(),
                        root.display()
                    )));
                }
                Some(_) => {}
            }

            let full_path = extract_to.join(&relative);

            match entry_type {
                EntryType::Directory => {
                    runtime.create_dir_all(&full_path)?;
                }
                EntryType::Regular | EntryType::Continuous => {
                    if relative.components().count() == 1 {
                        return Err(format_error(format!(
                            "regular file at the archive top level: {}",
                            relative.display()
                        )));
                    }
                    if let Some(parent) = full_path.parent() {
                        runtime.create_dir_all(parent)?;
                    }
                    let mut dest_file = runtime.create_file(&full_path)?;
                    std::io::copy(&mut entry, &mut dest_file)
                        .with_context(|| format!("Failed to extract file {:?}", full_path))?;
                    drop(dest_file);

                    #[cfg(unix)]
                    if let Ok(mode) = entry.header().mode() {
                        // setuid, setgid and sticky bits are dropped; owner keeps read/write
                        if let Err(e) = runtime.set_permissions(&full_path, (mode & 0o777) | 0o600)
                        {
                            debug!("Failed to set permissions on {:?}: {}", full_path, e);
                        }
                    }
                }
                other => {
                    return Err(format_error(format!(
                        "unsupported entry type {:?} for {}",
                        other,
                        raw_path.display()
                    )));
                }
            }
        }

        let root = top_level.ok_or_else(|| format_error("archive has no entries".to_string()))?;
        let root_path = extract_to.join(&root);
        if !runtime.is_dir(&root_path) {
            return Err(format_error(format!(
                "top-level entry is not a directory: {}",
                root.display()
            )));
        }

        debug!("Extracted archive root {:?}", root_path);
        Ok(root_path)
    }
}

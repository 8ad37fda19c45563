use log::debug;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard};

/// Tracks paths that must be removed if the process is interrupted
#[derive(Default)]
pub struct CleanupContext {
    paths: Vec<PathBuf>,
}

impl CleanupContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, path: PathBuf) {
        self.paths.push(path);
    }

    pub fn remove(&mut self, path: &Path) {
        self.paths.retain(|p| p != path);
    }

    pub fn paths(&self) -> &[PathBuf] {
        &self.paths
    }

    /// Remove every registered path from disk
    pub fn cleanup(&self) {
        for path in &self.paths {
            remove_path(path);
        }
    }
}

fn remove_path(path: &Path) {
    debug!("Cleaning up: {:?}", path);
    if path.is_dir() {
        let _ = std::fs::remove_dir_all(path);
    } else {
        let _ = std::fs::remove_file(path);
    }
}

pub type SharedCleanupContext = Arc<Mutex<CleanupContext>>;

pub fn new_shared() -> SharedCleanupContext {
    Arc::new(Mutex::new(CleanupContext::new()))
}

fn lock(ctx: &SharedCleanupContext) -> MutexGuard<'_, CleanupContext> {
    // A poisoned lock still holds a usable path list
    ctx.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

/// RAII guard for a transient path.
///
/// The path is registered with the shared context (so a Ctrl-C handler can
/// remove it) and is deleted from disk when the guard drops, on success and
/// error paths alike.
pub struct CleanupGuard {
    ctx: SharedCleanupContext,
    path: PathBuf,
}

impl CleanupGuard {
    pub fn new(ctx: SharedCleanupContext, path: PathBuf) -> Self {
        lock(&ctx).add(path.clone());
        Self { ctx, path }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for CleanupGuard {
    fn drop(&mut self) {
        remove_path(&self.path);
        lock(&self.ctx).remove(&self.path);
    }
}

//! Host name to locator mapping.

use std::collections::HashMap;
use std::sync::Arc;

use anyhow::Result;

use super::ReleaseLocator;
use crate::error::ApmError;

/// Registry of release locators keyed by host (e.g. `github.com`).
#[derive(Default)]
pub struct LocatorRegistry {
    locators: HashMap<String, Arc<dyn ReleaseLocator>>,
}

impl LocatorRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a locator for `host`, replacing any previous one.
    pub fn register(&mut self, host: impl Into<String>, locator: Arc<dyn ReleaseLocator>) {
        self.locators.insert(host.into(), locator);
    }

    pub fn has(&self, host: &str) -> bool {
        self.locators.contains_key(host)
    }

    /// Sorted host names.
    pub fn hosts(&self) -> Vec<&str> {
        let mut hosts: Vec<&str> = self.locators.keys().map(String::as_str).collect();
        hosts.sort_unstable();
        hosts
    }

    /// Locator for `host`, or [`ApmError::UnsupportedHost`].
    pub fn resolve(&self, host: &str) -> Result<&Arc<dyn ReleaseLocator>> {
        self.locators
            .get(host)
            .ok_or_else(|| ApmError::UnsupportedHost(host.to_string()).into())
    }
}

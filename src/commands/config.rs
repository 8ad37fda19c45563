use anyhow::Result;
use log::debug;
use reqwest::{
    Client,
    header::{AUTHORIZATION, HeaderMap, HeaderValue},
};

use std::path::PathBuf;
use std::sync::Arc;

use crate::{
    error::ApmError,
    http::HttpClient,
    locator::{DEFAULT_GITHUB_API_URL, GitHubLocator, LocatorRegistry},
    package::PackageLayout,
    runtime::Runtime,
};

/// Environment variable naming the package root.
pub const ROOT_ENV: &str = "ARRIETTY_PM_PATH";

pub struct Config<R: Runtime> {
    pub runtime: R,
    pub http_client: HttpClient,
    pub locators: LocatorRegistry,
    pub layout: PackageLayout,
}

impl<R: Runtime> Config<R> {
    pub fn new(runtime: R, root: Option<PathBuf>, api_url: Option<String>) -> Result<Self> {
        let root = resolve_root(&runtime, root)?;
        debug!("Using package root {:?}", root);

        let mut headers = HeaderMap::new();
        let token = runtime
            .env_var("GITHUB_TOKEN")
            .ok()
            .filter(|t| !t.is_empty());
        if let Some(token) = token {
            let mut auth_value = HeaderValue::from_str(&format!("Bearer {}", token))?;
            auth_value.set_sensitive(true);
            headers.insert(AUTHORIZATION, auth_value);
            debug!("Using GITHUB_TOKEN for authentication");
        }

        let client = Client::builder()
            .user_agent("apm-cli")
            .default_headers(headers)
            .build()?;
        let http_client = HttpClient::new(client);

        let api_url = api_url.unwrap_or_else(|| DEFAULT_GITHUB_API_URL.to_string());
        let mut locators = LocatorRegistry::new();
        locators.register(
            "github.com",
            Arc::new(GitHubLocator::new(http_client.clone(), &api_url)),
        );

        Ok(Self {
            runtime,
            http_client,
            locators,
            layout: PackageLayout::new(root),
        })
    }
}

/// The explicit root if given, else `ARRIETTY_PM_PATH`. Empty values count
/// as unset.
fn resolve_root<R: Runtime>(runtime: &R, root: Option<PathBuf>) -> Result<PathBuf> {
    if let Some(root) = root.filter(|p| !p.as_os_str().is_empty()) {
        return Ok(root);
    }
    match runtime.env_var(ROOT_ENV) {
        Ok(value) if !value.is_empty() => Ok(PathBuf::from(value)),
        _ => Err(ApmError::RootNotSet.into()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::apm_error;
    use crate::runtime::MockRuntime;
    use mockall::predicate::eq;
    use mockito::{Matcher, Server};

    fn runtime_with(root_env: Option<&'static str>, token: Option<&'static str>) -> MockRuntime {
        let mut runtime = MockRuntime::new();
        runtime
            .expect_env_var()
            .with(eq(ROOT_ENV))
            .returning(move |_| root_env.map(String::from).ok_or(std::env::VarError::NotPresent));
        runtime
            .expect_env_var()
            .with(eq("GITHUB_TOKEN"))
            .returning(move |_| token.map(String::from).ok_or(std::env::VarError::NotPresent));
        runtime
    }

    /// Helper function to verify Authorization header behavior
    async fn verify_authorization_header(token: Option<&'static str>) {
        let runtime = runtime_with(None, token);

        let mut server = Server::new_async().await;
        let expected_header = match token {
            Some(t) => Matcher::Exact(format!("Bearer {}", t)),
            None => Matcher::Missing,
        };
        let mock = server
            .mock("GET", "/")
            .match_header("Authorization", expected_header)
            .match_header("User-Agent", "apm-cli")
            .create_async()
            .await;

        let config = Config::new(runtime, Some(PathBuf::from("/apm")), None).unwrap();
        let _ = config.http_client.inner().get(server.url()).send().await;

        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_config_new_with_github_token() {
        verify_authorization_header(Some("test_token")).await;
    }

    #[tokio::test]
    async fn test_config_new_without_github_token() {
        verify_authorization_header(None).await;
    }

    #[test]
    fn test_explicit_root_wins_over_env() {
        let runtime = runtime_with(Some("/from/env"), None);
        let config = Config::new(runtime, Some(PathBuf::from("/explicit")), None).unwrap();
        assert_eq!(config.layout.root(), PathBuf::from("/explicit").as_path());
    }

    #[test]
    fn test_root_from_env() {
        let runtime = runtime_with(Some("/from/env"), None);
        let config = Config::new(runtime, None, None).unwrap();
        assert_eq!(config.layout.root(), PathBuf::from("/from/env").as_path());
    }

    #[test]
    fn test_root_not_set() {
        let runtime = runtime_with(None, None);
        let err = Config::new(runtime, None, None).err().unwrap();
        assert!(matches!(apm_error(&err), Some(ApmError::RootNotSet)));
    }

    #[test]
    fn test_empty_root_is_not_set() {
        let runtime = runtime_with(Some(""), None);
        let err = Config::new(runtime, Some(PathBuf::new()), None).err().unwrap();
        assert!(matches!(apm_error(&err), Some(ApmError::RootNotSet)));
    }

    #[test]
    fn test_github_locator_registered() {
        let runtime = runtime_with(None, None);
        let config = Config::new(runtime, Some(PathBuf::from("/apm")), None).unwrap();
        assert_eq!(config.locators.hosts(), vec!["github.com"]);
    }
}

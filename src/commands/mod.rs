use anyhow::Result;
use log::debug;
use std::path::PathBuf;
use std::sync::Arc;

use crate::{
    application::{GetUseCase, Installed, ListAction, ShowAction},
    archive::TarGzExtractor,
    cleanup::new_shared,
    install::ArchiveInstaller,
    package::{PackageLayout, PackageRegistry, Repository},
    runtime::Runtime,
};

pub mod config;

use config::Config;

/// Install a package and print where it landed
#[tracing::instrument(skip(runtime, root, api_url))]
pub async fn get<R: Runtime + 'static>(
    runtime: R,
    identifier: &str,
    root: Option<PathBuf>,
    api_url: Option<String>,
) -> Result<()> {
    let config = Config::new(runtime, root, api_url)?;
    let installed = run_get(identifier, &config).await?;
    println!("{}", format_installed(&installed));
    Ok(())
}

#[tracing::instrument(skip(config))]
pub async fn run_get<R: Runtime + 'static>(identifier: &str, config: &Config<R>) -> Result<Installed> {
    let use_case = GetUseCase::new(
        &config.locators,
        PackageRegistry::new(&config.runtime, config.layout.clone()),
        ArchiveInstaller::new(
            &config.runtime,
            config.http_client.clone(),
            TarGzExtractor,
            config.layout.clone(),
        ),
    );

    // Set up cleanup context for Ctrl-C handling
    let cleanup_ctx = new_shared();
    let cleanup_ctx_clone = Arc::clone(&cleanup_ctx);

    let ctrl_c_handler = tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            eprintln!("\nInterrupted, cleaning up...");
            if let Ok(ctx) = cleanup_ctx_clone.lock() {
                ctx.cleanup();
            }
            std::process::exit(130); // Standard exit code for Ctrl-C
        }
    });

    let result = use_case.get(identifier, cleanup_ctx).await;

    // Installation finished either way
    ctrl_c_handler.abort();

    result
}

/// List all installed packages
#[tracing::instrument(skip(runtime, root))]
pub fn list<R: Runtime>(runtime: R, root: Option<PathBuf>) -> Result<()> {
    let config = Config::new(runtime, root, None)?;
    debug!("Listing packages from {:?}", config.layout.packages_dir());

    let packages = ListAction::new(&config.runtime, config.layout.clone()).list_packages()?;
    if packages.is_empty() {
        println!("No packages installed.");
        return Ok(());
    }

    debug!("Found {} package(s)", packages.len());
    for repo in packages {
        println!("{}", repo);
    }
    Ok(())
}

/// Show installed package details
#[tracing::instrument(skip(runtime, root))]
pub fn show<R: Runtime>(runtime: R, identifier: &str, root: Option<PathBuf>) -> Result<()> {
    let config = Config::new(runtime, root, None)?;
    let repos = ShowAction::new(&config.runtime, config.layout.clone()).show(identifier)?;

    let details: Vec<String> = repos
        .iter()
        .map(|repo| format_repository(repo, &config.layout))
        .collect();
    println!("{}", details.join("\n"));
    Ok(())
}

fn format_installed(installed: &Installed) -> String {
    format!(
        "Installed {} to {}",
        installed.identifier,
        installed.path.display()
    )
}

fn format_repository(repo: &Repository, layout: &PackageLayout) -> String {
    let path = layout.package_dir(&repo.host, &repo.author, &repo.name, &repo.version);
    let mut out = format!("{}\n  Path: {}\n", repo, path.display());
    if repo.deps.is_empty() {
        out.push_str("  Dependencies: (none)\n");
    } else {
        out.push_str("  Dependencies:\n");
        for dep in &repo.deps {
            out.push_str(&format!("    {}@{}\n", dep.url, dep.version));
        }
    }
    out
}

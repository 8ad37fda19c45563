use anyhow::Result;
use apm::commands::{get, list, show};
use clap::Parser;
use std::path::PathBuf;

/// apm - Arrietty package manager
///
/// Fetch released packages from source hosts and install them under a
/// local package root.
///
/// The package root comes from --root or the ARRIETTY_PM_PATH environment
/// variable. If GITHUB_TOKEN is set, it will be used for authentication.
///
/// Examples:
///   apm get github.com/acme/widget          # Install the latest release
///   apm get github.com/acme/widget@v1.0.0   # Install a specific release
#[derive(Parser, Debug)]
#[command(author, version = env!("APM_VERSION"), about)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Package root directory (also via ARRIETTY_PM_PATH)
    #[arg(
        long = "root",
        short = 'r',
        env = "ARRIETTY_PM_PATH",
        value_name = "PATH",
        global = true
    )]
    pub root: Option<PathBuf>,

    /// GitHub API URL (defaults to https://api.github.com)
    #[arg(long = "api-url", value_name = "URL", global = true)]
    pub api_url: Option<String>,
}

#[derive(clap::Subcommand, Debug)]
enum Commands {
    /// Install a package release
    Get(GetArgs),

    /// List installed packages
    List,

    /// Show an installed package and its dependencies
    Show(ShowArgs),
}

#[derive(clap::Args, Debug)]
pub struct GetArgs {
    /// Package in the format "host/author/repo[@version]"
    #[arg(value_name = "IDENTIFIER")]
    pub identifier: String,
}

#[derive(clap::Args, Debug)]
pub struct ShowArgs {
    /// Package in the format "host/author/repo[@version]"
    #[arg(value_name = "IDENTIFIER")]
    pub identifier: String,
}

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();
    let cli = Cli::parse();
    let runtime = apm::runtime::RealRuntime;

    match cli.command {
        Commands::Get(args) => get(runtime, &args.identifier, cli.root, cli.api_url).await?,
        Commands::List => list(runtime, cli.root)?,
        Commands::Show(args) => show(runtime, &args.identifier, cli.root)?,
    }
    Ok(())
}

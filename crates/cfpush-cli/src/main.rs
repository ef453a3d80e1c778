//! cfpush CLI tool.

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

mod commands;

#[derive(Parser)]
#[command(name = "cfpush")]
#[command(about = "Push application manifests to a Cloud Foundry space", long_about = None)]
struct Cli {
    /// Cloud Controller API endpoint
    #[arg(long, env = "CF_API", global = true)]
    api: Option<String>,

    /// OAuth bearer token
    #[arg(long, env = "CF_TOKEN", global = true, hide_env_values = true)]
    token: Option<String>,

    /// Target configuration file
    #[arg(long, default_value = "cfpush.kdl", global = true)]
    config: PathBuf,

    /// Log at debug level unless RUST_LOG says otherwise
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

/// Options shared by every command that reads a manifest.
#[derive(Args, Clone)]
struct ManifestArgs {
    /// Path to the manifest
    #[arg(default_value = "manifest.yml")]
    manifest: PathBuf,

    /// Variable substitution, as name=value (repeatable)
    #[arg(long = "var", value_name = "NAME=VALUE")]
    vars: Vec<String>,

    /// YAML file of variable values (repeatable)
    #[arg(long = "vars-file", value_name = "PATH")]
    vars_files: Vec<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Push every application of a manifest
    Push {
        #[command(flatten)]
        manifest: ManifestArgs,

        /// Space to push into
        #[arg(long, env = "CF_SPACE_GUID")]
        space: Option<String>,
    },
    /// Validate a manifest without contacting the platform
    Validate {
        #[command(flatten)]
        manifest: ManifestArgs,
    },
    /// Show how each declared route would be interpreted
    Routes {
        #[command(flatten)]
        manifest: ManifestArgs,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let default_level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_writer(std::io::stderr)
        .init();

    match &cli.command {
        Commands::Push { manifest, space } => {
            let target = commands::resolve_target(
                &cli.config,
                cli.api.as_deref(),
                cli.token.as_deref(),
                space.as_deref(),
            )?;
            commands::push::run(target, manifest).await?;
        }
        Commands::Validate { manifest } => {
            commands::validate(manifest)?;
        }
        Commands::Routes { manifest } => {
            commands::routes::show(manifest)?;
        }
    }

    Ok(())
}

//! CLI command implementations.

pub mod push;
pub mod routes;

use anyhow::{Context, Result, bail};
use cfpush_config::manifest::load_manifest;
use cfpush_config::target::{load_target_config, parse_api_url, parse_space_guid};
use cfpush_config::{Manifest, ManifestVariables, TargetConfig};
use std::path::Path;
use tracing::debug;

use crate::ManifestArgs;

/// Combine the configuration file with command line overrides.
///
/// The file is optional when `--api` is given. Flags win over the file.
pub fn resolve_target(
    config_path: &Path,
    api: Option<&str>,
    token: Option<&str>,
    space: Option<&str>,
) -> Result<TargetConfig> {
    let file = if config_path.exists() {
        debug!(path = %config_path.display(), "Loading target configuration");
        Some(
            load_target_config(config_path).with_context(|| {
                format!("Failed to load target config: {}", config_path.display())
            })?,
        )
    } else {
        None
    };

    let mut target = match (api, file) {
        (Some(raw), Some(mut file)) => {
            file.api = parse_api_url(raw)?;
            file
        }
        (Some(raw), None) => TargetConfig::new(parse_api_url(raw)?),
        (None, Some(file)) => file,
        (None, None) => bail!(
            "No API endpoint: pass --api, set CF_API or create {}",
            config_path.display()
        ),
    };

    if let Some(token) = token {
        target.token = Some(token.to_string());
    }
    if let Some(space) = space {
        target.space = Some(parse_space_guid(space)?);
    }

    Ok(target)
}

/// Read `--var` and `--vars-file` values, then load the manifest.
pub fn load(args: &ManifestArgs) -> Result<Manifest> {
    let mut vars = ManifestVariables::new();
    for path in &args.vars_files {
        vars.merge_file(path)
            .with_context(|| format!("Failed to read vars file: {}", path.display()))?;
    }
    for pair in &args.vars {
        vars.set_pair(pair)?;
    }

    let manifest = load_manifest(&args.manifest, &vars)
        .with_context(|| format!("Failed to load manifest: {}", args.manifest.display()))?;
    Ok(manifest)
}

pub fn validate(args: &ManifestArgs) -> Result<()> {
    match load(args) {
        Ok(manifest) => {
            println!(
                "Manifest is valid ({} application(s))",
                manifest.applications.len()
            );
            Ok(())
        }
        Err(e) => {
            println!("Manifest error: {:#}", e);
            std::process::exit(1);
        }
    }
}

//! Application manifest parsing.
//!
//! A manifest declares one or more applications:
//!
//! ```yaml
//! applications:
//! - name: web
//!   memory: 512M
//!   docker:
//!     image: registry.example.com/web:1.4
//!   routes:
//!   - route: web.apps.example.com
//!   services:
//!   - web-db
//! ```
//!
//! Every entry is validated when the manifest is loaded.

use cfpush_core::application::{Environment, ExtraFields, HealthCheckType};
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::{ConfigError, ConfigResult, ManifestVariables};

/// Root of a manifest file.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Manifest {
    /// Manifest schema version
    #[serde(default)]
    pub version: Option<u32>,

    #[serde(default)]
    pub applications: Vec<AppManifest>,
}

/// One application entry.
///
/// Keys without a typed field land in `extra` and are passed through to the
/// application request unchanged.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AppManifest {
    pub name: String,

    /// Directory or archive holding the application bits
    #[serde(default)]
    pub path: Option<PathBuf>,

    #[serde(default)]
    pub stack: Option<String>,

    #[serde(default)]
    pub buildpack: Option<String>,

    #[serde(default)]
    pub command: Option<String>,

    /// Memory limit in megabytes
    #[serde(default, deserialize_with = "deserialize_megabytes")]
    pub memory: Option<u64>,

    /// Disk limit in megabytes
    #[serde(default, deserialize_with = "deserialize_megabytes")]
    pub disk_quota: Option<u64>,

    #[serde(default)]
    pub instances: Option<u32>,

    #[serde(default)]
    pub env: Environment,

    /// Names of service instances to bind
    #[serde(default)]
    pub services: Vec<String>,

    #[serde(default)]
    pub routes: Vec<RouteDeclaration>,

    #[serde(default, rename = "no-route")]
    pub no_route: bool,

    #[serde(default, rename = "random-route")]
    pub random_route: bool,

    #[serde(default)]
    pub docker: Option<DockerManifest>,

    #[serde(default, rename = "health-check-type")]
    pub health_check_type: Option<HealthCheckType>,

    #[serde(default, rename = "health-check-http-endpoint")]
    pub health_check_http_endpoint: Option<String>,

    /// Health check timeout in seconds
    #[serde(default)]
    pub timeout: Option<u32>,

    #[serde(flatten)]
    pub extra: ExtraFields,
}

/// Docker image source for an application.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DockerManifest {
    #[serde(default)]
    pub image: Option<String>,
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub password: Option<String>,
}

/// A declared route, e.g. `myhost.apps.example.com/api` or `tcp.example.com:4444`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RouteDeclaration {
    pub route: String,
}

impl RouteDeclaration {
    pub fn new(route: impl Into<String>) -> Self {
        Self {
            route: route.into(),
        }
    }
}

impl AppManifest {
    /// Entry deploys a docker image rather than uploaded bits.
    ///
    /// An entry with both `path` and `docker` is pushed from its bits.
    pub fn is_docker(&self) -> bool {
        self.docker.is_some() && self.path.is_none()
    }
}

/// Parse and validate a manifest from YAML text.
pub fn parse_manifest(yaml: &str) -> ConfigResult<Manifest> {
    let manifest: Manifest = serde_yaml::from_str(yaml)?;
    validate_manifest(&manifest)?;
    debug!(applications = manifest.applications.len(), "Parsed manifest");
    Ok(manifest)
}

/// Load a manifest from disk, interpolating `((var))` placeholders first.
///
/// Relative application paths are resolved against the manifest's directory.
pub fn load_manifest(path: &Path, vars: &ManifestVariables) -> ConfigResult<Manifest> {
    let content = std::fs::read_to_string(path)?;
    let content = vars.interpolate(&content)?;
    let mut manifest = parse_manifest(&content)?;

    let base = path.parent().unwrap_or_else(|| Path::new("."));
    for app in &mut manifest.applications {
        if let Some(app_path) = &app.path {
            if app_path.is_relative() {
                app.path = Some(base.join(app_path));
            }
        }
    }

    Ok(manifest)
}

fn validate_manifest(manifest: &Manifest) -> ConfigResult<()> {
    let mut seen = HashSet::new();

    for (idx, app) in manifest.applications.iter().enumerate() {
        if app.name.trim().is_empty() {
            return Err(ConfigError::MissingField(format!(
                "name for application #{}",
                idx + 1
            )));
        }

        if !seen.insert(app.name.as_str()) {
            return Err(ConfigError::Duplicate(format!("application '{}'", app.name)));
        }

        if app.path.is_some() && app.docker.is_some() {
            debug!(app = %app.name, "Both path and docker set, pushing from path");
        }

        if let Some(route) = app.routes.iter().find(|r| r.route.trim().is_empty()) {
            return Err(ConfigError::InvalidValue {
                field: format!("{}.routes", app.name),
                message: format!("empty route '{}'", route.route),
            });
        }

        if app.services.iter().any(|s| s.trim().is_empty()) {
            return Err(ConfigError::InvalidValue {
                field: format!("{}.services", app.name),
                message: "empty service name".to_string(),
            });
        }
    }

    Ok(())
}

/// Parse a size such as `512M`, `1G` or `256MB` into megabytes.
pub fn parse_megabytes(input: &str) -> Result<u64, String> {
    let trimmed = input.trim();
    let upper = trimmed.to_ascii_uppercase();
    let split = upper
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(upper.len());
    let (digits, unit) = upper.split_at(split);

    let amount: u64 = digits
        .parse()
        .map_err(|_| format!("invalid size '{}'", trimmed))?;

    let multiplier = match unit.trim() {
        "M" | "MB" => 1,
        "G" | "GB" => 1024,
        "" => return Err(format!("size '{}' needs a unit (M or G)", trimmed)),
        other => return Err(format!("unknown size unit '{}' in '{}'", other, trimmed)),
    };

    amount
        .checked_mul(multiplier)
        .ok_or_else(|| format!("size '{}' is too large", trimmed))
}

fn deserialize_megabytes<'de, D>(deserializer: D) -> Result<Option<u64>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum RawSize {
        Megabytes(u64),
        Text(String),
    }

    match Option::<RawSize>::deserialize(deserializer)? {
        None => Ok(None),
        Some(RawSize::Megabytes(mb)) => Ok(Some(mb)),
        Some(RawSize::Text(text)) => parse_megabytes(&text)
            .map(Some)
            .map_err(serde::de::Error::custom),
    }
}

//! Target configuration parsing.
//!
//! Tells the CLI which platform to talk to and where to push:
//!
//! ```kdl
//! api "https://api.sys.example.com"
//! token "bearer-token"
//! space "0d6f7c2e-4b7a-4f8e-9e35-6c2a1c9b1f52"
//! skip-ssl-validation false
//! ```

use cfpush_core::Guid;
use kdl::{KdlDocument, KdlNode};
use url::Url;

use crate::{ConfigError, ConfigResult};

/// Platform endpoint and deployment scope.
#[derive(Debug, Clone, PartialEq)]
pub struct TargetConfig {
    /// Cloud Controller API endpoint.
    pub api: Url,
    /// OAuth bearer token; usually supplied through the environment instead.
    pub token: Option<String>,
    /// Space to push into.
    pub space: Option<Guid>,
    pub skip_ssl_validation: bool,
}

impl TargetConfig {
    pub fn new(api: Url) -> Self {
        Self {
            api,
            token: None,
            space: None,
            skip_ssl_validation: false,
        }
    }
}

/// Parse target configuration from KDL text.
pub fn parse_target_config(kdl: &str) -> ConfigResult<TargetConfig> {
    let doc: KdlDocument = kdl.parse()?;

    let mut api = None;
    let mut token = None;
    let mut space = None;
    let mut skip_ssl_validation = false;

    for node in doc.nodes() {
        match node.name().value() {
            "api" => {
                let raw = get_first_string_arg(node)
                    .ok_or_else(|| ConfigError::MissingField("api endpoint".to_string()))?;
                api = Some(parse_api_url(&raw)?);
            }
            "token" => {
                token = get_first_string_arg(node);
            }
            "space" => {
                let raw = get_first_string_arg(node)
                    .ok_or_else(|| ConfigError::MissingField("space guid".to_string()))?;
                space = Some(parse_space_guid(&raw)?);
            }
            "skip-ssl-validation" | "skip_ssl_validation" => {
                skip_ssl_validation = get_first_bool_arg(node).unwrap_or(true);
            }
            _ => {} // Ignore unknown nodes
        }
    }

    let api = api.ok_or_else(|| ConfigError::MissingField("api endpoint".to_string()))?;

    Ok(TargetConfig {
        api,
        token,
        space,
        skip_ssl_validation,
    })
}

/// Read and parse a target configuration file.
pub fn load_target_config(path: &std::path::Path) -> ConfigResult<TargetConfig> {
    let content = std::fs::read_to_string(path)?;
    parse_target_config(&content)
}

pub fn parse_api_url(raw: &str) -> ConfigResult<Url> {
    let url = Url::parse(raw).map_err(|e| ConfigError::InvalidValue {
        field: "api".to_string(),
        message: e.to_string(),
    })?;
    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(ConfigError::InvalidValue {
            field: "api".to_string(),
            message: format!("unsupported scheme '{}'", url.scheme()),
        });
    }
    Ok(url)
}

pub fn parse_space_guid(raw: &str) -> ConfigResult<Guid> {
    raw.parse::<Guid>().map_err(|e| ConfigError::InvalidValue {
        field: "space".to_string(),
        message: e.to_string(),
    })
}

// Helper functions for extracting values from KDL nodes

fn get_first_string_arg(node: &KdlNode) -> Option<String> {
    node.entries()
        .iter()
        .find(|e| e.name().is_none())
        .and_then(|e| e.value().as_string())
        .map(|s| s.to_string())
}

fn get_first_bool_arg(node: &KdlNode) -> Option<bool> {
    node.entries()
        .iter()
        .find(|e| e.name().is_none())
        .and_then(|e| e.value().as_bool())
}

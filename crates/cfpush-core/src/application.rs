//! Application types.
//!
//! An `App` is the platform's record of a deployed application. It is only
//! held for the lifetime of a single push; nothing is cached between pushes.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

use crate::Guid;

/// Environment variables as stored on the platform (`environment_json`).
pub type Environment = BTreeMap<String, Value>;

/// Manifest keys with no typed field, passed through as-is.
pub type ExtraFields = BTreeMap<String, Value>;

/// Run state of an application.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum AppState {
    Started,
    #[default]
    Stopped,
}

impl std::fmt::Display for AppState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AppState::Started => write!(f, "STARTED"),
            AppState::Stopped => write!(f, "STOPPED"),
        }
    }
}

/// How the platform decides an application instance is healthy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HealthCheckType {
    Port,
    Process,
    Http,
    None,
}

impl std::fmt::Display for HealthCheckType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            HealthCheckType::Port => write!(f, "port"),
            HealthCheckType::Process => write!(f, "process"),
            HealthCheckType::Http => write!(f, "http"),
            HealthCheckType::None => write!(f, "none"),
        }
    }
}

impl std::str::FromStr for HealthCheckType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "port" => Ok(HealthCheckType::Port),
            "process" => Ok(HealthCheckType::Process),
            "http" => Ok(HealthCheckType::Http),
            "none" => Ok(HealthCheckType::None),
            other => Err(format!("unknown health check type: {}", other)),
        }
    }
}

/// An application as reported by the platform.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct App {
    pub guid: Guid,
    pub name: String,
    pub space_guid: Guid,
    pub stack_guid: Option<Guid>,
    /// User-provided environment variables
    pub environment_json: Environment,
    pub health_check_type: Option<HealthCheckType>,
    pub health_check_http_endpoint: Option<String>,
    pub docker_image: Option<String>,
    pub state: AppState,
}

/// Registry credentials for pulling a private docker image.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DockerCredentials {
    pub username: String,
    pub password: String,
}

/// Payload for creating or updating an application.
///
/// Absent fields are left out of the serialized body so an update only
/// touches what the manifest declares.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AppRequest {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub space_guid: Option<Guid>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stack_guid: Option<Guid>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub buildpack: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub command: Option<String>,
    /// Memory limit in megabytes
    #[serde(skip_serializing_if = "Option::is_none")]
    pub memory: Option<u64>,
    /// Disk limit in megabytes
    #[serde(skip_serializing_if = "Option::is_none")]
    pub disk_quota: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub instances: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub environment_json: Option<Environment>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub health_check_type: Option<HealthCheckType>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub health_check_http_endpoint: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub health_check_timeout: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub docker_image: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub docker_credentials: Option<DockerCredentials>,
    /// Run on the diego backend
    #[serde(skip_serializing_if = "Option::is_none")]
    pub diego: Option<bool>,
    /// Untyped manifest keys; typed fields take precedence
    #[serde(flatten)]
    pub extra: ExtraFields,
}

impl AppRequest {
    /// Serialized names of the typed fields.
    pub const FIELDS: &'static [&'static str] = &[
        "name",
        "space_guid",
        "stack_guid",
        "buildpack",
        "command",
        "memory",
        "disk_quota",
        "instances",
        "environment_json",
        "health_check_type",
        "health_check_http_endpoint",
        "health_check_timeout",
        "docker_image",
        "docker_credentials",
        "diego",
    ];

    /// Set the pass-through keys, dropping any that a typed field owns.
    pub fn set_extra(&mut self, extra: &ExtraFields) {
        self.extra = extra
            .iter()
            .filter(|(key, _)| !Self::FIELDS.contains(&key.as_str()))
            .map(|(key, value)| (key.clone(), value.clone()))
            .collect();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_omits_absent_fields() {
        let request = AppRequest {
            name: "web".to_string(),
            memory: Some(256),
            ..Default::default()
        };

        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json, serde_json::json!({"name": "web", "memory": 256}));
    }

    #[test]
    fn test_extra_keys_flattened_into_body() {
        let mut extra = ExtraFields::new();
        extra.insert("buildpacks".to_string(), serde_json::json!(["ruby_buildpack"]));
        extra.insert("memory".to_string(), serde_json::json!("1G"));

        let mut request = AppRequest {
            name: "web".to_string(),
            memory: Some(512),
            ..Default::default()
        };
        request.set_extra(&extra);

        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "name": "web",
                "memory": 512,
                "buildpacks": ["ruby_buildpack"]
            })
        );
    }

    #[test]
    fn test_health_check_type_wire_format() {
        let json = serde_json::to_string(&HealthCheckType::Http).unwrap();
        assert_eq!(json, "\"http\"");
        assert_eq!("process".parse::<HealthCheckType>(), Ok(HealthCheckType::Process));
        assert!("tcp".parse::<HealthCheckType>().is_err());
    }

    #[test]
    fn test_app_state_wire_format() {
        let state: AppState = serde_json::from_str("\"STARTED\"").unwrap();
        assert_eq!(state, AppState::Started);
        assert_eq!(AppState::default(), AppState::Stopped);
        assert_eq!(AppState::Stopped.to_string(), "STOPPED");
    }
}

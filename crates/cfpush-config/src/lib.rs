//! Configuration parsing for cfpush.
//!
//! This crate handles parsing of:
//! - Application manifests (manifest.yml)
//! - `((var))` interpolation in manifests
//! - Target configuration (cfpush.kdl)

pub mod error;
pub mod manifest;
pub mod target;
pub mod variables;

pub use error::{ConfigError, ConfigResult};
pub use manifest::{AppManifest, DockerManifest, Manifest, RouteDeclaration};
pub use target::TargetConfig;
pub use variables::ManifestVariables;

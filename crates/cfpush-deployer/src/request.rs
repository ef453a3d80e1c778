//! Building application create/update payloads from manifest entries.

use cfpush_config::AppManifest;
use cfpush_core::application::{
    App, AppRequest, DockerCredentials, Environment, HealthCheckType,
};
use cfpush_core::platform::Platform;
use cfpush_core::{Error, Guid, Result};
use tracing::debug;

/// Endpoint probed by `http` health checks when none is configured.
pub const DEFAULT_HEALTH_CHECK_ENDPOINT: &str = "/";

/// Payload for creating a new application in `space`.
///
/// The manifest environment is taken as-is.
pub async fn build_create_request(
    platform: &dyn Platform,
    manifest: &AppManifest,
    space: &Guid,
) -> Result<AppRequest> {
    let mut request = build_request(platform, manifest).await?;
    request.space_guid = Some(*space);
    if !manifest.env.is_empty() {
        request.environment_json = Some(manifest.env.clone());
    }

    if request.health_check_type == Some(HealthCheckType::Http)
        && request.health_check_http_endpoint.is_none()
    {
        request.health_check_http_endpoint = Some(DEFAULT_HEALTH_CHECK_ENDPOINT.to_string());
    }

    Ok(request)
}

/// Payload for updating `existing` to match the manifest.
///
/// The environment is merged onto the application's current one, and an
/// endpoint already configured on the application is never reset.
pub async fn build_update_request(
    platform: &dyn Platform,
    manifest: &AppManifest,
    existing: &App,
) -> Result<AppRequest> {
    let mut request = build_request(platform, manifest).await?;
    request.environment_json = Some(merge_environment(
        &existing.environment_json,
        &manifest.env,
    ));

    if request.health_check_type == Some(HealthCheckType::Http)
        && request.health_check_http_endpoint.is_none()
        && existing.health_check_http_endpoint.is_none()
    {
        request.health_check_http_endpoint = Some(DEFAULT_HEALTH_CHECK_ENDPOINT.to_string());
    }

    Ok(request)
}

/// Manifest values win on key collision.
pub fn merge_environment(existing: &Environment, declared: &Environment) -> Environment {
    let mut merged = existing.clone();
    merged.extend(declared.iter().map(|(k, v)| (k.clone(), v.clone())));
    merged
}

async fn build_request(platform: &dyn Platform, manifest: &AppManifest) -> Result<AppRequest> {
    let mut request = AppRequest {
        name: manifest.name.clone(),
        buildpack: manifest.buildpack.clone(),
        command: manifest.command.clone(),
        memory: manifest.memory,
        disk_quota: manifest.disk_quota,
        instances: manifest.instances,
        health_check_type: manifest.health_check_type,
        health_check_http_endpoint: manifest.health_check_http_endpoint.clone(),
        health_check_timeout: manifest.timeout,
        ..Default::default()
    };
    request.set_extra(&manifest.extra);

    if let Some(stack_name) = &manifest.stack {
        let stack = platform
            .find_stacks(stack_name)
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| Error::NotFound(format!("stack {}", stack_name)))?;
        debug!(stack = %stack_name, guid = %stack.guid, "Resolved stack");
        request.stack_guid = Some(stack.guid);
    }

    if let Some(docker) = &manifest.docker {
        if let Some(image) = &docker.image {
            request.docker_image = Some(image.clone());
            request.diego = Some(true);
            if let (Some(username), Some(password)) = (&docker.username, &docker.password) {
                request.docker_credentials = Some(DockerCredentials {
                    username: username.clone(),
                    password: password.clone(),
                });
            }
        }
    }

    Ok(request)
}

//! Push orchestrator - deploys every application of a manifest in order.

use cfpush_config::{AppManifest, Manifest};
use cfpush_core::application::App;
use cfpush_core::platform::{Platform, Uploader};
use cfpush_core::space::{ServiceBinding, Space};
use cfpush_core::{Error, Guid, Result};
use std::sync::Arc;
use tracing::{info, warn};

use crate::resolver::{AppAction, resolve_application};
use crate::routes::{RouteOutcome, reconcile_routes};
use crate::services::bind_services;

/// Result of pushing one manifest entry.
#[derive(Debug, Clone)]
pub struct PushReport {
    /// The application after restart.
    pub app: App,
    pub action: AppAction,
    pub routes: RouteOutcome,
    /// Whether application bits were uploaded
    pub uploaded: bool,
    pub bindings: Vec<ServiceBinding>,
}

/// Orchestrates pushing a manifest to a space.
pub struct PushOperation {
    platform: Arc<dyn Platform>,
    uploader: Option<Arc<dyn Uploader>>,
}

impl PushOperation {
    pub fn new(platform: Arc<dyn Platform>) -> Self {
        Self {
            platform,
            uploader: None,
        }
    }

    /// Enable pushing `path`-based (non-docker) applications.
    pub fn with_uploader(mut self, uploader: Arc<dyn Uploader>) -> Self {
        self.uploader = Some(uploader);
        self
    }

    /// Push every application of `manifest` into the space.
    ///
    /// Entries are processed one at a time; the first failure aborts the
    /// push and nothing already done is rolled back.
    pub async fn push(&self, space_guid: &Guid, manifest: &Manifest) -> Result<Vec<PushReport>> {
        let space = self.platform.get_space(space_guid).await?;
        info!(space = %space.name, applications = manifest.applications.len(), "Starting push");

        let mut reports = Vec::new();
        for entry in &manifest.applications {
            if let Some(report) = self.push_entry(&space, entry).await? {
                reports.push(report);
            }
        }

        Ok(reports)
    }

    /// Push a single manifest entry.
    ///
    /// Returns `None` for entries that declare neither `docker` nor `path`.
    pub async fn push_entry(
        &self,
        space: &Space,
        entry: &AppManifest,
    ) -> Result<Option<PushReport>> {
        if entry.docker.is_none() && entry.path.is_none() {
            warn!(app = %entry.name, "Skipping application with neither docker nor path");
            return Ok(None);
        }

        let platform = self.platform.as_ref();

        let resolution = resolve_application(platform, space, entry).await?;
        let app = resolution.app;

        let routes = reconcile_routes(platform, space, &app, entry).await?;

        let uploaded = match &entry.path {
            Some(path) if !entry.is_docker() => {
                let uploader = self.uploader.as_ref().ok_or_else(|| {
                    Error::Unsupported(format!(
                        "uploading application bits for {} (no uploader configured)",
                        entry.name
                    ))
                })?;
                uploader.upload(&app, path).await?;
                info!(app = %app.name, path = %path.display(), "Uploaded application bits");
                true
            }
            _ => false,
        };

        let bindings = bind_services(platform, space, &app, &entry.services).await?;

        let app = restart(platform, &app).await?;
        info!(app = %app.name, action = %resolution.action, "Pushed application");

        Ok(Some(PushReport {
            app,
            action: resolution.action,
            routes,
            uploaded,
            bindings,
        }))
    }
}

/// Stop then start the application, whether or not anything changed.
pub async fn restart(platform: &dyn Platform, app: &App) -> Result<App> {
    platform.stop_app(&app.guid).await?;
    info!(app = %app.name, "Stopped application");
    let app = platform.start_app(&app.guid).await?;
    info!(app = %app.name, "Started application");
    Ok(app)
}

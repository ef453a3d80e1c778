//! Ensuring an application record exists and reflects its manifest entry.

use cfpush_config::AppManifest;
use cfpush_core::application::App;
use cfpush_core::platform::Platform;
use cfpush_core::space::Space;
use cfpush_core::{Error, Result};
use tracing::info;

use crate::request::{build_create_request, build_update_request};

/// What happened to the application record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppAction {
    Created,
    Updated,
}

impl std::fmt::Display for AppAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AppAction::Created => write!(f, "created"),
            AppAction::Updated => write!(f, "updated"),
        }
    }
}

/// The application after create/update.
#[derive(Debug, Clone)]
pub struct Resolution {
    pub app: App,
    pub action: AppAction,
}

/// Create the application if the space has none by that name, update it otherwise.
///
/// More than one match is reported as `AmbiguousApplication` rather than
/// picking one arbitrarily.
pub async fn resolve_application(
    platform: &dyn Platform,
    space: &Space,
    manifest: &AppManifest,
) -> Result<Resolution> {
    let mut matches = platform.find_apps(&space.guid, &manifest.name).await?;

    match matches.len() {
        0 => {
            let request = build_create_request(platform, manifest, &space.guid).await?;
            let app = platform.create_app(&request).await?;
            info!(app = %app.name, guid = %app.guid, "Created application");
            Ok(Resolution {
                app,
                action: AppAction::Created,
            })
        }
        1 => {
            let existing = matches.remove(0);
            let request = build_update_request(platform, manifest, &existing).await?;
            let app = platform.update_app(&existing.guid, &request).await?;
            info!(app = %app.name, guid = %app.guid, "Updated application");
            Ok(Resolution {
                app,
                action: AppAction::Updated,
            })
        }
        n => Err(Error::AmbiguousApplication(format!(
            "{} ({} matches in space {})",
            manifest.name, n, space.name
        ))),
    }
}

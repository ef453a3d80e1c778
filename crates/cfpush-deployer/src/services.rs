//! Binding service instances to an application.

use cfpush_core::application::App;
use cfpush_core::platform::Platform;
use cfpush_core::space::{ServiceBinding, Space};
use cfpush_core::{Error, Result};
use tracing::info;

/// Bind every named service instance in `space` to `app`.
///
/// All names are looked up before the first binding is created, so a
/// missing instance leaves the application unbound. Re-binding an already
/// bound instance surfaces the platform's own conflict error.
pub async fn bind_services(
    platform: &dyn Platform,
    space: &Space,
    app: &App,
    services: &[String],
) -> Result<Vec<ServiceBinding>> {
    let mut instances = Vec::with_capacity(services.len());
    for name in services {
        let instance = platform
            .find_service_instances(&space.guid, name)
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| Error::ServiceNotFound(name.clone()))?;
        instances.push(instance);
    }

    let mut bindings = Vec::with_capacity(instances.len());
    for instance in instances {
        let binding = platform
            .create_service_binding(&app.guid, &instance.guid)
            .await?;
        info!(app = %app.name, service = %instance.name, "Bound service");
        bindings.push(binding);
    }

    Ok(bindings)
}

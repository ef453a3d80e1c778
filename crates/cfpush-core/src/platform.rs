//! Platform collaborator traits.
//!
//! The orchestrator never talks HTTP itself. It sequences calls against a
//! `Platform`, which is injected once at construction (the Cloud Controller
//! client in production, an in-memory fake in tests).

use async_trait::async_trait;
use std::path::Path;

use crate::application::{App, AppRequest};
use crate::domain::Domain;
use crate::route::{Route, RouteAddress};
use crate::space::{ServiceBinding, ServiceInstance, Space, Stack};
use crate::{Guid, Result};

/// Remote platform API consumed by a push.
#[async_trait]
pub trait Platform: Send + Sync {
    // Spaces and organizations

    /// Resolve a space by id.
    async fn get_space(&self, space: &Guid) -> Result<Space>;

    /// Domains owned by an organization.
    async fn list_private_domains(&self, organization: &Guid) -> Result<Vec<Domain>>;

    /// Platform-wide domains, in the order the platform lists them.
    async fn list_shared_domains(&self) -> Result<Vec<Domain>>;

    /// Service instances in a space with the given name.
    async fn find_service_instances(&self, space: &Guid, name: &str)
    -> Result<Vec<ServiceInstance>>;

    // Applications

    /// Applications in a space with exactly the given name.
    async fn find_apps(&self, space: &Guid, name: &str) -> Result<Vec<App>>;

    async fn create_app(&self, request: &AppRequest) -> Result<App>;

    async fn update_app(&self, app: &Guid, request: &AppRequest) -> Result<App>;

    /// Routes currently associated to an application.
    async fn app_routes(&self, app: &Guid) -> Result<Vec<Route>>;

    async fn associate_route(&self, app: &Guid, route: &Guid) -> Result<()>;

    /// Detach a route from an application. The route itself survives.
    async fn remove_route(&self, app: &Guid, route: &Guid) -> Result<()>;

    async fn stop_app(&self, app: &Guid) -> Result<App>;

    async fn start_app(&self, app: &Guid) -> Result<App>;

    // Routes

    async fn create_host_route(
        &self,
        domain: &Guid,
        space: &Guid,
        host: &str,
        path: &str,
    ) -> Result<Route>;

    /// Create a TCP route. With no port the platform assigns one.
    async fn create_tcp_route(
        &self,
        domain: &Guid,
        space: &Guid,
        port: Option<u16>,
    ) -> Result<Route>;

    /// Existing routes on `domain` serving `address`, whichever apps they are
    /// associated to.
    async fn find_routes(&self, domain: &Guid, address: &RouteAddress) -> Result<Vec<Route>>;

    // Stacks and service bindings

    async fn find_stacks(&self, name: &str) -> Result<Vec<Stack>>;

    async fn create_service_binding(
        &self,
        app: &Guid,
        service_instance: &Guid,
    ) -> Result<ServiceBinding>;
}

/// Transfers application bits for non-docker pushes.
#[async_trait]
pub trait Uploader: Send + Sync {
    async fn upload(&self, app: &App, path: &Path) -> Result<()>;
}

//! Cloud Controller v2 wire format.
//!
//! Every object comes back as `{"metadata": {"guid": ...}, "entity": {...}}`
//! and lists are paginated through `next_url`.

use cfpush_core::Guid;
use cfpush_core::application::{App, AppState, Environment, HealthCheckType};
use cfpush_core::domain::{Domain, DomainScope};
use cfpush_core::route::Route;
use cfpush_core::space::{ServiceBinding, ServiceInstance, Space, Stack};
use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct Metadata {
    pub guid: Guid,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Resource<E> {
    pub metadata: Metadata,
    pub entity: E,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Page<E> {
    #[serde(default)]
    pub next_url: Option<String>,
    #[serde(default = "Vec::new")]
    pub resources: Vec<Resource<E>>,
}

/// Error body returned with non-2xx statuses.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ErrorBody {
    #[serde(default)]
    pub code: Option<u32>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub error_code: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SpaceEntity {
    pub name: String,
    pub organization_guid: Guid,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DomainEntity {
    pub name: String,
    #[serde(default)]
    pub router_group_type: Option<String>,
    #[serde(default)]
    pub internal: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RouteEntity {
    #[serde(default)]
    pub host: String,
    #[serde(default)]
    pub path: String,
    pub domain_guid: Guid,
    pub space_guid: Guid,
    #[serde(default)]
    pub port: Option<u16>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AppEntity {
    pub name: String,
    pub space_guid: Guid,
    #[serde(default)]
    pub stack_guid: Option<Guid>,
    #[serde(default)]
    pub environment_json: Option<Environment>,
    #[serde(default)]
    pub health_check_type: Option<HealthCheckType>,
    #[serde(default)]
    pub health_check_http_endpoint: Option<String>,
    #[serde(default)]
    pub docker_image: Option<String>,
    #[serde(default)]
    pub state: AppState,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NamedEntity {
    pub name: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServiceBindingEntity {
    pub app_guid: Guid,
    pub service_instance_guid: Guid,
}

impl From<Resource<SpaceEntity>> for Space {
    fn from(r: Resource<SpaceEntity>) -> Self {
        Space {
            guid: r.metadata.guid,
            name: r.entity.name,
            organization_guid: r.entity.organization_guid,
        }
    }
}

/// Domains carry their scope implicitly, through the endpoint they came from.
pub fn into_domain(r: Resource<DomainEntity>, scope: DomainScope) -> Domain {
    Domain {
        guid: r.metadata.guid,
        name: r.entity.name,
        scope,
        router_group_type: r.entity.router_group_type,
        internal: r.entity.internal,
    }
}

impl From<Resource<RouteEntity>> for Route {
    fn from(r: Resource<RouteEntity>) -> Self {
        Route {
            guid: r.metadata.guid,
            domain_guid: r.entity.domain_guid,
            space_guid: r.entity.space_guid,
            host: r.entity.host,
            path: r.entity.path,
            port: r.entity.port,
        }
    }
}

impl From<Resource<AppEntity>> for App {
    fn from(r: Resource<AppEntity>) -> Self {
        App {
            guid: r.metadata.guid,
            name: r.entity.name,
            space_guid: r.entity.space_guid,
            stack_guid: r.entity.stack_guid,
            environment_json: r.entity.environment_json.unwrap_or_default(),
            health_check_type: r.entity.health_check_type,
            health_check_http_endpoint: r.entity.health_check_http_endpoint,
            docker_image: r.entity.docker_image,
            state: r.entity.state,
        }
    }
}

impl From<Resource<NamedEntity>> for Stack {
    fn from(r: Resource<NamedEntity>) -> Self {
        Stack {
            guid: r.metadata.guid,
            name: r.entity.name,
        }
    }
}

impl From<Resource<NamedEntity>> for ServiceInstance {
    fn from(r: Resource<NamedEntity>) -> Self {
        ServiceInstance {
            guid: r.metadata.guid,
            name: r.entity.name,
        }
    }
}

impl From<Resource<ServiceBindingEntity>> for ServiceBinding {
    fn from(r: Resource<ServiceBindingEntity>) -> Self {
        ServiceBinding {
            guid: r.metadata.guid,
            app_guid: r.entity.app_guid,
            service_instance_guid: r.entity.service_instance_guid,
        }
    }
}

//! In-memory platform used by the orchestration tests.

use async_trait::async_trait;
use cfpush_core::application::{App, AppRequest, AppState};
use cfpush_core::domain::{Domain, DomainScope};
use cfpush_core::platform::{Platform, Uploader};
use cfpush_core::route::{Route, RouteAddress};
use cfpush_core::space::{ServiceBinding, ServiceInstance, Space, Stack};
use cfpush_core::{Error, Guid, Result};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

#[derive(Debug, Default)]
pub struct FakeState {
    pub apps: Vec<App>,
    pub routes: Vec<Route>,
    /// (app, route) associations
    pub associations: Vec<(Guid, Guid)>,
    pub private_domains: Vec<Domain>,
    pub shared_domains: Vec<Domain>,
    pub stacks: Vec<Stack>,
    pub service_instances: Vec<ServiceInstance>,
    pub bindings: Vec<ServiceBinding>,
    pub created_requests: Vec<AppRequest>,
    pub updated_requests: Vec<AppRequest>,
    /// Mutating calls in order, e.g. `create_app web`
    pub calls: Vec<String>,
    next_port: u16,
}

pub struct FakePlatform {
    pub space: Space,
    pub state: Mutex<FakeState>,
}

impl FakePlatform {
    pub fn new() -> Self {
        Self {
            space: Space {
                guid: Guid::new(),
                name: "dev".to_string(),
                organization_guid: Guid::new(),
            },
            state: Mutex::new(FakeState {
                next_port: 61000,
                ..Default::default()
            }),
        }
    }

    pub fn add_private_domain(&self, name: &str) -> Domain {
        let domain = make_domain(name, DomainScope::Private, None, false);
        self.state.lock().unwrap().private_domains.push(domain.clone());
        domain
    }

    pub fn add_shared_domain(&self, name: &str) -> Domain {
        let domain = make_domain(name, DomainScope::Shared, None, false);
        self.state.lock().unwrap().shared_domains.push(domain.clone());
        domain
    }

    pub fn add_internal_domain(&self, name: &str) -> Domain {
        let domain = make_domain(name, DomainScope::Shared, None, true);
        self.state.lock().unwrap().shared_domains.push(domain.clone());
        domain
    }

    pub fn add_tcp_domain(&self, name: &str) -> Domain {
        let domain = make_domain(name, DomainScope::Shared, Some("tcp"), false);
        self.state.lock().unwrap().shared_domains.push(domain.clone());
        domain
    }

    pub fn add_stack(&self, name: &str) -> Stack {
        let stack = Stack {
            guid: Guid::new(),
            name: name.to_string(),
        };
        self.state.lock().unwrap().stacks.push(stack.clone());
        stack
    }

    pub fn add_service_instance(&self, name: &str) -> ServiceInstance {
        let instance = ServiceInstance {
            guid: Guid::new(),
            name: name.to_string(),
        };
        self.state
            .lock()
            .unwrap()
            .service_instances
            .push(instance.clone());
        instance
    }

    /// Seed an existing application in the space.
    pub fn add_app(&self, name: &str) -> App {
        let app = App {
            guid: Guid::new(),
            name: name.to_string(),
            space_guid: self.space.guid,
            stack_guid: None,
            environment_json: Default::default(),
            health_check_type: None,
            health_check_http_endpoint: None,
            docker_image: None,
            state: AppState::Started,
        };
        self.state.lock().unwrap().apps.push(app.clone());
        app
    }

    /// Seed an existing route, optionally associated to an application.
    pub fn add_route(&self, domain: &Domain, address: RouteAddress, app: Option<&App>) -> Route {
        let (host, path, port) = match address {
            RouteAddress::Host { host, path } => (host, path, None),
            RouteAddress::Port(port) => (String::new(), String::new(), Some(port)),
        };
        let route = Route {
            guid: Guid::new(),
            domain_guid: domain.guid,
            space_guid: self.space.guid,
            host,
            path,
            port,
        };
        let mut state = self.state.lock().unwrap();
        state.routes.push(route.clone());
        if let Some(app) = app {
            state.associations.push((app.guid, route.guid));
        }
        route
    }

    pub fn routes_of(&self, app: &Guid) -> Vec<Route> {
        let state = self.state.lock().unwrap();
        associated_routes(&state, app)
    }

    pub fn calls(&self) -> Vec<String> {
        self.state.lock().unwrap().calls.clone()
    }

    pub fn route_count(&self) -> usize {
        self.state.lock().unwrap().routes.len()
    }
}

fn make_domain(
    name: &str,
    scope: DomainScope,
    router_group_type: Option<&str>,
    internal: bool,
) -> Domain {
    Domain {
        guid: Guid::new(),
        name: name.to_string(),
        scope,
        router_group_type: router_group_type.map(String::from),
        internal,
    }
}

fn associated_routes(state: &FakeState, app: &Guid) -> Vec<Route> {
    state
        .associations
        .iter()
        .filter(|(a, _)| a == app)
        .filter_map(|(_, r)| state.routes.iter().find(|route| route.guid == *r).cloned())
        .collect()
}

fn apply_request(app: &mut App, request: &AppRequest) {
    app.name = request.name.clone();
    if let Some(stack) = request.stack_guid {
        app.stack_guid = Some(stack);
    }
    if let Some(env) = &request.environment_json {
        app.environment_json = env.clone();
    }
    if request.health_check_type.is_some() {
        app.health_check_type = request.health_check_type;
    }
    if request.health_check_http_endpoint.is_some() {
        app.health_check_http_endpoint = request.health_check_http_endpoint.clone();
    }
    if request.docker_image.is_some() {
        app.docker_image = request.docker_image.clone();
    }
}

#[async_trait]
impl Platform for FakePlatform {
    async fn get_space(&self, space: &Guid) -> Result<Space> {
        if *space == self.space.guid {
            Ok(self.space.clone())
        } else {
            Err(Error::NotFound(format!("space {}", space)))
        }
    }

    async fn list_private_domains(&self, organization: &Guid) -> Result<Vec<Domain>> {
        if *organization != self.space.organization_guid {
            return Ok(vec![]);
        }
        Ok(self.state.lock().unwrap().private_domains.clone())
    }

    async fn list_shared_domains(&self) -> Result<Vec<Domain>> {
        Ok(self.state.lock().unwrap().shared_domains.clone())
    }

    async fn find_service_instances(
        &self,
        _space: &Guid,
        name: &str,
    ) -> Result<Vec<ServiceInstance>> {
        let state = self.state.lock().unwrap();
        Ok(state
            .service_instances
            .iter()
            .filter(|s| s.name == name)
            .cloned()
            .collect())
    }

    async fn find_apps(&self, space: &Guid, name: &str) -> Result<Vec<App>> {
        let state = self.state.lock().unwrap();
        Ok(state
            .apps
            .iter()
            .filter(|a| a.space_guid == *space && a.name == name)
            .cloned()
            .collect())
    }

    async fn create_app(&self, request: &AppRequest) -> Result<App> {
        let mut app = App {
            guid: Guid::new(),
            name: request.name.clone(),
            space_guid: request.space_guid.unwrap_or(self.space.guid),
            stack_guid: None,
            environment_json: Default::default(),
            health_check_type: None,
            health_check_http_endpoint: None,
            docker_image: None,
            state: AppState::Stopped,
        };
        apply_request(&mut app, request);

        let mut state = self.state.lock().unwrap();
        state.calls.push(format!("create_app {}", request.name));
        state.created_requests.push(request.clone());
        state.apps.push(app.clone());
        Ok(app)
    }

    async fn update_app(&self, app: &Guid, request: &AppRequest) -> Result<App> {
        let mut state = self.state.lock().unwrap();
        state.calls.push(format!("update_app {}", request.name));
        state.updated_requests.push(request.clone());
        let existing = state
            .apps
            .iter_mut()
            .find(|a| a.guid == *app)
            .ok_or_else(|| Error::NotFound(format!("app {}", app)))?;
        apply_request(existing, request);
        Ok(existing.clone())
    }

    async fn app_routes(&self, app: &Guid) -> Result<Vec<Route>> {
        Ok(self.routes_of(app))
    }

    async fn associate_route(&self, app: &Guid, route: &Guid) -> Result<()> {
        let mut state = self.state.lock().unwrap();
        state.calls.push(format!("associate_route {}", route));
        if !state.associations.contains(&(*app, *route)) {
            state.associations.push((*app, *route));
        }
        Ok(())
    }

    async fn remove_route(&self, app: &Guid, route: &Guid) -> Result<()> {
        let mut state = self.state.lock().unwrap();
        state.calls.push(format!("remove_route {}", route));
        state.associations.retain(|pair| *pair != (*app, *route));
        Ok(())
    }

    async fn stop_app(&self, app: &Guid) -> Result<App> {
        self.set_state(app, AppState::Stopped, "stop_app")
    }

    async fn start_app(&self, app: &Guid) -> Result<App> {
        self.set_state(app, AppState::Started, "start_app")
    }

    async fn create_host_route(
        &self,
        domain: &Guid,
        space: &Guid,
        host: &str,
        path: &str,
    ) -> Result<Route> {
        let route = Route {
            guid: Guid::new(),
            domain_guid: *domain,
            space_guid: *space,
            host: host.to_string(),
            path: path.to_string(),
            port: None,
        };
        let mut state = self.state.lock().unwrap();
        state
            .calls
            .push(format!("create_host_route {}{}", host, path));
        state.routes.push(route.clone());
        Ok(route)
    }

    async fn create_tcp_route(
        &self,
        domain: &Guid,
        space: &Guid,
        port: Option<u16>,
    ) -> Result<Route> {
        let mut state = self.state.lock().unwrap();
        let port = match port {
            Some(port) => port,
            None => {
                state.next_port += 1;
                state.next_port
            }
        };
        let route = Route {
            guid: Guid::new(),
            domain_guid: *domain,
            space_guid: *space,
            host: String::new(),
            path: String::new(),
            port: Some(port),
        };
        state.calls.push(format!("create_tcp_route {}", port));
        state.routes.push(route.clone());
        Ok(route)
    }

    async fn find_routes(&self, domain: &Guid, address: &RouteAddress) -> Result<Vec<Route>> {
        let state = self.state.lock().unwrap();
        Ok(state
            .routes
            .iter()
            .filter(|r| r.domain_guid == *domain)
            .filter(|r| match address {
                RouteAddress::Host { host, path } => r.host == *host && r.path == *path,
                RouteAddress::Port(port) => r.port == Some(*port),
            })
            .cloned()
            .collect())
    }

    async fn find_stacks(&self, name: &str) -> Result<Vec<Stack>> {
        let state = self.state.lock().unwrap();
        Ok(state
            .stacks
            .iter()
            .filter(|s| s.name == name)
            .cloned()
            .collect())
    }

    async fn create_service_binding(
        &self,
        app: &Guid,
        service_instance: &Guid,
    ) -> Result<ServiceBinding> {
        let binding = ServiceBinding {
            guid: Guid::new(),
            app_guid: *app,
            service_instance_guid: *service_instance,
        };
        let mut state = self.state.lock().unwrap();
        state
            .calls
            .push(format!("create_service_binding {}", service_instance));
        state.bindings.push(binding.clone());
        Ok(binding)
    }
}

impl FakePlatform {
    fn set_state(&self, app: &Guid, to: AppState, call: &str) -> Result<App> {
        let mut state = self.state.lock().unwrap();
        state.calls.push(call.to_string());
        let existing = state
            .apps
            .iter_mut()
            .find(|a| a.guid == *app)
            .ok_or_else(|| Error::NotFound(format!("app {}", app)))?;
        existing.state = to;
        Ok(existing.clone())
    }
}

/// Uploader that records which paths it was asked to upload.
#[derive(Default)]
pub struct RecordingUploader {
    pub uploads: Mutex<Vec<(String, PathBuf)>>,
}

#[async_trait]
impl Uploader for RecordingUploader {
    async fn upload(&self, app: &App, path: &Path) -> Result<()> {
        self.uploads
            .lock()
            .unwrap()
            .push((app.name.clone(), path.to_path_buf()));
        Ok(())
    }
}

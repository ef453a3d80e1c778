//! HTTP implementation of [`Platform`] against the Cloud Controller v2 API.

use async_trait::async_trait;
use cfpush_core::application::{App, AppRequest, AppState};
use cfpush_core::domain::{Domain, DomainScope};
use cfpush_core::platform::Platform;
use cfpush_core::route::{Route, RouteAddress};
use cfpush_core::space::{ServiceBinding, ServiceInstance, Space, Stack};
use cfpush_core::{Error, Guid, Result};
use reqwest::{Method, RequestBuilder, StatusCode};
use serde::de::DeserializeOwned;
use serde_json::json;
use tracing::debug;
use url::Url;

use crate::wire::{
    AppEntity, DomainEntity, ErrorBody, NamedEntity, Page, Resource, RouteEntity,
    ServiceBindingEntity, SpaceEntity, into_domain,
};

const USER_AGENT: &str = concat!("cfpush/", env!("CARGO_PKG_VERSION"));

/// Cloud Controller API client.
pub struct CloudControllerClient {
    client: reqwest::Client,
    api: Url,
    token: Option<String>,
}

impl CloudControllerClient {
    pub fn new(api: Url, token: Option<String>) -> Result<Self> {
        Self::with_options(api, token, false)
    }

    /// Build a client, optionally accepting self-signed certificates.
    ///
    /// A base path on `api` (e.g. `https://host/cf`) prefixes every request.
    pub fn with_options(
        mut api: Url,
        token: Option<String>,
        skip_ssl_validation: bool,
    ) -> Result<Self> {
        if !api.path().ends_with('/') {
            let path = format!("{}/", api.path());
            api.set_path(&path);
        }

        let client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .danger_accept_invalid_certs(skip_ssl_validation)
            .build()
            .map_err(|e| Error::Configuration(format!("failed to build HTTP client: {}", e)))?;

        Ok(Self { client, api, token })
    }

    pub fn api(&self) -> &Url {
        &self.api
    }

    fn request(&self, method: Method, path: &str) -> Result<RequestBuilder> {
        let url = self
            .api
            .join(path.trim_start_matches('/'))
            .map_err(|e| Error::Internal(format!("invalid API path {}: {}", path, e)))?;

        let builder = self
            .client
            .request(method, url)
            .header("Accept", "application/json");

        Ok(match &self.token {
            Some(token) => builder.bearer_auth(token),
            None => builder,
        })
    }

    async fn send(&self, builder: RequestBuilder) -> Result<reqwest::Response> {
        let response = builder
            .send()
            .await
            .map_err(|e| Error::Internal(format!("request failed: {}", e)))?;

        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let text = response.text().await.unwrap_or_default();
        Err(status_error(status, &text))
    }

    async fn fetch<T: DeserializeOwned>(&self, builder: RequestBuilder) -> Result<T> {
        let response = self.send(builder).await?;
        let url = response.url().clone();
        response
            .json()
            .await
            .map_err(|e| Error::Internal(format!("invalid response from {}: {}", url, e)))
    }

    /// Collect every resource of a listing, following `next_url`.
    async fn list<E: DeserializeOwned>(&self, path: &str) -> Result<Vec<Resource<E>>> {
        let mut resources = Vec::new();
        let mut next = Some(path.to_string());

        while let Some(path) = next.take() {
            debug!(path = %path, "Listing resources");
            let page: Page<E> = self.fetch(self.request(Method::GET, &path)?).await?;
            resources.extend(page.resources);
            next = page.next_url;
        }

        Ok(resources)
    }

    async fn set_state(&self, app: &Guid, state: AppState) -> Result<App> {
        let builder = self
            .request(Method::PUT, &format!("/v2/apps/{}", app))?
            .json(&json!({ "state": state }));
        let resource: Resource<AppEntity> = self.fetch(builder).await?;
        Ok(resource.into())
    }
}

/// A `q=field:value` filter with the value escaped.
fn filter(field: &str, value: &str) -> String {
    format!("q={}", urlencoding::encode(&format!("{}:{}", field, value)))
}

/// Map a failed response to the error vocabulary of the crate.
fn status_error(status: StatusCode, body: &str) -> Error {
    let parsed: ErrorBody = serde_json::from_str(body).unwrap_or_default();
    let message = match (&parsed.error_code, &parsed.description) {
        (Some(code), Some(description)) => format!("{}: {}", code, description),
        (None, Some(description)) => description.clone(),
        _ if body.is_empty() => status.to_string(),
        _ => body.to_string(),
    };

    match status.as_u16() {
        401 | 403 => Error::Unauthorized(message),
        404 => Error::NotFound(message),
        409 => Error::Conflict(message),
        400 if parsed
            .error_code
            .as_deref()
            .is_some_and(|code| code.ends_with("Taken")) =>
        {
            Error::Conflict(message)
        }
        status => Error::Api { status, message },
    }
}

#[async_trait]
impl Platform for CloudControllerClient {
    async fn get_space(&self, space: &Guid) -> Result<Space> {
        let resource: Resource<SpaceEntity> = self
            .fetch(self.request(Method::GET, &format!("/v2/spaces/{}", space))?)
            .await?;
        Ok(resource.into())
    }

    async fn list_private_domains(&self, organization: &Guid) -> Result<Vec<Domain>> {
        let resources = self
            .list::<DomainEntity>(&format!("/v2/organizations/{}/private_domains", organization))
            .await?;
        Ok(resources
            .into_iter()
            .map(|r| into_domain(r, DomainScope::Private))
            .collect())
    }

    async fn list_shared_domains(&self) -> Result<Vec<Domain>> {
        let resources = self.list::<DomainEntity>("/v2/shared_domains").await?;
        Ok(resources
            .into_iter()
            .map(|r| into_domain(r, DomainScope::Shared))
            .collect())
    }

    async fn find_service_instances(
        &self,
        space: &Guid,
        name: &str,
    ) -> Result<Vec<ServiceInstance>> {
        let path = format!(
            "/v2/spaces/{}/service_instances?{}",
            space,
            filter("name", name)
        );
        let resources = self.list::<NamedEntity>(&path).await?;
        Ok(resources
            .into_iter()
            .map(ServiceInstance::from)
            .filter(|s| s.name == name)
            .collect())
    }

    async fn find_apps(&self, space: &Guid, name: &str) -> Result<Vec<App>> {
        let path = format!(
            "/v2/apps?{}&{}",
            filter("name", name),
            filter("space_guid", &space.to_string())
        );
        let resources = self.list::<AppEntity>(&path).await?;
        Ok(resources
            .into_iter()
            .map(App::from)
            .filter(|a| a.name == name && a.space_guid == *space)
            .collect())
    }

    async fn create_app(&self, request: &AppRequest) -> Result<App> {
        let resource: Resource<AppEntity> = self
            .fetch(self.request(Method::POST, "/v2/apps")?.json(request))
            .await?;
        Ok(resource.into())
    }

    async fn update_app(&self, app: &Guid, request: &AppRequest) -> Result<App> {
        let resource: Resource<AppEntity> = self
            .fetch(
                self.request(Method::PUT, &format!("/v2/apps/{}", app))?
                    .json(request),
            )
            .await?;
        Ok(resource.into())
    }

    async fn app_routes(&self, app: &Guid) -> Result<Vec<Route>> {
        let resources = self
            .list::<RouteEntity>(&format!("/v2/apps/{}/routes", app))
            .await?;
        Ok(resources.into_iter().map(Route::from).collect())
    }

    async fn associate_route(&self, app: &Guid, route: &Guid) -> Result<()> {
        self.send(self.request(Method::PUT, &format!("/v2/apps/{}/routes/{}", app, route))?)
            .await?;
        Ok(())
    }

    async fn remove_route(&self, app: &Guid, route: &Guid) -> Result<()> {
        self.send(self.request(
            Method::DELETE,
            &format!("/v2/apps/{}/routes/{}", app, route),
        )?)
        .await?;
        Ok(())
    }

    async fn stop_app(&self, app: &Guid) -> Result<App> {
        self.set_state(app, AppState::Stopped).await
    }

    async fn start_app(&self, app: &Guid) -> Result<App> {
        self.set_state(app, AppState::Started).await
    }

    async fn create_host_route(
        &self,
        domain: &Guid,
        space: &Guid,
        host: &str,
        path: &str,
    ) -> Result<Route> {
        let mut body = json!({
            "domain_guid": domain,
            "space_guid": space,
            "host": host,
        });
        if !path.is_empty() {
            body["path"] = json!(path);
        }

        let resource: Resource<RouteEntity> = self
            .fetch(self.request(Method::POST, "/v2/routes")?.json(&body))
            .await?;
        Ok(resource.into())
    }

    async fn create_tcp_route(
        &self,
        domain: &Guid,
        space: &Guid,
        port: Option<u16>,
    ) -> Result<Route> {
        let (path, body) = match port {
            Some(port) => (
                "/v2/routes",
                json!({ "domain_guid": domain, "space_guid": space, "port": port }),
            ),
            None => (
                "/v2/routes?generate_port=true",
                json!({ "domain_guid": domain, "space_guid": space }),
            ),
        };

        let resource: Resource<RouteEntity> = self
            .fetch(self.request(Method::POST, path)?.json(&body))
            .await?;
        Ok(resource.into())
    }

    async fn find_routes(&self, domain: &Guid, address: &RouteAddress) -> Result<Vec<Route>> {
        let mut filters = vec![filter("domain_guid", &domain.to_string())];
        match address {
            RouteAddress::Host { host, path } => {
                filters.push(filter("host", host));
                if !path.is_empty() {
                    filters.push(filter("path", path));
                }
            }
            RouteAddress::Port(port) => filters.push(filter("port", &port.to_string())),
        }

        let resources = self
            .list::<RouteEntity>(&format!("/v2/routes?{}", filters.join("&")))
            .await?;

        Ok(resources
            .into_iter()
            .map(Route::from)
            .filter(|route| {
                route.matches(domain, address)
                    && match address {
                        RouteAddress::Host { path, .. } => route.path == *path,
                        RouteAddress::Port(_) => true,
                    }
            })
            .collect())
    }

    async fn find_stacks(&self, name: &str) -> Result<Vec<Stack>> {
        let resources = self
            .list::<NamedEntity>(&format!("/v2/stacks?{}", filter("name", name)))
            .await?;
        Ok(resources.into_iter().map(Stack::from).collect())
    }

    async fn create_service_binding(
        &self,
        app: &Guid,
        service_instance: &Guid,
    ) -> Result<ServiceBinding> {
        let body = json!({
            "app_guid": app,
            "service_instance_guid": service_instance,
        });
        let resource: Resource<ServiceBindingEntity> = self
            .fetch(self.request(Method::POST, "/v2/service_bindings")?.json(&body))
            .await?;
        Ok(resource.into())
    }
}

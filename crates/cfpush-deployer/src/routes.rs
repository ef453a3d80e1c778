//! Route reconciliation.
//!
//! Makes an application's associated routes match its manifest entry:
//!
//! 1. `no-route: true` detaches every associated route.
//! 2. No declared routes and nothing associated yet: one default route is
//!    synthesized on the first external shared domain.
//! 3. Otherwise each declared route is resolved and created if missing.
//!    Associated routes that are not declared are left alone.
//!
//! Declared routes look like `host.domain/path`, `domain` or `domain:port`,
//! optionally prefixed with a scheme.

use cfpush_config::{AppManifest, RouteDeclaration};
use cfpush_core::application::App;
use cfpush_core::domain::Domain;
use cfpush_core::platform::Platform;
use cfpush_core::route::{Route, RouteAddress};
use cfpush_core::space::Space;
use cfpush_core::{Error, Result};
use tracing::{debug, info};

/// What reconciliation did to the application's routes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RouteOutcome {
    /// `no-route` detached this many routes
    Unmapped { count: usize },
    /// A default route was created and associated
    DefaultCreated(Route),
    /// Declared routes were reconciled
    Reconciled {
        /// New route resources, now associated
        created: Vec<Route>,
        /// Existing space routes newly associated to this app
        associated: Vec<Route>,
        /// Declared routes the app already had
        unchanged: usize,
    },
}

/// A declared route split into its parts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedRoute {
    /// `host.domain` or bare `domain`
    pub location: String,
    pub port: Option<u16>,
    /// Empty when the route has no path or a bare `/`
    pub path: String,
}

/// Split a declared route into location, port and path.
///
/// A colon in the network location must sit after the first character and
/// before the last two. A route may not carry both a path and a port.
pub fn parse_route(route: &str) -> Result<ParsedRoute> {
    let without_scheme = match route.find("://") {
        Some(idx) => &route[idx + 3..],
        None => route,
    };
    let without_fragment = without_scheme
        .split(|c| c == '?' || c == '#')
        .next()
        .unwrap_or_default();
    let (netloc, raw_path) = match without_fragment.find('/') {
        Some(idx) => without_fragment.split_at(idx),
        None => (without_fragment, ""),
    };

    let (location, port) = match netloc.find(':') {
        Some(idx) if idx > 0 && idx + 2 < netloc.len() => {
            let port = netloc[idx + 1..]
                .parse::<u16>()
                .map_err(|_| Error::InvalidRouteFormat(route.to_string()))?;
            (&netloc[..idx], Some(port))
        }
        Some(_) => return Err(Error::InvalidRouteFormat(route.to_string())),
        None => (netloc, None),
    };

    if location.is_empty() {
        return Err(Error::InvalidRouteFormat(route.to_string()));
    }

    let path = if raw_path == "/" { "" } else { raw_path };

    if !path.is_empty() && port.is_some() {
        return Err(Error::ConflictingAttributes(format!(
            "cannot set both port and path on route {}",
            route
        )));
    }

    Ok(ParsedRoute {
        location: location.to_string(),
        port,
        path: path.to_string(),
    })
}

/// Find the domain a route location belongs to.
///
/// Private domains are searched before shared ones. Within a scope the whole
/// location is tried as a domain name first (empty host), then the part after
/// the first dot with the part before it as host.
pub fn resolve_domain<'a>(
    location: &str,
    private_domains: &'a [Domain],
    shared_domains: &'a [Domain],
) -> Result<(String, &'a Domain)> {
    for domains in [private_domains, shared_domains] {
        if let Some(domain) = find_domain(domains, location) {
            return Ok((String::new(), domain));
        }

        if let Some(idx) = location.find('.') {
            if idx > 0 && idx + 2 < location.len() {
                let (host, rest) = (&location[..idx], &location[idx + 1..]);
                if let Some(domain) = find_domain(domains, rest) {
                    return Ok((host.to_string(), domain));
                }
            }
        }
    }

    Err(Error::DomainNotFound(location.to_string()))
}

fn find_domain<'a>(domains: &'a [Domain], name: &str) -> Option<&'a Domain> {
    domains.iter().find(|d| d.name == name)
}

/// Decide how a parsed route is addressed on its resolved domain.
fn route_address(
    route: &str,
    parsed: &ParsedRoute,
    host: String,
    domain: &Domain,
) -> Result<RouteAddress> {
    if parsed.port.is_some() && !host.is_empty() {
        return Err(Error::ConflictingAttributes(format!(
            "route {} resolves to host '{}' on domain {}; tcp routes have no host",
            route, host, domain.name
        )));
    }

    match (domain.is_tcp(), parsed.port) {
        (true, Some(port)) => Ok(RouteAddress::Port(port)),
        (true, None) => Err(Error::MissingPort(format!(
            "{} (domain {} is tcp)",
            route, domain.name
        ))),
        (false, Some(_)) => Err(Error::UnsupportedPort(format!(
            "{} (domain {} is not tcp)",
            route, domain.name
        ))),
        (false, None) => Ok(RouteAddress::Host {
            host,
            path: parsed.path.clone(),
        }),
    }
}

/// Reconcile the application's routes against its manifest entry.
pub async fn reconcile_routes(
    platform: &dyn Platform,
    space: &Space,
    app: &App,
    manifest: &AppManifest,
) -> Result<RouteOutcome> {
    let existing = platform.app_routes(&app.guid).await?;

    if manifest.no_route {
        return unmap_all(platform, app, &existing).await;
    }

    if manifest.routes.is_empty() && existing.is_empty() {
        return create_default_route(platform, space, app, manifest.random_route).await;
    }

    reconcile_declared(platform, space, app, &existing, &manifest.routes).await
}

async fn unmap_all(
    platform: &dyn Platform,
    app: &App,
    existing: &[Route],
) -> Result<RouteOutcome> {
    for route in existing {
        platform.remove_route(&app.guid, &route.guid).await?;
        info!(app = %app.name, route = %route.guid, "Removed route");
    }
    Ok(RouteOutcome::Unmapped {
        count: existing.len(),
    })
}

async fn create_default_route(
    platform: &dyn Platform,
    space: &Space,
    app: &App,
    random_route: bool,
) -> Result<RouteOutcome> {
    let shared_domains = platform.list_shared_domains().await?;
    let domain = shared_domains
        .iter()
        .find(|d| !d.internal)
        .ok_or_else(|| {
            Error::Configuration(
                "no route declared, no-route not set, and no external shared domain available"
                    .to_string(),
            )
        })?;

    let route = if domain.is_tcp() {
        platform
            .create_tcp_route(&domain.guid, &space.guid, None)
            .await?
    } else {
        let host = if random_route {
            random_host(&app.name)
        } else {
            app.name.clone()
        };
        platform
            .create_host_route(&domain.guid, &space.guid, &host, "")
            .await?
    };

    platform.associate_route(&app.guid, &route.guid).await?;
    info!(app = %app.name, domain = %domain.name, route = %route.guid, "Created default route");
    Ok(RouteOutcome::DefaultCreated(route))
}

fn random_host(app_name: &str) -> String {
    format!("{}-{}", app_name, chrono::Utc::now().timestamp())
}

async fn reconcile_declared(
    platform: &dyn Platform,
    space: &Space,
    app: &App,
    existing: &[Route],
    declared: &[RouteDeclaration],
) -> Result<RouteOutcome> {
    // Reject malformed routes before touching the platform
    let parsed = declared
        .iter()
        .map(|d| parse_route(&d.route).map(|p| (d.route.as_str(), p)))
        .collect::<Result<Vec<_>>>()?;

    let mut created = Vec::new();
    let mut associated = Vec::new();
    let mut unchanged = 0;

    if parsed.is_empty() {
        return Ok(RouteOutcome::Reconciled {
            created,
            associated,
            unchanged,
        });
    }

    let private_domains = platform
        .list_private_domains(&space.organization_guid)
        .await?;
    let shared_domains = platform.list_shared_domains().await?;

    for (raw, route) in &parsed {
        let (host, domain) = resolve_domain(&route.location, &private_domains, &shared_domains)?;
        let address = route_address(raw, route, host, domain)?;

        if existing.iter().any(|r| r.matches(&domain.guid, &address)) {
            debug!(app = %app.name, route = %raw, "Route already associated");
            unchanged += 1;
            continue;
        }

        if let Some(found) = platform
            .find_routes(&domain.guid, &address)
            .await?
            .into_iter()
            .next()
        {
            platform.associate_route(&app.guid, &found.guid).await?;
            info!(app = %app.name, route = %raw, "Associated existing route");
            associated.push(found);
            continue;
        }

        let new_route = match &address {
            RouteAddress::Port(port) => {
                platform
                    .create_tcp_route(&domain.guid, &space.guid, Some(*port))
                    .await?
            }
            RouteAddress::Host { host, path } => {
                platform
                    .create_host_route(&domain.guid, &space.guid, host, path)
                    .await?
            }
        };
        platform.associate_route(&app.guid, &new_route.guid).await?;
        info!(app = %app.name, route = %raw, "Created route");
        created.push(new_route);
    }

    Ok(RouteOutcome::Reconciled {
        created,
        associated,
        unchanged,
    })
}

//! Route types.

use serde::{Deserialize, Serialize};

use crate::Guid;

/// A routable address bound to a domain.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Route {
    pub guid: Guid,
    pub domain_guid: Guid,
    pub space_guid: Guid,
    /// Empty for TCP routes and bare-domain routes
    #[serde(default)]
    pub host: String,
    #[serde(default)]
    pub path: String,
    /// Only set on TCP routes
    pub port: Option<u16>,
}

impl Route {
    /// Whether this route already serves `address` on `domain`.
    ///
    /// Host routes are matched on host alone, TCP routes on port.
    pub fn matches(&self, domain: &Guid, address: &RouteAddress) -> bool {
        if self.domain_guid != *domain {
            return false;
        }
        match address {
            RouteAddress::Host { host, .. } => self.host == *host,
            RouteAddress::Port(port) => self.port == Some(*port),
        }
    }
}

/// The domain-relative part of a route.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum RouteAddress {
    /// HTTP route: host (possibly empty) plus path (possibly empty)
    Host { host: String, path: String },
    /// TCP route on a fixed port
    Port(u16),
}

impl std::fmt::Display for RouteAddress {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RouteAddress::Host { host, path } => write!(f, "host={:?} path={:?}", host, path),
            RouteAddress::Port(port) => write!(f, "port={}", port),
        }
    }
}

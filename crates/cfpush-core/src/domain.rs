//! Domain types.

use serde::{Deserialize, Serialize};

use crate::Guid;

/// Router group type marking a domain as port-routed.
pub const TCP_ROUTER_GROUP: &str = "tcp";

/// Where a domain is visible.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DomainScope {
    /// Owned by a single organization
    Private,
    /// Available platform-wide
    Shared,
}

impl std::fmt::Display for DomainScope {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DomainScope::Private => write!(f, "private"),
            DomainScope::Shared => write!(f, "shared"),
        }
    }
}

/// A routable domain.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Domain {
    pub guid: Guid,
    pub name: String,
    pub scope: DomainScope,
    /// `tcp` for port-routed domains, absent for HTTP domains
    pub router_group_type: Option<String>,
    /// Internal domains are not externally routable
    pub internal: bool,
}

impl Domain {
    /// TCP domains route by port and carry no host or path.
    pub fn is_tcp(&self) -> bool {
        self.router_group_type.as_deref() == Some(TCP_ROUTER_GROUP)
    }
}

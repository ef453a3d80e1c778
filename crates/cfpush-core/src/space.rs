//! Space, stack and service types.

use serde::{Deserialize, Serialize};

use crate::Guid;

/// A space within an organization; the deployment scope of a push.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Space {
    pub guid: Guid,
    pub name: String,
    pub organization_guid: Guid,
}

/// A root filesystem applications can run on.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Stack {
    pub guid: Guid,
    pub name: String,
}

/// A provisioned backing service in a space.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServiceInstance {
    pub guid: Guid,
    pub name: String,
}

/// Link between an application and a service instance.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServiceBinding {
    pub guid: Guid,
    pub app_guid: Guid,
    pub service_instance_guid: Guid,
}

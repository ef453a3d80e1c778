//! Push orchestration for cfpush.
//!
//! Drives one manifest entry at a time through:
//! - request building and application create/update
//! - route reconciliation
//! - bits upload (non-docker apps, through an external uploader)
//! - service binding
//! - restart

pub mod push;
pub mod request;
pub mod resolver;
pub mod routes;
pub mod services;

#[cfg(test)]
mod testing;

pub use push::{PushOperation, PushReport};
pub use resolver::{AppAction, Resolution};
pub use routes::{ParsedRoute, RouteOutcome, parse_route};

//! Core domain types and traits for cfpush.
//!
//! This crate contains:
//! - Resource identifiers
//! - The platform object model (spaces, domains, routes, apps, services)
//! - The application create/update payload
//! - The `Platform` collaborator trait the orchestrator drives

pub mod application;
pub mod domain;
pub mod error;
pub mod id;
pub mod platform;
pub mod route;
pub mod space;

pub use error::{Error, Result};
pub use id::Guid;

//! Cloud Controller v2 client for cfpush.
//!
//! Implements the `Platform` collaborator trait over the platform's REST API.

pub mod client;
pub mod wire;

pub use client::CloudControllerClient;

//! HTTP API layer for framez.
//!
//! This crate provides the remote-procedure surface consumed by the mobile
//! client:
//!
//! - **Endpoints**: queries (side-effect-free reads) and mutations
//! - **Extractors**: caller identity resolved from the bearer token
//! - **Middleware**: authentication
//! - **Response**: the JSON envelope shared by all endpoints
//!
//! Built on Axum 0.8 with Tower middleware stack.

// Allow dead_code for API compatibility fields in request structs
#![allow(dead_code)]

pub mod endpoints;
pub mod extractors;
pub mod middleware;
pub mod response;

pub use endpoints::router;

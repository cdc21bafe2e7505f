//! Core business logic for framez.

pub mod services;

pub use services::*;

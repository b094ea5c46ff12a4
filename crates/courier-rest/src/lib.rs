//! # Courier REST
//!
//! HTTP adapter for the Courier email queue.
//! Parses and validates submissions, hands them to the job engine and exposes
//! the dead-letter log, health endpoints, Prometheus metrics and an OpenAPI
//! document.

pub mod controllers;
pub mod extractors;
pub mod middleware;
pub mod openapi;
pub mod responses;
pub mod router;
pub mod state;

pub use router::*;
pub use state::*;

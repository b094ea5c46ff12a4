//! # Courier Core
//!
//! Core types shared by every layer of the Courier email queue service:
//! the unified error type, API error payloads, request validation rules
//! and logging initialisation.

pub mod error;
pub mod result;
pub mod telemetry;
pub mod validation;

pub use error::*;
pub use result::*;
pub use validation::*;

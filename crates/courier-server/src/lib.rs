//! # Courier Server Library
//!
//! Wires configuration, the job engine and the HTTP adapter together and
//! owns the process lifecycle: signal handling and the bounded drain of
//! the engine on shutdown.

pub mod app;
pub mod signal;
pub mod startup;

pub use app::Application;

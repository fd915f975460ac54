//! `critiq-observability` — logging/tracing wiring.

pub mod tracing;

pub use tracing::init;

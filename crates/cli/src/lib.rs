//! Wiring from a crew manifest to a running [`Crew`](rustcrew_agent::Crew).
//!
//! The `rustcrew` binary is a thin shell over this module; integration
//! tests use it directly with a scripted provider.

pub mod wiring;

pub use wiring::{WiringError, build_crew, default_provider};

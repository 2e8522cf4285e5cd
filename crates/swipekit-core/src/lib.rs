//! Shared types, constants and errors for the swipekit workspace.
//!
//! Everything here is free of I/O and async so that the track parser, the
//! hardware layer and the session can all depend on it.

pub mod constants;
pub mod error;
pub mod types;

pub use error::{Error, Result};
pub use types::*;

/// Version info
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

//! # Highrise Common
//!
//! Common types, utilities, and shared abstractions for Highrise.
//!
//! This crate provides foundational types used across all Highrise subsystems:
//! - Coordinate types (tile grid, world space, world bounds)
//! - Actor handles
//! - Millisecond timers (cooldowns, deadlines)
//! - Version information for data schemas
//! - Common error types
//! - Prelude for convenient imports

#![warn(missing_docs)]
#![warn(clippy::all)]
#![deny(clippy::unwrap_used)]

pub mod coords;
pub mod error;
pub mod ids;
pub mod timer;
pub mod version;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::coords::*;
    pub use crate::error::*;
    pub use crate::ids::*;
    pub use crate::timer::*;
    pub use crate::version::*;
}

pub use prelude::*;

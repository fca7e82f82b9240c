//! # mindtrail-core
//!
//! Core types, traits, and geodesy for the mindtrail location engine.
//!
//! This crate holds the plain data model (location records, revisits,
//! clusters), the error type, shared defaults, the haversine distance, and
//! the collaborator traits that hosts implement. It has no engine state and
//! performs no I/O.

pub mod defaults;
pub mod error;
pub mod geo;
pub mod ids;
pub mod models;
pub mod traits;

// Re-export commonly used types at crate root
pub use error::{Error, PositionError, Result};
pub use geo::distance_m;
pub use ids::new_id;
pub use models::*;
pub use traits::*;

//! Collaborator traits the location engine is built against.
//!
//! The engine never reads a device sensor, calls a geocoding service, or
//! touches storage directly. Hosts inject implementations of these traits,
//! which keeps the engine testable without a device or a browser.

use async_trait::async_trait;

use crate::error::{PositionError, Result};
use crate::models::{GeocodedAddress, LocationRecord, LocationSnapshot, Position};

// =============================================================================
// INPUT COLLABORATORS
// =============================================================================

/// Source of the device's current position.
#[async_trait]
pub trait PositionSource: Send + Sync {
    /// Produce a fresh fix or explain why none is available.
    async fn current_position(&self) -> std::result::Result<Position, PositionError>;
}

/// Resolves coordinates to a human-readable address.
///
/// Failures are non-fatal to callers of the engine; they only lower the
/// fidelity of the stored record.
#[async_trait]
pub trait ReverseGeocoder: Send + Sync {
    async fn reverse(&self, latitude: f64, longitude: f64) -> Result<Option<GeocodedAddress>>;
}

// =============================================================================
// OUTPUT COLLABORATORS
// =============================================================================

/// Receives the full Store and cluster list after each mutation.
///
/// The engine issues at most one write per mutation and does not batch or
/// deduplicate.
#[async_trait]
pub trait PersistenceSink: Send + Sync {
    async fn save(&self, snapshot: &LocationSnapshot) -> Result<()>;
}

/// Supplies a previously persisted Store at startup.
#[async_trait]
pub trait SnapshotLoader: Send + Sync {
    /// `None` when nothing has been persisted yet.
    async fn load(&self) -> Result<Option<Vec<LocationRecord>>>;
}

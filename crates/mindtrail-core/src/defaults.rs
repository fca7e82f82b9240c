//! Centralized default constants for the mindtrail location engine.
//!
//! Every crate references these constants instead of defining its own magic
//! numbers. Engine configuration falls back to them when a value is absent.

// =============================================================================
// GEODESY
// =============================================================================

/// Mean Earth radius in meters used by the haversine distance.
pub const EARTH_RADIUS_M: f64 = 6_371_000.0;

// =============================================================================
// CLUSTERING
// =============================================================================

/// Radius around a seed record within which other records join its cluster.
pub const CLUSTER_RADIUS_M: f64 = 500.0;

// =============================================================================
// QUERIES
// =============================================================================

/// Radius used by nearby-content lookups when the caller gives none.
pub const NEARBY_RADIUS_M: f64 = 1000.0;

// =============================================================================
// POSITION ACQUISITION
// =============================================================================

/// How long to wait for the position source before giving up.
pub const POSITION_TIMEOUT_SECS: u64 = 10;

/// A cached current location older than this is re-acquired.
pub const POSITION_MAX_AGE_SECS: u64 = 300;

// =============================================================================
// REVISITS
// =============================================================================

/// Lowest accepted revisit rating.
pub const RATING_MIN: u8 = 1;

/// Highest accepted revisit rating.
pub const RATING_MAX: u8 = 5;

// =============================================================================
// PERSISTENCE
// =============================================================================

/// File name of the persisted Store.
pub const LOCATIONS_FILE: &str = "mindtrail_locations.json";

/// File name of the persisted cluster list.
pub const CLUSTERS_FILE: &str = "mindtrail_location_clusters.json";

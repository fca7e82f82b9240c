//! Read-only spatial and temporal lookups over the Store.
//!
//! Results keep Store order. An empty result is a normal outcome.

use chrono::{DateTime, Utc};
use mindtrail_core::{Coordinates, LocationRecord};

/// Records whose distance to `center` is at most `radius_m`.
pub fn nearby<'a>(
    records: &'a [LocationRecord],
    center: Coordinates,
    radius_m: f64,
) -> Vec<&'a LocationRecord> {
    records
        .iter()
        .filter(|r| r.distance_to(&center) <= radius_m)
        .collect()
}

/// Records created within the closed interval `[start, end]`.
///
/// An inverted interval matches nothing.
pub fn by_date_range(
    records: &[LocationRecord],
    start: DateTime<Utc>,
    end: DateTime<Utc>,
) -> Vec<&LocationRecord> {
    records
        .iter()
        .filter(|r| r.created_at >= start && r.created_at <= end)
        .collect()
}

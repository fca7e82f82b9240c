//! Great-circle distance between decimal-degree coordinates.
//!
//! Uses the haversine formula on a sphere of mean Earth radius
//! ([`EARTH_RADIUS_M`]). Inputs are not range checked: an out-of-range
//! latitude or longitude yields a finite but meaningless distance.

use crate::defaults::EARTH_RADIUS_M;
use crate::models::Coordinates;

/// Haversine distance in meters between `(lat1, lon1)` and `(lat2, lon2)`.
///
/// Symmetric in its two points and exactly `0.0` for identical points.
///
/// # Example
///
/// ```
/// use mindtrail_core::geo::distance_m;
///
/// let d = distance_m(39.9042, 116.4074, 39.9050, 116.4080);
/// assert!(d > 90.0 && d < 110.0);
/// ```
pub fn distance_m(lat1: f64, lon1: f64, lat2: f64, lon2: f64) -> f64 {
    let phi1 = lat1.to_radians();
    let phi2 = lat2.to_radians();
    let d_phi = (lat2 - lat1).to_radians();
    let d_lambda = (lon2 - lon1).to_radians();

    let a = (d_phi / 2.0).sin().powi(2) + phi1.cos() * phi2.cos() * (d_lambda / 2.0).sin().powi(2);
    // Rounding can push `a` just past 1 near antipodes.
    let a = a.clamp(0.0, 1.0);
    let c = 2.0 * a.sqrt().atan2((1.0 - a).sqrt());

    EARTH_RADIUS_M * c
}

impl Coordinates {
    /// Distance in meters to another point.
    pub fn distance_to(&self, other: &Coordinates) -> f64 {
        distance_m(self.latitude, self.longitude, other.latitude, other.longitude)
    }
}

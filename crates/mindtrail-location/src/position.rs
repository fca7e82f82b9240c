//! Position source for hosts without a device sensor.

use async_trait::async_trait;
use chrono::Utc;
use mindtrail_core::{Position, PositionError, PositionSource};

/// Always reports the same point, stamped with the time of the call.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FixedPosition {
    pub latitude: f64,
    pub longitude: f64,
    pub accuracy: Option<f64>,
}

impl FixedPosition {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
            accuracy: None,
        }
    }
}

#[async_trait]
impl PositionSource for FixedPosition {
    async fn current_position(&self) -> Result<Position, PositionError> {
        if !self.latitude.is_finite() || !self.longitude.is_finite() {
            return Err(PositionError::Unavailable(
                "fixed position is not a finite coordinate".to_string(),
            ));
        }
        Ok(Position {
            latitude: self.latitude,
            longitude: self.longitude,
            accuracy: self.accuracy,
            timestamp: Utc::now(),
        })
    }
}

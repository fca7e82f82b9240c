//! Collaborator fakes shared by the integration tests.

#![allow(dead_code)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, TimeZone, Utc};
use mindtrail_core::{
    new_id, ContentType, Error, GeocodedAddress, LocationRecord, LocationSnapshot,
    PersistenceSink, Position, PositionError, PositionSource, Result, ReverseGeocoder,
};

/// Position source that answers from a script and counts calls.
pub struct ScriptedPosition {
    answer: std::result::Result<(f64, f64), PositionError>,
    delay: Option<Duration>,
    /// Calls before this index answer immediately
    delay_from: usize,
    calls: AtomicUsize,
}

impl ScriptedPosition {
    pub fn at(latitude: f64, longitude: f64) -> Self {
        Self {
            answer: Ok((latitude, longitude)),
            delay: None,
            delay_from: 0,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn failing(error: PositionError) -> Self {
        Self {
            answer: Err(error),
            delay: None,
            delay_from: 0,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn delayed(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Answer the first `calls` lookups immediately, then stall for `delay`.
    pub fn stalls_after(mut self, calls: usize, delay: Duration) -> Self {
        self.delay = Some(delay);
        self.delay_from = calls;
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl PositionSource for ScriptedPosition {
    async fn current_position(&self) -> std::result::Result<Position, PositionError> {
        let call = self.calls.fetch_add(1, Ordering::SeqCst);
        if let Some(delay) = self.delay.filter(|_| call >= self.delay_from) {
            tokio::time::sleep(delay).await;
        }
        self.answer.clone().map(|(latitude, longitude)| Position {
            latitude,
            longitude,
            accuracy: Some(25.0),
            timestamp: Utc::now(),
        })
    }
}

/// Geocoder that always resolves to the same Beijing address.
pub struct BeijingGeocoder;

#[async_trait]
impl ReverseGeocoder for BeijingGeocoder {
    async fn reverse(&self, _latitude: f64, _longitude: f64) -> Result<Option<GeocodedAddress>> {
        Ok(Some(GeocodedAddress {
            formatted_address: Some("Chaoyang District, Sanlitun".to_string()),
            city: Some("Beijing".to_string()),
            country: Some("China".to_string()),
        }))
    }
}

/// Geocoder whose backend is down.
pub struct BrokenGeocoder;

#[async_trait]
impl ReverseGeocoder for BrokenGeocoder {
    async fn reverse(&self, _latitude: f64, _longitude: f64) -> Result<Option<GeocodedAddress>> {
        Err(Error::Geocode("service unavailable".to_string()))
    }
}

/// Sink that rejects every write.
pub struct BrokenSink;

#[async_trait]
impl PersistenceSink for BrokenSink {
    async fn save(&self, _snapshot: &LocationSnapshot) -> Result<()> {
        Err(Error::Persistence("disk full".to_string()))
    }
}

pub fn day(d: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 6, d, 8, 30, 0).unwrap()
}

/// A stored record with a fixed creation date.
pub fn record(lat: f64, lon: f64, created_at: DateTime<Utc>) -> LocationRecord {
    LocationRecord {
        id: new_id(),
        content_id: format!("moment_{}", created_at.timestamp()),
        content_type: ContentType::Moment,
        title: "fixture".to_string(),
        preview: None,
        thumbnail: None,
        latitude: lat,
        longitude: lon,
        accuracy: None,
        address: None,
        city: None,
        country: None,
        timestamp: created_at,
        created_at,
        revisits: vec![],
    }
}

/// Tiananmen, ~100 m further along, and Yuanmingyuan (~15 km away).
pub fn beijing_records() -> Vec<LocationRecord> {
    vec![
        record(39.9042, 116.4074, day(1)),
        record(39.9050, 116.4080, day(2)),
        record(40.0084, 116.2972, day(3)),
    ]
}

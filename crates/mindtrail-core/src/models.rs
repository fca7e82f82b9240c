//! Data model for geotagged content and its revisits.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::defaults::{RATING_MAX, RATING_MIN};
use crate::error::{Error, Result};

// =============================================================================
// ENUMERATIONS
// =============================================================================

/// Kind of content a location record points at.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContentType {
    /// Short post
    Moment,
    Article,
    Gallery,
    Video,
}

impl fmt::Display for ContentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Moment => write!(f, "moment"),
            Self::Article => write!(f, "article"),
            Self::Gallery => write!(f, "gallery"),
            Self::Video => write!(f, "video"),
        }
    }
}

impl FromStr for ContentType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "moment" | "short-post" | "short_post" | "post" => Ok(Self::Moment),
            "article" => Ok(Self::Article),
            "gallery" => Ok(Self::Gallery),
            "video" => Ok(Self::Video),
            _ => Err(Error::InvalidInput(format!("unknown content type: {}", s))),
        }
    }
}

/// Mood tag attached to a revisit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mood {
    Happy,
    Excited,
    Peaceful,
    Thoughtful,
    Grateful,
    Nostalgic,
    Inspired,
    Relaxed,
    Curious,
    Content,
}

impl Mood {
    pub const ALL: [Mood; 10] = [
        Mood::Happy,
        Mood::Excited,
        Mood::Peaceful,
        Mood::Thoughtful,
        Mood::Grateful,
        Mood::Nostalgic,
        Mood::Inspired,
        Mood::Relaxed,
        Mood::Curious,
        Mood::Content,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Happy => "happy",
            Self::Excited => "excited",
            Self::Peaceful => "peaceful",
            Self::Thoughtful => "thoughtful",
            Self::Grateful => "grateful",
            Self::Nostalgic => "nostalgic",
            Self::Inspired => "inspired",
            Self::Relaxed => "relaxed",
            Self::Curious => "curious",
            Self::Content => "content",
        }
    }
}

impl fmt::Display for Mood {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Mood {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let wanted = s.to_lowercase();
        Self::ALL
            .into_iter()
            .find(|m| m.as_str() == wanted)
            .ok_or_else(|| Error::InvalidInput(format!("unknown mood: {}", s)))
    }
}

/// Star rating of a revisit, always within `[1, 5]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct Rating(u8);

impl Rating {
    pub fn new(value: u8) -> Result<Self> {
        if (RATING_MIN..=RATING_MAX).contains(&value) {
            Ok(Self(value))
        } else {
            Err(Error::InvalidInput(format!(
                "rating must be between {} and {}, got {}",
                RATING_MIN, RATING_MAX, value
            )))
        }
    }

    pub fn get(self) -> u8 {
        self.0
    }
}

impl TryFrom<u8> for Rating {
    type Error = Error;

    fn try_from(value: u8) -> Result<Self> {
        Self::new(value)
    }
}

impl From<Rating> for u8 {
    fn from(rating: Rating) -> u8 {
        rating.0
    }
}

// =============================================================================
// POSITIONS
// =============================================================================

/// A point in decimal degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub latitude: f64,
    pub longitude: f64,
}

impl Coordinates {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }
}

/// A fix reported by a position source.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Position {
    pub latitude: f64,
    pub longitude: f64,
    /// Horizontal accuracy in meters
    pub accuracy: Option<f64>,
    pub timestamp: DateTime<Utc>,
}

/// Human-readable address resolved from coordinates.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GeocodedAddress {
    pub formatted_address: Option<String>,
    pub city: Option<String>,
    pub country: Option<String>,
}

/// A position, optionally enriched with a resolved address.
///
/// This is what gets copied into a [`LocationRecord`] when content is
/// associated with a place.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CapturedLocation {
    pub latitude: f64,
    pub longitude: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub accuracy: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub city: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub country: Option<String>,
    pub timestamp: DateTime<Utc>,
}

impl CapturedLocation {
    /// A bare point captured now, with no accuracy or address.
    pub fn at(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
            accuracy: None,
            address: None,
            city: None,
            country: None,
            timestamp: Utc::now(),
        }
    }

    pub fn coordinates(&self) -> Coordinates {
        Coordinates::new(self.latitude, self.longitude)
    }

    /// Fill the address fields from a geocoder answer.
    pub fn with_address(mut self, address: GeocodedAddress) -> Self {
        self.address = address.formatted_address;
        self.city = address.city;
        self.country = address.country;
        self
    }
}

impl From<Position> for CapturedLocation {
    fn from(position: Position) -> Self {
        Self {
            latitude: position.latitude,
            longitude: position.longitude,
            accuracy: position.accuracy,
            address: None,
            city: None,
            country: None,
            timestamp: position.timestamp,
        }
    }
}

// =============================================================================
// RECORDS
// =============================================================================

/// A later reflection tied to a location record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Revisit {
    pub id: Uuid,
    pub visit_date: DateTime<Utc>,
    pub reflection: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mood: Option<Mood>,
    #[serde(default)]
    pub photos: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rating: Option<Rating>,
}

/// A stored association between a geographic position and a content item.
///
/// Coordinates never change once the record exists; the only mutation is
/// appending to `revisits`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LocationRecord {
    pub id: Uuid,
    pub content_id: String,
    pub content_type: ContentType,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub preview: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub thumbnail: Option<String>,
    pub latitude: f64,
    pub longitude: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub accuracy: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub city: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub country: Option<String>,
    /// When the position was captured
    pub timestamp: DateTime<Utc>,
    /// When the record was created
    pub created_at: DateTime<Utc>,
    /// Append-only, in arrival order
    #[serde(default)]
    pub revisits: Vec<Revisit>,
}

impl LocationRecord {
    pub fn coordinates(&self) -> Coordinates {
        Coordinates::new(self.latitude, self.longitude)
    }

    pub fn distance_to(&self, point: &Coordinates) -> f64 {
        self.coordinates().distance_to(point)
    }
}

/// Where a cluster is anchored: the seed record's point and capture time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClusterCenter {
    pub latitude: f64,
    pub longitude: f64,
    pub timestamp: DateTime<Utc>,
}

impl ClusterCenter {
    pub fn coordinates(&self) -> Coordinates {
        Coordinates::new(self.latitude, self.longitude)
    }
}

/// Records within `radius_m` of a seed record. Derived, never stored on its own.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Cluster {
    pub center: ClusterCenter,
    pub radius_m: f64,
    /// Seed first, then members in Store order
    pub contents: Vec<LocationRecord>,
}

impl Cluster {
    pub fn len(&self) -> usize {
        self.contents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.contents.is_empty()
    }
}

/// Everything a persistence sink receives after a mutation.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LocationSnapshot {
    pub locations: Vec<LocationRecord>,
    pub clusters: Vec<Cluster>,
}

// =============================================================================
// REQUESTS
// =============================================================================

/// Request to associate a content item with a position.
#[derive(Debug, Clone)]
pub struct AssociateRequest {
    pub content_id: String,
    pub content_type: ContentType,
    pub title: String,
    pub preview: Option<String>,
    pub thumbnail: Option<String>,
    /// Explicit position; when absent the engine's position source is used
    pub location: Option<CapturedLocation>,
}

impl AssociateRequest {
    pub fn new(
        content_id: impl Into<String>,
        content_type: ContentType,
        title: impl Into<String>,
    ) -> Self {
        Self {
            content_id: content_id.into(),
            content_type,
            title: title.into(),
            preview: None,
            thumbnail: None,
            location: None,
        }
    }

    pub fn at(mut self, location: CapturedLocation) -> Self {
        self.location = Some(location);
        self
    }

    pub fn with_preview(mut self, preview: impl Into<String>) -> Self {
        self.preview = Some(preview.into());
        self
    }

    pub fn with_thumbnail(mut self, thumbnail: impl Into<String>) -> Self {
        self.thumbnail = Some(thumbnail.into());
        self
    }
}

/// Optional fields of a new revisit.
#[derive(Debug, Clone, Default)]
pub struct RevisitOptions {
    pub mood: Option<Mood>,
    pub photos: Vec<String>,
    pub rating: Option<Rating>,
}

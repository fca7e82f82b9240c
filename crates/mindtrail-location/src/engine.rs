//! The location engine: Store lifecycle, clustering, queries, and revisits.
//!
//! [`LocationEngine`] owns the Store (an ordered list of
//! [`LocationRecord`]s) and the clusters derived from it. Every mutation
//! happens synchronously between the engine's only suspension points, the
//! injected collaborators:
//!
//! - [`PositionSource`] and [`ReverseGeocoder`] when a position is acquired
//! - [`PersistenceSink`] after each mutation
//!
//! so there is exactly one writer and no interleaved rebuilds. A failed
//! position lookup leaves the Store untouched.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use mindtrail_core::{
    new_id, AssociateRequest, CapturedLocation, Cluster, Coordinates, Error, GeocodedAddress,
    LocationRecord, LocationSnapshot, PersistenceSink, PositionError, PositionSource, Result,
    ReverseGeocoder, Revisit, RevisitOptions, SnapshotLoader,
};
use tokio::time::{timeout, Instant};
use tracing::{debug, info, instrument, warn};
use uuid::Uuid;

use crate::cluster::build_clusters;
use crate::config::EngineConfig;
use crate::query;
use crate::revisit::{append_revisit, new_revisit};

/// Last acquired position and when it was acquired.
#[derive(Debug, Clone)]
struct CachedLocation {
    location: CapturedLocation,
    acquired_at: Instant,
}

/// In-memory location Store with derived clusters.
pub struct LocationEngine {
    config: EngineConfig,
    records: Vec<LocationRecord>,
    clusters: Vec<Cluster>,
    current: Option<CachedLocation>,
    permission_granted: bool,
    position_source: Option<Arc<dyn PositionSource>>,
    geocoder: Option<Arc<dyn ReverseGeocoder>>,
    sink: Option<Arc<dyn PersistenceSink>>,
}

impl LocationEngine {
    /// Empty engine with no collaborators attached.
    pub fn new(config: EngineConfig) -> Self {
        Self {
            config,
            records: Vec::new(),
            clusters: Vec::new(),
            current: None,
            permission_granted: false,
            position_source: None,
            geocoder: None,
            sink: None,
        }
    }

    pub fn with_position_source(mut self, source: Arc<dyn PositionSource>) -> Self {
        self.position_source = Some(source);
        self
    }

    pub fn with_geocoder(mut self, geocoder: Arc<dyn ReverseGeocoder>) -> Self {
        self.geocoder = Some(geocoder);
        self
    }

    pub fn with_sink(mut self, sink: Arc<dyn PersistenceSink>) -> Self {
        self.sink = Some(sink);
        self
    }

    // =========================================================================
    // STATE
    // =========================================================================

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// The Store, in insertion order.
    pub fn records(&self) -> &[LocationRecord] {
        &self.records
    }

    /// Clusters from the last recomputation.
    pub fn clusters(&self) -> &[Cluster] {
        &self.clusters
    }

    pub fn get(&self, id: Uuid) -> Option<&LocationRecord> {
        self.records.iter().find(|r| r.id == id)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Last position acquired through [`locate`](Self::locate), if any.
    pub fn current_location(&self) -> Option<&CapturedLocation> {
        self.current.as_ref().map(|c| &c.location)
    }

    /// True after a successful position lookup; false after a denial.
    pub fn permission_granted(&self) -> bool {
        self.permission_granted
    }

    /// Store and clusters as handed to the persistence sink.
    pub fn snapshot(&self) -> LocationSnapshot {
        LocationSnapshot {
            locations: self.records.clone(),
            clusters: self.clusters.clone(),
        }
    }

    // =========================================================================
    // STORE LIFECYCLE
    // =========================================================================

    /// Replace the Store with a previously persisted one and rebuild clusters.
    ///
    /// Returns the number of records loaded; `0` when the loader has nothing.
    /// On error the Store is left as it was.
    #[instrument(
        skip(self, loader),
        fields(subsystem = "location", component = "engine", op = "load")
    )]
    pub async fn load(&mut self, loader: &dyn SnapshotLoader) -> Result<usize> {
        let Some(records) = loader.load().await? else {
            debug!("No persisted locations, starting empty");
            return Ok(0);
        };

        if let Some(bad) = records
            .iter()
            .find(|r| !r.latitude.is_finite() || !r.longitude.is_finite())
        {
            return Err(Error::InvalidInput(format!(
                "persisted location {} has non-finite coordinates",
                bad.id
            )));
        }

        self.records = records;
        self.recompute_clusters();
        info!(
            record_count = self.records.len(),
            cluster_count = self.clusters.len(),
            "Location store loaded"
        );
        Ok(self.records.len())
    }

    /// Associate a content item with a position and add it to the Store.
    ///
    /// Position resolution order: the request's explicit location, then the
    /// cached current location if younger than `position_max_age`, then a
    /// fresh [`locate`](Self::locate). If the position cannot be obtained
    /// the error is returned and the Store is unchanged.
    #[instrument(skip(self, req), fields(
        subsystem = "location",
        component = "engine",
        op = "associate",
        content_id = %req.content_id,
        content_type = %req.content_type,
    ))]
    pub async fn associate(&mut self, req: AssociateRequest) -> Result<LocationRecord> {
        let AssociateRequest {
            content_id,
            content_type,
            title,
            preview,
            thumbnail,
            location,
        } = req;

        let location = match location {
            Some(explicit) => {
                if !explicit.latitude.is_finite() || !explicit.longitude.is_finite() {
                    return Err(Error::InvalidInput(format!(
                        "coordinates must be finite, got ({}, {})",
                        explicit.latitude, explicit.longitude
                    )));
                }
                explicit
            }
            None => match self.fresh_current_location() {
                Some(cached) => {
                    debug!("Reusing cached current location");
                    cached
                }
                None => self.locate().await?,
            },
        };

        let record = LocationRecord {
            id: new_id(),
            content_id,
            content_type,
            title,
            preview,
            thumbnail,
            latitude: location.latitude,
            longitude: location.longitude,
            accuracy: location.accuracy,
            address: location.address,
            city: location.city,
            country: location.country,
            timestamp: location.timestamp,
            created_at: Utc::now(),
            revisits: Vec::new(),
        };

        self.records.push(record.clone());
        self.recompute_clusters();
        info!(
            location_id = %record.id,
            record_count = self.records.len(),
            cluster_count = self.clusters.len(),
            "Content associated with location"
        );

        self.persist_after_mutation("associate").await;
        Ok(record)
    }

    /// Empty the Store, the clusters, and the cached current location.
    ///
    /// Nothing is persisted; call [`persist`](Self::persist) to write the
    /// cleared state.
    pub fn clear(&mut self) {
        let dropped = self.records.len();
        self.records.clear();
        self.clusters.clear();
        self.current = None;
        info!(
            subsystem = "location",
            component = "engine",
            op = "clear",
            record_count = dropped,
            "Location store cleared"
        );
    }

    /// Hand the current Store and clusters to the persistence sink.
    ///
    /// A no-op without a sink.
    pub async fn persist(&self) -> Result<()> {
        let Some(sink) = &self.sink else {
            debug!("No persistence sink configured, skipping save");
            return Ok(());
        };
        sink.save(&self.snapshot()).await
    }

    async fn persist_after_mutation(&self, op: &'static str) {
        if let Err(e) = self.persist().await {
            warn!(op, error = %e, "Persisting location store failed, keeping in-memory state");
        }
    }

    // =========================================================================
    // POSITION
    // =========================================================================

    /// Acquire the current position from the position source.
    ///
    /// Bounded by `position_timeout`. A successful fix is enriched through
    /// the reverse geocoder when one is attached (failures only lose the
    /// address) and becomes the cached current location.
    #[instrument(skip(self), fields(subsystem = "location", component = "engine", op = "locate"))]
    pub async fn locate(&mut self) -> Result<CapturedLocation> {
        let source = self.position_source.clone().ok_or_else(|| {
            PositionError::Unavailable("no position source configured".to_string())
        })?;

        let start = Instant::now();
        let lookup = timeout(self.config.position_timeout, source.current_position());
        let position = match lookup.await {
            Ok(Ok(position)) => position,
            Ok(Err(e)) => {
                if e == PositionError::PermissionDenied {
                    self.permission_granted = false;
                }
                warn!(error = %e, "Position source failed");
                return Err(e.into());
            }
            Err(_) => {
                warn!(
                    timeout_secs = self.config.position_timeout.as_secs(),
                    "Position source timed out"
                );
                return Err(PositionError::Timeout.into());
            }
        };

        let mut location = CapturedLocation::from(position);
        if let Some(address) = self.reverse_geocode(location.latitude, location.longitude).await {
            location = location.with_address(address);
        }

        self.current = Some(CachedLocation {
            location: location.clone(),
            acquired_at: Instant::now(),
        });
        self.permission_granted = true;

        debug!(
            latitude = location.latitude,
            longitude = location.longitude,
            duration_ms = start.elapsed().as_millis() as u64,
            "Position acquired"
        );
        Ok(location)
    }

    fn fresh_current_location(&self) -> Option<CapturedLocation> {
        self.current
            .as_ref()
            .filter(|c| c.acquired_at.elapsed() <= self.config.position_max_age)
            .map(|c| c.location.clone())
    }

    async fn reverse_geocode(&self, latitude: f64, longitude: f64) -> Option<GeocodedAddress> {
        let geocoder = self.geocoder.as_ref()?;
        match geocoder.reverse(latitude, longitude).await {
            Ok(address) => address,
            Err(e) => {
                warn!(error = %e, "Reverse geocoding failed, keeping raw coordinates");
                None
            }
        }
    }

    // =========================================================================
    // CLUSTERS AND QUERIES
    // =========================================================================

    /// Rebuild clusters from the current Store.
    pub fn recompute_clusters(&mut self) -> &[Cluster] {
        self.clusters = build_clusters(&self.records, self.config.cluster_radius_m);
        debug!(
            record_count = self.records.len(),
            cluster_count = self.clusters.len(),
            "Clusters recomputed"
        );
        &self.clusters
    }

    /// Records within `radius_m` of the point (default `nearby_radius_m`).
    pub fn nearby(
        &self,
        latitude: f64,
        longitude: f64,
        radius_m: Option<f64>,
    ) -> Vec<&LocationRecord> {
        let radius = radius_m.unwrap_or(self.config.nearby_radius_m);
        let hits = query::nearby(&self.records, Coordinates::new(latitude, longitude), radius);
        debug!(
            subsystem = "location",
            op = "nearby",
            radius_m = radius,
            result_count = hits.len(),
            "Nearby lookup"
        );
        hits
    }

    /// Records whose `created_at` lies in `[start, end]`.
    pub fn by_date_range(&self, start: DateTime<Utc>, end: DateTime<Utc>) -> Vec<&LocationRecord> {
        let hits = query::by_date_range(&self.records, start, end);
        debug!(
            subsystem = "location",
            op = "by_date_range",
            result_count = hits.len(),
            "Date range lookup"
        );
        hits
    }

    // =========================================================================
    // REVISITS
    // =========================================================================

    /// Append a revisit to a record and persist.
    ///
    /// Fails with [`Error::LocationNotFound`] for an unknown id. The new
    /// entry is dated now; an unset rating stays unset.
    #[instrument(skip(self, reflection, options), fields(
        subsystem = "location",
        component = "engine",
        op = "add_revisit",
        location_id = %location_id,
    ))]
    pub async fn add_revisit(
        &mut self,
        location_id: Uuid,
        reflection: impl Into<String> + Send,
        options: RevisitOptions,
    ) -> Result<Revisit> {
        let revisit = append_revisit(
            &mut self.records,
            location_id,
            new_revisit(reflection, options),
        )?
        .clone();

        // Cluster contents are copies of the records.
        self.recompute_clusters();
        debug!(revisit_id = %revisit.id, "Revisit recorded");

        self.persist_after_mutation("add_revisit").await;
        Ok(revisit)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStore;
    use chrono::TimeZone;
    use mindtrail_core::ContentType;

    fn engine() -> LocationEngine {
        LocationEngine::new(EngineConfig::default())
    }

    fn at(lat: f64, lon: f64) -> CapturedLocation {
        CapturedLocation::at(lat, lon)
    }

    #[tokio::test]
    async fn test_associate_with_explicit_location() {
        let mut engine = engine();
        let record = engine
            .associate(
                AssociateRequest::new("moment_1", ContentType::Moment, "Tiananmen")
                    .with_thumbnail("https://img.example/t.jpg")
                    .at(at(39.9042, 116.4074)),
            )
            .await
            .unwrap();

        assert_eq!(engine.len(), 1);
        assert!(record.revisits.is_empty());
        assert_eq!(record.thumbnail.as_deref(), Some("https://img.example/t.jpg"));
        assert_eq!(engine.clusters().len(), 1);
        assert_eq!(engine.get(record.id), Some(&record));
    }

    #[tokio::test]
    async fn test_associate_without_source_fails_and_leaves_store() {
        let mut engine = engine();
        let err = engine
            .associate(AssociateRequest::new("a", ContentType::Article, "x"))
            .await
            .unwrap_err();

        assert!(matches!(err, Error::PositionUnavailable(PositionError::Unavailable(_))));
        assert!(engine.is_empty());
        assert!(engine.clusters().is_empty());
    }

    #[tokio::test]
    async fn test_associate_rejects_nan_coordinates() {
        let mut engine = engine();
        let err = engine
            .associate(AssociateRequest::new("a", ContentType::Article, "x").at(at(f64::NAN, 1.0)))
            .await
            .unwrap_err();
        assert!(matches!(err, Error::InvalidInput(_)));
        assert!(engine.is_empty());
    }

    #[tokio::test]
    async fn test_clear_empties_everything_without_persisting() {
        let sink = Arc::new(MemoryStore::new());
        let mut engine = engine().with_sink(sink.clone());
        engine
            .associate(AssociateRequest::new("a", ContentType::Gallery, "x").at(at(1.0, 1.0)))
            .await
            .unwrap();
        assert_eq!(sink.write_count().await, 1);

        engine.clear();
        assert!(engine.is_empty());
        assert!(engine.clusters().is_empty());
        assert!(engine.current_location().is_none());
        assert_eq!(sink.write_count().await, 1);

        engine.persist().await.unwrap();
        assert_eq!(sink.write_count().await, 2);
        assert!(sink.last_snapshot().await.unwrap().locations.is_empty());
    }

    #[tokio::test]
    async fn test_nearby_uses_configured_default_radius() {
        let config = EngineConfig {
            nearby_radius_m: 50.0,
            ..Default::default()
        };
        let mut engine = LocationEngine::new(config);
        engine
            .associate(
                AssociateRequest::new("a", ContentType::Moment, "x").at(at(39.9042, 116.4074)),
            )
            .await
            .unwrap();
        engine
            .associate(
                AssociateRequest::new("b", ContentType::Moment, "y").at(at(39.9050, 116.4080)),
            )
            .await
            .unwrap();

        assert_eq!(engine.nearby(39.9042, 116.4074, None).len(), 1);
        assert_eq!(engine.nearby(39.9042, 116.4074, Some(1000.0)).len(), 2);
    }

    #[tokio::test]
    async fn test_by_date_range_on_fresh_records() {
        let mut engine = engine();
        let before = Utc::now();
        engine
            .associate(AssociateRequest::new("a", ContentType::Video, "x").at(at(0.0, 0.0)))
            .await
            .unwrap();
        let after = Utc::now();

        assert_eq!(engine.by_date_range(before, after).len(), 1);
        let long_ago = Utc.with_ymd_and_hms(2020, 1, 1, 0, 0, 0).unwrap();
        assert!(engine.by_date_range(long_ago, long_ago).is_empty());
    }

    #[tokio::test]
    async fn test_add_revisit_refreshes_cluster_copies() {
        let mut engine = engine();
        let record = engine
            .associate(AssociateRequest::new("a", ContentType::Article, "x").at(at(0.0, 0.0)))
            .await
            .unwrap();

        engine
            .add_revisit(record.id, "back again", RevisitOptions::default())
            .await
            .unwrap();

        assert_eq!(engine.get(record.id).unwrap().revisits.len(), 1);
        assert_eq!(engine.clusters()[0].contents[0].revisits.len(), 1);
    }

    #[tokio::test]
    async fn test_load_replaces_store_and_rebuilds_clusters() {
        let mut seed = engine();
        for (i, (lat, lon)) in [(39.9042, 116.4074), (39.9050, 116.4080), (40.0084, 116.2972)]
            .into_iter()
            .enumerate()
        {
            seed.associate(
                AssociateRequest::new(format!("m{}", i), ContentType::Moment, "x").at(at(lat, lon)),
            )
            .await
            .unwrap();
        }
        let loader = MemoryStore::seeded(seed.records().to_vec());

        let mut engine = engine();
        assert_eq!(engine.load(&loader).await.unwrap(), 3);
        assert_eq!(engine.records(), seed.records());
        assert_eq!(engine.clusters().len(), 2);
    }

    #[tokio::test]
    async fn test_load_nothing_keeps_empty_store() {
        let mut engine = engine();
        assert_eq!(engine.load(&MemoryStore::new()).await.unwrap(), 0);
        assert!(engine.is_empty());
    }
}

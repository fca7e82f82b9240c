//! # mindtrail-location
//!
//! Location clustering and content association engine for mindtrail.
//!
//! The engine keeps an in-memory Store of geotagged content records, groups
//! them into seed-centered clusters, answers radius and date-range queries,
//! and records follow-up revisits. Device position, reverse geocoding, and
//! persistence are injected through the traits in `mindtrail_core`.
//!
//! ```rust,ignore
//! use mindtrail_location::{EngineConfig, LocationEngine, JsonFileStore, FixedPosition};
//!
//! let store = Arc::new(JsonFileStore::new(&config.data_dir));
//! let mut engine = LocationEngine::new(config)
//!     .with_position_source(Arc::new(FixedPosition::new(39.9042, 116.4074)))
//!     .with_sink(store.clone());
//! engine.load(&*store).await?;
//!
//! let record = engine
//!     .associate(AssociateRequest::new("moment_1", ContentType::Moment, "Tiananmen"))
//!     .await?;
//! let nearby = engine.nearby(record.latitude, record.longitude, None);
//! ```

pub mod cluster;
pub mod config;
pub mod engine;
pub mod position;
pub mod query;
pub mod revisit;
pub mod storage;

pub use cluster::build_clusters;
pub use config::{ConfigError, EngineConfig};
pub use engine::LocationEngine;
pub use position::FixedPosition;
pub use storage::{JsonFileStore, MemoryStore};

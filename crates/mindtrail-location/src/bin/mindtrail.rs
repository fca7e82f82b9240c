//! mindtrail: command-line host for the location engine.
//!
//! Operates on the JSON file store in the configured data directory and
//! prints results as JSON.
//!
//! Environment variables:
//!   LOG_FORMAT                - "json" or "text" (default: "text")
//!   LOG_FILE                  - path to log file (optional, enables file logging)
//!   RUST_LOG                  - standard env filter
//!                               (default: "mindtrail=info,mindtrail_location=info")
//!   MINDTRAIL_FIXED_POSITION  - "lat,lon" used when `associate` gets no coordinates
//!   MINDTRAIL_*               - engine settings, see `EngineConfig::from_env`

use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use anyhow::{anyhow, Context};
use chrono::{DateTime, Utc};
use clap::{Parser, Subcommand};
use mindtrail_core::{AssociateRequest, CapturedLocation, ContentType, Mood, Rating, RevisitOptions};
use mindtrail_location::{EngineConfig, FixedPosition, JsonFileStore, LocationEngine};
use serde::Serialize;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use uuid::Uuid;

#[derive(Parser)]
#[command(name = "mindtrail")]
#[command(author, version, about = "Geotagged content clustering for mindtrail")]
#[command(propagate_version = true)]
struct Cli {
    /// Engine config file (default: ~/.config/mindtrail/engine.toml, then env)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Override the data directory
    #[arg(short, long, global = true)]
    data_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Associate a content item with a position
    Associate {
        #[arg(long)]
        content_id: String,

        /// moment, article, gallery, or video
        #[arg(long)]
        content_type: String,

        #[arg(long)]
        title: String,

        #[arg(long)]
        preview: Option<String>,

        #[arg(long)]
        thumbnail: Option<String>,

        /// Latitude in decimal degrees (requires --lon)
        #[arg(long, requires = "lon", allow_hyphen_values = true)]
        lat: Option<f64>,

        /// Longitude in decimal degrees (requires --lat)
        #[arg(long, requires = "lat", allow_hyphen_values = true)]
        lon: Option<f64>,

        /// Positioning accuracy in meters
        #[arg(long)]
        accuracy: Option<f64>,

        #[arg(long)]
        address: Option<String>,

        #[arg(long)]
        city: Option<String>,

        #[arg(long)]
        country: Option<String>,
    },

    /// Append a revisit to a location record
    Revisit {
        location_id: Uuid,

        reflection: String,

        #[arg(long)]
        mood: Option<String>,

        /// Photo URL (repeatable)
        #[arg(long = "photo")]
        photos: Vec<String>,

        /// 1 to 5
        #[arg(long)]
        rating: Option<u8>,
    },

    /// Print the current clusters
    Clusters,

    /// Records within a radius of a point
    Nearby {
        #[arg(long, allow_hyphen_values = true)]
        lat: f64,

        #[arg(long, allow_hyphen_values = true)]
        lon: f64,

        /// Meters (default from config)
        #[arg(long)]
        radius: Option<f64>,
    },

    /// Records created in an inclusive RFC 3339 interval (empty if start > end)
    Range {
        #[arg(long)]
        start: DateTime<Utc>,

        #[arg(long)]
        end: DateTime<Utc>,
    },

    /// Print every record in the store
    List,

    /// Remove every record and persist the empty store
    Clear,

    /// Print the effective engine configuration
    Config,
}

fn init_tracing() -> Option<tracing_appender::non_blocking::WorkerGuard> {
    let log_format = std::env::var("LOG_FORMAT").unwrap_or_else(|_| "text".to_string());
    let log_file = std::env::var("LOG_FILE").ok();

    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "mindtrail=info,mindtrail_location=info".into());
    let registry = tracing_subscriber::registry().with(env_filter);

    if let Some(ref path) = log_file {
        let path = std::path::Path::new(path);
        let file_dir = path.parent().unwrap_or(std::path::Path::new("."));
        let file_name = path
            .file_name()
            .and_then(|f| f.to_str())
            .unwrap_or("mindtrail.log");
        let file_appender = tracing_appender::rolling::daily(file_dir, file_name);
        let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

        if log_format == "json" {
            registry
                .with(tracing_subscriber::fmt::layer().json().with_writer(non_blocking))
                .init();
        } else {
            registry
                .with(
                    tracing_subscriber::fmt::layer()
                        .with_writer(non_blocking)
                        .with_ansi(false),
                )
                .init();
        }
        Some(guard)
    } else {
        // Logs go to stderr so stdout stays valid JSON.
        if log_format == "json" {
            registry
                .with(tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr))
                .init();
        } else {
            registry
                .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
                .init();
        }
        None
    }
}

fn load_config(cli: &Cli) -> anyhow::Result<EngineConfig> {
    let mut config = match &cli.config {
        Some(path) => EngineConfig::from_file(path)
            .with_context(|| format!("reading config {}", path.display()))?,
        None => EngineConfig::load()?,
    };
    if let Some(dir) = &cli.data_dir {
        config.data_dir = dir.clone();
    }
    Ok(config)
}

fn fixed_position_from_env() -> anyhow::Result<Option<FixedPosition>> {
    let Ok(raw) = std::env::var("MINDTRAIL_FIXED_POSITION") else {
        return Ok(None);
    };
    let (lat, lon) = raw
        .split_once(',')
        .ok_or_else(|| anyhow!("MINDTRAIL_FIXED_POSITION must be \"lat,lon\", got {:?}", raw))?;
    let lat: f64 = lat.trim().parse().context("MINDTRAIL_FIXED_POSITION latitude")?;
    let lon: f64 = lon.trim().parse().context("MINDTRAIL_FIXED_POSITION longitude")?;
    Ok(Some(FixedPosition::new(lat, lon)))
}

fn print_json<T: Serialize>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    let config = load_config(&cli)?;

    if let Commands::Config = cli.command {
        return print_json(&config);
    }

    let store = Arc::new(JsonFileStore::new(&config.data_dir));
    let mut engine = LocationEngine::new(config).with_sink(store.clone());
    if let Some(source) = fixed_position_from_env()? {
        engine = engine.with_position_source(Arc::new(source));
    }

    let loaded = engine.load(&*store).await?;
    info!(
        data_dir = %store.dir().display(),
        record_count = loaded,
        "Store opened"
    );

    match cli.command {
        Commands::Associate {
            content_id,
            content_type,
            title,
            preview,
            thumbnail,
            lat,
            lon,
            accuracy,
            address,
            city,
            country,
        } => {
            let content_type: ContentType = content_type.parse()?;
            let mut req = AssociateRequest::new(content_id, content_type, title);
            req.preview = preview;
            req.thumbnail = thumbnail;
            if let (Some(lat), Some(lon)) = (lat, lon) {
                let mut location = CapturedLocation::at(lat, lon);
                location.accuracy = accuracy;
                location.address = address;
                location.city = city;
                location.country = country;
                req = req.at(location);
            }
            let record = engine.associate(req).await?;
            print_json(&record)
        }
        Commands::Revisit {
            location_id,
            reflection,
            mood,
            photos,
            rating,
        } => {
            let options = RevisitOptions {
                mood: mood.as_deref().map(str::parse::<Mood>).transpose()?,
                photos,
                rating: rating.map(Rating::new).transpose()?,
            };
            let revisit = engine.add_revisit(location_id, reflection, options).await?;
            print_json(&revisit)
        }
        Commands::Clusters => print_json(&engine.clusters()),
        Commands::Nearby { lat, lon, radius } => print_json(&engine.nearby(lat, lon, radius)),
        Commands::Range { start, end } => print_json(&engine.by_date_range(start, end)),
        Commands::List => print_json(&engine.records()),
        Commands::Clear => {
            engine.clear();
            engine.persist().await?;
            print_json(&serde_json::json!({ "cleared": loaded }))
        }
        Commands::Config => unreachable!("handled before the store is opened"),
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    dotenvy::dotenv().ok();
    let _log_guard = init_tracing();

    match run(Cli::parse()).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!(error = %e, "mindtrail command failed");
            eprintln!("Error: {:#}", e);
            ExitCode::FAILURE
        }
    }
}

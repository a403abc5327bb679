use std::sync::Arc;

use tokio::task::JoinHandle;
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::api::{create_router, AppState};
use crate::cache::SnapshotCache;
use crate::config::Config;
use crate::fetcher::WeatherCsvFetcher;
use crate::pipeline::WeatherPipeline;
use crate::services::SeriesService;

/// Running application: the HTTP server task.
///
/// Snapshots are computed on demand and cached; there are no background schedulers.
pub struct Application {
    pub server_handle: JoinHandle<Result<(), std::io::Error>>,
}

impl Application {
    /// Wire fetcher, pipeline, cache and service from `config` into an `AppState`.
    pub fn state(config: &Config) -> Result<AppState, Box<dyn std::error::Error>> {
        let fetcher = WeatherCsvFetcher::new(config.csv_url.clone(), config.fetch_timeout())?;
        let pipeline = WeatherPipeline::new(config.csv_skip_rows, config.gap_threshold());
        let cache = Arc::new(SnapshotCache::new(config.cache_ttl()));

        info!(
            "Snapshot freshness window: {}s, gap threshold: {} minutes",
            config.cache_ttl_seconds, config.gap_threshold_minutes
        );

        Ok(AppState {
            series_service: SeriesService::new(fetcher, pipeline, cache),
        })
    }

    /// Build the application and spawn the HTTP server.
    pub async fn build(config: Config) -> Result<Self, Box<dyn std::error::Error>> {
        info!("Initializing application components");

        let app_state = Self::state(&config)?;
        let app = create_router(app_state).layer(TraceLayer::new_for_http());

        let addr = config.server_addr();
        info!("Starting HTTP server on {}", addr);

        let listener = tokio::net::TcpListener::bind(&addr).await?;
        let server_handle = tokio::spawn(async move { axum::serve(listener, app).await });

        info!("Application initialized successfully");

        Ok(Self { server_handle })
    }

    /// Wait for the server task to finish.
    pub async fn run_until_stopped(self) -> Result<(), Box<dyn std::error::Error>> {
        self.server_handle.await??;
        Ok(())
    }
}

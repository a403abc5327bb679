use std::sync::Arc;

use tracing::{debug, info, instrument};

use crate::cache::SnapshotCache;
use crate::fetch_error::FetchError;
use crate::fetcher::WeatherCsvFetcher;
use crate::pipeline::{PipelineError, WeatherPipeline};
use crate::snapshot::WeatherSnapshot;

#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    #[error(transparent)]
    Fetch(#[from] FetchError),
    #[error(transparent)]
    Pipeline(#[from] PipelineError),
    #[error("Pipeline task failed: {0}")]
    Task(String),
}

/// Fetches the export, runs the pipeline and memoizes the snapshot per source.
#[derive(Clone)]
pub struct SeriesService {
    fetcher: WeatherCsvFetcher,
    pipeline: WeatherPipeline,
    cache: Arc<SnapshotCache<WeatherSnapshot>>,
}

impl SeriesService {
    pub fn new(
        fetcher: WeatherCsvFetcher,
        pipeline: WeatherPipeline,
        cache: Arc<SnapshotCache<WeatherSnapshot>>,
    ) -> Self {
        Self {
            fetcher,
            pipeline,
            cache,
        }
    }

    /// Current snapshot, recomputed when the cached one is older than the freshness window.
    ///
    /// Failures and empty results are never cached.
    #[instrument(skip(self), fields(source = %self.fetcher.url()))]
    pub async fn get_snapshot(&self) -> Result<Arc<WeatherSnapshot>, ServiceError> {
        let key = self.fetcher.url();
        if let Some(snapshot) = self.cache.get_fresh(key) {
            return Ok(snapshot);
        }

        debug!("No fresh snapshot, fetching export");
        let csv = self.fetcher.fetch_csv().await?;

        let pipeline = self.pipeline;
        let source = key.to_string();
        let snapshot = tokio::task::spawn_blocking(move || {
            pipeline
                .run(&csv)
                .map(|output| WeatherSnapshot::new(source, output))
        })
        .await
        .map_err(|e| ServiceError::Task(e.to_string()))??;

        info!(
            "Computed snapshot with {} records ({} dropped rows)",
            snapshot.table().len(),
            snapshot.dropped_rows()
        );

        Ok(self.cache.insert(key, snapshot))
    }

    /// Drop the cached snapshot so the next call recomputes.
    pub fn invalidate(&self) {
        self.cache.invalidate(self.fetcher.url());
    }
}

#![allow(dead_code)]

use std::sync::Arc;
use std::time::Duration;

use weather_series_service::api::{create_router, AppState};
use weather_series_service::cache::SnapshotCache;
use weather_series_service::fetcher::WeatherCsvFetcher;
use weather_series_service::pipeline::{default_gap_threshold, WeatherPipeline};
use weather_series_service::services::SeriesService;

pub const CLEANED_SAMPLE: &str = include_str!("../sample-data-files/WD_clean_sample.csv");
pub const LEGACY_SAMPLE: &str = include_str!("../sample-data-files/legacy_export_sample.csv");

/// Service pointed at `url` with the default gap threshold and a 10 minute cache.
pub fn series_service(url: String, skip_rows: usize) -> SeriesService {
    let fetcher =
        WeatherCsvFetcher::new(url, Duration::from_secs(5)).expect("Failed to create fetcher");
    let pipeline = WeatherPipeline::new(skip_rows, default_gap_threshold());
    let cache = Arc::new(SnapshotCache::new(Duration::from_secs(600)));
    SeriesService::new(fetcher, pipeline, cache)
}

pub fn router(url: String, skip_rows: usize) -> axum::Router {
    create_router(AppState {
        series_service: series_service(url, skip_rows),
    })
}

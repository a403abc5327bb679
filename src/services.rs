pub mod series_service;

pub use series_service::{SeriesService, ServiceError};

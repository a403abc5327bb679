pub mod api;
pub mod app;
pub mod cache;
pub mod config;
pub mod fetch_error;
pub mod fetcher;
pub mod pipeline;
pub mod services;
pub mod snapshot;

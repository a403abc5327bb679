use std::env;
use std::time::Duration;

use crate::pipeline::gaps::DEFAULT_GAP_THRESHOLD_MINUTES;
use crate::pipeline::{default_gap_threshold, gap_threshold_from_minutes};

#[derive(Debug, Clone)]
pub struct Config {
    pub csv_url: String,
    pub server_host: String,
    pub server_port: u16,
    pub cache_ttl_seconds: u64,
    pub gap_threshold_minutes: i64,
    pub csv_skip_rows: usize,
    pub fetch_timeout_seconds: u64,
}

impl Config {
    pub fn from_env() -> Result<Self, env::VarError> {
        Ok(Config {
            csv_url: env::var("WEATHER_CSV_URL")?,
            server_host: env::var("SERVER_HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
            server_port: env::var("SERVER_PORT")
                .unwrap_or_else(|_| "8080".to_string())
                .parse()
                .unwrap_or(8080),
            cache_ttl_seconds: env::var("CACHE_TTL_SECONDS")
                .unwrap_or_else(|_| "600".to_string())
                .parse()
                .unwrap_or(600),
            gap_threshold_minutes: env::var("GAP_THRESHOLD_MINUTES")
                .ok()
                .and_then(|v| v.parse().ok())
                .filter(|minutes| gap_threshold_from_minutes(*minutes).is_some())
                .unwrap_or(DEFAULT_GAP_THRESHOLD_MINUTES),
            csv_skip_rows: env::var("CSV_SKIP_ROWS")
                .unwrap_or_else(|_| "0".to_string())
                .parse()
                .unwrap_or(0),
            fetch_timeout_seconds: env::var("FETCH_TIMEOUT_SECONDS")
                .unwrap_or_else(|_| "30".to_string())
                .parse()
                .unwrap_or(30),
        })
    }

    pub fn server_addr(&self) -> String {
        format!("{}:{}", self.server_host, self.server_port)
    }

    pub fn cache_ttl(&self) -> Duration {
        Duration::from_secs(self.cache_ttl_seconds)
    }

    /// Falls back to the default when the field holds a non-positive or
    /// out-of-range value.
    pub fn gap_threshold(&self) -> chrono::Duration {
        gap_threshold_from_minutes(self.gap_threshold_minutes)
            .unwrap_or_else(default_gap_threshold)
    }

    pub fn fetch_timeout(&self) -> Duration {
        Duration::from_secs(self.fetch_timeout_seconds)
    }
}

// Weather series pipeline
//
// Turns a loosely formatted CSV weather export into a clean, time-indexed
// observation series:
// raw CSV -> label normalization -> type coercion -> time index -> gap markers

pub mod coercion;
pub mod columns;
pub mod error;
pub mod gaps;
pub mod raw_table;
pub mod record;
pub mod schema;
pub mod time_index;

pub use coercion::Cell;
pub use error::PipelineError;
pub use gaps::{default_gap_threshold, gap_threshold_from_minutes, insert_gap_markers};
pub use raw_table::RawTable;
pub use record::{ObservationRecord, ObservationSeries, RecordKind};
pub use schema::{HeaderDialect, Measure, SeriesSchema};
pub use time_index::TimeIndexOutcome;

use chrono::Duration;
use tracing::{debug, info, instrument, warn};

/// Everything one pipeline run produces.
#[derive(Debug, Clone)]
pub struct PipelineOutput {
    pub schema: SeriesSchema,
    /// Ordered observations without gap markers, for the tabular view.
    pub table: ObservationSeries,
    /// Same observations with gap markers, for charting.
    pub chart: ObservationSeries,
    pub dropped_rows: usize,
    pub total_rows: usize,
}

/// Configured pipeline. Stateless; safe to share between callers.
#[derive(Debug, Clone, Copy)]
pub struct WeatherPipeline {
    skip_rows: usize,
    gap_threshold: Duration,
}

impl Default for WeatherPipeline {
    fn default() -> Self {
        Self::new(0, default_gap_threshold())
    }
}

impl WeatherPipeline {
    /// # Arguments
    /// * `skip_rows` - Leading CSV records to discard before the header
    /// * `gap_threshold` - Spacing beyond which consecutive records are discontinuous
    pub fn new(skip_rows: usize, gap_threshold: Duration) -> Self {
        Self {
            skip_rows,
            gap_threshold,
        }
    }

    pub fn gap_threshold(&self) -> Duration {
        self.gap_threshold
    }

    #[instrument(skip(self, csv_text), fields(payload_size = csv_text.len()))]
    pub fn run(&self, csv_text: &str) -> Result<PipelineOutput, PipelineError> {
        let raw = RawTable::from_csv(csv_text, self.skip_rows)?;

        let labels = columns::normalize_labels(raw.headers());
        debug!("Normalized labels: {:?}", labels);

        let schema = SeriesSchema::resolve(&labels)?;

        let rows = coercion::coerce_rows(&labels, raw.rows(), &schema::numeric_allow_list());

        let outcome = time_index::build_series(&schema, &labels, &rows)?;
        if outcome.dropped_rows > 0 {
            warn!(
                "{} of {} rows dropped during time indexing",
                outcome.dropped_rows, outcome.total_rows
            );
        }

        let chart = insert_gap_markers(&outcome.series, self.gap_threshold);

        info!(
            "Built {:?} series: {} records, {} gap markers, {} rows dropped",
            schema.dialect(),
            outcome.series.len(),
            chart.gap_marker_count(),
            outcome.dropped_rows
        );

        Ok(PipelineOutput {
            schema,
            table: outcome.series,
            chart,
            dropped_rows: outcome.dropped_rows,
            total_rows: outcome.total_rows,
        })
    }
}

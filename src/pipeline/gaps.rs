//! Inserts null-valued marker rows at temporal gaps so line charts break
//! instead of interpolating across missing intervals.
use chrono::Duration;
use tracing::debug;

use crate::pipeline::record::{ObservationRecord, ObservationSeries};

pub const DEFAULT_GAP_THRESHOLD_MINUTES: i64 = 120;

pub fn default_gap_threshold() -> Duration {
    Duration::minutes(DEFAULT_GAP_THRESHOLD_MINUTES)
}

/// Threshold for a configured number of minutes, or `None` when the value is
/// not positive or too large to represent.
pub fn gap_threshold_from_minutes(minutes: i64) -> Option<Duration> {
    if minutes <= 0 {
        return None;
    }
    Duration::try_minutes(minutes)
}

/// Return a copy of `series` with a gap marker before every observed record
/// that follows its observed predecessor by strictly more than `threshold`.
///
/// Each marker sits one second before the later record with every measurement
/// missing. Existing markers are carried over and a gap that already has its
/// marker is not marked again, so the operation is idempotent.
pub fn insert_gap_markers(series: &ObservationSeries, threshold: Duration) -> ObservationSeries {
    if series.len() < 2 {
        return series.clone();
    }

    let one_second = Duration::seconds(1);
    let mut records: Vec<ObservationRecord> = Vec::with_capacity(series.len());
    let mut previous = None;
    let mut inserted = 0;

    for record in series {
        if record.is_gap_marker() {
            records.push(record.clone());
            continue;
        }

        if let Some(previous) = previous {
            let delta = record.timestamp() - previous;
            let marker_at = record.timestamp() - one_second;
            let already_marked = records
                .last()
                .is_some_and(|last| last.is_gap_marker() && last.timestamp() == marker_at);

            if delta > threshold && marker_at > previous && !already_marked {
                debug!(
                    "Gap of {} minutes ending at {}",
                    delta.num_minutes(),
                    record.timestamp()
                );
                records.push(ObservationRecord::gap_marker(
                    marker_at,
                    record.values().keys(),
                ));
                inserted += 1;
            }
        }

        previous = Some(record.timestamp());
        records.push(record.clone());
    }

    debug!("Inserted {} gap markers", inserted);

    ObservationSeries::from_sorted(series.labels().to_vec(), records)
}

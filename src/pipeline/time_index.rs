//! Fuses the separate `Date` and `Time` columns into one ordered timestamp index.
use std::borrow::Cow;
use std::collections::BTreeMap;

use chrono::{NaiveDate, NaiveDateTime};
use tracing::{debug, warn};

use crate::pipeline::coercion::Cell;
use crate::pipeline::record::{ObservationRecord, ObservationSeries};
use crate::pipeline::schema::SeriesSchema;
use crate::pipeline::PipelineError;

/// Date layouts, day-first before month-first, two-digit years before four.
///
/// Month-first layouts only match when the day-first reading is impossible
/// (e.g. `04/13/23`).
const DATE_FORMATS: [&str; 12] = [
    "%d/%m/%y", "%d/%m/%Y", "%d-%m-%y", "%d-%m-%Y", "%d.%m.%y", "%d.%m.%Y", "%Y-%m-%d", "%Y/%m/%d",
    "%m/%d/%y", "%m/%d/%Y", "%m-%d-%y", "%m-%d-%Y",
];

const TIME_FORMATS: [&str; 5] = ["%H:%M", "%H:%M:%S", "%H:%M:%S%.f", "%I:%M %p", "%I:%M:%S %p"];

/// Result of building the time index.
#[derive(Debug, Clone)]
pub struct TimeIndexOutcome {
    pub series: ObservationSeries,
    /// Rows dropped because their date/time text did not parse.
    pub dropped_rows: usize,
    pub total_rows: usize,
}

/// Parse `"<date> <time>"` with the day-first convention.
///
/// `13/04/23 14:05` is 13 April 2023. A blank time parses as midnight.
pub fn parse_day_first(date: &str, time: &str) -> Option<NaiveDateTime> {
    let time = expand_short_meridiem(time.trim());
    let combined = format!("{} {}", date.trim(), time);
    let combined = combined.trim();

    if combined.is_empty() {
        return None;
    }

    for date_format in DATE_FORMATS {
        if time.is_empty() {
            if let Ok(day) = NaiveDate::parse_from_str(combined, date_format) {
                return day.and_hms_opt(0, 0, 0);
            }
            continue;
        }

        for time_format in TIME_FORMATS {
            let format = format!("{date_format} {time_format}");
            if let Ok(parsed) = NaiveDateTime::parse_from_str(combined, &format) {
                return Some(parsed);
            }
        }
    }

    None
}

/// Station software writes `2:05a` / `11:30p`; expand to `2:05 AM` / `11:30 PM`.
fn expand_short_meridiem(time: &str) -> Cow<'_, str> {
    let mut chars = time.chars().rev();
    let (Some(last), Some(before)) = (chars.next(), chars.next()) else {
        return Cow::Borrowed(time);
    };

    if !before.is_ascii_digit() {
        return Cow::Borrowed(time);
    }

    let meridiem = match last.to_ascii_lowercase() {
        'a' => "AM",
        'p' => "PM",
        _ => return Cow::Borrowed(time),
    };

    Cow::Owned(format!("{} {meridiem}", &time[..time.len() - 1]))
}

/// Build an ascending series from coerced rows.
///
/// Rows whose date/time text does not parse are dropped and counted. Rows that
/// share a timestamp keep their source order. The `Date` and `Time` columns are
/// consumed and do not appear in the records.
pub fn build_series(
    schema: &SeriesSchema,
    labels: &[String],
    rows: &[Vec<Cell>],
) -> Result<TimeIndexOutcome, PipelineError> {
    let date_column = schema.date_column();
    let time_column = schema.time_column();

    let mut records = Vec::with_capacity(rows.len());
    let mut dropped_rows = 0;

    for (row_idx, row) in rows.iter().enumerate() {
        let date = row.get(date_column).and_then(Cell::as_text).unwrap_or("");
        let time = row.get(time_column).and_then(Cell::as_text).unwrap_or("");

        let Some(timestamp) = parse_day_first(date, time) else {
            debug!(
                "Dropping row {}: unparseable date/time (date='{}', time='{}')",
                row_idx + 1,
                date,
                time
            );
            dropped_rows += 1;
            continue;
        };

        let mut values = BTreeMap::new();
        let mut text = BTreeMap::new();
        for (col_idx, (label, cell)) in labels.iter().zip(row).enumerate() {
            if col_idx == date_column || col_idx == time_column {
                continue;
            }
            match cell {
                Cell::Measurement(value) => {
                    values.insert(label.clone(), *value);
                }
                Cell::Text(raw) => {
                    text.insert(label.clone(), raw.clone());
                }
            }
        }

        records.push(ObservationRecord::observed(timestamp, values, text));
    }

    if dropped_rows > 0 {
        warn!(
            "Dropped {} rows with unparseable date/time out of {}",
            dropped_rows,
            rows.len()
        );
    }

    if records.is_empty() {
        return Err(PipelineError::EmptyResult { dropped_rows });
    }

    // sort_by_key is stable: equal timestamps keep source order
    records.sort_by_key(ObservationRecord::timestamp);

    let series_labels = labels
        .iter()
        .enumerate()
        .filter(|(idx, _)| *idx != date_column && *idx != time_column)
        .map(|(_, label)| label.clone())
        .collect();

    Ok(TimeIndexOutcome {
        series: ObservationSeries::from_sorted(series_labels, records),
        dropped_rows,
        total_rows: rows.len(),
    })
}

use std::collections::BTreeMap;

use chrono::NaiveDateTime;
use serde::Serialize;
use utoipa::ToSchema;

use crate::pipeline::schema::{Measure, SeriesSchema};

/// Whether a record came from the source or was synthesized for rendering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum RecordKind {
    Observed,
    /// Null-valued row that tells a line chart to break. Never recorded data.
    GapMarker,
}

/// One timestamped row of measurements.
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct ObservationRecord {
    #[schema(value_type = String, format = DateTime)]
    timestamp: NaiveDateTime,
    kind: RecordKind,
    #[schema(value_type = Object)]
    values: BTreeMap<String, Option<f64>>,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    #[schema(value_type = Object)]
    text: BTreeMap<String, String>,
}

impl ObservationRecord {
    pub fn observed(
        timestamp: NaiveDateTime,
        values: BTreeMap<String, Option<f64>>,
        text: BTreeMap<String, String>,
    ) -> Self {
        Self {
            timestamp,
            kind: RecordKind::Observed,
            values,
            text,
        }
    }

    /// A marker with every given measurement label set to missing.
    pub fn gap_marker<'a>(timestamp: NaiveDateTime, labels: impl IntoIterator<Item = &'a String>) -> Self {
        Self {
            timestamp,
            kind: RecordKind::GapMarker,
            values: labels.into_iter().map(|label| (label.clone(), None)).collect(),
            text: BTreeMap::new(),
        }
    }

    pub fn timestamp(&self) -> NaiveDateTime {
        self.timestamp
    }

    pub fn kind(&self) -> RecordKind {
        self.kind
    }

    pub fn is_gap_marker(&self) -> bool {
        self.kind == RecordKind::GapMarker
    }

    pub fn values(&self) -> &BTreeMap<String, Option<f64>> {
        &self.values
    }

    pub fn text(&self) -> &BTreeMap<String, String> {
        &self.text
    }

    /// Numeric value for a label; `None` when missing or not a measurement column.
    pub fn value(&self, label: &str) -> Option<f64> {
        self.values.get(label).copied().flatten()
    }

    pub fn text_value(&self, label: &str) -> Option<&str> {
        self.text.get(label).map(String::as_str)
    }

    /// Value of a recognized measure under the export's schema.
    pub fn measure(&self, schema: &SeriesSchema, measure: Measure) -> Option<f64> {
        schema.label_for(measure).and_then(|label| self.value(label))
    }
}

/// Records sorted ascending by timestamp, plus the table's normalized labels.
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct ObservationSeries {
    labels: Vec<String>,
    records: Vec<ObservationRecord>,
}

impl ObservationSeries {
    /// Wrap records that are already in ascending timestamp order.
    pub(crate) fn from_sorted(labels: Vec<String>, records: Vec<ObservationRecord>) -> Self {
        debug_assert!(records
            .windows(2)
            .all(|pair| pair[0].timestamp() <= pair[1].timestamp()));
        Self { labels, records }
    }

    pub fn labels(&self) -> &[String] {
        &self.labels
    }

    pub fn records(&self) -> &[ObservationRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, ObservationRecord> {
        self.records.iter()
    }

    pub fn timestamps(&self) -> impl Iterator<Item = NaiveDateTime> + '_ {
        self.records.iter().map(ObservationRecord::timestamp)
    }

    /// Real rows only, skipping gap markers.
    pub fn observed(&self) -> impl DoubleEndedIterator<Item = &ObservationRecord> + '_ {
        self.records.iter().filter(|record| !record.is_gap_marker())
    }

    pub fn observed_count(&self) -> usize {
        self.observed().count()
    }

    pub fn gap_marker_count(&self) -> usize {
        self.records.len() - self.observed_count()
    }

    /// Most recent real record.
    pub fn latest(&self) -> Option<&ObservationRecord> {
        self.observed().next_back()
    }
}

impl<'a> IntoIterator for &'a ObservationSeries {
    type Item = &'a ObservationRecord;
    type IntoIter = std::slice::Iter<'a, ObservationRecord>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.iter()
    }
}

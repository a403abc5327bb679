//! Header dialect detection and the statically declared record schema.
use serde::Serialize;
use tracing::debug;
use utoipa::ToSchema;

use crate::pipeline::PipelineError;

pub const DATE_COLUMN: &str = "Date";
pub const TIME_COLUMN: &str = "Time";

/// Labels that only appear in the legacy (station software) export.
const LEGACY_MARKERS: [&str; 6] = [
    "Out Temp",
    "Out Hum",
    "Wind Speed",
    "Dew Pt",
    "Solar Rad",
    "Rain Rate",
];

/// Header naming convention of a weather export.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum HeaderDialect {
    /// Raw station export: `Out Temp`, `Out Hum`, `Wind Speed`, `Dew Pt.`, `Solar Rad.`, `Rain Rate`
    Legacy,
    /// Pre-cleaned export: `Temp`, `Hum`, `Speed`, `Pt`, `Rad`, `Rate`
    Cleaned,
}

impl HeaderDialect {
    /// Pick the dialect from already-normalized labels.
    pub fn detect<S: AsRef<str>>(labels: &[S]) -> Self {
        let is_legacy = labels
            .iter()
            .any(|label| LEGACY_MARKERS.contains(&label.as_ref()));

        if is_legacy {
            HeaderDialect::Legacy
        } else {
            HeaderDialect::Cleaned
        }
    }
}

/// A physical quantity recorded by the station.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum Measure {
    Temperature,
    Humidity,
    DewPoint,
    WindSpeed,
    Barometer,
    Rain,
    RainRate,
    SolarRadiation,
}

impl Measure {
    pub const ALL: [Measure; 8] = [
        Measure::Temperature,
        Measure::Humidity,
        Measure::DewPoint,
        Measure::WindSpeed,
        Measure::Barometer,
        Measure::Rain,
        Measure::RainRate,
        Measure::SolarRadiation,
    ];

    /// Column label used for this measure by the given dialect.
    pub fn label(self, dialect: HeaderDialect) -> &'static str {
        match (dialect, self) {
            (HeaderDialect::Legacy, Measure::Temperature) => "Out Temp",
            (HeaderDialect::Legacy, Measure::Humidity) => "Out Hum",
            (HeaderDialect::Legacy, Measure::DewPoint) => "Dew Pt",
            (HeaderDialect::Legacy, Measure::WindSpeed) => "Wind Speed",
            (HeaderDialect::Legacy, Measure::RainRate) => "Rain Rate",
            (HeaderDialect::Legacy, Measure::SolarRadiation) => "Solar Rad",
            (HeaderDialect::Cleaned, Measure::Temperature) => "Temp",
            (HeaderDialect::Cleaned, Measure::Humidity) => "Hum",
            (HeaderDialect::Cleaned, Measure::DewPoint) => "Pt",
            (HeaderDialect::Cleaned, Measure::WindSpeed) => "Speed",
            (HeaderDialect::Cleaned, Measure::RainRate) => "Rate",
            (HeaderDialect::Cleaned, Measure::SolarRadiation) => "Rad",
            (_, Measure::Barometer) => "Bar",
            (_, Measure::Rain) => "Rain",
        }
    }

    pub fn display_name(self) -> &'static str {
        match self {
            Measure::Temperature => "Temperature",
            Measure::Humidity => "Humidity",
            Measure::DewPoint => "Dew Point",
            Measure::WindSpeed => "Wind Speed",
            Measure::Barometer => "Barometer",
            Measure::Rain => "Rainfall",
            Measure::RainRate => "Rain Rate",
            Measure::SolarRadiation => "Solar Radiation",
        }
    }

    pub fn unit(self) -> &'static str {
        match self {
            Measure::Temperature | Measure::DewPoint => "°C",
            Measure::Humidity => "%",
            Measure::WindSpeed => "km/h",
            Measure::Barometer => "mbar",
            Measure::Rain => "mm",
            Measure::RainRate => "mm/h",
            Measure::SolarRadiation => "W/m²",
        }
    }
}

/// Labels coerced to numbers regardless of dialect.
///
/// Covers both dialects so coercion does not depend on dialect detection.
pub fn numeric_allow_list() -> Vec<&'static str> {
    let mut labels = Vec::new();
    for dialect in [HeaderDialect::Legacy, HeaderDialect::Cleaned] {
        for measure in Measure::ALL {
            let label = measure.label(dialect);
            if !labels.contains(&label) {
                labels.push(label);
            }
        }
    }
    labels
}

/// Column layout of one export, resolved once at ingestion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SeriesSchema {
    dialect: HeaderDialect,
    date_column: usize,
    time_column: usize,
    measures: Vec<(Measure, String)>,
}

impl SeriesSchema {
    /// Resolve the schema from normalized labels.
    ///
    /// Fails when either the `Date` or the `Time` column is absent.
    pub fn resolve<S: AsRef<str>>(labels: &[S]) -> Result<Self, PipelineError> {
        let position = |name: &str| labels.iter().position(|label| label.as_ref() == name);

        let date_column = position(DATE_COLUMN);
        let time_column = position(TIME_COLUMN);

        let (date_column, time_column) = match (date_column, time_column) {
            (Some(date), Some(time)) => (date, time),
            (date, time) => {
                let mut missing = Vec::new();
                if date.is_none() {
                    missing.push(DATE_COLUMN.to_string());
                }
                if time.is_none() {
                    missing.push(TIME_COLUMN.to_string());
                }
                return Err(PipelineError::Schema { missing });
            }
        };

        let dialect = HeaderDialect::detect(labels);
        let measures: Vec<(Measure, String)> = Measure::ALL
            .iter()
            .map(|measure| (*measure, measure.label(dialect)))
            .filter(|(_, label)| position(*label).is_some())
            .map(|(measure, label)| (measure, label.to_string()))
            .collect();

        debug!(
            "Resolved {:?} dialect with {} recognized measures",
            dialect,
            measures.len()
        );

        Ok(Self {
            dialect,
            date_column,
            time_column,
            measures,
        })
    }

    pub fn dialect(&self) -> HeaderDialect {
        self.dialect
    }

    pub fn date_column(&self) -> usize {
        self.date_column
    }

    pub fn time_column(&self) -> usize {
        self.time_column
    }

    /// Recognized measures present in this export, in declaration order.
    pub fn measures(&self) -> impl Iterator<Item = Measure> + '_ {
        self.measures.iter().map(|(measure, _)| *measure)
    }

    pub fn label_for(&self, measure: Measure) -> Option<&str> {
        self.measures
            .iter()
            .find(|(m, _)| *m == measure)
            .map(|(_, label)| label.as_str())
    }

    pub fn has(&self, measure: Measure) -> bool {
        self.label_for(measure).is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_detect_legacy_dialect() {
        let labels = ["Date", "Time", "Out Temp", "Out Hum", "Dew Pt", "Bar"];
        assert_eq!(HeaderDialect::detect(&labels), HeaderDialect::Legacy);
    }

    #[test]
    fn test_rain_rate_alone_marks_legacy_export() {
        let labels = ["Date", "Time", "Rain Rate", "Bar"];
        assert_eq!(HeaderDialect::detect(&labels), HeaderDialect::Legacy);

        let schema = SeriesSchema::resolve(&labels).unwrap();
        assert!(schema.has(Measure::RainRate));
        assert_eq!(schema.label_for(Measure::RainRate), Some("Rain Rate"));
    }

    #[test]
    fn test_detect_cleaned_dialect() {
        let labels = ["Date", "Time", "Temp", "Hum", "Pt", "Bar", "Rate"];
        assert_eq!(HeaderDialect::detect(&labels), HeaderDialect::Cleaned);
    }

    #[test]
    fn test_resolve_cleaned_schema() {
        let labels = ["Date", "Time", "Temp", "Hum", "Speed", "Bar", "Rain", "Comment"];
        let schema = SeriesSchema::resolve(&labels).unwrap();

        assert_eq!(schema.dialect(), HeaderDialect::Cleaned);
        assert_eq!(schema.date_column(), 0);
        assert_eq!(schema.time_column(), 1);
        assert_eq!(schema.label_for(Measure::Temperature), Some("Temp"));
        assert_eq!(schema.label_for(Measure::WindSpeed), Some("Speed"));
        assert!(!schema.has(Measure::SolarRadiation));
        assert_eq!(
            schema.measures().collect::<Vec<_>>(),
            vec![
                Measure::Temperature,
                Measure::Humidity,
                Measure::WindSpeed,
                Measure::Barometer,
                Measure::Rain
            ]
        );
    }

    #[test]
    fn test_resolve_legacy_schema() {
        let labels = ["Date", "Time", "Out Temp", "Wind Speed", "Solar Rad", "Bar"];
        let schema = SeriesSchema::resolve(&labels).unwrap();

        assert_eq!(schema.dialect(), HeaderDialect::Legacy);
        assert_eq!(schema.label_for(Measure::Temperature), Some("Out Temp"));
        assert_eq!(schema.label_for(Measure::SolarRadiation), Some("Solar Rad"));
        assert_eq!(schema.label_for(Measure::Barometer), Some("Bar"));
    }

    #[test]
    fn test_resolve_missing_time_column() {
        let labels = ["Date", "Temp"];
        match SeriesSchema::resolve(&labels) {
            Err(PipelineError::Schema { missing }) => assert_eq!(missing, vec!["Time"]),
            other => panic!("Expected schema error, got {other:?}"),
        }
    }

    #[test]
    fn test_resolve_missing_both_columns() {
        let labels = ["Temp", "Hum"];
        match SeriesSchema::resolve(&labels) {
            Err(PipelineError::Schema { missing }) => {
                assert_eq!(missing, vec!["Date", "Time"])
            }
            other => panic!("Expected schema error, got {other:?}"),
        }
    }

    #[test]
    fn test_numeric_allow_list_covers_both_dialects() {
        let labels = numeric_allow_list();
        for expected in ["Out Temp", "Temp", "Hum", "Pt", "Speed", "Bar", "Rain", "Rad", "Rate"] {
            assert!(labels.contains(&expected), "missing {expected}");
        }
        assert!(!labels.contains(&"Date"));
        assert!(!labels.contains(&"Time"));
    }
}

//! Read-only views over one computed pipeline result: latest conditions,
//! recognized measures and chart panels.
use chrono::{DateTime, NaiveDateTime, Utc};
use serde::Serialize;
use utoipa::ToSchema;

use crate::pipeline::{
    HeaderDialect, Measure, ObservationRecord, ObservationSeries, PipelineOutput, SeriesSchema,
};

/// Measures shown in the "latest conditions" summary.
pub const HEADLINE_MEASURES: [Measure; 4] = [
    Measure::Temperature,
    Measure::Humidity,
    Measure::WindSpeed,
    Measure::Barometer,
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum ChartKind {
    Line,
    Area,
}

struct PanelSpec {
    id: &'static str,
    title: &'static str,
    y_axis_label: &'static str,
    kind: ChartKind,
    measures: &'static [Measure],
}

const PANELS: [PanelSpec; 4] = [
    PanelSpec {
        id: "temperature",
        title: "Temperature and Dew Point Over Time",
        y_axis_label: "Temperature (°C)",
        kind: ChartKind::Line,
        measures: &[Measure::Temperature, Measure::DewPoint],
    },
    PanelSpec {
        id: "wind",
        title: "Wind Speed Over Time",
        y_axis_label: "Speed (km/h)",
        kind: ChartKind::Line,
        measures: &[Measure::WindSpeed],
    },
    PanelSpec {
        id: "rainfall",
        title: "Cumulative Rainfall",
        y_axis_label: "Rainfall (mm)",
        kind: ChartKind::Area,
        measures: &[Measure::Rain],
    },
    PanelSpec {
        id: "solar",
        title: "Solar Radiation Over Time",
        y_axis_label: "Radiation (W/m²)",
        kind: ChartKind::Line,
        measures: &[Measure::SolarRadiation],
    },
];

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct MetricReading {
    pub measure: Measure,
    pub label: String,
    pub value: Option<f64>,
    pub unit: String,
    /// `"21.4 °C"`, or `"N/A"` when the value is missing
    pub display: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct LatestConditions {
    #[schema(value_type = String, format = DateTime)]
    pub timestamp: NaiveDateTime,
    pub metrics: Vec<MetricReading>,
}

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct ChartPoint {
    #[schema(value_type = String, format = DateTime)]
    pub timestamp: NaiveDateTime,
    /// `None` at gap markers and missing readings
    pub value: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct ChartTrace {
    pub measure: Measure,
    pub label: String,
    pub points: Vec<ChartPoint>,
}

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct ChartPanel {
    pub id: String,
    pub title: String,
    pub y_axis_label: String,
    pub kind: ChartKind,
    pub traces: Vec<ChartTrace>,
}

/// One immutable pipeline result with the time it was computed.
#[derive(Debug, Clone)]
pub struct WeatherSnapshot {
    source: String,
    computed_at: DateTime<Utc>,
    output: PipelineOutput,
}

impl WeatherSnapshot {
    pub fn new(source: impl Into<String>, output: PipelineOutput) -> Self {
        Self {
            source: source.into(),
            computed_at: Utc::now(),
            output,
        }
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn computed_at(&self) -> DateTime<Utc> {
        self.computed_at
    }

    pub fn schema(&self) -> &SeriesSchema {
        &self.output.schema
    }

    pub fn dialect(&self) -> HeaderDialect {
        self.output.schema.dialect()
    }

    /// Series without gap markers, for tabular display.
    pub fn table(&self) -> &ObservationSeries {
        &self.output.table
    }

    /// Series with gap markers, for charting.
    pub fn chart(&self) -> &ObservationSeries {
        &self.output.chart
    }

    pub fn dropped_rows(&self) -> usize {
        self.output.dropped_rows
    }

    pub fn total_rows(&self) -> usize {
        self.output.total_rows
    }

    pub fn latest(&self) -> Option<&ObservationRecord> {
        self.output.table.latest()
    }

    pub fn present_measures(&self) -> Vec<Measure> {
        self.output.schema.measures().collect()
    }

    /// Most recent record where every present headline measure has a value.
    pub fn latest_conditions(&self) -> Option<LatestConditions> {
        let schema = &self.output.schema;
        let required: Vec<Measure> = HEADLINE_MEASURES
            .into_iter()
            .filter(|measure| schema.has(*measure))
            .collect();

        let record = self
            .output
            .table
            .observed()
            .rev()
            .find(|record| {
                required
                    .iter()
                    .all(|measure| record.measure(schema, *measure).is_some())
            })?;

        let metrics = HEADLINE_MEASURES
            .into_iter()
            .map(|measure| {
                let value = record.measure(schema, measure);
                let display = match value {
                    Some(v) => format!("{v:.1} {}", measure.unit()),
                    None => "N/A".to_string(),
                };
                MetricReading {
                    measure,
                    label: measure.display_name().to_string(),
                    value,
                    unit: measure.unit().to_string(),
                    display,
                }
            })
            .collect();

        Some(LatestConditions {
            timestamp: record.timestamp(),
            metrics,
        })
    }

    /// Chart panels whose measures are all present, with data from the chart series.
    pub fn chart_panels(&self) -> Vec<ChartPanel> {
        let schema = &self.output.schema;

        PANELS
            .iter()
            .filter(|panel| panel.measures.iter().all(|m| schema.has(*m)))
            .map(|panel| ChartPanel {
                id: panel.id.to_string(),
                title: panel.title.to_string(),
                y_axis_label: panel.y_axis_label.to_string(),
                kind: panel.kind,
                traces: panel
                    .measures
                    .iter()
                    .map(|measure| self.trace(*measure))
                    .collect(),
            })
            .collect()
    }

    fn trace(&self, measure: Measure) -> ChartTrace {
        let schema = &self.output.schema;
        let points = self
            .output
            .chart
            .iter()
            .map(|record| ChartPoint {
                timestamp: record.timestamp(),
                value: record.measure(schema, measure),
            })
            .collect();

        ChartTrace {
            measure,
            label: measure.display_name().to_string(),
            points,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::WeatherPipeline;

    fn snapshot(csv: &str) -> WeatherSnapshot {
        let output = WeatherPipeline::default().run(csv).unwrap();
        WeatherSnapshot::new("test://export.csv", output)
    }

    #[test]
    fn test_latest_conditions_skips_incomplete_rows() {
        let snap = snapshot(
            "Date,Time,Temp,Hum,Speed,Bar\n\
             13/04/23,06:00,14.1,80,3.2,1012.4\n\
             13/04/23,07:00,15.0,78,4.0,1012.6\n\
             13/04/23,08:00,16.0,--,4.2,1012.8\n",
        );

        let latest = snap.latest_conditions().unwrap();
        assert_eq!(latest.timestamp.to_string(), "2023-04-13 07:00:00");
        assert_eq!(latest.metrics[0].display, "15.0 °C");
        assert_eq!(latest.metrics[1].value, Some(78.0));
        assert_eq!(latest.metrics[3].display, "1012.6 mbar");

        // the raw latest record is still the 08:00 row
        assert_eq!(
            snap.latest().unwrap().timestamp().to_string(),
            "2023-04-13 08:00:00"
        );
    }

    #[test]
    fn test_latest_conditions_marks_absent_measures_na() {
        let snap = snapshot("Date,Time,Temp\n13/04/23,06:00,14.1\n");
        let latest = snap.latest_conditions().unwrap();

        assert_eq!(latest.metrics.len(), 4);
        assert_eq!(latest.metrics[0].value, Some(14.1));
        assert_eq!(latest.metrics[2].display, "N/A");
    }

    #[test]
    fn test_latest_conditions_none_when_no_complete_row() {
        let snap = snapshot("Date,Time,Temp,Hum\n13/04/23,06:00,,80\n13/04/23,07:00,--,81\n");
        assert!(snap.latest_conditions().is_none());
    }

    #[test]
    fn test_chart_panels_follow_present_measures() {
        let snap = snapshot(
            "Date,Time,Temp,Pt,Rain\n\
             13/04/23,06:00,14.1,10.0,0.0\n\
             13/04/23,09:00,16.0,10.5,0.2\n",
        );

        let panels = snap.chart_panels();
        let ids: Vec<&str> = panels.iter().map(|p| p.id.as_str()).collect();
        assert_eq!(ids, vec!["temperature", "rainfall"]);
        assert_eq!(panels[1].kind, ChartKind::Area);

        let temperature = &panels[0];
        assert_eq!(temperature.traces.len(), 2);
        // two observations plus one gap marker
        assert_eq!(temperature.traces[0].points.len(), 3);
        assert_eq!(temperature.traces[0].points[1].value, None);
    }

    #[test]
    fn test_temperature_panel_needs_dew_point() {
        let snap = snapshot("Date,Time,Out Temp,Wind Speed\n13/04/23,06:00,14.1,3.0\n");
        let ids: Vec<String> = snap.chart_panels().into_iter().map(|p| p.id).collect();
        assert_eq!(ids, vec!["wind"]);
        assert_eq!(
            snap.present_measures(),
            vec![Measure::Temperature, Measure::WindSpeed]
        );
    }
}

/// A cell after type coercion: numeric measurement or untouched text.
#[derive(Debug, Clone, PartialEq)]
pub enum Cell {
    /// Allow-listed column; `None` marks a missing or malformed value.
    Measurement(Option<f64>),
    Text(String),
}

impl Cell {
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Cell::Text(text) => Some(text.as_str()),
            Cell::Measurement(_) => None,
        }
    }
}

/// Parse a measurement cell. Empty, non-numeric and non-finite text becomes `None`.
pub fn coerce_cell(raw: &str) -> Option<f64> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }

    trimmed.parse::<f64>().ok().filter(|value| value.is_finite())
}

/// Convert allow-listed columns to numbers; pass every other column through as text.
pub fn coerce_rows<S: AsRef<str>>(
    labels: &[S],
    rows: &[Vec<String>],
    allow_list: &[&str],
) -> Vec<Vec<Cell>> {
    let numeric: Vec<bool> = labels
        .iter()
        .map(|label| allow_list.contains(&label.as_ref()))
        .collect();

    rows.iter()
        .map(|row| {
            row.iter()
                .zip(&numeric)
                .map(|(raw, is_numeric)| {
                    if *is_numeric {
                        Cell::Measurement(coerce_cell(raw))
                    } else {
                        Cell::Text(raw.clone())
                    }
                })
                .collect()
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_coerce_cell_numbers() {
        assert_eq!(coerce_cell("21.4"), Some(21.4));
        assert_eq!(coerce_cell("  -3.5 "), Some(-3.5));
        assert_eq!(coerce_cell("1013"), Some(1013.0));
        assert_eq!(coerce_cell("1e3"), Some(1000.0));
    }

    #[test]
    fn test_coerce_cell_malformed_becomes_missing() {
        assert_eq!(coerce_cell(""), None);
        assert_eq!(coerce_cell("   "), None);
        assert_eq!(coerce_cell("--"), None);
        assert_eq!(coerce_cell("---"), None);
        assert_eq!(coerce_cell("N/A"), None);
        assert_eq!(coerce_cell("12,5"), None);
        assert_eq!(coerce_cell("NaN"), None);
        assert_eq!(coerce_cell("inf"), None);
    }

    #[test]
    fn test_coerce_rows_only_touches_allow_listed_columns() {
        let labels = ["Date", "Time", "Temp", "Wind Dir"];
        let rows = vec![
            vec!["13/04/23".to_string(), "14:05".to_string(), "21.4".to_string(), "NNE".to_string()],
            vec!["13/04/23".to_string(), "14:10".to_string(), "--".to_string(), "---".to_string()],
        ];

        let coerced = coerce_rows(&labels, &rows, &["Temp", "Hum"]);

        assert_eq!(coerced.len(), 2);
        assert_eq!(coerced[0][0], Cell::Text("13/04/23".to_string()));
        assert_eq!(coerced[0][2], Cell::Measurement(Some(21.4)));
        assert_eq!(coerced[0][3], Cell::Text("NNE".to_string()));
        assert_eq!(coerced[1][2], Cell::Measurement(None));
        assert_eq!(coerced[1][3].as_text(), Some("---"));
        // input rows are left as they were
        assert_eq!(rows[1][2], "--");
    }

    #[test]
    fn test_coerced_measurements_are_finite_or_missing() {
        let labels = ["Temp"];
        let rows: Vec<Vec<String>> = ["1.5", "", "--", "abc", "NaN", "-inf", "0"]
            .iter()
            .map(|cell| vec![cell.to_string()])
            .collect();

        for row in coerce_rows(&labels, &rows, &["Temp"]) {
            match &row[0] {
                Cell::Measurement(Some(value)) => assert!(value.is_finite()),
                Cell::Measurement(None) => {}
                Cell::Text(text) => panic!("raw text survived coercion: {text}"),
            }
        }
    }
}

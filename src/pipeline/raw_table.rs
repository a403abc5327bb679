use tracing::debug;

use crate::pipeline::PipelineError;

/// Header labels and string cells exactly as read from a CSV export.
///
/// Every row has the same width as the header: short rows are padded with
/// empty cells.
#[derive(Debug, Clone, PartialEq)]
pub struct RawTable {
    headers: Vec<String>,
    rows: Vec<Vec<String>>,
}

impl RawTable {
    pub fn new(headers: Vec<String>, rows: Vec<Vec<String>>) -> Self {
        let width = headers.len();
        let rows = rows
            .into_iter()
            .map(|mut row| {
                row.resize(width, String::new());
                row
            })
            .collect();

        Self { headers, rows }
    }

    /// Read a CSV payload.
    ///
    /// The first `skip_rows` records are discarded (legacy exports carry a banner
    /// line above the header), blank records are ignored, and the first remaining
    /// record becomes the header.
    ///
    /// Fails with `Parse` when a field spans a line break (an unterminated quote
    /// swallows the rest of the file) or a data record is wider than the header.
    pub fn from_csv(text: &str, skip_rows: usize) -> Result<Self, PipelineError> {
        let text = text.strip_prefix('\u{feff}').unwrap_or(text);

        let mut reader = csv::ReaderBuilder::new()
            .has_headers(false)
            .flexible(true)
            .from_reader(text.as_bytes());

        let mut headers: Option<Vec<String>> = None;
        let mut rows = Vec::new();

        for (idx, result) in reader.records().enumerate() {
            let record = result?;

            if idx < skip_rows {
                debug!("Skipping leading record {}", idx + 1);
                continue;
            }

            if record.iter().all(|field| field.trim().is_empty()) {
                continue;
            }

            let line = record.position().map(|pos| pos.line()).unwrap_or(0);

            if record.iter().any(|field| field.contains(['\n', '\r'])) {
                return Err(PipelineError::Parse(format!(
                    "line {line}: field spans multiple lines (unterminated quote)"
                )));
            }

            let cells: Vec<String> = record.iter().map(str::to_string).collect();
            match &headers {
                None => headers = Some(cells),
                Some(header) if cells.len() > header.len() => {
                    return Err(PipelineError::Parse(format!(
                        "line {line}: expected {} fields, saw {}",
                        header.len(),
                        cells.len()
                    )));
                }
                Some(_) => rows.push(cells),
            }
        }

        let headers = headers
            .ok_or_else(|| PipelineError::Parse("payload contains no header row".to_string()))?;

        debug!(
            "Read CSV with {} columns and {} data rows",
            headers.len(),
            rows.len()
        );

        Ok(Self::new(headers, rows))
    }

    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    pub fn rows(&self) -> &[Vec<String>] {
        &self.rows
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_csv_reads_header_and_rows() {
        let csv = "Date,Time,Temp\n13/04/23,14:05,21.4\n13/04/23,14:10,21.6\n";
        let table = RawTable::from_csv(csv, 0).unwrap();

        assert_eq!(table.headers(), &["Date", "Time", "Temp"]);
        assert_eq!(table.rows().len(), 2);
        assert_eq!(table.rows()[1][2], "21.6");
    }

    #[test]
    fn test_from_csv_skips_banner_and_blank_lines() {
        let csv = "Station export v2\n\n,,\nDate,Time,Temp\n13/04/23,14:05,21.4\n";
        let table = RawTable::from_csv(csv, 1).unwrap();

        assert_eq!(table.headers(), &["Date", "Time", "Temp"]);
        assert_eq!(table.rows().len(), 1);
    }

    #[test]
    fn test_from_csv_pads_short_rows() {
        let csv = "Date,Time,Temp\n13/04/23,14:05\n13/04/23,14:10,21.6\n";
        let table = RawTable::from_csv(csv, 0).unwrap();

        assert_eq!(table.rows()[0], vec!["13/04/23", "14:05", ""]);
        assert_eq!(table.rows()[1], vec!["13/04/23", "14:10", "21.6"]);
    }

    #[test]
    fn test_from_csv_rejects_rows_wider_than_header() {
        let csv = "Date,Time,Temp\n13/04/23,14:05,1\n13/04/23,14:10,21.6,99,extra\n";

        match RawTable::from_csv(csv, 0) {
            Err(PipelineError::Parse(msg)) => {
                assert!(msg.contains("line 3"), "unexpected message: {msg}");
                assert!(msg.contains("expected 3 fields, saw 5"));
            }
            other => panic!("Expected parse error, got {other:?}"),
        }
    }

    #[test]
    fn test_from_csv_rejects_unterminated_quote() {
        let csv = "Date,Time,Temp\n\"13/04/23,14:05,1\n";

        match RawTable::from_csv(csv, 0) {
            Err(PipelineError::Parse(msg)) => assert!(msg.contains("unterminated quote")),
            other => panic!("Expected parse error, got {other:?}"),
        }
    }

    #[test]
    fn test_from_csv_accepts_quoted_fields_with_commas() {
        let csv = "Date,Time,Note\n13/04/23,14:05,\"gusty, dry\"\n";
        let table = RawTable::from_csv(csv, 0).unwrap();
        assert_eq!(table.rows()[0][2], "gusty, dry");
    }

    #[test]
    fn test_from_csv_strips_byte_order_mark() {
        let csv = "\u{feff}Date,Time\n13/04/23,14:05\n";
        let table = RawTable::from_csv(csv, 0).unwrap();
        assert_eq!(table.headers()[0], "Date");
    }

    #[test]
    fn test_from_csv_empty_payload_is_parse_error() {
        let result = RawTable::from_csv("", 0);
        assert!(matches!(result, Err(PipelineError::Parse(_))));

        let result = RawTable::from_csv("\n\n", 0);
        assert!(matches!(result, Err(PipelineError::Parse(_))));
    }

    #[test]
    fn test_from_csv_header_only() {
        let table = RawTable::from_csv("Date,Time,Temp\n", 0).unwrap();
        assert_eq!(table.headers().len(), 3);
        assert!(table.rows().is_empty());
    }
}

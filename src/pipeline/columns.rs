//! Column label cleanup and deduplication.
use std::collections::HashMap;

/// Trim surrounding whitespace and drop every literal `.` from a raw label.
pub fn clean_label(raw: &str) -> String {
    raw.trim().replace('.', "")
}

/// Make labels unique by suffixing repeats with their occurrence count.
///
/// `["A", "B", "A"]` becomes `["A", "B", "A_1"]`. A genuine `A_1` column that
/// collides with a generated suffix is not detected.
pub fn deduplicate_labels<S: AsRef<str>>(labels: &[S]) -> Vec<String> {
    let mut counts: HashMap<&str, usize> = HashMap::new();

    labels
        .iter()
        .map(|label| {
            let label = label.as_ref();
            let count = counts.entry(label).or_insert(0);
            let unique = if *count == 0 {
                label.to_string()
            } else {
                format!("{label}_{count}")
            };
            *count += 1;
            unique
        })
        .collect()
}

/// Clean then deduplicate a header row. Never fails.
pub fn normalize_labels<S: AsRef<str>>(raw: &[S]) -> Vec<String> {
    let cleaned: Vec<String> = raw.iter().map(|label| clean_label(label.as_ref())).collect();
    deduplicate_labels(&cleaned)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_clean_label() {
        assert_eq!(clean_label("  Dew Pt. "), "Dew Pt");
        assert_eq!(clean_label("Solar Rad."), "Solar Rad");
        assert_eq!(clean_label("a.b.c"), "abc");
        assert_eq!(clean_label("   "), "");
    }

    #[test]
    fn test_deduplicate_basic() {
        assert_eq!(deduplicate_labels(&["A", "B", "A"]), vec!["A", "B", "A_1"]);
    }

    #[test]
    fn test_deduplicate_many_repeats() {
        assert_eq!(
            deduplicate_labels(&["Temp", "Temp", "Temp", "Hum", "Temp"]),
            vec!["Temp", "Temp_1", "Temp_2", "Hum", "Temp_3"]
        );
    }

    #[test]
    fn test_deduplicate_is_identity_on_unique_labels() {
        let labels = vec!["Date", "Time", "Temp", "Hum"];
        assert_eq!(deduplicate_labels(&labels), labels);
        assert_eq!(normalize_labels(&labels), labels);
    }

    #[test]
    fn test_deduplicate_empty_and_all_duplicate_input() {
        let empty: Vec<&str> = Vec::new();
        assert!(deduplicate_labels(&empty).is_empty());

        let labels = deduplicate_labels(&["", "", ""]);
        assert_eq!(labels, vec!["", "_1", "_2"]);
    }

    #[test]
    fn test_suffix_collision_is_not_resolved() {
        // A genuine "Temp_1" column collides with the generated suffix.
        let labels = deduplicate_labels(&["Temp", "Temp_1", "Temp"]);
        assert_eq!(labels, vec!["Temp", "Temp_1", "Temp_1"]);
    }

    #[test]
    fn test_normalize_cleans_before_deduplicating() {
        let labels = normalize_labels(&[" Temp ", "Temp.", "Hum", "Dew Pt."]);
        assert_eq!(labels, vec!["Temp", "Temp_1", "Hum", "Dew Pt"]);
    }

    #[test]
    fn test_normalize_preserves_length_and_uniqueness() {
        let raw = ["A", "B", "A", " B", "C.", "C", "A"];
        let labels = normalize_labels(&raw);

        assert_eq!(labels.len(), raw.len());
        let unique: HashSet<&String> = labels.iter().collect();
        assert_eq!(unique.len(), labels.len());
        assert_eq!(labels[0], "A");
        assert_eq!(labels[1], "B");
        assert_eq!(labels[4], "C");
    }
}

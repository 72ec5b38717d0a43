use std::path::Path;

use serde_json::{Map, Value};

use crate::data::table::{Cell, FlatTable};
use crate::error::{DataWarning, Result, VizError};

/// Separator used when joining nested key names, before sanitizing.
const NEST_SEPARATOR: char = '.';
/// Replacement that keeps generated column names identifier-safe.
const SAFE_SEPARATOR: char = '_';

/// Result of loading a benchmark file.
pub struct LoadedData {
    pub table: FlatTable,
    pub warnings: Vec<DataWarning>,
}

/// Read a JSON benchmark file and flatten the list stored under `results_key`.
pub fn load_file(path: &Path, results_key: &str) -> Result<LoadedData> {
    let text = std::fs::read_to_string(path).map_err(|source| VizError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let loaded = parse_str(&text, results_key)?;
    tracing::info!(
        "Loaded {} records with {} columns from {:?}",
        loaded.table.len(),
        loaded.table.columns().len(),
        path
    );
    Ok(loaded)
}

/// Parse an in-memory JSON document.
pub fn parse_str(text: &str, results_key: &str) -> Result<LoadedData> {
    let document: Value = serde_json::from_str(text)?;
    let Value::Object(top) = document else {
        return Err(VizError::DataFormat(
            "top-level JSON value must be an object".to_string(),
        ));
    };

    let mut warnings = Vec::new();
    let records = match top.get(results_key) {
        None => {
            tracing::warn!("No \"{results_key}\" key in document, using an empty list");
            warnings.push(DataWarning::MissingResultsKey(results_key.to_string()));
            Vec::new()
        }
        Some(Value::Array(items)) => items.iter().collect(),
        Some(other) => {
            return Err(VizError::DataFormat(format!(
                "\"{results_key}\" must be a list, found {}",
                json_kind(other)
            )))
        }
    };

    let mut table = FlatTable::new();
    for (idx, item) in records.into_iter().enumerate() {
        let Value::Object(obj) = item else {
            return Err(VizError::DataFormat(format!(
                "record {idx} in \"{results_key}\" must be an object, found {}",
                json_kind(item)
            )));
        };
        let mut flat = Vec::new();
        flatten_into(obj, None, &mut flat);
        table.push_record(flat);
    }

    Ok(LoadedData { table, warnings })
}

/// Flatten nested objects into `parent.child` names, then sanitize `.` to `_`.
fn flatten_into(obj: &Map<String, Value>, prefix: Option<&str>, out: &mut Vec<(String, Cell)>) {
    for (key, value) in obj {
        let joined = match prefix {
            Some(p) => format!("{p}{NEST_SEPARATOR}{key}"),
            None => key.clone(),
        };
        match value {
            Value::Object(child) => flatten_into(child, Some(&joined), out),
            scalar => {
                let name = sanitize_name(&joined);
                // Later paths that collapse onto the same name win.
                out.retain(|(existing, _)| *existing != name);
                out.push((name, Cell::from_json(scalar)));
            }
        }
    }
}

pub fn sanitize_name(name: &str) -> String {
    name.replace(NEST_SEPARATOR, &SAFE_SEPARATOR.to_string())
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "a list",
        Value::Object(_) => "an object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const NESTED: &str = r#"{
        "results": [
            { "pass": 0, "n": 2,
              "standard": { "time_s": 0.001, "rss_kB": 1000 },
              "strassen": { "time_s": 0.002, "rss_kB": 1200 },
              "equivalent": true },
            { "pass": 1, "n": 2,
              "standard": { "time_s": 0.0011, "rss_kB": 1010 },
              "strassen": { "time_s": 0.0019, "rss_kB": 1190 },
              "equivalent": false }
        ],
        "meta": { "host": "ignored" }
    }"#;

    #[test]
    fn flattens_nested_metrics() {
        let loaded = parse_str(NESTED, "results").unwrap();
        let t = &loaded.table;
        assert!(loaded.warnings.is_empty());
        assert_eq!(t.len(), 2);
        assert_eq!(
            t.columns(),
            &[
                "pass",
                "n",
                "standard_time_s",
                "standard_rss_kB",
                "strassen_time_s",
                "strassen_rss_kB",
                "equivalent"
            ]
        );
        assert_eq!(t.get(1, "strassen_rss_kB"), &Cell::Int(1190));
        assert_eq!(t.get(1, "equivalent"), &Cell::Bool(false));
    }

    #[test]
    fn dots_in_keys_become_underscores() {
        let doc = r#"{"results":[{"a.b": 1, "c": {"d.e": 2}}]}"#;
        let t = parse_str(doc, "results").unwrap().table;
        assert_eq!(t.columns(), &["a_b", "c_d_e"]);
    }

    #[test]
    fn divergent_records_union_columns() {
        let doc = r#"{"results":[{"pass":1,"x":{"time_s":1.0}},{"pass":2,"y":{"rss_kB":5}}]}"#;
        let t = parse_str(doc, "results").unwrap().table;
        assert_eq!(t.columns().len(), 3);
        assert_eq!(t.len(), 2);
        assert!(t.get(1, "x_time_s").is_missing());
    }

    #[test]
    fn missing_results_key_is_empty_not_fatal() {
        let loaded = parse_str(r#"{"other": []}"#, "results").unwrap();
        assert!(loaded.table.is_empty());
        assert_eq!(
            loaded.warnings,
            vec![DataWarning::MissingResultsKey("results".into())]
        );
    }

    #[test]
    fn malformed_documents_are_data_errors() {
        for doc in [
            "[1, 2]",
            r#"{"results": 5}"#,
            r#"{"results": [1]}"#,
            r#"{"results": [ {"pass": 1 ]}"#,
        ] {
            let err = parse_str(doc, "results").err().unwrap();
            assert!(err.is_data_format(), "{doc} -> {err}");
        }
    }

    #[test]
    fn custom_results_key() {
        let t = parse_str(r#"{"runs":[{"pass":1}]}"#, "runs").unwrap().table;
        assert_eq!(t.len(), 1);
    }

    #[test]
    fn load_from_disk() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(NESTED.as_bytes()).unwrap();
        let loaded = load_file(file.path(), "results").unwrap();
        assert_eq!(loaded.table.len(), 2);
    }

    #[test]
    fn unreadable_file_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = load_file(&dir.path().join("absent.json"), "results").err().unwrap();
        assert!(matches!(err, VizError::Io { .. }));
    }
}

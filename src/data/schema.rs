use std::collections::HashSet;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::data::table::FlatTable;
use crate::error::{DataWarning, Result, VizError};

pub const PASS_COLUMN: &str = "pass";
pub const SIZE_COLUMN: &str = "n";
pub const EQUIVALENT_COLUMN: &str = "equivalent";
pub const DEFAULT_RESULTS_KEY: &str = "results";

/// Pass number of the warm-up run. It is never reported.
pub const WARMUP_PASS: u32 = 0;

/// The two per-algorithm metrics recorded by the benchmark.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Metric {
    Time,
    Memory,
}

impl Metric {
    pub const ALL: [Metric; 2] = [Metric::Time, Metric::Memory];

    /// Suffix of the flattened column holding this metric.
    pub fn suffix(&self) -> &'static str {
        match self {
            Metric::Time => "_time_s",
            Metric::Memory => "_rss_kB",
        }
    }

    /// Name of the value column in long-form output.
    pub fn value_column(&self) -> &'static str {
        match self {
            Metric::Time => "time_s",
            Metric::Memory => "rss_kB",
        }
    }

    pub fn axis_label(&self) -> &'static str {
        match self {
            Metric::Time => "Time (s)",
            Metric::Memory => "Memory (kB)",
        }
    }

    pub fn title(&self) -> &'static str {
        match self {
            Metric::Time => "Time",
            Metric::Memory => "Memory",
        }
    }
}

/// Derive the algorithm label from a metric column name, if the column ends
/// with exactly one of the metric suffixes.
pub fn algorithm_label(column: &str) -> Option<(&str, Metric)> {
    Metric::ALL.into_iter().find_map(|metric| {
        column
            .strip_suffix(metric.suffix())
            .filter(|label| !label.is_empty())
            .map(|label| (label, metric))
    })
}

/// What happens to a row holding a missing identifier or a malformed value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InvalidFieldPolicy {
    /// Drop the row and record a warning.
    #[default]
    Skip,
    /// Abort loading with a data-format error.
    Reject,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WarmupPolicy {
    /// Drop every row whose pass equals [`WARMUP_PASS`].
    #[default]
    ExcludeWarmup,
    IncludeAll,
}

impl WarmupPolicy {
    /// Whether a row with this pass value survives filtering. Rows without a
    /// pass value are never warm-up rows.
    pub fn keeps(&self, pass: Option<u32>) -> bool {
        match self {
            WarmupPolicy::ExcludeWarmup => pass != Some(WARMUP_PASS),
            WarmupPolicy::IncludeAll => true,
        }
    }
}

/// Explicit mapping of an algorithm to its two metric columns. Columns left
/// out of a config file follow the `<name>_time_s` / `<name>_rss_kB` naming.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AlgorithmColumns {
    pub name: String,
    #[serde(default)]
    pub time_column: String,
    #[serde(default)]
    pub memory_column: String,
}

impl AlgorithmColumns {
    /// Columns following the `<name>_time_s` / `<name>_rss_kB` convention.
    pub fn conventional(name: &str) -> Self {
        Self {
            name: name.to_string(),
            time_column: format!("{name}{}", Metric::Time.suffix()),
            memory_column: format!("{name}{}", Metric::Memory.suffix()),
        }
    }

    pub fn column(&self, metric: Metric) -> &str {
        match metric {
            Metric::Time => &self.time_column,
            Metric::Memory => &self.memory_column,
        }
    }
}

/// How benchmark documents are interpreted. Loaded from an optional JSON
/// config file; every field has a default.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct BenchmarkSchema {
    pub results_key: String,
    /// Empty means "discover from column suffixes".
    pub algorithms: Vec<AlgorithmColumns>,
    pub invalid_fields: InvalidFieldPolicy,
    pub warmup: WarmupPolicy,
}

impl Default for BenchmarkSchema {
    fn default() -> Self {
        Self {
            results_key: DEFAULT_RESULTS_KEY.to_string(),
            algorithms: Vec::new(),
            invalid_fields: InvalidFieldPolicy::default(),
            warmup: WarmupPolicy::default(),
        }
    }
}

impl BenchmarkSchema {
    pub fn from_file(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .map_err(|e| VizError::Config(format!("cannot read {}: {e}", path.display())))?;
        Self::from_json(&text)
    }

    pub fn from_json(text: &str) -> Result<Self> {
        let mut schema: BenchmarkSchema =
            serde_json::from_str(text).map_err(|e| VizError::Config(e.to_string()))?;
        for alg in &mut schema.algorithms {
            let conventional = AlgorithmColumns::conventional(&alg.name);
            if alg.time_column.is_empty() {
                alg.time_column = conventional.time_column;
            }
            if alg.memory_column.is_empty() {
                alg.memory_column = conventional.memory_column;
            }
        }
        schema.validate()?;
        Ok(schema)
    }

    pub fn validate(&self) -> Result<()> {
        if self.results_key.is_empty() {
            return Err(VizError::Config("results_key must not be empty".to_string()));
        }
        let mut seen = HashSet::new();
        for alg in &self.algorithms {
            if alg.name.trim().is_empty() {
                return Err(VizError::Config("algorithm name must not be empty".to_string()));
            }
            if !seen.insert(alg.name.as_str()) {
                return Err(VizError::Config(format!("algorithm {} listed twice", alg.name)));
            }
            if alg.time_column == alg.memory_column {
                return Err(VizError::Config(format!(
                    "{}: time and memory columns must differ",
                    alg.name
                )));
            }
        }
        Ok(())
    }

    /// Bind the schema to a concrete table.
    pub fn resolve(&self, table: &FlatTable) -> ResolvedSchema {
        let mut warnings = Vec::new();
        let mut time = Vec::new();
        let mut memory = Vec::new();

        if self.algorithms.is_empty() {
            for column in table.columns() {
                if let Some((label, metric)) = algorithm_label(column) {
                    let binding = MetricColumn { algorithm: label.to_string(), column: column.clone() };
                    match metric {
                        Metric::Time => time.push(binding),
                        Metric::Memory => memory.push(binding),
                    }
                }
            }
        } else {
            for alg in &self.algorithms {
                for metric in Metric::ALL {
                    let column = alg.column(metric);
                    if !table.has_column(column) {
                        warnings.push(DataWarning::MissingConfiguredColumn {
                            algorithm: alg.name.clone(),
                            column: column.to_string(),
                        });
                        continue;
                    }
                    let binding = MetricColumn { algorithm: alg.name.clone(), column: column.to_string() };
                    match metric {
                        Metric::Time => time.push(binding),
                        Metric::Memory => memory.push(binding),
                    }
                }
            }
        }

        if time.is_empty() {
            warnings.push(DataWarning::NoTimeColumns);
        }
        if memory.is_empty() {
            warnings.push(DataWarning::NoMemoryColumns);
        }

        ResolvedSchema {
            time,
            memory,
            has_pass: table.has_column(PASS_COLUMN),
            has_size: table.has_column(SIZE_COLUMN),
            has_equivalent: table.has_column(EQUIVALENT_COLUMN),
            invalid_fields: self.invalid_fields,
            warmup: self.warmup,
            warnings,
        }
    }
}

/// One metric column bound to its algorithm label.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MetricColumn {
    pub algorithm: String,
    pub column: String,
}

/// A schema bound to the columns actually present in a table.
#[derive(Debug, Clone)]
pub struct ResolvedSchema {
    pub time: Vec<MetricColumn>,
    pub memory: Vec<MetricColumn>,
    pub has_pass: bool,
    pub has_size: bool,
    pub has_equivalent: bool,
    pub invalid_fields: InvalidFieldPolicy,
    pub warmup: WarmupPolicy,
    pub warnings: Vec<DataWarning>,
}

impl ResolvedSchema {
    pub fn columns(&self, metric: Metric) -> &[MetricColumn] {
        match metric {
            Metric::Time => &self.time,
            Metric::Memory => &self.memory,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::loader::parse_str;

    #[test]
    fn labels_are_suffix_exact_and_shared() {
        assert_eq!(algorithm_label("strassen_time_s"), Some(("strassen", Metric::Time)));
        assert_eq!(algorithm_label("strassen_rss_kB"), Some(("strassen", Metric::Memory)));
        assert_eq!(algorithm_label("strassen_rss_kb"), None);
        assert_eq!(algorithm_label("time_s"), None);
        assert_eq!(algorithm_label("_time_s"), None);
        assert_eq!(algorithm_label("a_time_s_x"), None);
        // Only the final suffix is stripped.
        assert_eq!(algorithm_label("a_time_s_time_s"), Some(("a_time_s", Metric::Time)));
    }

    #[test]
    fn discovers_columns_by_suffix() {
        let doc = r#"{"results":[{"pass":1,"n":2,
            "standard":{"time_s":1.0,"rss_kB":3},
            "blocked":{"time_s":2.0,"rss_kB":4}}]}"#;
        let table = parse_str(doc, "results").unwrap().table;
        let resolved = BenchmarkSchema::default().resolve(&table);
        let time: Vec<_> = resolved.time.iter().map(|m| m.algorithm.as_str()).collect();
        let mem: Vec<_> = resolved.memory.iter().map(|m| m.algorithm.as_str()).collect();
        assert_eq!(time, ["standard", "blocked"]);
        assert_eq!(time, mem);
        assert!(resolved.has_pass && resolved.has_size && !resolved.has_equivalent);
        assert!(resolved.warnings.is_empty());
    }

    #[test]
    fn no_metric_columns_warns() {
        let table = parse_str(r#"{"results":[{"pass":1}]}"#, "results").unwrap().table;
        let resolved = BenchmarkSchema::default().resolve(&table);
        assert!(resolved.time.is_empty() && resolved.memory.is_empty());
        assert_eq!(
            resolved.warnings,
            vec![DataWarning::NoTimeColumns, DataWarning::NoMemoryColumns]
        );
    }

    #[test]
    fn configured_schema_uses_explicit_columns() {
        let schema = BenchmarkSchema::from_json(
            r#"{"algorithms":[
                {"name":"naive","time_column":"standard_time_s","memory_column":"standard_rss_kB"},
                {"name":"blocked","time_column":"blocked_time_s","memory_column":"blocked_rss_kB"}
            ],"invalid_fields":"reject"}"#,
        )
        .unwrap();
        assert_eq!(schema.invalid_fields, InvalidFieldPolicy::Reject);
        assert_eq!(schema.results_key, DEFAULT_RESULTS_KEY);

        let doc = r#"{"results":[{"pass":1,"n":2,"standard":{"time_s":1.0,"rss_kB":3}}]}"#;
        let table = parse_str(doc, "results").unwrap().table;
        let resolved = schema.resolve(&table);
        assert_eq!(resolved.time.len(), 1);
        assert_eq!(resolved.time[0].algorithm, "naive");
        assert_eq!(resolved.warnings.len(), 2);
    }

    #[test]
    fn invalid_configs_are_rejected() {
        let dup = r#"{"algorithms":[
            {"name":"a","time_column":"x","memory_column":"y"},
            {"name":"a","time_column":"z","memory_column":"w"}]}"#;
        assert!(matches!(BenchmarkSchema::from_json(dup), Err(VizError::Config(_))));

        let same = r#"{"algorithms":[{"name":"a","time_column":"x","memory_column":"x"}]}"#;
        assert!(matches!(BenchmarkSchema::from_json(same), Err(VizError::Config(_))));

        assert!(matches!(
            BenchmarkSchema::from_json(r#"{"unknown": 1}"#),
            Err(VizError::Config(_))
        ));
    }

    #[test]
    fn warmup_policy() {
        assert!(!WarmupPolicy::ExcludeWarmup.keeps(Some(WARMUP_PASS)));
        assert!(WarmupPolicy::ExcludeWarmup.keeps(Some(1)));
        assert!(WarmupPolicy::ExcludeWarmup.keeps(None));
        assert!(WarmupPolicy::IncludeAll.keeps(Some(WARMUP_PASS)));
    }

    #[test]
    fn omitted_columns_follow_convention() {
        let schema = BenchmarkSchema::from_json(
            r#"{"algorithms":[{"name":"strassen"},{"name":"blocked","time_column":"blk_t"}]}"#,
        )
        .unwrap();
        let strassen = &schema.algorithms[0];
        assert_eq!(strassen.column(Metric::Time), "strassen_time_s");
        assert_eq!(strassen.column(Metric::Memory), "strassen_rss_kB");
        assert_eq!(schema.algorithms[1].time_column, "blk_t");
        assert_eq!(schema.algorithms[1].memory_column, "blocked_rss_kB");
    }

    #[test]
    fn schema_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("schema.json");
        std::fs::write(&path, r#"{"results_key":"runs","warmup":"include_all"}"#).unwrap();
        let schema = BenchmarkSchema::from_file(&path).unwrap();
        assert_eq!(schema.results_key, "runs");
        assert_eq!(schema.warmup, WarmupPolicy::IncludeAll);
        assert!(matches!(
            BenchmarkSchema::from_file(&dir.path().join("missing.json")),
            Err(VizError::Config(_))
        ));
    }
}

use std::path::{Path, PathBuf};

use crate::data::loader;
use crate::data::record::validate_rows;
use crate::data::schema::{BenchmarkSchema, Metric};
use crate::data::table::FlatTable;
use crate::error::{DataWarning, Result};
use crate::processing::aggregate::{describe_by_size, group_means, Aggregate, GroupBy, SizeStatsTable};
use crate::processing::reshape::{correctness, display_table, unpivot, CorrectnessSeries, LongSeries};

/// Every derived series for one metric.
#[derive(Debug, Clone)]
pub struct MetricViews {
    pub long: LongSeries,
    pub by_pass: Aggregate,
    pub by_size: Aggregate,
    pub stats: SizeStatsTable,
}

impl MetricViews {
    fn build(long: LongSeries) -> Self {
        let by_pass = group_means(&long, GroupBy::Pass);
        let by_size = group_means(&long, GroupBy::Size);
        let stats = describe_by_size(&long);
        Self { long, by_pass, by_size, stats }
    }
}

/// A loaded benchmark file and everything derived from it. Built once and
/// read-only afterwards.
#[derive(Debug, Clone)]
pub struct Dataset {
    pub source: Option<PathBuf>,
    pub table: FlatTable,
    /// `table` without warm-up rows.
    pub raw_view: FlatTable,
    pub time: MetricViews,
    pub memory: MetricViews,
    pub correctness: CorrectnessSeries,
    /// Non-warm-up passes present in either metric, ascending.
    pub passes: Vec<u32>,
    /// Algorithm labels, ascending.
    pub algorithms: Vec<String>,
    pub warnings: Vec<DataWarning>,
}

impl Dataset {
    /// Load a file and run the full pipeline.
    pub fn load(path: &Path, schema: &BenchmarkSchema) -> Result<Self> {
        let loaded = loader::load_file(path, &schema.results_key)?;
        let mut dataset = Self::build(loaded.table, schema)?;
        dataset.source = Some(path.to_path_buf());
        let mut warnings = loaded.warnings;
        warnings.append(&mut dataset.warnings);
        dataset.warnings = warnings;
        Ok(dataset)
    }

    /// Run the pipeline over an already-flattened table.
    pub fn build(table: FlatTable, schema: &BenchmarkSchema) -> Result<Self> {
        let resolved = schema.resolve(&table);
        let mut warnings = resolved.warnings.clone();
        let records = validate_rows(&table, &resolved, &mut warnings)?;

        let time = MetricViews::build(unpivot(&records, &resolved, Metric::Time));
        let memory = MetricViews::build(unpivot(&records, &resolved, Metric::Memory));
        let correctness = correctness(&records, &resolved);
        let raw_view = display_table(&table, resolved.warmup);

        // A metric whose columns were found but produced no samples counts as
        // filtered out, the same as a table with no rows left.
        let starved = Metric::ALL.into_iter().any(|metric| {
            let long = match metric {
                Metric::Time => &time.long,
                Metric::Memory => &memory.long,
            };
            !resolved.columns(metric).is_empty() && long.is_empty()
        });
        if raw_view.is_empty() || starved {
            warnings.push(DataWarning::NoRowsAfterFiltering);
        }

        let mut passes: Vec<u32> = time
            .long
            .rows
            .iter()
            .chain(memory.long.rows.iter())
            .filter_map(|s| s.pass)
            .collect();
        passes.sort_unstable();
        passes.dedup();

        let mut algorithms: Vec<String> = resolved
            .time
            .iter()
            .chain(resolved.memory.iter())
            .map(|m| m.algorithm.clone())
            .collect();
        algorithms.sort();
        algorithms.dedup();

        for w in &warnings {
            tracing::warn!("{w}");
        }
        tracing::info!(
            "Dataset ready: {} time samples, {} memory samples, {} passes, {} algorithms",
            time.long.len(),
            memory.long.len(),
            passes.len(),
            algorithms.len()
        );

        Ok(Dataset {
            source: None,
            table,
            raw_view,
            time,
            memory,
            correctness,
            passes,
            algorithms,
            warnings,
        })
    }

    pub fn metric(&self, metric: Metric) -> &MetricViews {
        match metric {
            Metric::Time => &self.time,
            Metric::Memory => &self.memory,
        }
    }

    /// Stable color index of an algorithm across every chart.
    pub fn algorithm_index(&self, algorithm: &str) -> usize {
        self.algorithms
            .iter()
            .position(|a| a == algorithm)
            .unwrap_or(self.algorithms.len())
    }

    /// Plain-text summary printed by `--check`.
    pub fn summary(&self) -> String {
        let mut out = String::new();
        if let Some(path) = &self.source {
            out.push_str(&format!("File: {}\n", path.display()));
        }
        out.push_str(&format!(
            "Records: {} ({} after removing warm-up)\nColumns: {}\n",
            self.table.len(),
            self.raw_view.len(),
            self.table.columns().len()
        ));
        out.push_str(&format!("Algorithms: {}\n", self.algorithms.join(", ")));
        let passes: Vec<String> = self.passes.iter().map(u32::to_string).collect();
        out.push_str(&format!("Passes: {}\n", passes.join(", ")));
        for metric in Metric::ALL {
            let views = self.metric(metric);
            out.push_str(&format!("\nMean {} by n:\n", metric.axis_label()));
            for row in &views.by_size.rows {
                let key = row.key.map(|k| k.to_string()).unwrap_or_else(|| "-".into());
                out.push_str(&format!(
                    "  n={key:<8} {:<12} mean={:<14.6} std={:.6} (count {})\n",
                    row.algorithm, row.mean, row.std, row.count
                ));
            }
        }
        if !self.correctness.rows.is_empty() {
            out.push_str(&format!(
                "\nCorrectness: {} of {} runs failed\n",
                self.correctness.failures(),
                self.correctness.rows.len()
            ));
        }
        for w in &self.warnings {
            out.push_str(&format!("Warning: {w}\n"));
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::loader::parse_str;
    use crate::data::schema::InvalidFieldPolicy;
    use crate::data::table::TableSource;
    use std::io::Write;

    fn dataset(doc: &str) -> Dataset {
        let table = parse_str(doc, "results").unwrap().table;
        Dataset::build(table, &BenchmarkSchema::default()).unwrap()
    }

    #[test]
    fn warmup_scenario() {
        let ds = dataset(
            r#"{"results":[
                {"pass":0,"n":4,"standard_time_s":0.1,"standard_rss_kB":100,"equivalent":true},
                {"pass":1,"n":4,"standard_time_s":0.2,"standard_rss_kB":110,"equivalent":true}
            ]}"#,
        );
        assert_eq!(ds.raw_view.len(), 1);
        assert_eq!(ds.raw_view.get(0, "pass").as_i64(), Some(1));
        let mean = ds.time.by_size.get(4, "standard").unwrap().mean;
        assert!((mean - 0.2).abs() < 1e-9);
        assert_eq!(ds.passes, [1]);
        assert_eq!(ds.correctness.rows.len(), 1);
        assert!(ds.warnings.is_empty());
    }

    #[test]
    fn no_pass_zero_anywhere() {
        let ds = dataset(
            r#"{"results":[
                {"pass":0,"n":2,"a":{"time_s":5.0,"rss_kB":5},"equivalent":false},
                {"pass":0,"n":4,"a":{"time_s":6.0,"rss_kB":6},"equivalent":false},
                {"pass":1,"n":2,"a":{"time_s":1.0,"rss_kB":1},"equivalent":true},
                {"pass":2,"n":4,"a":{"time_s":2.0,"rss_kB":2},"equivalent":true}
            ]}"#,
        );
        for metric in Metric::ALL {
            let views = ds.metric(metric);
            assert!(views.by_pass.rows.iter().all(|r| r.key != Some(0)));
            assert!(views.long.rows.iter().all(|r| r.pass != Some(0)));
            assert_eq!(views.by_size.get(2, "a").unwrap().count, 1);
        }
        assert!(ds.correctness.rows.iter().all(|r| r.pass != Some(0)));
        assert_eq!(ds.correctness.failures(), 0);
        assert_eq!(ds.raw_view.len(), 2);
    }

    #[test]
    fn empty_metrics_do_not_fail() {
        let ds = dataset(r#"{"results":[{"pass":1,"n":2}]}"#);
        assert!(ds.time.long.is_empty());
        assert!(ds.memory.by_size.is_empty());
        assert!(ds.correctness.rows.is_empty());
        assert!(ds.warnings.contains(&DataWarning::NoTimeColumns));
        assert!(ds.warnings.contains(&DataWarning::NoMemoryColumns));
        assert_eq!(ds.raw_view.row_count(), 1);
    }

    #[test]
    fn only_warmup_rows_warns() {
        let ds = dataset(r#"{"results":[{"pass":0,"n":2,"a_time_s":1.0,"a_rss_kB":1}]}"#);
        assert!(ds.raw_view.is_empty());
        assert!(ds.passes.is_empty());
        assert!(ds.warnings.contains(&DataWarning::NoRowsAfterFiltering));
    }

    #[test]
    fn all_null_metrics_warn() {
        let ds = dataset(r#"{"results":[{"pass":1,"n":2,"a_time_s":null,"a_rss_kB":null}]}"#);
        assert!(ds.time.long.is_empty());
        assert!(ds.memory.long.is_empty());
        assert_eq!(ds.raw_view.len(), 1);
        assert_eq!(ds.warnings, [DataWarning::NoRowsAfterFiltering]);
    }

    #[test]
    fn every_row_skipped_warns() {
        let ds = dataset(r#"{"results":[{"pass":1,"n":2,"a_time_s":-1.0,"a_rss_kB":3}]}"#);
        assert!(ds.time.long.is_empty());
        assert!(ds.warnings.contains(&DataWarning::NoRowsAfterFiltering));
    }

    #[test]
    fn bad_warmup_row_does_not_abort_reject() {
        let table = parse_str(
            r#"{"results":[{"pass":0,"n":2,"a_time_s":-1.0},{"pass":1,"n":2,"a_time_s":1.0}]}"#,
            "results",
        )
        .unwrap()
        .table;
        let schema = BenchmarkSchema {
            invalid_fields: InvalidFieldPolicy::Reject,
            ..BenchmarkSchema::default()
        };
        let ds = Dataset::build(table, &schema).unwrap();
        assert_eq!(ds.time.long.len(), 1);
        assert_eq!(ds.warnings, [DataWarning::NoMemoryColumns]);
    }

    #[test]
    fn cross_metric_labels_join() {
        let ds = dataset(
            r#"{"results":[{"pass":1,"n":8,"strassen":{"time_s":0.5,"rss_kB":64}}]}"#,
        );
        let t = &ds.time.long.rows[0];
        let m = &ds.memory.long.rows[0];
        assert_eq!((t.pass, t.n, &t.algorithm), (m.pass, m.n, &m.algorithm));
        assert_eq!(ds.algorithms, ["strassen"]);
    }

    #[test]
    fn reject_policy_surfaces_error() {
        let table = parse_str(r#"{"results":[{"pass":"x","n":2}]}"#, "results").unwrap().table;
        let schema = BenchmarkSchema {
            invalid_fields: InvalidFieldPolicy::Reject,
            ..BenchmarkSchema::default()
        };
        assert!(Dataset::build(table, &schema).unwrap_err().is_data_format());
    }

    #[test]
    fn load_records_source_and_summary() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"{{"results":[{{"pass":1,"n":2,"standard":{{"time_s":0.5,"rss_kB":10}},"equivalent":false}}]}}"#
        )
        .unwrap();
        let ds = Dataset::load(file.path(), &BenchmarkSchema::default()).unwrap();
        assert_eq!(ds.source.as_deref(), Some(file.path()));
        let summary = ds.summary();
        assert!(summary.contains("Algorithms: standard"));
        assert!(summary.contains("1 of 1 runs failed"));
    }

    #[test]
    fn load_missing_key_keeps_warning() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{"runs":[]}}"#).unwrap();
        let ds = Dataset::load(file.path(), &BenchmarkSchema::default()).unwrap();
        assert_eq!(ds.warnings[0], DataWarning::MissingResultsKey("results".into()));
        assert!(ds.table.is_empty());
    }
}

use std::collections::BTreeMap;

use crate::data::schema::{Metric, PASS_COLUMN, SIZE_COLUMN};
use crate::data::table::TableSource;
use crate::processing::reshape::{format_value, opt_text, LongSeries, ALGORITHM_COLUMN};
use crate::processing::statistics::{mean, sample_std, SeriesStats};

/// Identifier column an aggregate is keyed on (together with the algorithm).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GroupBy {
    Pass,
    Size,
}

impl GroupBy {
    pub fn column(&self) -> &'static str {
        match self {
            GroupBy::Pass => PASS_COLUMN,
            GroupBy::Size => SIZE_COLUMN,
        }
    }
}

/// Mean and sample std of one (key, algorithm) group.
#[derive(Debug, Clone, PartialEq)]
pub struct GroupStat {
    pub key: Option<u64>,
    pub algorithm: String,
    pub count: usize,
    pub mean: f64,
    /// NaN for single-sample groups.
    pub std: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Aggregate {
    pub metric: Metric,
    pub group_by: GroupBy,
    /// Sorted by (key, algorithm).
    pub rows: Vec<GroupStat>,
}

impl Aggregate {
    pub fn get(&self, key: u64, algorithm: &str) -> Option<&GroupStat> {
        self.rows
            .iter()
            .find(|r| r.key == Some(key) && r.algorithm == algorithm)
    }

    /// Distinct keys in ascending order.
    pub fn keys(&self) -> Vec<Option<u64>> {
        let mut keys: Vec<Option<u64>> = self.rows.iter().map(|r| r.key).collect();
        keys.dedup();
        keys
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// Group a long-form series by (key, algorithm) and compute mean and
/// sample standard deviation. Group order is sorted by key, then algorithm.
pub fn group_means(series: &LongSeries, group_by: GroupBy) -> Aggregate {
    let mut groups: BTreeMap<(Option<u64>, String), Vec<f64>> = BTreeMap::new();
    for sample in &series.rows {
        let key = match group_by {
            GroupBy::Pass => sample.pass.map(u64::from),
            GroupBy::Size => sample.n,
        };
        groups
            .entry((key, sample.algorithm.clone()))
            .or_default()
            .push(sample.value);
    }

    let rows = groups
        .into_iter()
        .filter_map(|((key, algorithm), values)| {
            Some(GroupStat {
                key,
                algorithm,
                count: values.len(),
                mean: mean(&values)?,
                std: sample_std(&values),
            })
        })
        .collect();

    Aggregate { metric: series.metric, group_by, rows }
}

impl TableSource for Aggregate {
    fn column_names(&self) -> Vec<String> {
        [self.group_by.column(), ALGORITHM_COLUMN, "count", "mean", "std"]
            .iter()
            .map(|s| s.to_string())
            .collect()
    }

    fn row_count(&self) -> usize {
        self.rows.len()
    }

    fn cell_text(&self, row: usize, col: usize) -> String {
        let Some(stat) = self.rows.get(row) else {
            return String::new();
        };
        match col {
            0 => opt_text(stat.key),
            1 => stat.algorithm.clone(),
            2 => stat.count.to_string(),
            3 => format_value(self.metric, stat.mean),
            _ => format_value(self.metric, stat.std),
        }
    }
}

/// Descriptive statistics of one (algorithm, n) group.
#[derive(Debug, Clone, PartialEq)]
pub struct SizeStats {
    pub algorithm: String,
    pub n: Option<u64>,
    pub stats: SeriesStats,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SizeStatsTable {
    pub metric: Metric,
    /// Sorted by (algorithm, n).
    pub rows: Vec<SizeStats>,
}

/// Per-(algorithm, n) summary across passes.
pub fn describe_by_size(series: &LongSeries) -> SizeStatsTable {
    let mut groups: BTreeMap<(String, Option<u64>), Vec<f64>> = BTreeMap::new();
    for sample in &series.rows {
        groups
            .entry((sample.algorithm.clone(), sample.n))
            .or_default()
            .push(sample.value);
    }
    let rows = groups
        .into_iter()
        .filter_map(|((algorithm, n), values)| {
            SeriesStats::compute(&values).map(|stats| SizeStats { algorithm, n, stats })
        })
        .collect();
    SizeStatsTable { metric: series.metric, rows }
}

impl TableSource for SizeStatsTable {
    fn column_names(&self) -> Vec<String> {
        [ALGORITHM_COLUMN, SIZE_COLUMN, "count", "mean", "std", "min", "25%", "median", "75%", "max"]
            .iter()
            .map(|s| s.to_string())
            .collect()
    }

    fn row_count(&self) -> usize {
        self.rows.len()
    }

    fn cell_text(&self, row: usize, col: usize) -> String {
        let Some(r) = self.rows.get(row) else {
            return String::new();
        };
        let m = self.metric;
        match col {
            0 => r.algorithm.clone(),
            1 => opt_text(r.n),
            2 => r.stats.count.to_string(),
            3 => format_value(m, r.stats.mean),
            4 => format_value(m, r.stats.std_dev),
            5 => format_value(m, r.stats.min),
            6 => format_value(m, r.stats.q1),
            7 => format_value(m, r.stats.median),
            8 => format_value(m, r.stats.q3),
            _ => format_value(m, r.stats.max),
        }
    }
}

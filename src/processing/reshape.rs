use crate::data::record::RunRecord;
use crate::data::schema::{Metric, ResolvedSchema, WarmupPolicy, PASS_COLUMN, SIZE_COLUMN};
use crate::data::table::{FlatTable, TableSource};

pub const ALGORITHM_COLUMN: &str = "algorithm";
pub const CORRECT_COLUMN: &str = "correct";

/// One long-form observation: a single metric of one algorithm in one run.
#[derive(Debug, Clone, PartialEq)]
pub struct MetricSample {
    pub pass: Option<u32>,
    pub n: Option<u64>,
    pub algorithm: String,
    pub value: f64,
}

/// Long-form series for one metric.
#[derive(Debug, Clone, PartialEq)]
pub struct LongSeries {
    pub metric: Metric,
    pub has_pass: bool,
    pub has_size: bool,
    pub rows: Vec<MetricSample>,
}

impl LongSeries {
    /// Samples of a single pass, in series order.
    pub fn for_pass(&self, pass: u32) -> impl Iterator<Item = &MetricSample> + '_ {
        self.rows.iter().filter(move |s| s.pass == Some(pass))
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// Unpivot one metric into long form.
///
/// Output order is column-major: every row of the first metric column, then
/// every row of the next. Warm-up rows are filtered before missing values are
/// dropped.
pub fn unpivot(records: &[RunRecord], schema: &ResolvedSchema, metric: Metric) -> LongSeries {
    let mut rows = Vec::new();
    for binding in schema.columns(metric) {
        for record in records {
            if !schema.warmup.keeps(record.pass) {
                continue;
            }
            let Some(value) = record.metric(&binding.algorithm, metric) else {
                continue;
            };
            rows.push(MetricSample {
                pass: record.pass,
                n: record.n,
                algorithm: binding.algorithm.clone(),
                value,
            });
        }
    }
    LongSeries { metric, has_pass: schema.has_pass, has_size: schema.has_size, rows }
}

impl TableSource for LongSeries {
    fn column_names(&self) -> Vec<String> {
        let mut cols = Vec::new();
        if self.has_pass {
            cols.push(PASS_COLUMN.to_string());
        }
        if self.has_size {
            cols.push(SIZE_COLUMN.to_string());
        }
        cols.push(ALGORITHM_COLUMN.to_string());
        cols.push(self.metric.value_column().to_string());
        cols
    }

    fn row_count(&self) -> usize {
        self.rows.len()
    }

    fn cell_text(&self, row: usize, col: usize) -> String {
        let Some(sample) = self.rows.get(row) else {
            return String::new();
        };
        let names = self.column_names();
        match names.get(col).map(String::as_str) {
            Some(PASS_COLUMN) => opt_text(sample.pass),
            Some(SIZE_COLUMN) => opt_text(sample.n),
            Some(ALGORITHM_COLUMN) => sample.algorithm.clone(),
            Some(_) => format_value(self.metric, sample.value),
            None => String::new(),
        }
    }
}

/// Correctness flag of one run.
#[derive(Debug, Clone, PartialEq)]
pub struct CorrectnessSample {
    pub pass: Option<u32>,
    pub n: Option<u64>,
    pub correct: bool,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct CorrectnessSeries {
    pub rows: Vec<CorrectnessSample>,
}

impl CorrectnessSeries {
    pub fn failures(&self) -> usize {
        self.rows.iter().filter(|s| !s.correct).count()
    }
}

/// Extract the correctness flags. Empty when the table has no
/// `equivalent` column.
pub fn correctness(records: &[RunRecord], schema: &ResolvedSchema) -> CorrectnessSeries {
    if !schema.has_equivalent {
        return CorrectnessSeries::default();
    }
    let rows = records
        .iter()
        .filter(|r| schema.warmup.keeps(r.pass))
        .filter_map(|r| {
            r.equivalent.map(|correct| CorrectnessSample { pass: r.pass, n: r.n, correct })
        })
        .collect();
    CorrectnessSeries { rows }
}

impl TableSource for CorrectnessSeries {
    fn column_names(&self) -> Vec<String> {
        vec![PASS_COLUMN.to_string(), SIZE_COLUMN.to_string(), CORRECT_COLUMN.to_string()]
    }

    fn row_count(&self) -> usize {
        self.rows.len()
    }

    fn cell_text(&self, row: usize, col: usize) -> String {
        let Some(sample) = self.rows.get(row) else {
            return String::new();
        };
        match col {
            0 => opt_text(sample.pass),
            1 => opt_text(sample.n),
            _ => sample.correct.to_string(),
        }
    }

    fn sort_value(&self, row: usize, col: usize) -> f64 {
        match (col, self.rows.get(row)) {
            (2, Some(sample)) => f64::from(u8::from(sample.correct)),
            _ => self.cell_text(row, col).parse().unwrap_or(f64::NAN),
        }
    }
}

/// The flat table minus warm-up rows, for the raw-data view.
pub fn display_table(table: &FlatTable, warmup: WarmupPolicy) -> FlatTable {
    table.filter_rows(|t, row| {
        let pass = t.get(row, PASS_COLUMN).as_i64().and_then(|p| u32::try_from(p).ok());
        warmup.keeps(pass)
    })
}

pub fn opt_text<T: ToString>(value: Option<T>) -> String {
    value.map(|v| v.to_string()).unwrap_or_else(|| "-".to_string())
}

pub fn format_value(metric: Metric, value: f64) -> String {
    if !value.is_finite() {
        return "NaN".to_string();
    }
    match metric {
        Metric::Time => format!("{value:.9}"),
        Metric::Memory => format!("{value:.1}"),
    }
}

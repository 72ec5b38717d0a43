use std::collections::BTreeMap;

use crate::data::schema::{
    InvalidFieldPolicy, Metric, ResolvedSchema, EQUIVALENT_COLUMN, PASS_COLUMN, SIZE_COLUMN,
};
use crate::data::table::{Cell, FlatTable};
use crate::error::{DataWarning, Result, VizError};

/// Validated measurements of one algorithm within a run. `None` means the
/// cell was missing; it is dropped downstream, never imputed.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct AlgorithmMetrics {
    pub time_s: Option<f64>,
    pub rss_kb: Option<f64>,
}

impl AlgorithmMetrics {
    pub fn get(&self, metric: Metric) -> Option<f64> {
        match metric {
            Metric::Time => self.time_s,
            Metric::Memory => self.rss_kb,
        }
    }

    fn set(&mut self, metric: Metric, value: Option<f64>) {
        match metric {
            Metric::Time => self.time_s = value,
            Metric::Memory => self.rss_kb = value,
        }
    }
}

/// One benchmark observation, validated against a resolved schema.
#[derive(Debug, Clone, PartialEq)]
pub struct RunRecord {
    /// Index of the source row in the flat table.
    pub row: usize,
    pub pass: Option<u32>,
    pub n: Option<u64>,
    pub metrics: BTreeMap<String, AlgorithmMetrics>,
    pub equivalent: Option<bool>,
}

/// Why a field failed validation.
#[derive(Debug)]
struct FieldError(String);

impl RunRecord {
    /// Validate one flat-table row. Returns `Ok(None)` when the row is
    /// skipped under [`InvalidFieldPolicy::Skip`]; the warning is appended to
    /// `warnings`.
    pub fn from_row(
        table: &FlatTable,
        row: usize,
        schema: &ResolvedSchema,
        warnings: &mut Vec<DataWarning>,
    ) -> Result<Option<RunRecord>> {
        match Self::parse(table, row, schema) {
            Ok(record) => Ok(Some(record)),
            Err(FieldError(reason)) => match schema.invalid_fields {
                InvalidFieldPolicy::Skip => {
                    tracing::warn!("Skipping row {row}: {reason}");
                    warnings.push(DataWarning::SkippedRow { row, reason });
                    Ok(None)
                }
                InvalidFieldPolicy::Reject => {
                    Err(VizError::DataFormat(format!("row {row}: {reason}")))
                }
            },
        }
    }

    fn parse(table: &FlatTable, row: usize, schema: &ResolvedSchema) -> std::result::Result<Self, FieldError> {
        let pass = if schema.has_pass {
            let value = required_integer(table.get(row, PASS_COLUMN), PASS_COLUMN)?;
            Some(u32::try_from(value).map_err(|_| {
                FieldError(format!("\"{PASS_COLUMN}\" out of range: {value}"))
            })?)
        } else {
            None
        };

        // Warm-up rows are excluded before anything else is checked.
        if !schema.warmup.keeps(pass) {
            let n = table
                .get(row, SIZE_COLUMN)
                .as_i64()
                .and_then(|v| u64::try_from(v).ok());
            return Ok(RunRecord { row, pass, n, metrics: BTreeMap::new(), equivalent: None });
        }

        let n = if schema.has_size {
            Some(required_integer(table.get(row, SIZE_COLUMN), SIZE_COLUMN)?)
        } else {
            None
        };

        let mut metrics: BTreeMap<String, AlgorithmMetrics> = BTreeMap::new();
        for metric in Metric::ALL {
            for binding in schema.columns(metric) {
                let value = optional_measurement(table.get(row, &binding.column), &binding.column)?;
                metrics
                    .entry(binding.algorithm.clone())
                    .or_default()
                    .set(metric, value);
            }
        }

        let equivalent = match table.get(row, EQUIVALENT_COLUMN) {
            Cell::Missing => None,
            cell => Some(cell.as_bool().ok_or_else(|| {
                FieldError(format!("\"{EQUIVALENT_COLUMN}\" is not a boolean: {}", cell.display()))
            })?),
        };

        Ok(RunRecord { row, pass, n, metrics, equivalent })
    }

    pub fn metric(&self, algorithm: &str, metric: Metric) -> Option<f64> {
        self.metrics.get(algorithm).and_then(|m| m.get(metric))
    }
}

/// Validate every row of `table`, in order.
pub fn validate_rows(
    table: &FlatTable,
    schema: &ResolvedSchema,
    warnings: &mut Vec<DataWarning>,
) -> Result<Vec<RunRecord>> {
    let mut records = Vec::with_capacity(table.len());
    for row in 0..table.len() {
        if let Some(record) = RunRecord::from_row(table, row, schema, warnings)? {
            records.push(record);
        }
    }
    Ok(records)
}

fn required_integer(cell: &Cell, name: &str) -> std::result::Result<u64, FieldError> {
    if cell.is_missing() {
        return Err(FieldError(format!("\"{name}\" is missing")));
    }
    cell.as_i64()
        .and_then(|v| u64::try_from(v).ok())
        .ok_or_else(|| FieldError(format!("\"{name}\" is not a non-negative integer: {}", cell.display())))
}

fn optional_measurement(cell: &Cell, name: &str) -> std::result::Result<Option<f64>, FieldError> {
    if cell.is_missing() {
        return Ok(None);
    }
    match cell.as_f64() {
        Some(v) if v >= 0.0 => Ok(Some(v)),
        _ => Err(FieldError(format!(
            "\"{name}\" is not a non-negative number: {}",
            cell.display()
        ))),
    }
}

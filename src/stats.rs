use std::collections::HashMap;

use anyhow::{Context, Result};
use log::info;
use serde::Serialize;

use crate::{cli::StatsArgs, data::format_number, render, source, table::TypedTable};

/// Summary of the numeric cells of one column.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ColumnStats {
    pub name: String,
    pub count: usize,
    pub mean: f64,
    pub median: f64,
    pub mode: Option<f64>,
    pub min: f64,
    pub max: f64,
    /// Population standard deviation.
    pub std_dev: f64,
}

impl ColumnStats {
    /// Computes the summary of `values`, or `None` when there are none.
    pub fn from_values(name: impl Into<String>, values: &[f64]) -> Option<Self> {
        if values.is_empty() {
            return None;
        }
        let mut sorted = values.to_vec();
        sorted.sort_by(f64::total_cmp);

        let count = sorted.len();
        let mean = sorted.iter().sum::<f64>() / count as f64;
        let mid = count / 2;
        let median = if count.is_multiple_of(2) {
            (sorted[mid - 1] + sorted[mid]) / 2.0
        } else {
            sorted[mid]
        };
        let variance = sorted.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / count as f64;

        Some(Self {
            name: name.into(),
            count,
            mean,
            median,
            mode: mode_of_sorted(&sorted),
            min: sorted[0],
            max: sorted[count - 1],
            std_dev: variance.sqrt(),
        })
    }

    fn render_row(&self) -> Vec<String> {
        vec![
            self.name.clone(),
            self.count.to_string(),
            format_metric(self.mean),
            format_metric(self.median),
            self.mode.map(format_metric).unwrap_or_default(),
            format_metric(self.min),
            format_metric(self.max),
            format_metric(self.std_dev),
        ]
    }
}

/// One [`ColumnStats`] per header holding at least one numeric cell.
pub fn describe(table: &TypedTable) -> Vec<ColumnStats> {
    table
        .headers
        .iter()
        .filter_map(|header| ColumnStats::from_values(header, &table.numeric_values(header)))
        .collect()
}

/// Most frequent value of an ascending slice.
///
/// The first value to reach a new maximum count wins, so ties resolve to the
/// smallest value.
fn mode_of_sorted(sorted: &[f64]) -> Option<f64> {
    let mut counts: HashMap<u64, usize> = HashMap::new();
    let mut best_count = 0usize;
    let mut mode = None;
    for &value in sorted {
        // -0.0 and 0.0 count as the same value.
        let key = if value == 0.0 { 0f64.to_bits() } else { value.to_bits() };
        let count = counts.entry(key).or_insert(0);
        *count += 1;
        if *count > best_count {
            best_count = *count;
            mode = Some(value);
        }
    }
    mode
}

fn format_metric(value: f64) -> String {
    if value.fract() == 0.0 {
        format_number(value)
    } else {
        format!("{value:.4}")
    }
}

pub fn execute(args: &StatsArgs) -> Result<()> {
    let table = source::load_table(&args.input)
        .with_context(|| format!("Loading {:?}", args.input.input))?;
    let stats = describe(&table);

    if args.json {
        let json = serde_json::to_string_pretty(&stats).context("Serializing statistics")?;
        println!("{json}");
    } else {
        let headers = [
            "column", "count", "mean", "median", "mode", "min", "max", "std_dev",
        ]
        .map(String::from);
        let rows = stats.iter().map(ColumnStats::render_row).collect::<Vec<_>>();
        render::print_table(&headers, &rows);
    }
    info!(
        "Computed summary statistics for {} of {} column(s) over {} row(s)",
        stats.len(),
        table.headers.len(),
        table.row_count()
    );
    Ok(())
}

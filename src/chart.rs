//! Chart-ready aggregates.
//!
//! Bar, pie and line views each aggregate differently and are kept on
//! separate code paths: the bar chart averages per category, the pie chart
//! passes every row through, and the line chart pairs raw values with a
//! position-indexed trend.

use std::collections::HashMap;

use anyhow::{Context, anyhow};
use log::info;
use serde::Serialize;

use crate::{
    cli::{ChartArgs, ChartKind},
    data::Value,
    error::{AnalysisError, Result},
    regression::{self, Point},
    source,
    table::TypedTable,
};

pub const UNCATEGORIZED: &str = "uncategorized";

/// Per-category means.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategorySeries {
    pub labels: Vec<String>,
    /// `None` for a group without any numeric value.
    pub values: Vec<Option<f64>>,
}

/// One slice per row.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PieSeries {
    pub labels: Vec<Value>,
    pub values: Vec<Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LineSeries {
    pub labels: Vec<Value>,
    pub values: Vec<Value>,
    /// Fitted over the numeric values only; shorter than `values` when some
    /// rows are not numeric.
    pub trend: Vec<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Dataset<T> {
    pub label: String,
    pub data: Vec<T>,
}

/// The `{labels, datasets}` envelope consumed by chart widgets.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartData<L, T> {
    pub labels: Vec<L>,
    pub datasets: Vec<Dataset<T>>,
}

fn require_header(table: &TypedTable, header: &str) -> Result<()> {
    if table.has_header(header) {
        Ok(())
    } else {
        Err(AnalysisError::InvalidInput(format!(
            "unknown column '{header}'"
        )))
    }
}

fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        None
    } else {
        Some(values.iter().sum::<f64>() / values.len() as f64)
    }
}

fn category_label(value: &Value) -> String {
    match value {
        Value::Empty => UNCATEGORIZED.to_string(),
        other => other.as_display(),
    }
}

/// Groups rows by `category_header` and averages the numeric cells of
/// `value_header` within each group. Labels keep first-seen order.
pub fn bar_by_category(
    table: &TypedTable,
    category_header: &str,
    value_header: &str,
) -> Result<CategorySeries> {
    require_header(table, category_header)?;
    require_header(table, value_header)?;

    let mut labels: Vec<String> = Vec::new();
    let mut groups: HashMap<String, Vec<f64>> = HashMap::new();
    for row in &table.rows {
        let label = category_label(row.value(category_header));
        let group = groups.entry(label.clone()).or_insert_with(|| {
            labels.push(label);
            Vec::new()
        });
        if let Some(number) = row.number(value_header) {
            group.push(number);
        }
    }
    let values = labels
        .iter()
        .map(|label| groups.get(label).and_then(|values| mean(values)))
        .collect();
    Ok(CategorySeries { labels, values })
}

/// Single bar holding the mean of every numeric cell of `value_header`.
pub fn overall_mean(table: &TypedTable, value_header: &str) -> Result<CategorySeries> {
    require_header(table, value_header)?;
    Ok(CategorySeries {
        labels: vec![value_header.to_string()],
        values: vec![mean(&table.numeric_values(value_header))],
    })
}

/// Bar chart with automatic column choice: the first header holding a number
/// is the value column and the first other header the category. Without
/// another header the chart collapses to the overall mean.
pub fn default_bar_chart(table: &TypedTable) -> Result<Option<ChartData<String, Option<f64>>>> {
    let Some(value_header) = table.numeric_headers().first().copied() else {
        return Ok(None);
    };
    let category_header = table.headers.iter().find(|h| h.as_str() != value_header);
    let chart = match category_header {
        Some(category_header) => {
            let series = bar_by_category(table, category_header, value_header)?;
            ChartData {
                labels: series.labels,
                datasets: vec![Dataset {
                    label: format!("Mean of {value_header}"),
                    data: series.values,
                }],
            }
        }
        None => {
            let series = overall_mean(table, value_header)?;
            ChartData {
                labels: series.labels,
                datasets: vec![Dataset {
                    label: "Mean".to_string(),
                    data: series.values,
                }],
            }
        }
    };
    Ok(Some(chart))
}

/// The first header and the first distinct other header (or the first header
/// again when there is only one).
pub fn default_pair(table: &TypedTable) -> Option<(&str, &str)> {
    let first = table.headers.first()?;
    let second = table
        .headers
        .iter()
        .find(|h| *h != first)
        .unwrap_or(first);
    Some((first.as_str(), second.as_str()))
}

/// One slice per row: labels from `label_header`, values from `value_header`,
/// both passed through untouched.
pub fn pie_by_category(
    table: &TypedTable,
    label_header: &str,
    value_header: &str,
) -> Result<PieSeries> {
    require_header(table, label_header)?;
    require_header(table, value_header)?;
    let (labels, values) = table
        .rows
        .iter()
        .map(|row| {
            (
                row.value(label_header).clone(),
                row.value(value_header).clone(),
            )
        })
        .unzip();
    Ok(PieSeries { labels, values })
}

/// Row-ordered labels and values plus a trend fitted at x = 1..m over the m
/// numeric values.
pub fn line_with_trend(
    table: &TypedTable,
    category_header: &str,
    value_header: &str,
) -> Result<LineSeries> {
    require_header(table, category_header)?;
    require_header(table, value_header)?;
    let labels = table
        .rows
        .iter()
        .map(|row| row.value(category_header).clone())
        .collect::<Vec<_>>();
    let values = table
        .rows
        .iter()
        .map(|row| row.value(value_header).clone())
        .collect::<Vec<_>>();
    let ys = values.iter().filter_map(Value::as_number).collect::<Vec<_>>();
    let xs = (1..=ys.len()).map(|i| i as f64).collect::<Vec<_>>();
    let trend = regression::linear_trend(&xs, &ys)?;
    Ok(LineSeries {
        labels,
        values,
        trend,
    })
}

fn print_json<T: Serialize>(value: &T) -> anyhow::Result<()> {
    let json = serde_json::to_string_pretty(value).context("Serializing chart data")?;
    println!("{json}");
    Ok(())
}

pub fn execute(args: &ChartArgs) -> anyhow::Result<()> {
    let table = source::load_table(&args.input)
        .with_context(|| format!("Loading {:?}", args.input.input))?;
    if table.headers.is_empty() || table.is_empty() {
        return Err(anyhow!(
            "No data to chart in {:?}; load a file with a header and at least one row",
            args.input.input
        ));
    }
    let (default_category, default_value) = default_pair(&table)
        .map(|(c, v)| (c.to_string(), v.to_string()))
        .unwrap_or_default();
    let category = args.category.clone().unwrap_or(default_category);
    let value = args.value.clone().unwrap_or(default_value);

    match args.kind {
        ChartKind::Bar => {
            let chart = match (&args.category, &args.value) {
                (None, None) => default_bar_chart(&table)?,
                _ => {
                    let series = bar_by_category(&table, &category, &value)?;
                    Some(ChartData {
                        labels: series.labels,
                        datasets: vec![Dataset {
                            label: format!("Mean of {value}"),
                            data: series.values,
                        }],
                    })
                }
            };
            let chart =
                chart.ok_or_else(|| anyhow!("No numeric column available for a bar chart"))?;
            print_json(&chart)?;
        }
        ChartKind::Pie => {
            let series = pie_by_category(&table, &category, &value)?;
            print_json(&ChartData {
                labels: series.labels,
                datasets: vec![Dataset {
                    label: value.clone(),
                    data: series.values,
                }],
            })?;
        }
        ChartKind::Line => {
            let series = line_with_trend(&table, &category, &value)?;
            print_json(&LineChart::from(series))?;
        }
        ChartKind::Scatter => {
            let result = regression::correlate(&table, &category, &value)?;
            print_json(&ScatterChart {
                datasets: vec![
                    Dataset {
                        label: format!("{category} vs {value}"),
                        data: result.pair,
                    },
                    Dataset {
                        label: "Trend".to_string(),
                        data: result.trend_endpoints,
                    },
                ],
            })?;
        }
    }
    info!(
        "Rendered {:?} chart of '{}' by '{}' over {} row(s)",
        args.kind,
        value,
        category,
        table.row_count()
    );
    Ok(())
}

/// Line view: raw values and the fitted trend as two datasets.
#[derive(Debug, Serialize)]
struct LineChart {
    labels: Vec<Value>,
    datasets: (Dataset<Value>, Dataset<f64>),
}

impl From<LineSeries> for LineChart {
    fn from(series: LineSeries) -> Self {
        Self {
            labels: series.labels,
            datasets: (
                Dataset {
                    label: "Values".to_string(),
                    data: series.values,
                },
                Dataset {
                    label: "Trend".to_string(),
                    data: series.trend,
                },
            ),
        }
    }
}

#[derive(Debug, Serialize)]
struct ScatterChart {
    datasets: Vec<Dataset<Point>>,
}

//! Least-squares trend lines and Pearson correlation.

use std::fmt;

use anyhow::Context;
use itertools::{Itertools, MinMaxResult};
use log::info;
use serde::Serialize;

use crate::{
    cli::CorrelateArgs,
    data::format_number,
    error::{AnalysisError, Result},
    render, source,
    table::TypedTable,
};

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

/// Slope and intercept of `y = slope * x + intercept`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LineFit {
    pub slope: f64,
    pub intercept: f64,
}

impl LineFit {
    pub fn at(&self, x: f64) -> f64 {
        self.slope * x + self.intercept
    }
}

fn ensure_same_length(xs: &[f64], ys: &[f64]) -> Result<()> {
    if xs.len() != ys.len() {
        return Err(AnalysisError::InvalidInput(format!(
            "series lengths differ: {} x value(s) vs {} y value(s)",
            xs.len(),
            ys.len()
        )));
    }
    Ok(())
}

/// Ordinary least-squares fit from the closed-form sums.
///
/// `None` when the series are empty or every x is identical.
pub fn fit_line(xs: &[f64], ys: &[f64]) -> Result<Option<LineFit>> {
    ensure_same_length(xs, ys)?;
    if xs.is_empty() {
        return Ok(None);
    }
    let n = xs.len() as f64;
    let sum_x: f64 = xs.iter().sum();
    let sum_y: f64 = ys.iter().sum();
    let sum_xy: f64 = xs.iter().zip(ys).map(|(x, y)| x * y).sum();
    let sum_xx: f64 = xs.iter().map(|x| x * x).sum();

    let denominator = n * sum_xx - sum_x * sum_x;
    if denominator == 0.0 {
        return Ok(None);
    }
    Ok(Some(LineFit {
        slope: (n * sum_xy - sum_x * sum_y) / denominator,
        intercept: (sum_y * sum_xx - sum_x * sum_xy) / denominator,
    }))
}

/// Fitted y for every input x, in input order.
///
/// When all x are identical the line is flat at the first y.
pub fn linear_trend(xs: &[f64], ys: &[f64]) -> Result<Vec<f64>> {
    let fit = fit_line(xs, ys)?;
    Ok(match fit {
        Some(fit) => xs.iter().map(|&x| fit.at(x)).collect(),
        None => ys.first().map(|&y| vec![y; ys.len()]).unwrap_or_default(),
    })
}

/// Population Pearson coefficient.
///
/// `None` for empty input or when either series has zero variance.
pub fn pearson(xs: &[f64], ys: &[f64]) -> Result<Option<f64>> {
    ensure_same_length(xs, ys)?;
    if xs.is_empty() || is_constant(xs) || is_constant(ys) {
        return Ok(None);
    }
    let n = xs.len() as f64;
    let mean_x = xs.iter().sum::<f64>() / n;
    let mean_y = ys.iter().sum::<f64>() / n;
    let (mut covariance, mut var_x, mut var_y) = (0.0, 0.0, 0.0);
    for (x, y) in xs.iter().zip(ys) {
        let dx = x - mean_x;
        let dy = y - mean_y;
        covariance += dx * dy;
        var_x += dx * dx;
        var_y += dy * dy;
    }
    if var_x == 0.0 || var_y == 0.0 {
        return Ok(None);
    }
    let r = covariance / (var_x * var_y).sqrt();
    Ok(Some(r.clamp(-1.0, 1.0)))
}

// Compared by value: the summed squared deviations of a constant series can
// miss zero when its mean does not round-trip.
fn is_constant(values: &[f64]) -> bool {
    match values.iter().minmax_by(|a, b| a.total_cmp(b)) {
        MinMaxResult::NoElements | MinMaxResult::OneElement(_) => true,
        MinMaxResult::MinMax(min, max) => min == max,
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CorrelationBand {
    NotComputable,
    None,
    VeryWeak,
    Weak,
    Moderate,
    Strong,
    VeryStrong,
}

impl CorrelationBand {
    pub fn label(&self) -> &'static str {
        match self {
            CorrelationBand::NotComputable => "not computable",
            CorrelationBand::None => "none",
            CorrelationBand::VeryWeak => "very weak",
            CorrelationBand::Weak => "weak",
            CorrelationBand::Moderate => "moderate",
            CorrelationBand::Strong => "strong",
            CorrelationBand::VeryStrong => "very strong",
        }
    }
}

impl fmt::Display for CorrelationBand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Bands `|r|`; each band includes its lower bound.
pub fn correlation_band(r: Option<f64>) -> CorrelationBand {
    let Some(r) = r.filter(|r| !r.is_nan()) else {
        return CorrelationBand::NotComputable;
    };
    match r.abs() {
        a if a < 0.1 => CorrelationBand::None,
        a if a < 0.3 => CorrelationBand::VeryWeak,
        a if a < 0.5 => CorrelationBand::Weak,
        a if a < 0.7 => CorrelationBand::Moderate,
        a if a < 0.9 => CorrelationBand::Strong,
        _ => CorrelationBand::VeryStrong,
    }
}

/// Rows where both columns are numeric, in table order.
pub fn scatter_pairs(table: &TypedTable, x_header: &str, y_header: &str) -> Vec<Point> {
    table
        .rows
        .iter()
        .filter_map(|row| {
            Some(Point {
                x: row.number(x_header)?,
                y: row.number(y_header)?,
            })
        })
        .collect()
}

/// The fitted line evaluated at the smallest and largest observed x.
///
/// Empty for no points and a single point when every x is the same.
pub fn trend_endpoints(points: &[Point]) -> Result<Vec<Point>> {
    let (xs, ys): (Vec<f64>, Vec<f64>) = points.iter().map(|p| (p.x, p.y)).unzip();
    let fit = fit_line(&xs, &ys)?;
    let evaluate = |x: f64| Point {
        x,
        y: fit.map(|fit| fit.at(x)).unwrap_or(ys[0]),
    };
    Ok(match xs.iter().copied().minmax_by(f64::total_cmp) {
        MinMaxResult::NoElements => Vec::new(),
        MinMaxResult::OneElement(x) => vec![evaluate(x)],
        MinMaxResult::MinMax(min, max) if min == max => vec![evaluate(min)],
        MinMaxResult::MinMax(min, max) => vec![evaluate(min), evaluate(max)],
    })
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CorrelationResult {
    pub coefficient: Option<f64>,
    pub band: CorrelationBand,
    pub pair: Vec<Point>,
    pub trend_endpoints: Vec<Point>,
}

pub fn correlate(table: &TypedTable, x_header: &str, y_header: &str) -> Result<CorrelationResult> {
    for header in [x_header, y_header] {
        if !table.has_header(header) {
            return Err(AnalysisError::InvalidInput(format!(
                "unknown column '{header}'"
            )));
        }
    }
    let pair = scatter_pairs(table, x_header, y_header);
    let (xs, ys): (Vec<f64>, Vec<f64>) = pair.iter().map(|p| (p.x, p.y)).unzip();
    let coefficient = pearson(&xs, &ys)?;
    Ok(CorrelationResult {
        coefficient,
        band: correlation_band(coefficient),
        trend_endpoints: trend_endpoints(&pair)?,
        pair,
    })
}

pub fn execute(args: &CorrelateArgs) -> anyhow::Result<()> {
    let table = source::load_table(&args.input)
        .with_context(|| format!("Loading {:?}", args.input.input))?;
    let result = correlate(&table, &args.x, &args.y)
        .with_context(|| format!("Correlating '{}' with '{}'", args.x, args.y))?;

    if args.json {
        let json = serde_json::to_string_pretty(&result).context("Serializing correlation")?;
        println!("{json}");
    } else {
        let endpoints = result
            .trend_endpoints
            .iter()
            .map(|p| format!("({}, {})", format_number(p.x), format_number(p.y)))
            .join(" -> ");
        let headers = ["x", "y", "pairs", "coefficient", "band", "trend"].map(String::from);
        let row = vec![
            args.x.clone(),
            args.y.clone(),
            result.pair.len().to_string(),
            result
                .coefficient
                .map(|r| format!("{r:.4}"))
                .unwrap_or_default(),
            result.band.to_string(),
            endpoints,
        ];
        render::print_table(&headers, &[row]);
    }
    info!(
        "Correlated '{}' and '{}' over {} numeric pair(s)",
        args.x,
        args.y,
        result.pair.len()
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn linear_trend_fits_every_x() {
        let trend = linear_trend(&[1.0, 2.0, 3.0], &[2.0, 4.0, 6.0]).unwrap();
        for (got, want) in trend.iter().zip([2.0, 4.0, 6.0]) {
            assert!((got - want).abs() < 1e-9);
        }
    }

    #[test]
    fn linear_trend_with_constant_x_repeats_first_y() {
        let trend = linear_trend(&[1.0, 1.0, 1.0], &[2.0, 5.0, 9.0]).unwrap();
        assert_eq!(trend, vec![2.0, 2.0, 2.0]);
    }

    #[test]
    fn linear_trend_rejects_mismatched_lengths() {
        let err = linear_trend(&[1.0, 2.0], &[1.0]).unwrap_err();
        assert!(matches!(err, AnalysisError::InvalidInput(_)));
        assert!(linear_trend(&[], &[]).unwrap().is_empty());
    }

    #[test]
    fn pearson_handles_perfect_and_degenerate_series() {
        assert_eq!(pearson(&[1.0, 2.0, 3.0], &[2.0, 4.0, 6.0]).unwrap(), Some(1.0));
        assert_eq!(pearson(&[1.0, 2.0, 3.0], &[6.0, 4.0, 2.0]).unwrap(), Some(-1.0));
        assert_eq!(pearson(&[1.0, 2.0, 3.0], &[1.0, 1.0, 1.0]).unwrap(), None);
        assert_eq!(pearson(&[], &[]).unwrap(), None);
        assert!(pearson(&[1.0], &[]).is_err());
    }

    #[test]
    fn pearson_detects_constant_series_with_inexact_mean() {
        assert_eq!(pearson(&[1.0, 2.0, 3.0], &[0.1, 0.1, 0.1]).unwrap(), None);
        assert_eq!(pearson(&[0.7, 0.7, 0.7], &[1.0, 2.0, 3.0]).unwrap(), None);
        assert_eq!(pearson(&[4.0], &[2.0]).unwrap(), None);
    }

    #[test]
    fn correlation_band_lower_bounds_are_inclusive() {
        assert_eq!(correlation_band(None), CorrelationBand::NotComputable);
        assert_eq!(correlation_band(Some(f64::NAN)), CorrelationBand::NotComputable);
        assert_eq!(correlation_band(Some(0.05)), CorrelationBand::None);
        assert_eq!(correlation_band(Some(0.1)), CorrelationBand::VeryWeak);
        assert_eq!(correlation_band(Some(-0.3)), CorrelationBand::Weak);
        assert_eq!(correlation_band(Some(0.5)), CorrelationBand::Moderate);
        assert_eq!(correlation_band(Some(-0.7)), CorrelationBand::Strong);
        assert_eq!(correlation_band(Some(0.9)), CorrelationBand::VeryStrong);
        assert_eq!(correlation_band(Some(1.0)).label(), "very strong");
    }

    #[test]
    fn trend_endpoints_cover_observed_x_range() {
        let points = [
            Point { x: 3.0, y: 6.0 },
            Point { x: 1.0, y: 2.0 },
            Point { x: 2.0, y: 4.0 },
        ];
        let ends = trend_endpoints(&points).unwrap();
        assert_eq!(ends.len(), 2);
        assert_eq!(ends[0].x, 1.0);
        assert_eq!(ends[1].x, 3.0);
        assert!((ends[0].y - 2.0).abs() < 1e-9);
        assert!((ends[1].y - 6.0).abs() < 1e-9);
    }

    #[test]
    fn trend_endpoints_degenerate_cases() {
        assert!(trend_endpoints(&[]).unwrap().is_empty());
        let flat = [Point { x: 2.0, y: 5.0 }, Point { x: 2.0, y: 9.0 }];
        assert_eq!(trend_endpoints(&flat).unwrap(), vec![Point { x: 2.0, y: 5.0 }]);
    }
}

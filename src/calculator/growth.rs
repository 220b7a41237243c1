use serde::{Deserialize, Serialize};

/// Growth of a series over fixed trailing windows, read off the tail of an
/// annual series whose last column is the TTM/latest-quarter column.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct GrowthWindows {
    /// Percent change of the TTM column against the latest full year.
    pub ttm: f64,
    /// Annualized growth over the trailing 3-year window.
    pub three_year: f64,
    /// Annualized growth over the trailing 5-year window.
    pub five_year: f64,
}

impl GrowthWindows {
    pub fn of(series: &[f64]) -> Self {
        GrowthWindows {
            ttm: ttm_growth(series),
            three_year: windowed_growth(series, 3),
            five_year: windowed_growth(series, 5),
        }
    }
}

/// Simple year-over-year growth in percent, aligned with the input series.
/// Index 0 and any index without a positive prior comparator are `None`.
pub fn simple_yoy(series: &[f64]) -> Vec<Option<f64>> {
    series
        .iter()
        .enumerate()
        .map(|(i, &value)| {
            if i == 0 {
                return None;
            }
            let prior = series[i - 1];
            if prior > 0.0 {
                Some(finite_or_zero((value - prior) / prior * 100.0))
            } else {
                None
            }
        })
        .collect()
}

/// Compound annual growth rate in percent between two values.
///
/// Sign handling follows a fixed policy instead of failing:
/// - `years <= 0` is degenerate and yields 0;
/// - both values positive: the geometric rate;
/// - both values non-positive: the geometric rate of the magnitudes, negated
///   when the magnitude grew (a deepening loss is reported as decline);
/// - mixed sign: the geometric mean is undefined across a sign change, so a
///   simple linear annualized rate over `|start|` is used instead;
/// - a zero comparator yields 0.
pub fn cagr(start: f64, end: f64, years: f64) -> f64 {
    if years <= 0.0 {
        return 0.0;
    }

    if start > 0.0 && end > 0.0 {
        return finite_or_zero(((end / start).powf(1.0 / years) - 1.0) * 100.0);
    }

    if start <= 0.0 && end <= 0.0 {
        let start_mag = start.abs();
        let end_mag = end.abs();
        if start_mag == 0.0 || end_mag == 0.0 {
            return 0.0;
        }

        let rate = finite_or_zero(((end_mag / start_mag).powf(1.0 / years) - 1.0) * 100.0);
        return if end_mag > start_mag { -rate } else { rate };
    }

    // Mixed sign.
    if start.abs() == 0.0 {
        return 0.0;
    }
    finite_or_zero((end - start) / start.abs() / years * 100.0)
}

/// Annualized growth across a quarterly series, from its first to its last
/// point. Needs at least two points and a non-zero first point; otherwise the
/// figure is not applicable.
pub fn quarterly_cagr(series: &[f64]) -> Option<f64> {
    if series.len() < 2 {
        return None;
    }

    let first = series[0];
    let last = series[series.len() - 1];
    if first == 0.0 {
        return None;
    }

    let years = (series.len() - 1) as f64 / 4.0;
    Some(cagr(first, last, years))
}

/// Annualized growth over the trailing `window_years` window of an annual
/// series whose last column is TTM: compares the value one period before the
/// most recent column against the value `window_years` periods further back.
/// Series shorter than `window_years + 2` default to 0.
pub fn windowed_growth(series: &[f64], window_years: usize) -> f64 {
    let len = series.len();
    if len < window_years + 2 {
        return 0.0;
    }

    let end = series[len - 2];
    let start = series[len - 2 - window_years];
    cagr(start, end, window_years as f64)
}

/// Percent change of the TTM column against the latest full-year column.
fn ttm_growth(series: &[f64]) -> f64 {
    let len = series.len();
    if len < 2 {
        return 0.0;
    }

    let latest_full_year = series[len - 2];
    if latest_full_year <= 0.0 {
        return 0.0;
    }
    finite_or_zero((series[len - 1] - latest_full_year) / latest_full_year * 100.0)
}

pub(crate) fn finite_or_zero(value: f64) -> f64 {
    if value.is_finite() {
        value
    } else {
        0.0
    }
}

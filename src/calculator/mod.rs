use serde::{Deserialize, Serialize};

use crate::{
    declare::FinancialRow,
    extractor::{table::RowSeries, ExtractedData},
    util::text,
};

pub mod growth;

use growth::{finite_or_zero, GrowthWindows};

/// Everything derived from one extraction: scalar ratios at the latest full
/// year, per-period series aligned with the extracted periods, and growth
/// rates.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CalculatedMetrics {
    /// Sales over fixed assets at the latest full year.
    pub fixed_asset_turnover: f64,
    /// Profit for EPS over fixed assets at the latest full year, in percent.
    pub return_on_fixed_assets: f64,
    /// Depreciation over fixed assets at the latest full year, in percent.
    pub depreciation_to_fixed_assets: f64,

    /// Net fixed asset turnover per period.
    pub nfat: Vec<f64>,
    pub avg_nfat_3y: Vec<f64>,
    /// Net profit margin per period. Stored as a ratio, not a percentage;
    /// multiply by 100 for display.
    pub npm: Vec<f64>,
    pub avg_npm_3y: Vec<f64>,
    /// Dividend payout per period, in percent as shown on the page.
    pub dividend_payout: Vec<f64>,
    pub avg_dividend_payout_3y: Vec<f64>,
    /// Depreciation over fixed assets per period, as a ratio.
    pub depreciation_percent: Vec<f64>,
    pub avg_depreciation_percent_3y: Vec<f64>,
    /// Business sustainability ratio per period.
    pub bsr: Vec<f64>,

    pub growth: GrowthMetrics,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GrowthMetrics {
    /// Simple year-over-year sales growth, aligned with the periods; `None`
    /// where there is no positive prior comparator.
    pub sales_yoy: Vec<Option<f64>>,
    pub sales: GrowthWindows,
    pub eps: GrowthWindows,
    /// Annualized growth across the quarterly sales row; `None` when the row
    /// is too short to compare.
    pub quarterly_sales_cagr: Option<f64>,
    pub quarterly_expenses_cagr: Option<f64>,
    /// Annualized growth of quarterly sales minus expenses.
    pub quarterly_profit_cagr: Option<f64>,
}

/// Derives all metrics from extracted row data. Pure and total: rows that are
/// missing or shorter than the period count read as zero, and no arithmetic
/// step can fail.
///
/// Works entirely off `data`, so it can recompute from a cached extraction
/// without touching the page again.
pub fn calculate_financial_metrics(data: &ExtractedData) -> CalculatedMetrics {
    let period_count = data.periods.len();

    let sales = series_values(data.profit_loss_row(FinancialRow::Sales), period_count);
    let eps = series_values(data.profit_loss_row(FinancialRow::Eps), period_count);
    let dividend_payout = series_values(
        data.profit_loss_row(FinancialRow::DividendPayout),
        period_count,
    );
    let depreciation = series_values(
        data.profit_loss_row(FinancialRow::Depreciation),
        period_count,
    );
    let profit_for_eps = series_values(
        data.profit_loss_row(FinancialRow::ProfitForEps),
        period_count,
    );
    let fixed_assets = series_values(
        data.balance_sheet_row(FinancialRow::FixedAssets),
        period_count,
    );

    let nfat = nfat_series(&sales, &fixed_assets);
    let avg_nfat_3y = trailing_avg_zero_head(&nfat);
    let npm = guarded_ratio(&profit_for_eps, &sales);
    let avg_npm_3y = trailing_avg_zero_head(&npm);
    let avg_dividend_payout_3y = trailing_avg_partial_head(&dividend_payout);
    let depreciation_percent = guarded_ratio(&depreciation, &fixed_assets);
    let avg_depreciation_percent_3y = trailing_avg_partial_head(&depreciation_percent);
    let bsr = bsr_series(
        &avg_nfat_3y,
        &avg_npm_3y,
        &avg_dividend_payout_3y,
        &avg_depreciation_percent_3y,
    );

    let (fixed_asset_turnover, return_on_fixed_assets, depreciation_to_fixed_assets) =
        latest_year_scalars(period_count, &sales, &profit_for_eps, &depreciation, &fixed_assets);

    let quarterly_sales = quarter_values(data.quarters_row(FinancialRow::QuarterlySales));
    let quarterly_expenses = quarter_values(data.quarters_row(FinancialRow::QuarterlyExpenses));
    let quarterly_profit: Vec<f64> = quarterly_sales
        .iter()
        .zip(quarterly_expenses.iter())
        .map(|(s, e)| s - e)
        .collect();

    let growth = GrowthMetrics {
        sales_yoy: growth::simple_yoy(&sales),
        sales: GrowthWindows::of(&sales),
        eps: GrowthWindows::of(&eps),
        quarterly_sales_cagr: growth::quarterly_cagr(&quarterly_sales),
        quarterly_expenses_cagr: growth::quarterly_cagr(&quarterly_expenses),
        quarterly_profit_cagr: growth::quarterly_cagr(&quarterly_profit),
    };

    CalculatedMetrics {
        fixed_asset_turnover,
        return_on_fixed_assets,
        depreciation_to_fixed_assets,
        nfat,
        avg_nfat_3y,
        npm,
        avg_npm_3y,
        dividend_payout,
        avg_dividend_payout_3y,
        depreciation_percent,
        avg_depreciation_percent_3y,
        bsr,
        growth,
    }
}

/// Normalizes a row to one number per period. Missing rows and missing
/// trailing values read as zero, so a short row never fails a calculation.
fn series_values(row: Option<&RowSeries>, period_count: usize) -> Vec<f64> {
    (0..period_count)
        .map(|i| {
            text::parse_number(
                row.and_then(|r| r.values.get(i)).map(String::as_str),
            )
        })
        .collect()
}

/// Quarterly rows keep their own length; normalization only parses.
fn quarter_values(row: Option<&RowSeries>) -> Vec<f64> {
    row.map(|r| {
        r.values
            .iter()
            .map(|v| text::parse_number(Some(v)))
            .collect()
    })
    .unwrap_or_default()
}

/// Net fixed asset turnover: sales over the average of the current and prior
/// fixed-asset balances. The balance before the first period is taken as 0.
fn nfat_series(sales: &[f64], fixed_assets: &[f64]) -> Vec<f64> {
    sales
        .iter()
        .enumerate()
        .map(|(i, &s)| {
            let prior = if i == 0 { 0.0 } else { fixed_assets[i - 1] };
            let denominator = prior + fixed_assets[i];
            if denominator > 0.0 {
                finite_or_zero(2.0 * s / denominator)
            } else {
                0.0
            }
        })
        .collect()
}

/// Element-wise `numerator / denominator`, 0 wherever the denominator is not
/// positive.
fn guarded_ratio(numerator: &[f64], denominator: &[f64]) -> Vec<f64> {
    numerator
        .iter()
        .zip(denominator.iter())
        .map(|(&n, &d)| if d > 0.0 { finite_or_zero(n / d) } else { 0.0 })
        .collect()
}

/// 3-year trailing average with the strict head policy: the first three
/// periods lack a full window and are defined as 0.
fn trailing_avg_zero_head(series: &[f64]) -> Vec<f64> {
    series
        .iter()
        .enumerate()
        .map(|(i, _)| {
            if i < 3 {
                0.0
            } else {
                (series[i - 2] + series[i - 1] + series[i]) / 3.0
            }
        })
        .collect()
}

/// 3-year trailing average with the partial head policy: early periods
/// average whatever points exist so far (1, 2, then 3).
///
/// The two head policies differ on purpose; dividend payout and depreciation
/// have always been averaged over the partial window while NFAT and NPM start
/// at 0, and unifying them would shift every derived BSR figure.
fn trailing_avg_partial_head(series: &[f64]) -> Vec<f64> {
    series
        .iter()
        .enumerate()
        .map(|(i, _)| {
            let from = i.saturating_sub(2);
            let window = &series[from..=i];
            window.iter().sum::<f64>() / window.len() as f64
        })
        .collect()
}

/// Composite business sustainability ratio. Any non-finite input collapses
/// that period to 0.
fn bsr_series(
    avg_nfat_3y: &[f64],
    avg_npm_3y: &[f64],
    avg_dividend_payout_3y: &[f64],
    avg_depreciation_percent_3y: &[f64],
) -> Vec<f64> {
    (0..avg_nfat_3y.len())
        .map(|i| {
            let retained = 1.0 - avg_dividend_payout_3y[i] / 100.0;
            let value =
                (avg_nfat_3y[i] * avg_npm_3y[i] * retained - avg_depreciation_percent_3y[i]) * 100.0;
            finite_or_zero(value)
        })
        .collect()
}

/// Scalar ratios computed at the latest full-year column; the final column is
/// the TTM/latest-quarter column and is skipped. Fewer than two periods means
/// there is no full-year column, and all three scalars are 0.
fn latest_year_scalars(
    period_count: usize,
    sales: &[f64],
    profit_for_eps: &[f64],
    depreciation: &[f64],
    fixed_assets: &[f64],
) -> (f64, f64, f64) {
    if period_count < 2 {
        return (0.0, 0.0, 0.0);
    }

    let i = period_count - 2;
    let fa = fixed_assets[i];
    if fa == 0.0 {
        return (0.0, 0.0, 0.0);
    }

    (
        finite_or_zero(sales[i] / fa),
        finite_or_zero(profit_for_eps[i] / fa * 100.0),
        finite_or_zero(depreciation[i] / fa * 100.0),
    )
}

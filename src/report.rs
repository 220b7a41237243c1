use std::fmt::Write as _;

use crate::{
    calculator::GrowthMetrics,
    extractor::{ExtractionResult, ExtractionStatus},
};

/// Renders one extraction as a readable plain-text report.
///
/// A partial extraction is flagged prominently: its profit-derived figures
/// read as zero and must not be mistaken for real data.
pub fn render(result: &ExtractionResult) -> String {
    let data = &result.extracted_data;
    let metrics = &result.calculated_metrics;
    let mut out = String::with_capacity(2048);

    let name = if data.stock_name.is_empty() {
        "(unknown company)"
    } else {
        data.stock_name.as_str()
    };
    let _ = writeln!(out, "=== {} ===", name);

    if result.status == ExtractionStatus::Partial {
        let _ = writeln!(
            out,
            "*** PARTIAL DATA: the hidden Profit for EPS row could not be extracted;"
        );
        let _ = writeln!(out, "*** profit-derived figures below read as zero.");
    }

    let _ = writeln!(out, "\nExtracted rows ({} periods)", data.periods.len());
    let mut rows: Vec<_> = data
        .profit_loss
        .values()
        .chain(data.balance_sheet.values())
        .chain(data.quarters.values())
        .collect();
    rows.sort_by(|a, b| a.label.cmp(&b.label));
    for row in rows {
        let _ = writeln!(out, "  {}: {}", row.label, row.values.join(", "));
    }

    let _ = writeln!(out, "\nLatest full-year ratios");
    let _ = writeln!(
        out,
        "  Fixed Asset Turnover:         {:.2}",
        metrics.fixed_asset_turnover
    );
    let _ = writeln!(
        out,
        "  Return on Fixed Assets:       {:.2}%",
        metrics.return_on_fixed_assets
    );
    let _ = writeln!(
        out,
        "  Depreciation to Fixed Assets: {:.2}%",
        metrics.depreciation_to_fixed_assets
    );

    if !data.periods.is_empty() {
        let _ = writeln!(out, "\nPer-period series");
        let _ = writeln!(
            out,
            "  {:<12} {:>8} {:>10} {:>8}",
            "Period", "NFAT", "NPM", "BSR"
        );
        for (i, period) in data.periods.iter().enumerate() {
            let _ = writeln!(
                out,
                "  {:<12} {:>8.2} {:>9.2}% {:>8.2}",
                period,
                metrics.nfat.get(i).copied().unwrap_or(0.0),
                metrics.npm.get(i).copied().unwrap_or(0.0) * 100.0,
                metrics.bsr.get(i).copied().unwrap_or(0.0),
            );
        }
    }

    render_growth(&mut out, &metrics.growth);

    out
}

fn render_growth(out: &mut String, growth: &GrowthMetrics) {
    let _ = writeln!(out, "\nGrowth");
    let _ = writeln!(
        out,
        "  Sales: TTM {:.2}%, 3Y {:.2}%, 5Y {:.2}%",
        growth.sales.ttm, growth.sales.three_year, growth.sales.five_year
    );
    let _ = writeln!(
        out,
        "  EPS:   TTM {:.2}%, 3Y {:.2}%, 5Y {:.2}%",
        growth.eps.ttm, growth.eps.three_year, growth.eps.five_year
    );
    let _ = writeln!(
        out,
        "  Quarterly: sales {}, expenses {}, profit {}",
        not_applicable(growth.quarterly_sales_cagr),
        not_applicable(growth.quarterly_expenses_cagr),
        not_applicable(growth.quarterly_profit_cagr),
    );
}

fn not_applicable(rate: Option<f64>) -> String {
    match rate {
        Some(value) => format!("{:.2}%", value),
        None => "n/a".to_string(),
    }
}

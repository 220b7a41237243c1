use std::time::Duration;

use hashbrown::HashMap;
use serde::{Deserialize, Serialize};

use crate::{
    calculator::{self, CalculatedMetrics},
    config::SETTINGS,
    declare::{FinancialRow, PageSection},
    dom::DocumentAccessor,
    logging,
};

pub mod expand;
pub mod table;

use table::RowSeries;

/// Whether the hidden-row stage succeeded. A partial result still carries
/// metrics, computed with the missing rows read as zero, and must be rendered
/// distinctly so incomplete figures are not mistaken for real zeros.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExtractionStatus {
    Complete,
    Partial,
}

/// Structural failures. Everything else the extraction can hit degrades the
/// result to [`ExtractionStatus::Partial`] instead of surfacing here.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ExtractionError {
    #[error("required section '{0}' not found in the document")]
    SectionNotFound(&'static str),
}

/// Raw rows pulled off the page for one company, still as display text.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ExtractedData {
    pub stock_name: String,
    /// Column labels of the profit & loss table, earliest first. The final
    /// column is usually a TTM/latest-quarter column.
    pub periods: Vec<String>,
    pub profit_loss: HashMap<String, RowSeries>,
    pub balance_sheet: HashMap<String, RowSeries>,
    pub quarters: HashMap<String, RowSeries>,
}

impl ExtractedData {
    pub fn new(stock_name: String) -> Self {
        ExtractedData {
            stock_name,
            ..Default::default()
        }
    }

    pub fn insert_profit_loss(&mut self, row: FinancialRow, series: RowSeries) {
        self.profit_loss.insert(row.key().to_string(), series);
    }

    pub fn insert_balance_sheet(&mut self, row: FinancialRow, series: RowSeries) {
        self.balance_sheet.insert(row.key().to_string(), series);
    }

    pub fn insert_quarters(&mut self, row: FinancialRow, series: RowSeries) {
        self.quarters.insert(row.key().to_string(), series);
    }

    pub fn profit_loss_row(&self, row: FinancialRow) -> Option<&RowSeries> {
        self.profit_loss.get(row.key())
    }

    pub fn balance_sheet_row(&self, row: FinancialRow) -> Option<&RowSeries> {
        self.balance_sheet.get(row.key())
    }

    pub fn quarters_row(&self, row: FinancialRow) -> Option<&RowSeries> {
        self.quarters.get(row.key())
    }
}

/// One finished extraction, complete or partial.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExtractionResult {
    pub status: ExtractionStatus,
    pub extracted_data: ExtractedData,
    pub calculated_metrics: CalculatedMetrics,
}

/// Runs the whole pipeline against one page: locate the sections, extract the
/// visible rows and period header, expand the Net Profit row and wait for the
/// hidden Profit for EPS row, then derive the metrics.
///
/// Any failure of the expansion stage is logged and absorbed: the result is
/// delivered as [`ExtractionStatus::Partial`] with metrics computed from
/// whatever was extracted. Only a missing profit & loss section is fatal.
pub async fn run_extraction(
    doc: &dyn DocumentAccessor,
) -> Result<ExtractionResult, ExtractionError> {
    let primary = PageSection::ProfitLoss;
    if !doc.has_section(primary.selector()) {
        return Err(ExtractionError::SectionNotFound(primary.selector()));
    }

    let stock_name = doc.stock_name().unwrap_or_default();
    logging::info_file_async(format!(
        "Starting {} extraction for '{}'",
        primary.name(),
        stock_name
    ));

    let mut data = ExtractedData::new(stock_name);
    data.periods = table::extract_periods(doc, primary);

    for row in [
        FinancialRow::Sales,
        FinancialRow::Eps,
        FinancialRow::DividendPayout,
        FinancialRow::Depreciation,
    ] {
        data.insert_profit_loss(row, table::extract_row(doc, row.section(), row.keyword()));
    }

    if doc.has_section(PageSection::BalanceSheet.selector()) {
        let row = FinancialRow::FixedAssets;
        data.insert_balance_sheet(row, table::extract_row(doc, row.section(), row.keyword()));
    }

    if doc.has_section(PageSection::Quarters.selector()) {
        for row in [FinancialRow::QuarterlySales, FinancialRow::QuarterlyExpenses] {
            data.insert_quarters(row, table::extract_row(doc, row.section(), row.keyword()));
        }
    }

    let timeout = Duration::from_millis(SETTINGS.extractor.expand_timeout_ms);
    let status = match expand::expand_section(
        doc,
        primary,
        FinancialRow::NetProfit.keyword(),
        FinancialRow::ProfitForEps.keyword(),
        timeout,
    )
    .await
    {
        Ok(()) => {
            let row = FinancialRow::ProfitForEps;
            data.insert_profit_loss(row, table::extract_row(doc, primary, row.keyword()));
            ExtractionStatus::Complete
        }
        Err(why) => {
            logging::warn_file_async(format!(
                "Falling back to partial extraction for '{}' because: {}",
                data.stock_name, why
            ));
            ExtractionStatus::Partial
        }
    };

    let calculated_metrics = calculator::calculate_financial_metrics(&data);
    logging::info_file_async(format!(
        "Extraction finished for '{}' with status {:?} across {} periods",
        data.stock_name,
        status,
        data.periods.len()
    ));

    Ok(ExtractionResult {
        status,
        extracted_data: data,
        calculated_metrics,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dom::memory::{MemoryDocument, MemorySection};

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    fn profit_loss_section(with_expander: bool) -> MemorySection {
        let section = MemorySection::new(&["", "2021", "2022", "2023", "2024"])
            .row("Sales", &["100", "110", "121", "133"])
            .row("EPS in Rs", &["1", "1.1", "1.2", "1.3"])
            .row("Dividend Payout %", &["20", "22", "24", "26"])
            .row("Depreciation", &["10", "11", "12", "13"]);

        let section = if with_expander {
            section.expandable_row("Net Profit", &["52", "57", "62", "69"])
        } else {
            section.row("Net Profit", &["52", "57", "62", "69"])
        };

        section.hidden_row("Profit for EPS", &["50", "55", "60", "67"])
    }

    fn balance_sheet_section() -> MemorySection {
        MemorySection::new(&["", "2021", "2022", "2023", "2024"])
            .row("Fixed Assets", &["500", "520", "540", "560"])
    }

    #[tokio::test]
    async fn test_run_extraction_complete() {
        let doc = MemoryDocument::new("Acme Industries Ltd")
            .with_section("#profit-loss", profit_loss_section(true))
            .with_section("#balance-sheet", balance_sheet_section());

        let result = run_extraction(&doc).await.unwrap();

        assert_eq!(result.status, ExtractionStatus::Complete);
        assert_eq!(result.extracted_data.stock_name, "Acme Industries Ltd");
        assert_eq!(result.extracted_data.periods.len(), 4);

        let profit = result
            .extracted_data
            .profit_loss_row(FinancialRow::ProfitForEps)
            .unwrap();
        assert_eq!(profit.values, vec!["50", "55", "60", "67"]);

        // NFAT[3] = 2*133/(540+560)
        assert!(close(
            result.calculated_metrics.nfat[3],
            2.0 * 133.0 / 1100.0
        ));
    }

    #[tokio::test]
    async fn test_run_extraction_partial_on_missing_control() {
        let doc = MemoryDocument::new("Acme Industries Ltd")
            .with_section("#profit-loss", profit_loss_section(false))
            .with_section("#balance-sheet", balance_sheet_section());

        let result = run_extraction(&doc).await.unwrap();

        assert_eq!(result.status, ExtractionStatus::Partial);
        assert!(result
            .extracted_data
            .profit_loss_row(FinancialRow::ProfitForEps)
            .is_none());

        // Metrics are still derived from the visible rows; profit-based
        // figures read as zero.
        assert!(close(
            result.calculated_metrics.nfat[3],
            2.0 * 133.0 / 1100.0
        ));
        assert_eq!(result.calculated_metrics.npm[3], 0.0);
        assert_eq!(result.calculated_metrics.return_on_fixed_assets, 0.0);
    }

    #[tokio::test]
    async fn test_run_extraction_fails_without_primary_section() {
        let doc = MemoryDocument::new("Acme Industries Ltd")
            .with_section("#balance-sheet", balance_sheet_section());

        let result = run_extraction(&doc).await;

        assert_eq!(
            result.unwrap_err(),
            ExtractionError::SectionNotFound("#profit-loss")
        );
    }

    #[tokio::test]
    async fn test_run_extraction_collects_quarterly_rows() {
        let doc = MemoryDocument::new("Acme Industries Ltd")
            .with_section("#profit-loss", profit_loss_section(true))
            .with_section("#balance-sheet", balance_sheet_section())
            .with_section(
                "#quarters",
                MemorySection::new(&["", "Q1", "Q2", "Q3", "Q4", "Q5"])
                    .row("Sales", &["100", "120", "150", "180", "200"])
                    .row("Expenses", &["80", "90", "100", "110", "120"]),
            );

        let result = run_extraction(&doc).await.unwrap();

        assert!(close(
            result
                .calculated_metrics
                .growth
                .quarterly_sales_cagr
                .unwrap(),
            100.0
        ));
    }
}

use std::time::Duration;

/// How often the expansion waiter re-checks the section for the revealed row.
pub const POLL_INTERVAL: Duration = Duration::from_millis(500);

/// Upper bound on the total time spent waiting for a hidden row to appear.
pub const EXPAND_TIMEOUT: Duration = Duration::from_millis(5000);

/// Sections of the fundamentals page.
///
/// The layout is fixed to one provider: each section is an element with a
/// well-known id containing a single data table.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum PageSection {
    /// Annual profit & loss statement (required)
    ProfitLoss,
    /// Balance sheet (optional)
    BalanceSheet,
    /// Quarterly results (optional)
    Quarters,
}

impl PageSection {
    pub fn selector(&self) -> &'static str {
        match self {
            PageSection::ProfitLoss => "#profit-loss",
            PageSection::BalanceSheet => "#balance-sheet",
            PageSection::Quarters => "#quarters",
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            PageSection::ProfitLoss => "Profit & Loss",
            PageSection::BalanceSheet => "Balance Sheet",
            PageSection::Quarters => "Quarterly Results",
        }
    }

    pub fn iterator() -> impl Iterator<Item = Self> {
        [Self::ProfitLoss, Self::BalanceSheet, Self::Quarters].into_iter()
    }
}

/// Line items read off the page, identified by a keyword that is matched as a
/// case-sensitive substring against the full text of each table row.
///
/// Substring matching mirrors the page's loose row labels, but it means a
/// keyword like "Sales" also matches any longer label containing it; the
/// first row in document order wins.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum FinancialRow {
    /// Annual Sales row
    Sales,
    /// EPS in Rs
    Eps,
    /// Dividend Payout %
    DividendPayout,
    /// Depreciation
    Depreciation,
    /// Net Profit, the expandable row
    NetProfit,
    /// Profit for EPS, hidden until Net Profit is expanded
    ProfitForEps,
    /// Fixed Assets
    FixedAssets,
    /// Quarterly Sales row
    QuarterlySales,
    /// Quarterly Expenses row
    QuarterlyExpenses,
}

impl FinancialRow {
    /// The substring searched for in the row's text.
    pub fn keyword(&self) -> &'static str {
        match self {
            FinancialRow::Sales | FinancialRow::QuarterlySales => "Sales",
            FinancialRow::Eps => "EPS in Rs",
            FinancialRow::DividendPayout => "Dividend Payout %",
            FinancialRow::Depreciation => "Depreciation",
            FinancialRow::NetProfit => "Net Profit",
            FinancialRow::ProfitForEps => "Profit for EPS",
            FinancialRow::FixedAssets => "Fixed Assets",
            FinancialRow::QuarterlyExpenses => "Expenses",
        }
    }

    /// Key under which the row series is stored in `ExtractedData`.
    pub fn key(&self) -> &'static str {
        match self {
            FinancialRow::Sales | FinancialRow::QuarterlySales => "sales",
            FinancialRow::Eps => "eps",
            FinancialRow::DividendPayout => "dividend_payout",
            FinancialRow::Depreciation => "depreciation",
            FinancialRow::NetProfit => "net_profit",
            FinancialRow::ProfitForEps => "profit_for_eps",
            FinancialRow::FixedAssets => "fixed_assets",
            FinancialRow::QuarterlyExpenses => "expenses",
        }
    }

    /// The section the row belongs to.
    pub fn section(&self) -> PageSection {
        match self {
            FinancialRow::FixedAssets => PageSection::BalanceSheet,
            FinancialRow::QuarterlySales | FinancialRow::QuarterlyExpenses => PageSection::Quarters,
            _ => PageSection::ProfitLoss,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_financial_row_sections() {
        assert_eq!(FinancialRow::Sales.section(), PageSection::ProfitLoss);
        assert_eq!(
            FinancialRow::FixedAssets.section(),
            PageSection::BalanceSheet
        );
        assert_eq!(
            FinancialRow::QuarterlyExpenses.section(),
            PageSection::Quarters
        );
        assert_eq!(PageSection::ProfitLoss.selector(), "#profit-loss");
    }
}

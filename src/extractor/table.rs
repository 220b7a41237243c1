use serde::{Deserialize, Serialize};

use crate::{
    declare::PageSection,
    dom::DocumentAccessor,
};

/// One line item as shown on the page: the keyword it was found with and the
/// raw cell text per period.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RowSeries {
    pub label: String,
    pub values: Vec<String>,
}

impl RowSeries {
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

/// Finds the first row in `section` whose full text contains `keyword` and
/// returns its data cells (the leading label cell excluded) in document
/// order.
///
/// Absence is not an error: when no row matches, the series is returned with
/// empty values. The match is a case-sensitive substring test, so a short
/// keyword can hit a longer label containing it; the first row in document
/// order wins. That ambiguity is inherited from the page's loose labels and
/// is left as-is.
pub fn extract_row(
    doc: &dyn DocumentAccessor,
    section: PageSection,
    keyword: &str,
) -> RowSeries {
    let values = doc
        .rows(section.selector())
        .into_iter()
        .find(|row| row.contains(keyword))
        .map(|row| {
            row.cells
                .into_iter()
                .skip(1)
                .map(|cell| cell.trim().to_string())
                .collect()
        })
        .unwrap_or_default();

    RowSeries {
        label: keyword.to_string(),
        values,
    }
}

/// Returns the period labels from the section's table header, excluding the
/// first (label-column) header cell. No header row yields an empty sequence.
pub fn extract_periods(doc: &dyn DocumentAccessor, section: PageSection) -> Vec<String> {
    doc.header_cells(section.selector())
        .into_iter()
        .skip(1)
        .map(|cell| cell.trim().to_string())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dom::memory::{MemoryDocument, MemorySection};

    fn sample() -> MemoryDocument {
        MemoryDocument::new("Acme Industries Ltd").with_section(
            "#profit-loss",
            MemorySection::new(&["", "Mar 2022", "Mar 2023", "TTM"])
                .row("Sales", &["1,000", "1,100", "1,150"])
                .row("Other Sales Adjustments", &["5", "6", "7"])
                .row("Depreciation", &["40", "45", "47"]),
        )
    }

    #[test]
    fn test_extract_row() {
        let doc = sample();
        let row = extract_row(&doc, PageSection::ProfitLoss, "Depreciation");

        assert_eq!(row.label, "Depreciation");
        assert_eq!(row.values, vec!["40", "45", "47"]);
    }

    #[test]
    fn test_extract_row_first_match_wins() {
        let doc = sample();
        let row = extract_row(&doc, PageSection::ProfitLoss, "Sales");

        // "Sales" also matches "Other Sales Adjustments"; document order
        // decides.
        assert_eq!(row.values, vec!["1,000", "1,100", "1,150"]);
    }

    #[test]
    fn test_extract_row_absent_keyword() {
        let doc = sample();
        let row = extract_row(&doc, PageSection::ProfitLoss, "Interest");

        assert_eq!(row.label, "Interest");
        assert!(row.is_empty());
    }

    #[test]
    fn test_extract_row_missing_section() {
        let doc = sample();
        let row = extract_row(&doc, PageSection::BalanceSheet, "Fixed Assets");

        assert!(row.is_empty());
    }

    #[test]
    fn test_extract_periods() {
        let doc = sample();
        let periods = extract_periods(&doc, PageSection::ProfitLoss);

        assert_eq!(periods, vec!["Mar 2022", "Mar 2023", "TTM"]);
        assert!(extract_periods(&doc, PageSection::Quarters).is_empty());
    }
}

use anyhow::Result;

pub mod html;
pub mod memory;

/// Snapshot of one table row: the concatenated text used for keyword
/// matching, the per-cell text in document order (label cell first), and
/// whether the row carries an expand control.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TableRow {
    pub text: String,
    pub cells: Vec<String>,
    pub has_expander: bool,
}

impl TableRow {
    pub fn contains(&self, keyword: &str) -> bool {
        self.text.contains(keyword)
    }
}

/// Read access to the fundamentals page plus one mutation point: activating a
/// row's expand control.
///
/// The extraction pipeline only ever talks to the page through this trait, so
/// it can run against a parsed HTML snapshot ([`html::HtmlDocument`]) or a
/// synthetic table ([`memory::MemoryDocument`]) without changes.
pub trait DocumentAccessor: Send + Sync {
    /// True when an element matching `selector` exists in the document.
    fn has_section(&self, selector: &str) -> bool;

    /// All table rows of the section, in document order. An unknown selector
    /// yields an empty list.
    fn rows(&self, selector: &str) -> Vec<TableRow>;

    /// Header cell text of the section's table, in document order, including
    /// the leading label cell.
    fn header_cells(&self, selector: &str) -> Vec<String>;

    /// Simulates activating the expand control of the row at `row_index`
    /// within the section. Errors when the row or its control is missing.
    fn activate_expander(&self, selector: &str, row_index: usize) -> Result<()>;

    /// Company name shown on the page, if any.
    fn stock_name(&self) -> Option<String>;
}

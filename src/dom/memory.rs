use std::{
    sync::RwLock,
    time::{Duration, Instant},
};

use anyhow::{anyhow, Result};
use hashbrown::HashMap;

use crate::dom::{DocumentAccessor, TableRow};

/// An in-memory fundamentals page.
///
/// Sections are synthetic tables built through [`MemorySection`]; rows marked
/// hidden stay invisible until an expand control in the same section is
/// activated, optionally after a configurable delay. This is the backend the
/// extraction pipeline is tested against, and the only one whose expansion
/// behaves like the live page.
pub struct MemoryDocument {
    stock_name: Option<String>,
    sections: RwLock<HashMap<String, MemorySection>>,
}

#[derive(Default)]
pub struct MemorySection {
    header: Vec<String>,
    rows: Vec<MemoryRow>,
    reveal_delay: Duration,
    revealed_at: Option<Instant>,
}

struct MemoryRow {
    label: String,
    cells: Vec<String>,
    has_expander: bool,
    hidden: bool,
}

impl MemoryDocument {
    pub fn new(stock_name: &str) -> Self {
        MemoryDocument {
            stock_name: Some(stock_name.to_string()),
            sections: RwLock::new(HashMap::new()),
        }
    }

    pub fn with_section(self, selector: &str, section: MemorySection) -> Self {
        if let Ok(mut sections) = self.sections.write() {
            sections.insert(selector.to_string(), section);
        }
        self
    }
}

impl MemorySection {
    pub fn new(header: &[&str]) -> Self {
        MemorySection {
            header: header.iter().map(|h| h.to_string()).collect(),
            ..Default::default()
        }
    }

    /// Appends a visible row.
    pub fn row(mut self, label: &str, cells: &[&str]) -> Self {
        self.rows.push(MemoryRow::new(label, cells, false, false));
        self
    }

    /// Appends a visible row carrying an expand control.
    pub fn expandable_row(mut self, label: &str, cells: &[&str]) -> Self {
        self.rows.push(MemoryRow::new(label, cells, true, false));
        self
    }

    /// Appends a row that stays invisible until the section is expanded.
    pub fn hidden_row(mut self, label: &str, cells: &[&str]) -> Self {
        self.rows.push(MemoryRow::new(label, cells, false, true));
        self
    }

    /// Hidden rows appear this long after the expand control is activated.
    pub fn reveal_delay(mut self, delay: Duration) -> Self {
        self.reveal_delay = delay;
        self
    }

    fn revealed(&self) -> bool {
        self.revealed_at
            .map(|at| Instant::now() >= at)
            .unwrap_or(false)
    }

    fn visible_rows(&self) -> Vec<TableRow> {
        let revealed = self.revealed();
        self.rows
            .iter()
            .filter(|row| !row.hidden || revealed)
            .map(MemoryRow::to_table_row)
            .collect()
    }
}

impl MemoryRow {
    fn new(label: &str, cells: &[&str], has_expander: bool, hidden: bool) -> Self {
        MemoryRow {
            label: label.to_string(),
            cells: cells.iter().map(|c| c.to_string()).collect(),
            has_expander,
            hidden,
        }
    }

    fn to_table_row(&self) -> TableRow {
        let mut cells = Vec::with_capacity(self.cells.len() + 1);
        cells.push(self.label.clone());
        cells.extend(self.cells.iter().cloned());

        TableRow {
            text: cells.join(" "),
            cells,
            has_expander: self.has_expander,
        }
    }
}

impl DocumentAccessor for MemoryDocument {
    fn has_section(&self, selector: &str) -> bool {
        match self.sections.read() {
            Ok(sections) => sections.contains_key(selector),
            Err(_) => false,
        }
    }

    fn rows(&self, selector: &str) -> Vec<TableRow> {
        match self.sections.read() {
            Ok(sections) => sections
                .get(selector)
                .map(|s| s.visible_rows())
                .unwrap_or_default(),
            Err(_) => Vec::new(),
        }
    }

    fn header_cells(&self, selector: &str) -> Vec<String> {
        match self.sections.read() {
            Ok(sections) => sections
                .get(selector)
                .map(|s| s.header.clone())
                .unwrap_or_default(),
            Err(_) => Vec::new(),
        }
    }

    fn activate_expander(&self, selector: &str, row_index: usize) -> Result<()> {
        let mut sections = self
            .sections
            .write()
            .map_err(|_| anyhow!("Section lock poisoned"))?;
        let section = sections
            .get_mut(selector)
            .ok_or_else(|| anyhow!("No section matches {}", selector))?;

        let visible: Vec<usize> = {
            let revealed = section.revealed();
            section
                .rows
                .iter()
                .enumerate()
                .filter(|(_, row)| !row.hidden || revealed)
                .map(|(i, _)| i)
                .collect()
        };
        let row = visible
            .get(row_index)
            .and_then(|&i| section.rows.get(i))
            .ok_or_else(|| anyhow!("No row {} in section {}", row_index, selector))?;

        if !row.has_expander {
            return Err(anyhow!(
                "Row '{}' in section {} has no expand control",
                row.label,
                selector
            ));
        }

        section.revealed_at = Some(Instant::now() + section.reveal_delay);
        Ok(())
    }

    fn stock_name(&self) -> Option<String> {
        self.stock_name.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> MemoryDocument {
        MemoryDocument::new("Acme Industries Ltd").with_section(
            "#profit-loss",
            MemorySection::new(&["", "2022", "2023"])
                .row("Sales", &["1,000", "1,100"])
                .expandable_row("Net Profit", &["80", "95"])
                .hidden_row("Profit for EPS", &["78", "92"]),
        )
    }

    #[test]
    fn test_hidden_rows_invisible_until_activation() {
        let doc = sample();
        assert_eq!(doc.rows("#profit-loss").len(), 2);
        assert!(!doc
            .rows("#profit-loss")
            .iter()
            .any(|r| r.contains("Profit for EPS")));

        let expander = doc
            .rows("#profit-loss")
            .iter()
            .position(|r| r.contains("Net Profit"))
            .unwrap();
        doc.activate_expander("#profit-loss", expander).unwrap();

        let rows = doc.rows("#profit-loss");
        assert_eq!(rows.len(), 3);
        assert!(rows.iter().any(|r| r.contains("Profit for EPS")));
    }

    #[test]
    fn test_activation_without_control_fails() {
        let doc = sample();
        let sales = doc
            .rows("#profit-loss")
            .iter()
            .position(|r| r.contains("Sales"))
            .unwrap();

        assert!(doc.activate_expander("#profit-loss", sales).is_err());
        assert!(doc.activate_expander("#balance-sheet", 0).is_err());
    }

    #[test]
    fn test_reveal_delay_applies() {
        let doc = MemoryDocument::new("Acme").with_section(
            "#profit-loss",
            MemorySection::new(&["", "2023"])
                .expandable_row("Net Profit", &["95"])
                .hidden_row("Profit for EPS", &["92"])
                .reveal_delay(Duration::from_millis(50)),
        );

        doc.activate_expander("#profit-loss", 0).unwrap();
        assert_eq!(doc.rows("#profit-loss").len(), 1);

        std::thread::sleep(Duration::from_millis(60));
        assert_eq!(doc.rows("#profit-loss").len(), 2);
    }
}

use anyhow::{anyhow, Result};
use hashbrown::HashMap;
use once_cell::sync::Lazy;
use scraper::{ElementRef, Html, Selector};

use crate::{
    declare::PageSection,
    dom::{DocumentAccessor, TableRow},
    logging,
};

static H1_SELECTOR: Lazy<Selector> =
    Lazy::new(|| Selector::parse("h1").expect("Failed to parse h1 selector"));

static TR_SELECTOR: Lazy<Selector> =
    Lazy::new(|| Selector::parse("tr").expect("Failed to parse tr selector"));

static TD_SELECTOR: Lazy<Selector> =
    Lazy::new(|| Selector::parse("td").expect("Failed to parse td selector"));

static HEADER_ROW_SELECTOR: Lazy<Selector> =
    Lazy::new(|| Selector::parse("thead tr").expect("Failed to parse thead selector"));

static TH_SELECTOR: Lazy<Selector> =
    Lazy::new(|| Selector::parse("th").expect("Failed to parse th selector"));

/// The control the page renders inside expandable rows.
static EXPAND_BUTTON_SELECTOR: Lazy<Selector> =
    Lazy::new(|| Selector::parse("button.button-plain").expect("Failed to parse button selector"));

/// A fundamentals page parsed from static HTML.
///
/// The whole document is walked once at construction and flattened into owned
/// row/header snapshots, so the accessor is plain data afterwards. Activating
/// an expander is accepted but cannot run the page's scripts; a hidden row is
/// only ever found if the snapshot already contains it. Callers extracting
/// from static HTML therefore see the same degrade-to-partial path a stalled
/// live page would produce.
#[derive(Debug, Default)]
pub struct HtmlDocument {
    stock_name: Option<String>,
    sections: HashMap<&'static str, SectionSnapshot>,
}

#[derive(Debug, Default)]
struct SectionSnapshot {
    header: Vec<String>,
    rows: Vec<TableRow>,
}

impl HtmlDocument {
    /// Parses the page and snapshots the sections listed in [`PageSection`].
    pub fn parse(text: &str) -> Self {
        let document = Html::parse_document(text);
        let mut sections = HashMap::new();

        for section in PageSection::iterator() {
            let selector = match Selector::parse(section.selector()) {
                Ok(s) => s,
                Err(why) => {
                    logging::error_file_async(format!(
                        "Failed to Selector::parse because: {:?}",
                        why
                    ));
                    continue;
                }
            };

            if let Some(root) = document.select(&selector).next() {
                sections.insert(section.selector(), snapshot_section(root));
            }
        }

        let stock_name = document
            .select(&H1_SELECTOR)
            .next()
            .map(element_text)
            .filter(|name| !name.is_empty());

        HtmlDocument {
            stock_name,
            sections,
        }
    }
}

impl DocumentAccessor for HtmlDocument {
    fn has_section(&self, selector: &str) -> bool {
        self.sections.contains_key(selector)
    }

    fn rows(&self, selector: &str) -> Vec<TableRow> {
        self.sections
            .get(selector)
            .map(|s| s.rows.clone())
            .unwrap_or_default()
    }

    fn header_cells(&self, selector: &str) -> Vec<String> {
        self.sections
            .get(selector)
            .map(|s| s.header.clone())
            .unwrap_or_default()
    }

    fn activate_expander(&self, selector: &str, row_index: usize) -> Result<()> {
        let row = self
            .sections
            .get(selector)
            .and_then(|s| s.rows.get(row_index))
            .ok_or_else(|| anyhow!("No row {} in section {}", row_index, selector))?;

        if !row.has_expander {
            return Err(anyhow!(
                "Row {} in section {} has no expand control",
                row_index,
                selector
            ));
        }

        // A static snapshot cannot execute the click handler; the revealed
        // row is present only if the server rendered it into the page.
        logging::info_file_async(format!(
            "Activated expand control in section {} (static snapshot)",
            selector
        ));
        Ok(())
    }

    fn stock_name(&self) -> Option<String> {
        self.stock_name.clone()
    }
}

fn snapshot_section(root: ElementRef) -> SectionSnapshot {
    let header = root
        .select(&HEADER_ROW_SELECTOR)
        .next()
        .map(|tr| tr.select(&TH_SELECTOR).map(element_text).collect())
        .unwrap_or_default();

    let rows = root
        .select(&TR_SELECTOR)
        .map(|tr| TableRow {
            text: tr.text().collect::<String>(),
            cells: tr.select(&TD_SELECTOR).map(element_text).collect(),
            has_expander: tr.select(&EXPAND_BUTTON_SELECTOR).next().is_some(),
        })
        .collect();

    SectionSnapshot { header, rows }
}

fn element_text(element: ElementRef) -> String {
    element.text().collect::<String>().trim().to_string()
}

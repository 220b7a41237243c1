use anyhow::{anyhow, Result};
use once_cell::sync::Lazy;
use regex::Regex;
use urlencoding::encode;

use crate::{
    config::SETTINGS,
    declare::PageSection,
    dom::{html::HtmlDocument, DocumentAccessor},
    logging, util,
};

/// Listed-company symbols as the site accepts them: ticker or BSE code.
static SYMBOL_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Za-z0-9][A-Za-z0-9.\-&]*$").expect("Failed to compile symbol regex"));

/// Fetches the fundamentals page for a stock symbol and parses it into an
/// [`HtmlDocument`].
///
/// The consolidated statements are preferred; when the consolidated page has
/// no profit & loss section (smaller companies often only file standalone
/// figures), the standalone page is fetched instead.
pub async fn visit(stock_symbol: &str) -> Result<HtmlDocument> {
    if !SYMBOL_RE.is_match(stock_symbol) {
        return Err(anyhow!("Invalid stock symbol '{}'", stock_symbol));
    }

    let consolidated = company_url(stock_symbol, true);
    let text = util::http::get(&consolidated, None).await?;
    let document = HtmlDocument::parse(&text);

    if document.has_section(PageSection::ProfitLoss.selector()) {
        return Ok(document);
    }

    logging::info_file_async(format!(
        "No profit & loss section on the consolidated page for {}, trying standalone",
        stock_symbol
    ));

    let standalone = company_url(stock_symbol, false);
    let text = util::http::get(&standalone, None).await?;
    Ok(HtmlDocument::parse(&text))
}

fn company_url(stock_symbol: &str, consolidated: bool) -> String {
    let base = SETTINGS.crawler.base_url.trim_end_matches('/');
    if consolidated {
        format!("{}/company/{}/consolidated/", base, encode(stock_symbol))
    } else {
        format!("{}/company/{}/", base, encode(stock_symbol))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_symbol_validation() {
        assert!(SYMBOL_RE.is_match("TCS"));
        assert!(SYMBOL_RE.is_match("500325"));
        assert!(SYMBOL_RE.is_match("M&M"));
        assert!(!SYMBOL_RE.is_match(""));
        assert!(!SYMBOL_RE.is_match("../etc"));
        assert!(!SYMBOL_RE.is_match("A B"));
    }

    #[test]
    fn test_company_url() {
        let url = company_url("TCS", true);
        assert!(url.ends_with("/company/TCS/consolidated/"));

        let url = company_url("M&M", false);
        assert!(url.ends_with("/company/M%26M/"));
    }
}

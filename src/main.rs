use anyhow::{anyhow, Result};

pub mod cache;
pub mod calculator;
pub mod config;
pub mod crawler;
pub mod declare;
pub mod dom;
pub mod extractor;
pub mod logging;
pub mod report;
pub mod util;

use crate::{dom::html::HtmlDocument, extractor::ExtractionResult};

#[tokio::main]
async fn main() -> Result<()> {
    dotenv::dotenv().ok();

    let args: Vec<String> = std::env::args().skip(1).collect();
    let as_json = args.iter().any(|a| a == "--json");
    let mut positional = args.iter().filter(|a| !a.starts_with("--"));
    let from_file = args.iter().any(|a| a == "--file");

    match positional.next() {
        Some(path) if from_file => {
            let text = std::fs::read_to_string(path)?;
            let document = HtmlDocument::parse(&text);
            let result = extractor::run_extraction(&document).await?;
            emit(&result, as_json)?;
        }
        Some(symbol) => {
            if let Some(cached) = cache::TTL.get(symbol) {
                logging::info_file_async(format!("Serving {} from cache", symbol));
                emit(&cached, as_json)?;
                return Ok(());
            }

            let document = crawler::screener::visit(symbol).await?;
            let result = extractor::run_extraction(&document).await?;
            cache::TTL.remember(symbol, &result);
            emit(&result, as_json)?;
        }
        None => {
            eprintln!(
                "Usage: fundamentals <symbol> [--json] | fundamentals --file <page.html> [--json]"
            );
            return Err(anyhow!("missing stock symbol"));
        }
    }

    Ok(())
}

fn emit(result: &ExtractionResult, as_json: bool) -> Result<()> {
    if as_json {
        println!("{}", serde_json::to_string_pretty(result)?);
    } else {
        println!("{}", report::render(result));
    }
    Ok(())
}

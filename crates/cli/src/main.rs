//! analyze-product: extract product fields from one page and print them as JSON.
//!
//! The result (or `{"error": ...}` when the page cannot be fetched) goes to
//! stdout; logs go to stderr. Both outcomes exit with status 0.

use anyhow::Result;
use clap::Parser;
use productmcp_client::{FetchClient, FetchConfig, analyze_url};
use productmcp_core::{AppConfig, ProductFields};
use serde::Serialize;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "analyze-product")]
#[command(about = "Extract name, brand, model, price, spec and main image from a product page")]
#[command(version)]
struct Cli {
    /// Product page URL.
    url: String,

    #[arg(long, help = "Omit imagelink and print the five-key record")]
    no_image: bool,

    #[arg(long, help = "Pretty-print the JSON output")]
    pretty: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .json()
        .init();

    let cli = Cli::parse();
    let config = AppConfig::load()?;
    let client = FetchClient::new(FetchConfig::from(&config))?;

    tracing::debug!(url = %cli.url, "analyzing product page");
    let analysis = analyze_url(&client, &cli.url).await;
    let output = if cli.no_image {
        render(&analysis.map(ProductFields::from), cli.pretty)?
    } else {
        render(&analysis, cli.pretty)?
    };

    println!("{output}");
    Ok(())
}

fn render<T: Serialize>(value: &T, pretty: bool) -> serde_json::Result<String> {
    if pretty { serde_json::to_string_pretty(value) } else { serde_json::to_string(value) }
}

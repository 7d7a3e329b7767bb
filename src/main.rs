// src/main.rs
// =============================================================================
// This is the entry point of our CLI application.
//
// What happens here:
// 1. Parse command-line arguments using clap
// 2. Build a GoogleSearch from them and start the stream
// 3. Print results as they arrive (or all at once as JSON)
// 4. Exit with proper code (0 = results, 1 = no results, 2 = error)
// =============================================================================

mod cli;
mod telemetry;

use anyhow::{Context, Result};
use async_google_search::{GoogleSearch, SearchResult};
use clap::Parser;
use cli::Cli;
use futures::TryStreamExt;

#[tokio::main]
async fn main() {
    telemetry::init_telemetry();

    let exit_code = match run().await {
        Ok(code) => code,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            2
        }
    };

    std::process::exit(exit_code);
}

// Returns:
//   Ok(0) = at least one result
//   Ok(1) = search ran but found nothing
//   Err   = setup or HTTP failure
async fn run() -> Result<i32> {
    let cli = Cli::parse();
    let query = cli.query_string();

    let mut search = GoogleSearch::new(&query)
        .with_pages(cli.pages)
        .with_results_per_page(cli.num)
        .with_language(cli.lang.as_str());

    if let Some(proxy) = &cli.proxy {
        search = search.with_proxy(proxy.as_str());
    }
    if let Some(user) = &cli.proxy_user {
        let password = cli.proxy_password.clone().unwrap_or_default();
        search = search.with_proxy_auth(user.as_str(), password);
    }

    let mut stream = search.search().context("Could not start search")?;

    if !cli.json {
        println!("🔍 Searching for: {}", query);
        println!("📄 Pages: {} x {} results\n", cli.pages, cli.num);
        print_header();
    }

    let mut results = Vec::new();
    while let Some(result) = stream.try_next().await.context("Search failed")? {
        if !cli.json {
            print_row(&result);
        }
        results.push(result);
    }

    if cli.json {
        println!("{}", serde_json::to_string_pretty(&results)?);
    } else {
        print_summary(&results, stream.pages_fetched());
    }

    if results.is_empty() {
        Ok(1)
    } else {
        Ok(0)
    }
}

fn print_header() {
    println!("{:<60} {:<30} {:<25}", "URL", "ORIGIN", "HOST");
    println!("{}", "=".repeat(115));
}

fn print_row(result: &SearchResult) {
    println!(
        "{:<60} {:<30} {:<25}",
        truncate(result.url(), 57),
        truncate(&result.origin_prefix(), 27),
        truncate(result.bare_host(), 22)
    );
}

fn print_summary(results: &[SearchResult], pages: u32) {
    println!();
    println!("📊 Summary:");
    println!("   📄 Pages: {}", pages);
    println!("   📋 Results: {}", results.len());
}

// Shortens text for display, cutting on a char boundary
fn truncate(text: &str, max_chars: usize) -> String {
    if text.chars().count() > max_chars {
        let cut: String = text.chars().take(max_chars).collect();
        format!("{}...", cut)
    } else {
        text.to_string()
    }
}

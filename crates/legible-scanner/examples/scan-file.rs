//! Example: Scan a saved HTML file and print the report summary.
//!
//! Usage: `cargo run -p legible-scanner --example scan-file -- page.html [url] [config.toml]`

use legible_core::ScanConfig;
use legible_scanner::ScanEngine;
use tracing::info;

fn init_tracing() {
    use tracing_subscriber::{fmt, prelude::*, EnvFilter};

    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info,legible=debug"));

    tracing_subscriber::registry()
        .with(fmt::layer().with_target(true))
        .with(filter)
        .init();
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    init_tracing();

    let mut args = std::env::args().skip(1);
    let Some(path) = args.next() else {
        eprintln!("Usage: scan-file <page.html> [url] [config.toml]");
        std::process::exit(2);
    };
    let url = args
        .next()
        .unwrap_or_else(|| "https://example.com/".to_string());

    let config = match args.next() {
        Some(config_path) => ScanConfig::load(&config_path)?.with_env_overrides()?,
        None => ScanConfig::default().with_env_overrides()?,
    };

    let html = std::fs::read_to_string(&path)?;
    info!(path = %path, bytes = html.len(), "loaded page");

    let engine = ScanEngine::new(config)?;
    let result = engine.scan(&url, html, Some(200)).await?;

    println!("Scan {} of {}\n", result.scan_id, result.url);
    println!(
        "  Score: {:.1} / {:.0} (grade {})",
        result.scoring.overall_score, result.scoring.max_possible_score, result.scoring.grade
    );
    if result.is_partial() {
        println!(
            "  ⚠ Partial scan: {} check(s) did not finish",
            result.timed_out_rules.len()
        );
    }
    println!();

    for category in &result.scoring.category_scores {
        println!(
            "  • {:<20} {:>5.1}  ({} issue(s), weight {})",
            category.category.display_name(),
            category.score,
            category.issue_count,
            category.weight
        );
    }

    println!("\nTop issues:");
    for issue in result.top_issues(5) {
        println!("  [{}] {} ({})", issue.severity, issue.title, issue.id);
        if !issue.remediation.is_empty() {
            println!("      Fix: {}", issue.remediation);
        }
    }

    for error in &result.rule_errors {
        println!("  ⚠ {error}");
    }

    println!(
        "\nChunks: {} ({:?}), avg {:.0} tokens, avg noise {:.2}",
        result.chunking.total_chunks,
        result.chunking.strategy,
        result.chunking.average_tokens_per_chunk,
        result.chunking.average_noise_ratio
    );

    println!("Extractability:");
    for region in &result.extractability.regions {
        println!(
            "  • {:<12} {:?}: {}",
            region.content_source, region.level, region.reason
        );
    }
    if result.extractability.has_client_only_content {
        println!("  ⚠ Some content is only rendered client-side");
    }

    Ok(())
}

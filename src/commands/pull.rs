use crate::constants::UNIVERSE_TARGET;
use crate::error::{Error, Result};
use crate::models::{IngestConfig, IngestSummary, Universe};
use crate::services::{IngestRunner, YahooClient};
use crate::utils::get_universe_path;
use chrono::NaiveDate;

pub fn run(start: Option<String>, batch_size: usize) {
    let start_override = match start {
        Some(ref s) => match NaiveDate::parse_from_str(s, "%Y-%m-%d") {
            Ok(date) => Some(date),
            Err(e) => {
                eprintln!("❌ Invalid --start date '{}': {}", s, e);
                eprintln!("   Expected format: YYYY-MM-DD");
                std::process::exit(1);
            }
        },
        None => None,
    };

    let universe_path = get_universe_path();
    let universe = match Universe::load_symbols(&universe_path, UNIVERSE_TARGET) {
        Ok(universe) => universe,
        Err(e) => {
            eprintln!("❌ {}", e);
            eprintln!("   Run `pricevault universe` first to generate the ticker list.");
            std::process::exit(1);
        }
    };

    println!(
        "📋 Loaded {} tickers from {}",
        universe.len(),
        universe_path.display()
    );

    let config = IngestConfig {
        start_override,
        batch_size,
        ..Default::default()
    };

    match run_ingest(config, universe) {
        Ok(summary) => print_summary(&summary),
        Err(e) => {
            eprintln!("\n❌ Ingestion failed: {}", e);
            std::process::exit(1);
        }
    }
}

fn run_ingest(config: IngestConfig, universe: Vec<String>) -> Result<IngestSummary> {
    let runtime = tokio::runtime::Runtime::new()
        .map_err(|e| Error::Config(format!("Failed to create runtime: {}", e)))?;

    runtime.block_on(async {
        let provider = YahooClient::new()?;
        let runner = IngestRunner::new(config, provider);
        runner.run(&universe).await
    })
}

fn print_summary(summary: &IngestSummary) {
    if let Some(start) = summary.start_date {
        println!("📅 Fetch window started: {}", start);
    }

    if summary.no_new_data() {
        println!("✅ No new data to add (archive is already current).");
    } else {
        println!(
            "✅ Merged {} equity and {} index records into {} partition(s).",
            summary.equity_records, summary.index_records, summary.partitions_rewritten
        );
    }

    if summary.batches_failed > 0 {
        println!(
            "⚠️  {} of {} batches skipped:",
            summary.batches_failed, summary.batches_total
        );
    }
    for warning in &summary.warnings {
        println!("   - {}", warning);
    }
}

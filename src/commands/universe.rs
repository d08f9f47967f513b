use crate::models::UniversePolicy;
use crate::services::{ConstituentCatalog, HttpTabularSource, UniverseBuilder};
use crate::utils::get_universe_path;
use std::path::PathBuf;

pub fn run(output: Option<PathBuf>) {
    let path = output.unwrap_or_else(get_universe_path);

    let source = match HttpTabularSource::new() {
        Ok(source) => source,
        Err(e) => {
            eprintln!("❌ Failed to create HTTP client: {}", e);
            std::process::exit(1);
        }
    };

    let catalog = ConstituentCatalog::new(source);
    let builder = UniverseBuilder::new(UniversePolicy::reference());
    let outcome = builder.build(&catalog);

    for warning in &outcome.warnings {
        eprintln!("⚠️  {}", warning);
    }

    if outcome.universe.is_empty() {
        eprintln!("❌ No constituent source produced any symbols; nothing written.");
        std::process::exit(1);
    }

    if let Err(e) = outcome.universe.write_to(&path) {
        eprintln!("❌ Failed to write universe file: {}", e);
        std::process::exit(1);
    }

    println!(
        "✅ Wrote {} with {} unique tickers.",
        path.display(),
        outcome.universe.len()
    );
}

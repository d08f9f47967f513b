use crate::models::ArchiveKind;
use crate::services::high_water;
use crate::utils::get_data_dir;
use chrono::Duration;
use std::path::Path;

pub fn run() {
    let data_dir = get_data_dir();
    println!("📂 Archive root: {}", data_dir.display());

    for kind in ArchiveKind::all() {
        let root = data_dir.join(kind.dir_name());
        let partitions = count_partitions(&root);
        let latest = high_water::scan(&[root]);

        match latest {
            Some(date) => println!(
                "📊 {}: {} partition(s), latest date {}",
                kind.dir_name(),
                partitions,
                date
            ),
            None => println!("📊 {}: empty", kind.dir_name()),
        }
    }

    let roots = [
        data_dir.join(ArchiveKind::Prices.dir_name()),
        data_dir.join(ArchiveKind::Indices.dir_name()),
    ];
    match high_water::scan(&roots) {
        Some(mark) => println!(
            "📅 High-water mark: {} (next pull resumes from {})",
            mark,
            mark + Duration::days(1)
        ),
        None => println!("📅 Archive is empty; next pull fetches the full lookback."),
    }
}

fn count_partitions(dir: &Path) -> usize {
    let Ok(entries) = std::fs::read_dir(dir) else {
        return 0;
    };

    entries
        .flatten()
        .map(|entry| {
            let path = entry.path();
            if path.is_dir() {
                count_partitions(&path)
            } else if path.extension().is_some_and(|ext| ext == "csv") {
                1
            } else {
                0
            }
        })
        .sum()
}

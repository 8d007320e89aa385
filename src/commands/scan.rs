//! Scan command implementation

use anyhow::Result;

use super::{plural, scan_projects, truncate_path};
use crate::cli::ScanArgs;
use crate::config::Config;
use crate::project::DispositionStore;

/// Run the scan command
pub fn run(args: ScanArgs, config: &Config) -> Result<()> {
    tracing::info!(path = %args.path.display(), "Scanning for projects");

    let mut store = DispositionStore::new();
    let stats = scan_projects(&args.path, config, &mut store, args.json)?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(store.records())?);
        return Ok(());
    }

    if store.is_empty() {
        println!("No Unity projects found in {}.", args.path.display());
        return Ok(());
    }

    print_projects_table(&store);

    println!(
        "\nTotal: {} project{} ({} director{} visited, {} unreadable)",
        store.len(),
        plural(store.len()),
        stats.visited,
        if stats.visited == 1 { "y" } else { "ies" },
        stats.unreadable
    );

    Ok(())
}

fn print_projects_table(store: &DispositionStore) {
    println!("\n  {:<30} {:<60}", "NAME", "PATH");
    println!("  {}", "─".repeat(91));

    for record in store.iter() {
        println!(
            "  {:<30} {:<60}",
            record.name(),
            truncate_path(record.path(), 60)
        );
    }
}

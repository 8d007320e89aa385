//! Sweep command implementation.

use std::io::{self, BufRead, Write};
use std::thread;

use anyhow::{bail, Result};
use humansize::{format_size, BINARY};
use indicatif::{ProgressBar, ProgressStyle};

use super::{plural, scan_projects, truncate_path};
use crate::batch::{BatchExecutor, BatchStatus, BatchSummary, JobOutcome};
use crate::cli::SweepArgs;
use crate::config::Config;
use crate::project::{Disposition, DispositionStore};

/// Run the sweep command.
pub fn run(args: SweepArgs, mut config: Config) -> Result<()> {
    if let Some(dest) = &args.dest {
        config.archive.destination = dest.display().to_string();
    }
    if let Some(jobs) = args.jobs {
        config.batch.max_in_flight = jobs.max(1);
    }

    // Scan for projects
    println!("Scanning for Unity projects in {}...", args.path.display());
    let mut store = DispositionStore::new();
    scan_projects(&args.path, &config, &mut store, false)?;

    if store.is_empty() {
        println!("No Unity projects found.");
        return Ok(());
    }

    let stdin = io::stdin();
    let mut input = stdin.lock();

    // Assign dispositions
    if args.has_selection() {
        let unmatched = apply_selection(&args, &mut store)?;
        for name in unmatched {
            eprintln!("Warning: no project named '{}' was found", name);
        }
    } else {
        prompt_dispositions(&mut store, &mut input, &mut io::stdout())?;
    }

    let counts = store.counts();
    if counts.actionable() == 0 {
        println!("Nothing to do.");
        return Ok(());
    }

    print_plan(&store);
    println!(
        "\n{} to archive, {} to delete, {} left alone",
        counts.archive, counts.delete, counts.none
    );

    if args.dry_run {
        println!("\n[DRY RUN] No changes made.");
        return Ok(());
    }

    // Confirmation
    if !args.force {
        print!("\nProceed? [y/N] ");
        io::stdout().flush()?;

        let mut answer = String::new();
        input.read_line(&mut answer)?;

        if !answer.trim().eq_ignore_ascii_case("y") {
            println!("Aborted.");
            return Ok(());
        }
    }

    let outcomes = run_batch(&store, &config)?;
    let summary = BatchSummary::from_outcomes(&outcomes);

    // Print results
    println!("\nResults:");
    println!(
        "  Archived: {} project{} ({} written)",
        summary.archived_count,
        plural(summary.archived_count),
        format_size(summary.archive_bytes, BINARY)
    );
    println!(
        "  Deleted:  {} project{}",
        summary.deleted_count,
        plural(summary.deleted_count)
    );
    if summary.failed_count > 0 {
        println!(
            "  Failed:   {} project{}",
            summary.failed_count,
            plural(summary.failed_count)
        );
    }

    for outcome in &outcomes {
        match outcome {
            JobOutcome::Archived { path, archive, .. } => {
                println!("  {} -> {}", path.display(), archive.display());
            }
            JobOutcome::Failed {
                path,
                disposition,
                error,
            } => {
                eprintln!("  Error: could not {} {}: {}", disposition, path.display(), error);
            }
            JobOutcome::Deleted { .. } => {}
        }
    }

    if summary.failed_count > 0 {
        std::process::exit(5); // Partial failure
    }

    Ok(())
}

/// Drive a batch to completion from this thread, drawing a job counter.
fn run_batch(store: &DispositionStore, config: &Config) -> Result<Vec<JobOutcome>> {
    let mut executor = BatchExecutor::from_config(config)?;
    let total = executor.start(store, || tracing::debug!("All jobs finished"))?;

    let bar = ProgressBar::new(total as u64);
    bar.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} jobs")
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("#>-"),
    );

    let tick = config.batch.poll_interval();
    loop {
        match executor.poll() {
            BatchStatus::Running { finished, .. } => {
                bar.set_position(finished as u64);
                thread::sleep(tick);
            }
            BatchStatus::Complete | BatchStatus::Idle => break,
        }
    }
    bar.finish_and_clear();

    Ok(executor.take_outcomes())
}

/// Apply `--archive`, `--delete` and the `--*-all` flags to the store.
///
/// The `--*-all` flags set every record first; named flags then override.
/// Returns requested names that matched no project.
fn apply_selection(args: &SweepArgs, store: &mut DispositionStore) -> Result<Vec<String>> {
    if let Some(name) = args.archive.iter().find(|n| args.delete.contains(*n)) {
        bail!("'{}' cannot be both archived and deleted", name);
    }

    let base = if args.archive_all {
        Disposition::Archive
    } else if args.delete_all {
        Disposition::Delete
    } else {
        Disposition::None
    };

    let mut unmatched: Vec<String> = args
        .archive
        .iter()
        .chain(args.delete.iter())
        .cloned()
        .collect();

    for index in 0..store.len() {
        let Some(name) = store.get(index).map(|r| r.name()) else {
            continue;
        };

        let disposition = if args.archive.contains(&name) {
            Disposition::Archive
        } else if args.delete.contains(&name) {
            Disposition::Delete
        } else {
            base
        };

        unmatched.retain(|n| n != &name);
        store.set_disposition_at(index, disposition);
    }

    Ok(unmatched)
}

/// Ask for each project's disposition. End of input leaves the rest as none.
fn prompt_dispositions<R: BufRead, W: Write>(
    store: &mut DispositionStore,
    input: &mut R,
    output: &mut W,
) -> io::Result<()> {
    writeln!(output)?;

    for index in 0..store.len() {
        let Some(path) = store.get(index).map(|r| r.path().display().to_string()) else {
            continue;
        };

        loop {
            write!(output, "{} [n]one/[a]rchive/[d]elete (default n): ", path)?;
            output.flush()?;

            let mut line = String::new();
            if input.read_line(&mut line)? == 0 {
                writeln!(output)?;
                return Ok(());
            }

            match parse_choice(line.trim()) {
                Some(disposition) => {
                    store.set_disposition_at(index, disposition);
                    break;
                }
                None => writeln!(output, "Please answer n, a or d.")?,
            }
        }
    }

    Ok(())
}

fn parse_choice(answer: &str) -> Option<Disposition> {
    match answer.to_ascii_lowercase().as_str() {
        "" | "n" | "none" => Some(Disposition::None),
        "a" | "archive" => Some(Disposition::Archive),
        "d" | "delete" => Some(Disposition::Delete),
        _ => None,
    }
}

fn print_plan(store: &DispositionStore) {
    println!("\n  {:<10} {:<60}", "ACTION", "PATH");
    println!("  {}", "─".repeat(71));

    for record in store.iter().filter(|r| r.disposition().is_actionable()) {
        println!(
            "  {:<10} {:<60}",
            record.disposition(),
            truncate_path(record.path(), 60)
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::project::ProjectRecord;
    use std::path::PathBuf;

    fn sweep_args() -> SweepArgs {
        SweepArgs {
            path: PathBuf::from("."),
            archive: Vec::new(),
            delete: Vec::new(),
            archive_all: false,
            delete_all: false,
            dest: None,
            jobs: None,
            dry_run: false,
            force: false,
        }
    }

    fn store_of(paths: &[&str]) -> DispositionStore {
        let mut store = DispositionStore::new();
        for p in paths {
            store.push(ProjectRecord::new(PathBuf::from(p)));
        }
        store
    }

    fn dispositions(store: &DispositionStore) -> Vec<Disposition> {
        store.iter().map(|r| r.disposition()).collect()
    }

    #[test]
    fn test_apply_named_selection() {
        let mut store = store_of(&["/p/Alpha", "/p/Beta", "/p/Gamma"]);
        let args = SweepArgs {
            archive: vec!["Alpha".into()],
            delete: vec!["Gamma".into(), "Missing".into()],
            ..sweep_args()
        };

        let unmatched = apply_selection(&args, &mut store).unwrap();

        assert_eq!(
            dispositions(&store),
            vec![Disposition::Archive, Disposition::None, Disposition::Delete]
        );
        assert_eq!(unmatched, vec!["Missing".to_string()]);
    }

    #[test]
    fn test_apply_all_with_override() {
        let mut store = store_of(&["/p/Alpha", "/p/Beta"]);
        let args = SweepArgs {
            archive_all: true,
            delete: vec!["Beta".into()],
            ..sweep_args()
        };

        apply_selection(&args, &mut store).unwrap();

        assert_eq!(
            dispositions(&store),
            vec![Disposition::Archive, Disposition::Delete]
        );
    }

    #[test]
    fn test_apply_rejects_conflicting_names() {
        let mut store = store_of(&["/p/Alpha"]);
        let args = SweepArgs {
            archive: vec!["Alpha".into()],
            delete: vec!["Alpha".into()],
            ..sweep_args()
        };

        assert!(apply_selection(&args, &mut store).is_err());
        assert_eq!(dispositions(&store), vec![Disposition::None]);
    }

    #[test]
    fn test_prompt_dispositions() {
        let mut store = store_of(&["/p/Alpha", "/p/Beta", "/p/Gamma"]);
        let mut input = "a\nbogus\nd\n\n".as_bytes();
        let mut output = Vec::new();

        prompt_dispositions(&mut store, &mut input, &mut output).unwrap();

        assert_eq!(
            dispositions(&store),
            vec![Disposition::Archive, Disposition::Delete, Disposition::None]
        );
        let shown = String::from_utf8(output).unwrap();
        assert!(shown.contains("Please answer n, a or d."));
    }

    #[test]
    fn test_prompt_stops_at_end_of_input() {
        let mut store = store_of(&["/p/Alpha", "/p/Beta"]);
        let mut input = "d\n".as_bytes();
        let mut output = Vec::new();

        prompt_dispositions(&mut store, &mut input, &mut output).unwrap();

        assert_eq!(
            dispositions(&store),
            vec![Disposition::Delete, Disposition::None]
        );
    }

    #[test]
    fn test_parse_choice() {
        assert_eq!(parse_choice("A"), Some(Disposition::Archive));
        assert_eq!(parse_choice("delete"), Some(Disposition::Delete));
        assert_eq!(parse_choice(""), Some(Disposition::None));
        assert_eq!(parse_choice("x"), None);
    }
}

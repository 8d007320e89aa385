use clap::{Args, Parser, Subcommand};
use clap_complete::Shell;
use std::path::PathBuf;

/// Unity Sweeper - Find Unity projects and archive or delete them in bulk
#[derive(Parser, Debug)]
#[command(name = "unity-sweeper")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Path to configuration file
    #[arg(short, long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Suppress non-essential output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Find Unity projects under a directory
    Scan(ScanArgs),

    /// Find Unity projects, then archive or delete the chosen ones
    Sweep(SweepArgs),

    /// Launch interactive TUI
    Tui(TuiArgs),

    /// Generate shell completions
    Completions(CompletionsArgs),
}

#[derive(Args, Debug)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    #[arg(value_enum)]
    pub shell: Shell,
}

#[derive(Args, Debug)]
pub struct ScanArgs {
    /// Root directory to search
    #[arg(default_value = ".")]
    pub path: PathBuf,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

#[derive(Args, Debug)]
pub struct SweepArgs {
    /// Root directory to search
    #[arg(default_value = ".")]
    pub path: PathBuf,

    /// Archive the project with this folder name (repeatable)
    #[arg(short, long, value_name = "NAME")]
    pub archive: Vec<String>,

    /// Delete the project with this folder name (repeatable)
    #[arg(short = 'D', long, value_name = "NAME")]
    pub delete: Vec<String>,

    /// Archive every project found
    #[arg(long, conflicts_with = "delete_all")]
    pub archive_all: bool,

    /// Delete every project found
    #[arg(long)]
    pub delete_all: bool,

    /// Folder to move archives into
    #[arg(short, long, value_name = "PATH")]
    pub dest: Option<PathBuf>,

    /// Maximum jobs running at once
    #[arg(short, long, value_name = "N")]
    pub jobs: Option<usize>,

    /// Show what would be done without doing it
    #[arg(short = 'n', long)]
    pub dry_run: bool,

    /// Skip confirmation prompts
    #[arg(short, long)]
    pub force: bool,
}

impl SweepArgs {
    /// Whether dispositions come from flags rather than prompts.
    pub fn has_selection(&self) -> bool {
        self.archive_all || self.delete_all || !self.archive.is_empty() || !self.delete.is_empty()
    }
}

#[derive(Args, Debug)]
pub struct TuiArgs {
    /// Root directory to search
    #[arg(default_value = ".")]
    pub path: PathBuf,

    /// Folder to move archives into
    #[arg(short, long, value_name = "PATH")]
    pub dest: Option<PathBuf>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn verify_cli_structure() {
        // Validates the CLI definition is correct
        Cli::command().debug_assert();
    }

    #[test]
    fn parse_scan_command() {
        let cli = Cli::parse_from(["unity-sweeper", "scan", "/home"]);
        match cli.command {
            Command::Scan(args) => {
                assert_eq!(args.path, PathBuf::from("/home"));
                assert!(!args.json);
            }
            _ => panic!("Expected Scan command"),
        }
    }

    #[test]
    fn parse_sweep_with_options() {
        let cli = Cli::parse_from([
            "unity-sweeper",
            "sweep",
            "--archive",
            "Alpha",
            "--archive",
            "Beta",
            "--delete",
            "Old",
            "--dest",
            "/backups",
            "--jobs",
            "3",
            "--force",
            "/projects",
        ]);
        match cli.command {
            Command::Sweep(args) => {
                assert_eq!(args.path, PathBuf::from("/projects"));
                assert_eq!(args.archive, vec!["Alpha".to_string(), "Beta".to_string()]);
                assert_eq!(args.delete, vec!["Old".to_string()]);
                assert_eq!(args.dest, Some(PathBuf::from("/backups")));
                assert_eq!(args.jobs, Some(3));
                assert!(args.force);
                assert!(args.has_selection());
            }
            _ => panic!("Expected Sweep command"),
        }
    }

    #[test]
    fn archive_all_conflicts_with_delete_all() {
        let result = Cli::try_parse_from([
            "unity-sweeper",
            "sweep",
            "--archive-all",
            "--delete-all",
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn sweep_without_flags_has_no_selection() {
        let cli = Cli::parse_from(["unity-sweeper", "sweep"]);
        match cli.command {
            Command::Sweep(args) => assert!(!args.has_selection()),
            _ => panic!("Expected Sweep command"),
        }
    }

    #[test]
    fn global_verbose_flag() {
        let cli = Cli::parse_from(["unity-sweeper", "-vvv", "scan"]);
        assert_eq!(cli.verbose, 3);
    }
}

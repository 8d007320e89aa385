//! Interactive front end: scan, pick dispositions, run the batch.

pub mod app;
pub mod event;
pub mod ui;

pub use app::App;

use std::io::{self, Stdout};
use std::time::Duration;

use crossterm::execute;
use crossterm::terminal::{
    disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen,
};
use ratatui::backend::{Backend, CrosstermBackend};
use ratatui::Terminal;

use crate::cli::TuiArgs;
use crate::config::Config;

/// Run the TUI until the user quits.
///
/// The frame loop is the host scheduler: every frame gives the scanner or
/// the batch executor one non-blocking step.
pub fn run(args: TuiArgs, mut config: Config) -> anyhow::Result<()> {
    if let Some(dest) = &args.dest {
        config.archive.destination = dest.display().to_string();
    }

    // Resolve to absolute path
    let root = args.path.canonicalize().unwrap_or(args.path);

    let mut app = App::new(root, &config)?;
    app.start_scan()?;

    let mut terminal = init_terminal()?;
    let result = run_loop(&mut terminal, &mut app, config.tui.tick_rate());
    restore_terminal(&mut terminal)?;

    result?;
    Ok(())
}

fn run_loop<B: Backend>(
    terminal: &mut Terminal<B>,
    app: &mut App,
    tick_rate: Duration,
) -> io::Result<()> {
    while !app.should_quit {
        terminal.draw(|frame| ui::render(app, frame))?;
        event::handle_events(app, tick_rate)?;
        app.tick();
    }
    Ok(())
}

fn init_terminal() -> io::Result<Terminal<CrosstermBackend<Stdout>>> {
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    Terminal::new(CrosstermBackend::new(stdout))
}

fn restore_terminal(terminal: &mut Terminal<CrosstermBackend<Stdout>>) -> io::Result<()> {
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()
}

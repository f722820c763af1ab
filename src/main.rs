//! BuildShift - Admin Dashboard
//!
//! A terminal-based dashboard for the BuildShift backend: machines, task
//! boards, leaderboards, and recipe calculators.
//!
//! ## Usage
//!
//! ```bash
//! # Start the TUI dashboard
//! buildshift
//!
//! # With verbose logging
//! buildshift -v
//!
//! # Against a different backend
//! buildshift --base-url https://admin.buildshift.example
//!
//! # With a specific config file
//! buildshift --config /path/to/config.yaml
//! ```

use std::io::Write;
use std::panic;
use std::process::ExitCode;

use buildshift_core::config::Config;
use buildshift_core::logging::{LogGuard, init_logging};
use buildshift_tui::App;
use clap::Parser;
use tracing::{error, info};

/// BuildShift Admin Dashboard
///
/// A terminal-based interface for managing counter machines, browsing the
/// Notion task board and leaderboard, and running recipe calculations.
#[derive(Parser, Debug)]
#[command(name = "buildshift")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Enable verbose logging (increases log level)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Directory for log files (defaults to ~/.buildshift/logs/)
    #[arg(long)]
    log_dir: Option<std::path::PathBuf>,

    /// Config file path (defaults to ~/.buildshift/config.yaml)
    #[arg(short, long)]
    config: Option<std::path::PathBuf>,

    /// Override the backend base URL from the config
    #[arg(long)]
    base_url: Option<String>,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let _guard = match setup_logging(&cli) {
        Ok(guard) => guard,
        Err(e) => {
            eprintln!("Failed to initialize logging: {}", e);
            return ExitCode::from(1);
        }
    };

    // Install panic hook to ensure terminal cleanup
    install_panic_hook();

    info!("Starting BuildShift dashboard");

    match run_app(&cli) {
        Ok(()) => {
            info!("BuildShift dashboard exited normally");
            ExitCode::SUCCESS
        }
        Err(e) => {
            error!("BuildShift dashboard error: {}", e);
            eprintln!("Error: {}", e);
            ExitCode::from(1)
        }
    }
}

/// Install a panic hook that restores the terminal before printing the panic message.
///
/// This ensures that even if the application panics while in raw mode with the
/// alternate screen enabled, the terminal will be properly restored so the user
/// can see the panic message and continue using their terminal.
fn install_panic_hook() {
    let original_hook = panic::take_hook();

    panic::set_hook(Box::new(move |panic_info| {
        // Attempt to restore terminal state
        let _ = restore_terminal();

        // Call the original panic hook to print the panic message
        original_hook(panic_info);
    }));
}

/// Restore terminal to its normal state.
///
/// This function is called both on normal exit and during panic handling.
fn restore_terminal() -> std::io::Result<()> {
    let mut stdout = std::io::stdout();

    // Disable raw mode first
    let _ = crossterm::terminal::disable_raw_mode();

    // Leave alternate screen
    crossterm::execute!(stdout, crossterm::terminal::LeaveAlternateScreen)?;

    // Show cursor
    crossterm::execute!(stdout, crossterm::cursor::Show)?;

    // Flush to ensure all escape sequences are written
    stdout.flush()?;

    Ok(())
}

/// Set up logging based on CLI arguments.
fn setup_logging(cli: &Cli) -> buildshift_core::Result<LogGuard> {
    let debug = cli.verbose > 0;
    init_logging(cli.log_dir.clone(), debug)
}

/// Load the config and run the TUI application.
fn run_app(cli: &Cli) -> buildshift_tui::AppResult<()> {
    let mut config = match &cli.config {
        Some(path) => Config::load_from(path)?,
        None => Config::load()?,
    };
    if let Some(base_url) = &cli.base_url {
        config = config.with_base_url(base_url);
    }

    let mut app = App::new(config)?;
    app.run()
}

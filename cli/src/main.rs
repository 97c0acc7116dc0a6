//! Digitpad CLI - Binary entry point and terminal session management.
//!
//! # Architecture
//!
//! The CLI bridges [`digitpad_engine`] (application state) and [`digitpad_tui`]
//! (rendering), providing RAII-based terminal management with guaranteed
//! cleanup.
//!
//! ```text
//! main() -> Settings::from_env() -> TerminalSession::new() -> run_app() -> App + TUI
//! ```
//!
//! # Event Loop
//!
//! Fixed 8ms (~120 FPS) render cadence:
//!
//! 1. Wait for frame tick
//! 2. Drain input queue (non-blocking via [`digitpad_tui::InputPump`])
//! 3. Advance timers (`app.tick()`): trailing export, loader, toast expiry
//! 4. Apply finished prediction requests
//! 5. Render frame

use anyhow::{Context, Result};
use crossterm::{
    event::{DisableFocusChange, DisableMouseCapture, EnableFocusChange, EnableMouseCapture},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use ratatui::prelude::*;
use std::{
    fs::{self, OpenOptions},
    io::{Stdout, stdout},
    path::PathBuf,
    sync::Mutex,
    time::{Duration, Instant},
};
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

use digitpad_config::DigitpadConfig;
use digitpad_engine::{App, Settings, ToastLevel};
use digitpad_tui::{InputPump, draw, handle_events};

fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new("info"))
        .unwrap_or_else(|_| EnvFilter::new("warn"));

    let (log_file, init_warnings) = open_log_file();

    if let Some((log_path, file)) = log_file {
        tracing_subscriber::registry()
            .with(fmt::layer().with_ansi(false).with_writer(Mutex::new(file)))
            .with(env_filter)
            .init();

        tracing::info!(path = %log_path.display(), "Logging initialized");
        for warning in init_warnings {
            tracing::warn!("{warning}");
        }
        return;
    }

    // No log file: stay silent rather than corrupt the TUI.
    tracing_subscriber::registry().with(env_filter).init();
}

fn open_log_file() -> (Option<(PathBuf, std::fs::File)>, Vec<String>) {
    let mut warnings = Vec::new();

    for candidate in log_file_candidates() {
        if let Some(parent) = candidate.parent()
            && let Err(e) = fs::create_dir_all(parent)
        {
            warnings.push(format!(
                "Failed to create log dir {}: {e}",
                parent.display()
            ));
            continue;
        }

        match OpenOptions::new()
            .create(true)
            .append(true)
            .open(&candidate)
        {
            Ok(file) => return (Some((candidate, file)), warnings),
            Err(e) => {
                warnings.push(format!(
                    "Failed to open log file {}: {e}",
                    candidate.display()
                ));
            }
        }
    }

    (None, warnings)
}

fn log_file_candidates() -> Vec<PathBuf> {
    let mut candidates = Vec::new();

    // Primary: ~/.digitpad/logs/digitpad.log
    if let Some(config_path) = DigitpadConfig::path()
        && let Some(config_dir) = config_path.parent()
    {
        candidates.push(config_dir.join("logs").join("digitpad.log"));
    }

    // Fallback: ./.digitpad/logs/digitpad.log
    candidates.push(PathBuf::from(".digitpad").join("logs").join("digitpad.log"));

    candidates
}

/// Resolve settings, plus a notice to show when the config file was skipped.
fn load_settings() -> Result<(Settings, Option<String>)> {
    let (config, notice) = match DigitpadConfig::load() {
        Ok(config) => (config, None),
        Err(err) => {
            tracing::warn!("Ignoring config file: {err}");
            (None, Some(format!("Ignoring config file: {err}")))
        }
    };
    let settings = Settings::from_env(config.as_ref()).context("invalid classifier configuration")?;
    Ok((settings, notice))
}

/// RAII wrapper for terminal state with guaranteed cleanup on drop.
///
/// Enables raw mode, the alternate screen, mouse capture (needed for
/// drawing) and focus reporting (a lost focus ends the stroke). On drop
/// everything is restored, including after panics and early returns.
struct TerminalSession {
    terminal: Terminal<CrosstermBackend<Stdout>>,
}

impl TerminalSession {
    fn new() -> Result<Self> {
        enable_raw_mode()?;

        let mut out = stdout();
        if let Err(err) = execute!(
            out,
            EnterAlternateScreen,
            EnableMouseCapture,
            EnableFocusChange
        ) {
            let _ = disable_raw_mode();
            let _ = execute!(
                out,
                DisableFocusChange,
                DisableMouseCapture,
                LeaveAlternateScreen
            );
            return Err(err.into());
        }

        let terminal = match Terminal::new(CrosstermBackend::new(out)) {
            Ok(t) => t,
            Err(err) => {
                let _ = disable_raw_mode();
                let _ = execute!(
                    stdout(),
                    DisableFocusChange,
                    DisableMouseCapture,
                    LeaveAlternateScreen
                );
                return Err(err.into());
            }
        };

        Ok(Self { terminal })
    }
}

impl Drop for TerminalSession {
    fn drop(&mut self) {
        let _ = disable_raw_mode();
        let _ = execute!(
            self.terminal.backend_mut(),
            DisableFocusChange,
            DisableMouseCapture,
            LeaveAlternateScreen
        );
        let _ = self.terminal.show_cursor();
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing();

    let (settings, notice) = match load_settings() {
        Ok(loaded) => loaded,
        Err(err) => {
            tracing::error!("{err:#}");
            eprintln!("Error: {err:#}");
            std::process::exit(2);
        }
    };
    let mut app = App::new(&settings)?;
    if let Some(notice) = notice {
        app.notify(ToastLevel::Info, notice, Instant::now());
    }

    let result = {
        let mut session = TerminalSession::new()?;
        run_app(&mut session.terminal, &mut app).await
    };

    if let Err(err) = result {
        tracing::error!("{err:#}");
        eprintln!("Error: {err:?}");
    }

    Ok(())
}

const FRAME_DURATION: Duration = Duration::from_millis(8);

async fn run_app<B>(terminal: &mut Terminal<B>, app: &mut App) -> Result<()>
where
    B: Backend,
    B::Error: Send + Sync + 'static,
{
    let mut input = InputPump::new();
    let mut frames = tokio::time::interval(FRAME_DURATION);
    frames.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);

    let result: Result<()> = loop {
        frames.tick().await;

        // Non-blocking input (drain queue only)
        let quit_now = match handle_events(app, &mut input) {
            Ok(q) => q,
            Err(e) => break Err(e),
        };
        if quit_now {
            break Ok(());
        }

        let now = Instant::now();
        app.tick(now);
        app.process_prediction_events(now);

        if let Err(e) = terminal.draw(|frame| draw(frame, app)) {
            break Err(e.into());
        }
    };

    input.shutdown().await;
    result
}

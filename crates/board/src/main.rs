use std::{
    fs::OpenOptions,
    io,
    sync::{Arc, Mutex},
    time::Duration,
};

use anyhow::Context;
use board::{
    api::HttpTaskApi,
    app::{App, Command},
    config::ClientConfig,
    ui,
};
use crossterm::{
    event::{self, Event, KeyEventKind},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use ratatui::{
    Terminal,
    backend::{Backend, CrosstermBackend},
};
use tracing_subscriber::{EnvFilter, prelude::*};

const TICK_RATE: Duration = Duration::from_millis(250);

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    if let Err(e) = dotenv::dotenv() {
        if !e.not_found() {
            eprintln!("Failed to load .env file: {e}");
        }
    }

    init_logging()?;

    let config = ClientConfig::from_env();
    tracing::info!(api_url = %config.api_url, "Starting board");
    let mut app = App::new(Arc::new(HttpTaskApi::new(&config.api_url)));

    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let mut terminal = Terminal::new(CrosstermBackend::new(stdout))?;

    let result = run_app(&mut terminal, &mut app).await;

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    if let Err(err) = &result {
        tracing::error!(error = %err, "Board exited with error");
    }
    result
}

/// Logs go to a file so they never draw over the board.
fn init_logging() -> anyhow::Result<()> {
    let log_path = utils::assets::board_log_path().context("Failed to resolve data directory")?;
    let log_file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(&log_path)
        .with_context(|| format!("Failed to open {}", log_path.display()))?;

    let log_level = std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string());
    let filter_string = format!(
        "warn,board={level},db={level},utils={level}",
        level = log_level
    );
    let env_filter = EnvFilter::try_new(filter_string)
        .map_err(|e| anyhow::anyhow!("Failed to create tracing filter: {e}"))?;
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_ansi(false)
                .with_writer(Mutex::new(log_file))
                .with_filter(env_filter),
        )
        .init();
    Ok(())
}

async fn run_app<B: Backend>(terminal: &mut Terminal<B>, app: &mut App) -> anyhow::Result<()> {
    app.fetch_tasks().await;

    loop {
        terminal.draw(|f| ui::draw(f, app))?;

        if !event::poll(TICK_RATE)? {
            continue;
        }
        let Event::Key(key) = event::read()? else {
            continue;
        };
        if key.kind != KeyEventKind::Press {
            continue;
        }
        let Some(command) = app.handle_key(key) else {
            continue;
        };

        match command {
            Command::Quit => return Ok(()),
            // Show the optimistic move and the disabled form before awaiting the server.
            Command::Drop {
                task_id,
                destination,
            } => {
                if let Some(pending) = app.begin_drop(task_id, destination) {
                    terminal.draw(|f| ui::draw(f, app))?;
                    app.finish_drop(pending).await;
                }
            }
            Command::SubmitForm => {
                if let Some(request) = app.begin_submit() {
                    terminal.draw(|f| ui::draw(f, app))?;
                    app.finish_submit(request).await;
                }
            }
            other => app.run(other).await,
        }
    }
}

mod app;
mod config;
mod error;
mod events;
mod midi;
mod port;
mod registry;
mod table;
mod toggle;
mod ui;

use anyhow::Context;
use app::App;
use clap::Parser;
use config::{Cli, Config};
use crossterm::{
    event::{self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEventKind, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use midi::MidirBackend;
use ratatui::{backend::CrosstermBackend, Terminal};
use registry::RegistrySnapshot;
use std::io;
use std::sync::Arc;
use std::time::Duration;
use tracing::info;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

fn main() -> anyhow::Result<()> {
    let config = Config::from(Cli::parse());

    if config.list_ports {
        return list_ports_and_exit(&config);
    }

    let _guard = setup_tracing(&config);
    info!(client = %config.client_name, "starting");

    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let capability = Arc::new(MidirBackend::new(config.client_name.clone()));
    let mut app = App::new(capability, config.table_config());
    app.initialize();

    // Run the app
    let result = run_app(&mut terminal, &mut app);
    app.shutdown();

    // Restore terminal
    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    result.context("application error")
}

/// Logs go to a file, the terminal belongs to the UI
fn setup_tracing(config: &Config) -> WorkerGuard {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("midi_ports={}", config.log_level)));

    let log_dir = config
        .log_file
        .parent()
        .unwrap_or(std::path::Path::new("/tmp"));
    let log_filename = config
        .log_file
        .file_name()
        .unwrap_or(std::ffi::OsStr::new("mports.log"));

    let file_appender = tracing_appender::rolling::never(log_dir, log_filename);
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    tracing_subscriber::registry()
        .with(filter)
        .with(
            fmt::layer()
                .with_writer(non_blocking)
                .with_ansi(false)
                .with_target(true)
                .with_thread_names(true),
        )
        .init();

    guard
}

/// CLI mode: print all MIDI ports as JSON and exit
fn list_ports_and_exit(config: &Config) -> anyhow::Result<()> {
    let backend = MidirBackend::new(config.client_name.clone());
    let snapshot = RegistrySnapshot::capture(&backend)?;

    let json = serde_json::json!({
        "inputs": snapshot.inputs,
        "outputs": snapshot.outputs,
    });
    println!("{}", serde_json::to_string_pretty(&json)?);

    Ok(())
}

fn run_app<B: ratatui::backend::Backend>(
    terminal: &mut Terminal<B>,
    app: &mut App,
) -> io::Result<()> {
    loop {
        // Apply request outcomes and port changes
        app.process_events();

        // Draw UI
        terminal.draw(|f| ui::render(f, app))?;

        // Handle keyboard input with timeout
        if event::poll(Duration::from_millis(100))? {
            if let Event::Key(key) = event::read()? {
                if key.kind != KeyEventKind::Press {
                    continue;
                }
                match key.code {
                    KeyCode::Char('q') => {
                        app.quit();
                    }
                    KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                        app.quit();
                    }
                    KeyCode::Char('R') | KeyCode::Char('r') => {
                        app.handle_refresh();
                    }
                    KeyCode::Up | KeyCode::Char('k') => {
                        app.handle_key_up();
                    }
                    KeyCode::Down | KeyCode::Char('j') => {
                        app.handle_key_down();
                    }
                    KeyCode::Tab | KeyCode::Left | KeyCode::Right => {
                        app.handle_tab();
                    }
                    KeyCode::Enter | KeyCode::Char(' ') => {
                        app.handle_enter();
                    }
                    KeyCode::Esc => {
                        app.handle_escape();
                    }
                    KeyCode::Char('?') => {
                        app.toggle_help();
                    }
                    _ => {}
                }
            }
        }

        if app.should_quit {
            break;
        }
    }

    Ok(())
}

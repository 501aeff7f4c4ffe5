use crossterm::{
    event::{self, DisableFocusChange, DisableMouseCapture, EnableFocusChange, EnableMouseCapture},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use dsa_workspace::{
    spawn_backend_worker, telemetry, App, HttpBackend, PrefsStore, WorkspaceConfig,
};
use ratatui::{backend::CrosstermBackend, Terminal};
use std::io;
use std::time::Duration;
use tracing::{error, info, warn};

const TICK: Duration = Duration::from_millis(50);

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let log_path = telemetry::default_log_path();
    if let Err(e) = telemetry::init_tracing(&log_path) {
        eprintln!("Warning: could not open log file {}: {}", log_path.display(), e);
    }

    let config = WorkspaceConfig::load()?;
    info!(api = %config.api_base_url, model = ?config.model, "Starting dsa-workspace");

    let prefs = match PrefsStore::open_default() {
        Ok(prefs) => Some(prefs),
        Err(e) => {
            warn!(error = %e, "Preferences unavailable, theme and session id will not persist");
            None
        }
    };

    let (request_tx, request_rx) = crossbeam_channel::unbounded();
    let (response_tx, response_rx) = crossbeam_channel::unbounded();
    let backend = HttpBackend::new(&config)?;
    let worker = spawn_backend_worker(backend, response_tx, request_rx)?;

    let mut app = App::new(config, prefs, Some(request_tx), Some(response_rx));
    app.request_questions();

    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(
        stdout,
        EnterAlternateScreen,
        EnableMouseCapture,
        EnableFocusChange
    )?;
    let mut terminal = Terminal::new(CrosstermBackend::new(stdout))?;

    let result = run(&mut terminal, &mut app);

    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture,
        DisableFocusChange
    )?;
    terminal.show_cursor()?;

    // Dropping the app drops every request sender, which stops the worker.
    drop(app);
    if worker.join().is_err() {
        error!("Backend worker panicked");
    }

    result?;
    info!("Exited cleanly");
    Ok(())
}

fn run<B: ratatui::backend::Backend>(terminal: &mut Terminal<B>, app: &mut App) -> io::Result<()> {
    loop {
        app.poll_responses();
        terminal.draw(|f| app.draw(f))?;

        if event::poll(TICK)? {
            app.handle_event(event::read()?);
        }
        if app.should_quit {
            return Ok(());
        }
    }
}

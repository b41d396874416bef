/// Liquidation Dashboard
///
/// Terminal dashboard for liquidations, large trades and funding rates
/// streamed from the dashboard feed. Filters are edited in the settings bar
/// and pushed upstream on apply.
///
/// Keys: 1-8 toggle symbols, l/t edit thresholds, a/Enter apply, r reset
/// draft, q/Esc quit.

use chrono::Local;
use crossterm::{
    event::{self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use liquidation_dashboard::{
    project_with_zone,
    settings::ThresholdField,
    widget::{render_dashboard, ScreenState},
    ConnectionStatus, DashboardConfig, DashboardError, Session, SettingsForm,
    SettingsReconciler, WebSocketClient,
};
use ratatui::{backend::CrosstermBackend, Terminal};
use rustls::crypto::ring::default_provider;
use std::{
    fs::File,
    io,
    sync::Mutex,
    time::{Duration, Instant},
};
use tracing::info;

/// How long the "Applied!" acknowledgement stays visible
const APPLIED_ACK: Duration = Duration::from_millis(1500);

/// Log to a file, the terminal belongs to the TUI
fn init_logging() -> io::Result<()> {
    let path = std::env::var("DASHBOARD_LOG_FILE")
        .unwrap_or_else(|_| "liquidation-dashboard.log".to_string());
    let file = File::create(path)?;

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .init();
    Ok(())
}

#[tokio::main]
async fn main() -> Result<(), DashboardError> {
    let _ = default_provider().install_default();
    init_logging()?;

    let config = DashboardConfig::from_env()?;
    info!(url = %config.websocket.url, "Starting liquidation dashboard");

    let (reconciler, outbound_rx) = SettingsReconciler::channel();
    // Emits the initial settings onto the outbound channel
    let mut session = Session::with_capacity(config.buffer_capacity, reconciler);
    let mut form = SettingsForm::from_filter(session.filter());

    let client = WebSocketClient::with_config(config.websocket.clone());
    let (mut event_rx, mut status_rx) = client.start(outbound_rx);

    // Setup panic hook to restore terminal on crash
    let original_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |panic_info| {
        let _ = disable_raw_mode();
        let _ = execute!(io::stdout(), LeaveAlternateScreen, DisableMouseCapture);
        original_hook(panic_info);
    }));

    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let tick_rate = config.tick_rate;
    let mut status = ConnectionStatus::Reconnecting;
    let mut applied_at: Option<Instant> = None;

    loop {
        // Drain in arrival order before drawing
        while let Ok(message) = event_rx.try_recv() {
            session.ingest(&message);
        }
        while let Ok(next) = status_rx.try_recv() {
            status = next;
        }

        let view = project_with_zone(&session, &Local);
        let applied = applied_at.is_some_and(|at| at.elapsed() < APPLIED_ACK);
        terminal.draw(|f| {
            render_dashboard(
                f,
                &ScreenState {
                    view: &view,
                    form: &form,
                    status,
                    applied,
                },
            )
        })?;

        if !event::poll(tick_rate)? {
            continue;
        }
        let Event::Key(key) = event::read()? else {
            continue;
        };

        if form.editing().is_some() {
            match key.code {
                KeyCode::Char(c) if c.is_ascii_digit() => form.push_char(c),
                KeyCode::Backspace => form.pop_char(),
                KeyCode::Enter | KeyCode::Esc | KeyCode::Tab => form.finish_edit(),
                _ => {}
            }
            continue;
        }

        match key.code {
            KeyCode::Char('q') | KeyCode::Esc => break,
            KeyCode::Char(c @ '1'..='8') => {
                if let Some(index) = c.to_digit(10) {
                    form.toggle_index(index as usize);
                }
            }
            KeyCode::Char('l') => form.begin_edit(ThresholdField::Liquidation),
            KeyCode::Char('t') => form.begin_edit(ThresholdField::Trade),
            KeyCode::Char('a') | KeyCode::Enter => {
                session.apply_settings(form.to_filter_state());
                form = SettingsForm::from_filter(session.filter());
                applied_at = Some(Instant::now());
            }
            KeyCode::Char('r') => form = SettingsForm::from_filter(session.filter()),
            _ => {}
        }
    }

    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    info!(stats = ?session.stats(), "Dashboard exited");
    Ok(())
}

//! Botdash TUI - five-panel trading-bot dashboard with interactive charts.

use std::io::{self, stdout};
use std::path::PathBuf;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use crossterm::event::{self, DisableMouseCapture, EnableMouseCapture, Event};
use crossterm::execute;
use crossterm::terminal::{
    disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen,
};
use ratatui::backend::CrosstermBackend;
use ratatui::layout::Rect;
use ratatui::Terminal;

use botdash_core::config::{default_config_path, DashboardConfig};
use botdash_core::logging::{self, LogSink};
use botdash_core::poller::Poller;
use botdash_core::source::select_source;

use botdash_tui::app::{AppState, UiRequest};
use botdash_tui::{input, persistence, ui};

fn main() -> Result<()> {
    // Install a panic hook that restores the terminal before printing the panic.
    let default_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |info| {
        let _ = disable_raw_mode();
        let _ = execute!(io::stderr(), LeaveAlternateScreen, DisableMouseCapture);
        default_hook(info);
    }));

    // Config and logging. The terminal belongs to the UI, so logs go to a file.
    let config_path = default_config_path(dirs::config_dir());
    let config = DashboardConfig::load(&config_path)
        .with_context(|| format!("loading {}", config_path.display()))?;
    let log_file = config.log.file.clone().unwrap_or_else(|| {
        dirs::cache_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("botdash")
            .join("botdash-tui.log")
    });
    logging::init(&config.log.level, LogSink::File(log_file))?;
    tracing::info!(config = %config_path.display(), "botdash-tui starting");

    // Data source and poller
    let source = select_source(&config).context("selecting data source")?;
    let kind = source.kind();
    let interval = config.poll.interval();
    let mut poller = Poller::spawn(source, interval).context("starting poller")?;

    // Build app state and apply persisted preferences
    let prefs_path = persistence::prefs_path(dirs::config_dir());
    let mut app = AppState::new(kind, interval);
    persistence::apply(&mut app, persistence::load(&prefs_path));

    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;
    terminal.clear()?;

    // Run the main event loop
    let result = run_app(&mut terminal, &mut app, &poller);

    // Save preferences before exit
    if let Err(e) = persistence::save(&prefs_path, &persistence::extract(&app)) {
        tracing::warn!(error = %e, "failed to save preferences");
    }

    poller.shutdown();

    // Restore terminal
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen, DisableMouseCapture)?;
    terminal.show_cursor()?;

    tracing::info!("botdash-tui stopped");
    result
}

fn run_app(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: &mut AppState,
    poller: &Poller,
) -> Result<()> {
    loop {
        // 1. Render
        let size = terminal.size()?;
        app.screen = Rect::new(0, 0, size.width, size.height);
        terminal.draw(|f| ui::draw(f, app))?;

        // 2. Drain poller events (non-blocking)
        app.drain_poller(poller, Instant::now());

        // 3. Forward queued requests
        for request in app.take_requests() {
            match request {
                UiRequest::Refresh => poller.refresh(),
                UiRequest::SaveStrategy(cfg) => poller.update_strategy(cfg),
            }
        }

        // 4. Poll for input events (50ms timeout for ~20 FPS tick)
        if event::poll(Duration::from_millis(50))? {
            match event::read()? {
                Event::Key(key) => input::handle_key(app, key),
                Event::Mouse(mouse) => input::handle_mouse(app, mouse),
                _ => {}
            }
        }

        // 5. Check quit
        if !app.running {
            break;
        }
    }
    Ok(())
}

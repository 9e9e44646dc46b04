//! Terminal User Interface Module
//!
//! Interactive chat surface for Student Assist.
//! Built with Ratatui for terminal rendering.
//!
//! # Layout
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │  📚 Student Assist AI Study Partner        [gemini-2.5-flash]   │
//! ├─ Document Context ──────────────────────────────────────────────┤
//! │  ✓ 📄 lecture-notes.pdf  (approx. 12,345 characters)            │
//! ├─ Messages ──────────────────────────────────────────────────────┤
//! │  You: ...                                                       │
//! │  Assistant: ...                                                 │
//! ├─ Input ─────────────────────────────────────────────────────────┤
//! │  Ask your question here...                                      │
//! └─────────────────────────────────────────────────────────────────┘
//!  ◐ Thinking… │ [Enter] Send [Ctrl+O] Open file [Ctrl+N] New chat
//! ```

pub mod app;
pub mod event;
pub mod theme;
pub mod ui;
pub mod widgets;

pub use app::{Activity, App, AppEvent, View};
pub use event::{AppAction, EventHandler};

use crate::session::StudySession;
use crossterm::{
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::backend::CrosstermBackend;
use ratatui::Terminal;
use std::io::{self, Stdout};
use std::time::Duration;
use tracing::{error, info};

/// Type alias for our terminal backend
pub type Tui = Terminal<CrosstermBackend<Stdout>>;

/// Initialize the terminal for TUI mode
pub fn init_terminal() -> anyhow::Result<Tui> {
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let terminal = Terminal::new(backend)?;
    Ok(terminal)
}

/// Restore the terminal to its original state
pub fn restore_terminal(terminal: &mut Tui) -> anyhow::Result<()> {
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;
    Ok(())
}

/// Run the TUI application
pub async fn run(session: StudySession) -> anyhow::Result<()> {
    info!(session_id = %session.id(), "Starting TUI mode");

    let mut terminal = init_terminal()?;
    let mut app = App::new(session);
    let mut events = EventHandler::new(Duration::from_millis(120));

    let result = run_app(&mut terminal, &mut app, &mut events).await;

    if let Err(e) = restore_terminal(&mut terminal) {
        error!("Failed to restore terminal: {}", e);
    }

    result
}

/// Main application loop
async fn run_app(terminal: &mut Tui, app: &mut App, events: &mut EventHandler) -> anyhow::Result<()> {
    while !app.should_quit {
        terminal.draw(|frame| ui::render(frame, app))?;

        let action = events.next().await?;
        app.handle_action(action);

        // Finished uploads and replies; ticks keep this responsive
        app.poll_events();
    }

    info!("TUI exited normally");
    Ok(())
}

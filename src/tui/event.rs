//! Event Handling
//!
//! Maps key presses and timer ticks to application actions.

use crossterm::event::{Event, EventStream, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use futures::StreamExt;
use std::time::Duration;
use tokio::time::{Interval, MissedTickBehavior};

/// Actions that can be performed in the application
#[derive(Debug, Clone, PartialEq)]
pub enum AppAction {
    /// Quit the application
    Quit,
    /// Quit immediately, even while a request is running
    ForceQuit,
    /// Submit the question or the file path (Enter)
    Submit,
    /// Open the file path prompt
    OpenFile,
    /// Clear conversation and document context
    NewChat,
    /// Toggle help view
    ToggleHelp,
    /// Escape - close modals, cancel
    Escape,
    ScrollUp,
    ScrollDown,
    ScrollPageUp,
    ScrollPageDown,
    ScrollTop,
    ScrollBottom,
    /// Regular input key, forwarded to the focused text area
    Input(KeyEvent),
    /// Timer tick for the busy spinner
    Tick,
}

/// Merges terminal key presses with a spinner tick.
pub struct EventHandler {
    reader: EventStream,
    ticker: Interval,
}

impl EventHandler {
    pub fn new(tick_rate: Duration) -> Self {
        let mut ticker = tokio::time::interval(tick_rate);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
        Self {
            reader: EventStream::new(),
            ticker,
        }
    }

    /// Wait for the next key press or tick
    pub async fn next(&mut self) -> anyhow::Result<AppAction> {
        loop {
            tokio::select! {
                _ = self.ticker.tick() => return Ok(AppAction::Tick),
                event = self.reader.next() => match event {
                    // Windows reports releases too
                    Some(Ok(Event::Key(key))) if key.kind == KeyEventKind::Press => {
                        if let Some(action) = map_key_event(key) {
                            return Ok(action);
                        }
                    }
                    Some(Ok(_)) => {}
                    Some(Err(e)) => return Err(e.into()),
                    None => return Ok(AppAction::ForceQuit),
                },
            }
        }
    }
}

/// Map a key event to an app action
pub fn map_key_event(key: KeyEvent) -> Option<AppAction> {
    match (key.modifiers, key.code) {
        (KeyModifiers::CONTROL, KeyCode::Char('c')) => Some(AppAction::ForceQuit),
        (KeyModifiers::CONTROL, KeyCode::Char('q')) => Some(AppAction::Quit),
        (KeyModifiers::CONTROL, KeyCode::Char('o')) => Some(AppAction::OpenFile),
        (KeyModifiers::CONTROL, KeyCode::Char('n')) => Some(AppAction::NewChat),
        (KeyModifiers::CONTROL, KeyCode::Home) => Some(AppAction::ScrollTop),
        (KeyModifiers::CONTROL, KeyCode::End) => Some(AppAction::ScrollBottom),

        (KeyModifiers::NONE, code) | (KeyModifiers::SHIFT, code) => match code {
            KeyCode::Esc => Some(AppAction::Escape),
            KeyCode::Enter => Some(AppAction::Submit),
            KeyCode::F(1) => Some(AppAction::ToggleHelp),
            KeyCode::Up => Some(AppAction::ScrollUp),
            KeyCode::Down => Some(AppAction::ScrollDown),
            KeyCode::PageUp => Some(AppAction::ScrollPageUp),
            KeyCode::PageDown => Some(AppAction::ScrollPageDown),
            _ => Some(AppAction::Input(key)),
        },

        _ => Some(AppAction::Input(key)),
    }
}

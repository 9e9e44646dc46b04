//! Theme and Styling
//!
//! Colors and styles for the Student Assist TUI.

use crate::session::Role;
use crate::tui::app::NoticeLevel;
use ratatui::style::{Color, Modifier, Style};

/// Application theme
pub struct Theme;

impl Theme {
    /// Chalkboard green accent
    pub const ACCENT: Color = Color::Rgb(72, 187, 120);
    /// Highlighter yellow
    pub const HIGHLIGHT: Color = Color::Rgb(250, 204, 21);
    pub const ERROR: Color = Color::Rgb(248, 113, 113);

    pub const INK: Color = Color::Rgb(226, 232, 240);
    pub const PENCIL: Color = Color::Rgb(148, 163, 184);
    pub const FAINT: Color = Color::Rgb(71, 85, 105);

    pub const FRAME: Color = Color::Rgb(51, 65, 85);
    pub const FRAME_FOCUSED: Color = Color::Rgb(96, 165, 250);

    pub const STUDENT: Color = Color::Rgb(125, 211, 252);
    pub const TUTOR: Color = Color::Rgb(72, 187, 120);

    pub fn text() -> Style {
        Style::default().fg(Self::INK)
    }

    pub fn text_secondary() -> Style {
        Style::default().fg(Self::PENCIL)
    }

    pub fn text_dim() -> Style {
        Style::default().fg(Self::FAINT)
    }

    pub fn bold(color: Color) -> Style {
        Style::default().fg(color).add_modifier(Modifier::BOLD)
    }

    pub fn title() -> Style {
        Self::bold(Self::ACCENT)
    }

    pub fn heading() -> Style {
        Self::bold(Self::INK)
    }

    pub fn border(focused: bool) -> Style {
        Style::default().fg(if focused { Self::FRAME_FOCUSED } else { Self::FRAME })
    }

    /// Label style for a conversation role
    pub fn role(role: Role) -> Style {
        match role {
            Role::User => Self::bold(Self::STUDENT),
            Role::Assistant => Self::bold(Self::TUTOR),
        }
    }

    pub fn notice(level: NoticeLevel) -> Style {
        match level {
            NoticeLevel::Info => Style::default().fg(Self::PENCIL),
            NoticeLevel::Success => Style::default().fg(Self::ACCENT),
            NoticeLevel::Warning => Style::default().fg(Self::HIGHLIGHT),
            NoticeLevel::Error => Style::default().fg(Self::ERROR),
        }
    }

    /// Keyboard shortcut style
    pub fn key() -> Style {
        Self::bold(Self::ACCENT)
    }

    /// Busy indicator
    pub fn busy() -> Style {
        Self::bold(Self::HIGHLIGHT)
    }
}

/// Status icons
pub struct Icons;

impl Icons {
    pub const CURSOR: &'static str = "▌";
    pub const DOCUMENT: &'static str = "📄";
    pub const SPINNER: [&'static str; 4] = ["◐", "◓", "◑", "◒"];

    pub fn notice(level: NoticeLevel) -> &'static str {
        match level {
            NoticeLevel::Info => "•",
            NoticeLevel::Success => "✓",
            NoticeLevel::Warning => "!",
            NoticeLevel::Error => "✗",
        }
    }

    /// Spinner frame for the given tick count
    pub fn spinner(tick: usize) -> &'static str {
        Self::SPINNER[tick % Self::SPINNER.len()]
    }
}

//! UI Rendering
//!
//! Main UI layout and rendering logic for the TUI.

use crate::session::Role;
use crate::tui::app::{Activity, App, Notice, View};
use crate::tui::theme::{Icons, Theme};
use crate::tui::widgets;
use ratatui::{
    layout::{Alignment, Constraint, Flex, Layout, Rect},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph},
    Frame,
};

const INDENT: &str = "  ";

const SHORTCUTS: [(&str, &str); 5] = [
    ("Enter", "Send"),
    ("Ctrl+O", "Open file"),
    ("Ctrl+N", "New chat"),
    ("Ctrl+Q", "Quit"),
    ("F1", "Help"),
];

const HELP: [(&str, &str); 10] = [
    ("Enter", "Send question / Load file"),
    ("Ctrl+O", "Load a PDF, DOCX or image as context"),
    ("Ctrl+N", "Start a new chat"),
    ("Ctrl+Q", "Quit application"),
    ("Ctrl+C", "Force quit"),
    ("↑/↓", "Scroll messages"),
    ("PageUp/Down", "Scroll page"),
    ("Ctrl+Home/End", "Jump to top / bottom"),
    ("Esc", "Close dialog"),
    ("F1", "Show this help"),
];

/// Render the main UI
pub fn render(frame: &mut Frame, app: &mut App) {
    let [header, document, messages, input, status] = Layout::vertical([
        Constraint::Length(3),
        Constraint::Length(3),
        Constraint::Min(8),
        Constraint::Length(4),
        Constraint::Length(1),
    ])
    .areas(frame.area());

    render_header(frame, header, app);
    widgets::render_document(frame, document, app.document(), app.activity(), app.tick);
    render_messages(frame, messages, app);
    render_input(frame, input, app);
    render_status_bar(frame, status, app);

    match app.view {
        View::Help => render_help(frame),
        View::OpenFile => render_path_prompt(frame, app),
        View::Chat => {}
    }
}

fn render_header(frame: &mut Frame, area: Rect, app: &App) {
    let title = Line::from(vec![
        Span::raw("📚 "),
        Span::styled("Student Assist", Theme::title()),
        Span::styled(" AI Study Partner", Theme::text_secondary()),
        Span::styled(format!("  [{}]", app.model()), Theme::text_dim()),
    ]);

    let header = Paragraph::new(title).alignment(Alignment::Center).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Theme::border(false)),
    );
    frame.render_widget(header, area);
}

/// Render turns and notices in order, then the question in flight
fn render_messages(frame: &mut Frame, area: Rect, app: &mut App) {
    let block = Block::default()
        .title(" Messages ")
        .borders(Borders::ALL)
        .border_style(Theme::border(app.view == View::Chat));

    let inner = block.inner(area);
    frame.render_widget(block, area);

    let lines = message_lines(app, (inner.width as usize).saturating_sub(INDENT.len()));
    app.update_scroll_bounds(rendered_height(lines.len()), inner.height);

    let paragraph = Paragraph::new(lines).scroll((app.scroll_offset, 0));
    frame.render_widget(paragraph, inner);
}

/// Line count as a scroll height, saturating at `u16::MAX`
fn rendered_height(count: usize) -> u16 {
    u16::try_from(count).unwrap_or(u16::MAX)
}

fn message_lines(app: &App, width: usize) -> Vec<Line<'static>> {
    let mut lines = Vec::new();
    let mut notices = app.notices().iter().peekable();

    for (index, turn) in app.turns().iter().enumerate() {
        while let Some(notice) = notices.next_if(|n| n.anchor <= index) {
            push_notice(&mut lines, notice, width);
        }
        push_message(&mut lines, turn.role, &turn.content, width);
    }
    for notice in notices {
        push_notice(&mut lines, notice, width);
    }

    if let Some(query) = app.pending_query() {
        push_message(&mut lines, Role::User, query, width);
        lines.push(Line::from(vec![
            Span::styled(format!("{}: ", role_label(Role::Assistant)), Theme::role(Role::Assistant)),
            Span::styled(Icons::CURSOR, Theme::busy()),
        ]));
    }
    lines
}

fn role_label(role: Role) -> &'static str {
    match role {
        Role::User => "You",
        Role::Assistant => "Assistant",
    }
}

fn push_message(lines: &mut Vec<Line<'static>>, role: Role, content: &str, width: usize) {
    lines.push(Line::from(Span::styled(
        format!("{}:", role_label(role)),
        Theme::role(role),
    )));
    for wrapped in content.lines().flat_map(|raw| wrap_text(raw, width)) {
        lines.push(Line::from(vec![
            Span::raw(INDENT),
            Span::styled(wrapped, Theme::text()),
        ]));
    }
    lines.push(Line::default());
}

fn push_notice(lines: &mut Vec<Line<'static>>, notice: &Notice, width: usize) {
    let style = Theme::notice(notice.level);
    let mut lead = format!("{} ", Icons::notice(notice.level));
    for part in wrap_text(&notice.text, width.saturating_sub(2)) {
        lines.push(Line::from(vec![
            Span::styled(std::mem::replace(&mut lead, INDENT.to_string()), style),
            Span::styled(part, style),
        ]));
    }
    lines.push(Line::default());
}

/// Break `text` into lines of at most `width` characters, preferring
/// spaces and hard-splitting words that are longer than a line.
fn wrap_text(text: &str, width: usize) -> Vec<String> {
    if width == 0 || text.chars().count() <= width {
        return vec![text.to_string()];
    }

    let mut out = Vec::new();
    let mut current = String::new();
    let mut current_len = 0;

    for word in text.split(' ') {
        let mut chars: Vec<char> = word.chars().collect();

        if current_len > 0 && current_len + 1 + chars.len() > width {
            out.push(std::mem::take(&mut current));
            current_len = 0;
        }
        while chars.len() > width {
            if current_len > 0 {
                out.push(std::mem::take(&mut current));
                current_len = 0;
            }
            out.push(chars.drain(..width).collect());
        }
        if current_len > 0 {
            current.push(' ');
            current_len += 1;
        }
        current_len += chars.len();
        current.extend(chars);
    }
    out.push(current);
    out
}

fn render_input(frame: &mut Frame, area: Rect, app: &App) {
    let title = if app.is_busy() {
        " Input (waiting for the current request) "
    } else {
        " Input "
    };
    let block = Block::default()
        .title(title)
        .borders(Borders::ALL)
        .border_style(Theme::border(app.view == View::Chat));

    let inner = block.inner(area);
    frame.render_widget(block, area);
    frame.render_widget(&app.input, inner);
}

fn render_status_bar(frame: &mut Frame, area: Rect, app: &App) {
    let spinner = Icons::spinner(app.tick);
    let status = match app.activity() {
        Activity::Idle => Span::styled("Ready", Theme::text_secondary()),
        Activity::Extracting(filename) => {
            Span::styled(format!("{} Extracting {}…", spinner, filename), Theme::busy())
        }
        Activity::Thinking => Span::styled(format!("{} Thinking…", spinner), Theme::busy()),
    };

    let mut spans = vec![status, Span::styled(" │", Theme::text_dim())];
    for (key, desc) in SHORTCUTS {
        spans.push(Span::styled(format!(" [{}]", key), Theme::key()));
        spans.push(Span::styled(format!(" {}", desc), Theme::text_secondary()));
    }

    frame.render_widget(Paragraph::new(Line::from(spans)), area);
}

fn render_path_prompt(frame: &mut Frame, app: &App) {
    let area = popup_area(frame.area(), 70, 3);
    frame.render_widget(Clear, area);

    let block = Block::default()
        .title(" Open Document (Enter to load, Esc to cancel) ")
        .borders(Borders::ALL)
        .border_style(Theme::border(true));

    let inner = block.inner(area);
    frame.render_widget(block, area);
    frame.render_widget(&app.path_input, inner);
}

fn render_help(frame: &mut Frame) {
    let mut help_lines = vec![
        Line::from(Span::styled("Keyboard Shortcuts", Theme::heading())),
        Line::default(),
    ];
    help_lines.extend(HELP.iter().map(|(key, desc)| {
        Line::from(vec![
            Span::styled(format!("{:<15}", key), Theme::key()),
            Span::styled(*desc, Theme::text()),
        ])
    }));
    help_lines.extend([
        Line::default(),
        Line::from(Span::styled(
            "Questions are answered from the loaded document when possible.",
            Theme::text_secondary(),
        )),
        Line::default(),
        Line::from(Span::styled("Press any key to close", Theme::text_dim())),
    ]);

    let area = popup_area(frame.area(), 60, help_lines.len() as u16 + 2);
    frame.render_widget(Clear, area);
    let paragraph = Paragraph::new(help_lines).block(
        Block::default()
            .title(" Help ")
            .borders(Borders::ALL)
            .border_style(Theme::border(true)),
    );
    frame.render_widget(paragraph, area);
}

/// Centered popup `percent_x` wide and `height` rows tall
fn popup_area(area: Rect, percent_x: u16, height: u16) -> Rect {
    let [row] = Layout::vertical([Constraint::Length(height)])
        .flex(Flex::Center)
        .areas(area);
    let [popup] = Layout::horizontal([Constraint::Percentage(percent_x)])
        .flex(Flex::Center)
        .areas(row);
    popup
}

//! Document Widget
//!
//! Shows which document grounds the conversation, or the file being
//! extracted right now.

use crate::documents::SUPPORTED_EXTENSIONS;
use crate::tui::app::{Activity, LoadedDocument, NoticeLevel};
use crate::tui::theme::{Icons, Theme};
use crate::utils::format_count;
use ratatui::{
    layout::Rect,
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

pub fn render_document(
    frame: &mut Frame,
    area: Rect,
    document: Option<&LoadedDocument>,
    activity: &Activity,
    tick: usize,
) {
    let block = Block::default()
        .title(" Document Context ")
        .borders(Borders::ALL)
        .border_style(Theme::border(false));

    let inner = block.inner(area);
    frame.render_widget(block, area);

    let paragraph = Paragraph::new(document_line(document, activity, tick));
    frame.render_widget(paragraph, inner);
}

fn document_line(document: Option<&LoadedDocument>, activity: &Activity, tick: usize) -> Line<'static> {
    if let Activity::Extracting(filename) = activity {
        return Line::from(vec![
            Span::styled(format!("{} ", Icons::spinner(tick)), Theme::busy()),
            Span::styled(format!("Processing '{}'...", filename), Theme::text_secondary()),
        ]);
    }

    match document {
        Some(doc) => Line::from(vec![
            Span::styled(
                format!("{} ", Icons::notice(NoticeLevel::Success)),
                Theme::notice(NoticeLevel::Success),
            ),
            Span::raw(format!("{} ", Icons::DOCUMENT)),
            Span::styled(doc.filename.clone(), Theme::heading()),
            Span::styled(
                format!("  (approx. {} characters)", format_count(doc.char_count)),
                Theme::text_secondary(),
            ),
        ]),
        None => Line::from(Span::styled(
            format!(
                "No document loaded. Press Ctrl+O to add one ({}).",
                SUPPORTED_EXTENSIONS.join(", ")
            ),
            Theme::text_dim(),
        )),
    }
}

//! TUI Widgets
//!
//! Custom widgets for the Student Assist TUI.

mod document;

pub use document::render_document;

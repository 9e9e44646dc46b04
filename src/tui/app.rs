//! Application State
//!
//! Contains the main application state and logic for the TUI.
//!
//! The `StudySession` is moved into a background task for every upload or
//! question and handed back through an `AppEvent` when the task finishes.
//! While it is away the app is busy and further requests are refused, so a
//! session never serves two requests at once.

use crate::documents::UploadedFile;
use crate::session::{ChatTurn, LoadOutcome, Reply, StudySession};
use crate::tui::event::AppAction;
use crate::types::AppResult;
use crate::utils::format_count;
use chrono::{DateTime, Utc};
use std::path::{Path, PathBuf};
use tokio::sync::mpsc;
use tracing::{debug, info};
use tui_textarea::TextArea;

const INPUT_PLACEHOLDER: &str = "Ask your question here...";
const PATH_PLACEHOLDER: &str = "Path to a PDF, DOCX or image file";

/// What the background task is doing
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Activity {
    #[default]
    Idle,
    /// Extracting text from the named file
    Extracting(String),
    /// Waiting for the model's reply
    Thinking,
}

/// Current view/screen
#[derive(Debug, Clone, PartialEq, Default)]
pub enum View {
    #[default]
    Chat,
    Help,
    /// File path prompt
    OpenFile,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum NoticeLevel {
    Info,
    Success,
    Warning,
    Error,
}

/// A system line shown in the message panel. Notices are not part of the
/// conversation; `anchor` is the number of turns that preceded it.
#[derive(Debug, Clone)]
pub struct Notice {
    pub level: NoticeLevel,
    pub text: String,
    pub anchor: usize,
    pub timestamp: DateTime<Utc>,
}

/// Summary of the active document context
#[derive(Debug, Clone, PartialEq)]
pub struct LoadedDocument {
    pub filename: String,
    pub char_count: usize,
}

/// Completion events from background tasks
pub enum AppEvent {
    DocumentProcessed {
        session: StudySession,
        result: AppResult<LoadOutcome>,
    },
    ReplyReady {
        session: StudySession,
        reply: Option<Reply>,
    },
}

/// Main application state
pub struct App {
    // UI State
    pub view: View,
    pub should_quit: bool,
    pub input: TextArea<'static>,
    pub path_input: TextArea<'static>,
    pub scroll_offset: u16,
    pub max_scroll: u16,
    /// Keep the newest message in view
    pub follow_output: bool,
    pub tick: usize,

    // Session State
    session: Option<StudySession>,
    model: String,
    activity: Activity,
    turns: Vec<ChatTurn>,
    document: Option<LoadedDocument>,
    notices: Vec<Notice>,
    pending_query: Option<String>,

    // Async communication
    event_rx: mpsc::Receiver<AppEvent>,
    event_tx: mpsc::Sender<AppEvent>,
}

impl App {
    /// Create a new application instance
    pub fn new(session: StudySession) -> Self {
        let (tx, rx) = mpsc::channel(16);
        let model = session.model().to_string();

        let mut app = Self {
            view: View::Chat,
            should_quit: false,
            input: new_text_area(INPUT_PLACEHOLDER),
            path_input: new_text_area(PATH_PLACEHOLDER),
            scroll_offset: 0,
            max_scroll: 0,
            follow_output: true,
            tick: 0,
            session: Some(session),
            model,
            activity: Activity::Idle,
            turns: Vec::new(),
            document: None,
            notices: Vec::new(),
            pending_query: None,
            event_rx: rx,
            event_tx: tx,
        };

        app.sync_from_session();
        app.push_notice(
            NoticeLevel::Info,
            "Welcome to Student Assist! Ask a question below, or press Ctrl+O to load a \
             PDF, DOCX or image file as context.",
        );
        app
    }

    pub fn is_busy(&self) -> bool {
        self.session.is_none()
    }

    pub fn activity(&self) -> &Activity {
        &self.activity
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    pub fn turns(&self) -> &[ChatTurn] {
        &self.turns
    }

    pub fn notices(&self) -> &[Notice] {
        &self.notices
    }

    pub fn document(&self) -> Option<&LoadedDocument> {
        self.document.as_ref()
    }

    /// The question currently being answered
    pub fn pending_query(&self) -> Option<&str> {
        self.pending_query.as_deref()
    }

    /// Drain finished background tasks without blocking
    pub fn poll_events(&mut self) {
        while let Ok(event) = self.event_rx.try_recv() {
            self.handle_event(event);
        }
    }

    /// Wait for the running background task to finish
    pub async fn wait_for_event(&mut self) {
        if let Some(event) = self.event_rx.recv().await {
            self.handle_event(event);
        }
    }

    fn handle_event(&mut self, event: AppEvent) {
        match event {
            AppEvent::DocumentProcessed { session, result } => {
                self.restore_session(session);
                match result {
                    Ok(LoadOutcome::Loaded {
                        filename,
                        char_count,
                    }) => self.push_notice(
                        NoticeLevel::Success,
                        format!(
                            "Successfully loaded context from: {} (approx. {} characters).",
                            filename,
                            format_count(char_count)
                        ),
                    ),
                    Ok(LoadOutcome::AlreadyLoaded { filename }) => self.push_notice(
                        NoticeLevel::Info,
                        format!("Context from {} is already loaded.", filename),
                    ),
                    Err(e) => self.push_notice(
                        NoticeLevel::Error,
                        format!("Document processing failed: {}", e),
                    ),
                }
            }
            AppEvent::ReplyReady { session, reply } => {
                self.restore_session(session);
                if let Some(Reply { error: Some(kind), .. }) = reply {
                    debug!(error_kind = %kind, "Reply carried an error notice");
                }
            }
        }
    }

    fn restore_session(&mut self, session: StudySession) {
        self.session = Some(session);
        self.activity = Activity::Idle;
        self.pending_query = None;
        self.sync_from_session();
    }

    /// Refresh the displayed conversation and document from the session
    fn sync_from_session(&mut self) {
        if let Some(session) = &self.session {
            self.turns = session.conversation().all().to_vec();
            self.document = session.document().map(|doc| LoadedDocument {
                filename: doc.filename.clone(),
                char_count: doc.char_count(),
            });
        }
    }

    fn push_notice(&mut self, level: NoticeLevel, text: impl Into<String>) {
        self.notices.push(Notice {
            level,
            text: text.into(),
            anchor: self.turns.len(),
            timestamp: Utc::now(),
        });
        self.follow_output = true;
    }

    /// Handle a user action
    pub fn handle_action(&mut self, action: AppAction) {
        match action {
            AppAction::Quit | AppAction::ForceQuit => {
                self.should_quit = true;
            }
            AppAction::Submit => match self.view {
                View::Chat => self.submit_query(),
                View::OpenFile => self.submit_path(),
                View::Help => self.view = View::Chat,
            },
            AppAction::OpenFile => {
                if self.view == View::Help {
                    return;
                }
                if self.is_busy() {
                    self.push_notice(
                        NoticeLevel::Warning,
                        "Please wait for the current request to finish.",
                    );
                } else {
                    self.view = View::OpenFile;
                }
            }
            AppAction::NewChat => self.new_chat(),
            AppAction::ToggleHelp => {
                self.view = if self.view == View::Help {
                    View::Chat
                } else {
                    View::Help
                };
            }
            AppAction::Escape => {
                if self.view == View::OpenFile {
                    self.path_input = new_text_area(PATH_PLACEHOLDER);
                }
                self.view = View::Chat;
            }
            AppAction::ScrollUp => self.scroll_by(-1),
            AppAction::ScrollDown => self.scroll_by(1),
            AppAction::ScrollPageUp => self.scroll_by(-10),
            AppAction::ScrollPageDown => self.scroll_by(10),
            AppAction::ScrollTop => {
                self.scroll_offset = 0;
                self.follow_output = false;
            }
            AppAction::ScrollBottom => {
                self.scroll_offset = self.max_scroll;
                self.follow_output = true;
            }
            AppAction::Input(key_event) => match self.view {
                View::Chat => {
                    self.input.input(key_event);
                }
                View::OpenFile => {
                    self.path_input.input(key_event);
                }
                // Any key closes help
                View::Help => self.view = View::Chat,
            },
            AppAction::Tick => {
                self.tick = self.tick.wrapping_add(1);
            }
        }
    }

    /// Send the typed question to the session in the background
    fn submit_query(&mut self) {
        let query = self.input.lines().join("\n");
        if query.trim().is_empty() {
            return;
        }
        // Busy: keep the text so it can be sent once the reply arrives
        let Some(mut session) = self.session.take() else {
            return;
        };

        self.input = new_text_area(INPUT_PLACEHOLDER);
        self.pending_query = Some(query.trim().to_string());
        self.activity = Activity::Thinking;
        self.follow_output = true;

        let tx = self.event_tx.clone();
        tokio::spawn(async move {
            let reply = session.ask(&query).await;
            tx.send(AppEvent::ReplyReady { session, reply }).await.ok();
        });
    }

    /// Read and extract the file named in the path prompt in the background
    fn submit_path(&mut self) {
        let raw = self.path_input.lines().join("");
        let raw = raw.trim();
        if raw.is_empty() {
            return;
        }
        let Some(mut session) = self.session.take() else {
            return;
        };

        let path = expand_home(raw);
        let display_name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| raw.to_string());
        info!(path = %path.display(), "Loading document");

        self.path_input = new_text_area(PATH_PLACEHOLDER);
        self.view = View::Chat;
        self.activity = Activity::Extracting(display_name);

        let tx = self.event_tx.clone();
        tokio::spawn(async move {
            let result = match UploadedFile::from_path(&path).await {
                Ok(upload) => session.load_document(&upload).await,
                Err(e) => Err(e),
            };
            tx.send(AppEvent::DocumentProcessed { session, result })
                .await
                .ok();
        });
    }

    fn new_chat(&mut self) {
        let Some(session) = self.session.as_mut() else {
            self.push_notice(
                NoticeLevel::Warning,
                "Please wait for the current request to finish.",
            );
            return;
        };

        session.new_chat();
        self.notices.clear();
        self.sync_from_session();
        self.scroll_offset = 0;
        self.push_notice(
            NoticeLevel::Info,
            "Started a new chat. Conversation and document context cleared.",
        );
    }

    fn scroll_by(&mut self, delta: i32) {
        let offset = (self.scroll_offset as i32 + delta).clamp(0, self.max_scroll as i32);
        self.scroll_offset = offset as u16;
        self.follow_output = self.scroll_offset >= self.max_scroll;
    }

    /// Update max scroll based on content
    pub fn update_scroll_bounds(&mut self, content_height: u16, viewport_height: u16) {
        self.max_scroll = content_height.saturating_sub(viewport_height);
        if self.follow_output || self.scroll_offset > self.max_scroll {
            self.scroll_offset = self.max_scroll;
        }
    }
}

fn new_text_area(placeholder: &str) -> TextArea<'static> {
    let mut area = TextArea::default();
    area.set_cursor_line_style(ratatui::style::Style::default());
    area.set_placeholder_text(placeholder);
    area
}

fn expand_home(raw: &str) -> PathBuf {
    match raw.strip_prefix("~/") {
        Some(rest) => dirs::home_dir()
            .map(|home| home.join(rest))
            .unwrap_or_else(|| Path::new(raw).to_path_buf()),
        None => PathBuf::from(raw),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::documents::tests::CountingExtractor;
    use crate::documents::ExtractorRegistry;
    use crate::session::tests::FakeChat;
    use crate::session::Role;
    use crate::types::AppError;
    use std::sync::Arc;

    fn app_with(chat: Arc<FakeChat>, pdf: Arc<CountingExtractor>) -> App {
        let mut registry = ExtractorRegistry::new();
        registry.register(".pdf", pdf);
        App::new(StudySession::new(chat, Arc::new(registry)))
    }

    fn type_path(app: &mut App, path: &Path) {
        app.handle_action(AppAction::OpenFile);
        assert_eq!(app.view, View::OpenFile);
        app.path_input.insert_str(path.to_string_lossy());
        app.handle_action(AppAction::Submit);
    }

    #[test]
    fn test_expand_home() {
        assert_eq!(expand_home("notes.pdf"), PathBuf::from("notes.pdf"));
        if let Some(home) = dirs::home_dir() {
            assert_eq!(expand_home("~/notes.pdf"), home.join("notes.pdf"));
        }
    }

    #[tokio::test]
    async fn test_question_round_trip() {
        let chat = FakeChat::scripted(vec![Ok("Photosynthesis.".to_string())]);
        let mut app = app_with(chat.clone(), CountingExtractor::new("unused"));

        app.input.insert_str("What do plants do?");
        app.handle_action(AppAction::Submit);

        assert!(app.is_busy());
        assert_eq!(app.activity(), &Activity::Thinking);
        assert_eq!(app.pending_query(), Some("What do plants do?"));

        app.wait_for_event().await;

        assert!(!app.is_busy());
        assert_eq!(app.activity(), &Activity::Idle);
        assert_eq!(app.turns().len(), 2);
        assert_eq!(app.turns()[0].role, Role::User);
        assert_eq!(app.turns()[1].content, "Photosynthesis.");
        assert_eq!(chat.prompts(), ["What do plants do?"]);
    }

    #[tokio::test]
    async fn test_submit_while_busy_keeps_input() {
        let chat = FakeChat::scripted(vec![]);
        let mut app = app_with(chat.clone(), CountingExtractor::new("unused"));

        app.input.insert_str("first");
        app.handle_action(AppAction::Submit);
        app.input.insert_str("second");
        app.handle_action(AppAction::Submit);

        assert_eq!(app.input.lines().join(""), "second");
        app.wait_for_event().await;
        assert_eq!(chat.prompts(), ["first"]);
    }

    #[tokio::test]
    async fn test_blank_question_is_ignored() {
        let chat = FakeChat::scripted(vec![]);
        let mut app = app_with(chat.clone(), CountingExtractor::new("unused"));

        app.input.insert_str("   ");
        app.handle_action(AppAction::Submit);

        assert!(!app.is_busy());
        assert!(app.turns().is_empty());
    }

    #[tokio::test]
    async fn test_failed_reply_is_shown_as_assistant_turn() {
        let chat = FakeChat::scripted(vec![Err(AppError::ApiFailure("quota exceeded".to_string()))]);
        let mut app = app_with(chat, CountingExtractor::new("unused"));

        app.input.insert_str("hello");
        app.handle_action(AppAction::Submit);
        app.wait_for_event().await;

        assert_eq!(app.turns()[1].role, Role::Assistant);
        assert_eq!(
            app.turns()[1].content,
            "An error occurred while calling the Gemini API: quota exceeded"
        );
    }

    #[tokio::test]
    async fn test_loading_a_document_reports_size_and_duplicates() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("lecture.pdf");
        std::fs::write(&path, b"%PDF-1.5").unwrap();

        let pdf = CountingExtractor::new(&"a".repeat(1500));
        let mut app = app_with(FakeChat::scripted(vec![]), pdf.clone());

        type_path(&mut app, &path);
        assert_eq!(app.view, View::Chat);
        assert_eq!(app.activity(), &Activity::Extracting("lecture.pdf".to_string()));

        app.wait_for_event().await;
        assert_eq!(
            app.document(),
            Some(&LoadedDocument {
                filename: "lecture.pdf".to_string(),
                char_count: 1500
            })
        );
        let notice = app.notices().last().unwrap();
        assert_eq!(notice.level, NoticeLevel::Success);
        assert_eq!(
            notice.text,
            "Successfully loaded context from: lecture.pdf (approx. 1,500 characters)."
        );

        type_path(&mut app, &path);
        app.wait_for_event().await;
        assert_eq!(
            app.notices().last().unwrap().text,
            "Context from lecture.pdf is already loaded."
        );
        assert_eq!(pdf.calls(), 1);
    }

    #[tokio::test]
    async fn test_unsupported_file_reports_failure() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("notes.xyz");
        std::fs::write(&path, b"data").unwrap();

        let pdf = CountingExtractor::new("unused");
        let mut app = app_with(FakeChat::scripted(vec![]), pdf.clone());

        type_path(&mut app, &path);
        app.wait_for_event().await;

        let notice = app.notices().last().unwrap();
        assert_eq!(notice.level, NoticeLevel::Error);
        assert_eq!(
            notice.text,
            "Document processing failed: Unsupported file type: .xyz"
        );
        assert!(app.document().is_none());
        assert_eq!(pdf.calls(), 0);
    }

    #[tokio::test]
    async fn test_new_chat_clears_everything() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("a.pdf");
        std::fs::write(&path, b"%PDF").unwrap();

        let mut app = app_with(FakeChat::scripted(vec![]), CountingExtractor::new("ctx"));
        type_path(&mut app, &path);
        app.wait_for_event().await;
        app.input.insert_str("question");
        app.handle_action(AppAction::Submit);
        app.wait_for_event().await;
        assert_eq!(app.turns().len(), 2);

        app.handle_action(AppAction::NewChat);

        assert!(app.turns().is_empty());
        assert!(app.document().is_none());
        assert_eq!(app.notices().len(), 1);
    }

    #[tokio::test]
    async fn test_new_chat_refused_while_busy() {
        let mut app = app_with(FakeChat::scripted(vec![]), CountingExtractor::new("unused"));

        app.input.insert_str("question");
        app.handle_action(AppAction::Submit);
        app.handle_action(AppAction::NewChat);
        assert_eq!(app.notices().last().unwrap().level, NoticeLevel::Warning);

        app.wait_for_event().await;
        assert_eq!(app.turns().len(), 2);
    }

    #[tokio::test]
    async fn test_help_closes_on_any_key() {
        let mut app = app_with(FakeChat::scripted(vec![]), CountingExtractor::new("unused"));

        app.handle_action(AppAction::ToggleHelp);
        assert_eq!(app.view, View::Help);
        app.handle_action(AppAction::Input(crossterm::event::KeyEvent::from(
            crossterm::event::KeyCode::Char('x'),
        )));
        assert_eq!(app.view, View::Chat);
        assert_eq!(app.input.lines().join(""), "");
    }

    #[tokio::test]
    async fn test_scrolling_stops_following_output() {
        let mut app = app_with(FakeChat::scripted(vec![]), CountingExtractor::new("unused"));
        app.update_scroll_bounds(50, 20);
        assert_eq!(app.scroll_offset, 30);

        app.handle_action(AppAction::ScrollPageUp);
        assert_eq!(app.scroll_offset, 20);
        assert!(!app.follow_output);

        app.update_scroll_bounds(60, 20);
        assert_eq!(app.scroll_offset, 20);

        app.handle_action(AppAction::ScrollBottom);
        assert_eq!(app.scroll_offset, 40);
        assert!(app.follow_output);
    }
}

/// Text extracted from the most recently loaded document.
#[derive(Debug, Clone, PartialEq)]
pub struct DocumentContext {
    pub filename: String,
    pub text: String,
}

impl DocumentContext {
    pub fn new(filename: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            filename: filename.into(),
            text: text.into(),
        }
    }

    pub fn char_count(&self) -> usize {
        self.text.chars().count()
    }
}

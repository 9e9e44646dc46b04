// LLM chat layer

pub mod google;
pub mod prompt;
pub mod provider;

pub use google::GeminiChatSession;
pub use prompt::assemble;
pub use provider::*;

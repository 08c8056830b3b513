//! LLM provider implementations

mod gemini;

pub use gemini::{GeminiProvider, DEFAULT_CHAT_MODEL};

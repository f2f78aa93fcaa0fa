//! Reply backends for Kai.
//!
//! [`TemplateResponder`] answers every intent from fixed in-character pools
//! and never fails. [`OllamaResponder`] talks to a local model and is only
//! routed the open-ended intents.

pub mod ollama;
pub mod prompts;
pub mod retry;
pub mod template;

pub use ollama::OllamaResponder;
pub use prompts::{build_system_prompt, sanitize_reply};
pub use template::TemplateResponder;

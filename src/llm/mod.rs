//! LLM integration module

pub mod client;
pub mod prompts;

pub use client::{ChatBackend, ChatRequest, OpenAiCompatClient};
pub use prompts::{PromptParams, PromptTemplates};

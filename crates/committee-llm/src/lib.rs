//! LLM provider abstraction layer for equity-committee
//!
//! This crate provides provider-agnostic abstractions for asking a Large
//! Language Model to draft text. It includes:
//!
//! - Message types for chat-style prompts
//! - Completion request/response types
//! - The [`LLMProvider`] trait that report generation depends on
//! - An OpenAI-compatible provider (behind the `openai` feature), which also
//!   covers Groq, Azure OpenAI and local servers such as llama.cpp or LM Studio

pub mod completion;
pub mod error;
pub mod messages;
pub mod provider;

// Re-export main types
pub use completion::{CompletionRequest, CompletionResponse, StopReason, TokenUsage};
pub use error::{LLMError, Result};
pub use messages::{Message, Role};
pub use provider::LLMProvider;

// Provider implementations (feature-gated)
#[cfg(feature = "openai")]
pub mod providers;

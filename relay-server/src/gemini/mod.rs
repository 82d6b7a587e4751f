//! Gemini generation module.

pub mod client;
pub mod types;

pub use client::{GeminiClient, ReplyGenerator};
pub use types::{GenerateContentRequest, GenerateContentResponse};

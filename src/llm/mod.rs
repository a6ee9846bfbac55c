//! Hosted model client.
//!
//! [`ModelBackend`] is the seam every stage calls through; [`GeminiClient`]
//! is the production implementation and [`RetryPolicy`] handles transient
//! provider overload.

mod client;
mod retry;
mod types;


pub use client::GeminiClient;
pub use retry::{is_overloaded, RetryPolicy};
pub use types::*;

use async_trait::async_trait;

use crate::error::LlmResult;

/// Anything that can turn a prompt into a JSON completion
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ModelBackend: Send + Sync {
    /// Send one prompt and return the raw completion text
    async fn generate(&self, prompt: &str, temperature: f32) -> LlmResult<String>;
}

//! Core infrastructure shared by all stages.

use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info};

use super::parse::{parse_response, ResponseSchema};
use crate::error::AppResult;
use crate::llm::ModelBackend;

/// Model access shared by every stage client.
///
/// Cloning is cheap; clones share the same backend.
#[derive(Clone)]
pub struct StageCore {
    model: Arc<dyn ModelBackend>,
}

impl StageCore {
    /// Create a new core around a model backend.
    pub fn new(model: Arc<dyn ModelBackend>) -> Self {
        Self { model }
    }

    /// Get a reference to the model backend.
    #[inline]
    pub fn model(&self) -> &dyn ModelBackend {
        self.model.as_ref()
    }

    /// Send `prompt` and decode the completion as `T`.
    pub(crate) async fn complete<T: ResponseSchema>(
        &self,
        stage: &'static str,
        prompt: &str,
        temperature: f32,
    ) -> AppResult<T> {
        let start = Instant::now();
        debug!(stage, prompt_chars = prompt.len(), "Requesting completion");

        let completion = self.model.generate(prompt, temperature).await?;
        let parsed = parse_response::<T>(&completion)?;

        info!(
            stage,
            schema = T::NAME,
            latency_ms = start.elapsed().as_millis() as u64,
            "Stage completed"
        );
        Ok(parsed)
    }
}

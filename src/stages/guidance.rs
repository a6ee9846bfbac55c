use tracing::{info, warn};

use super::{FrameworkGuidance, FrameworkSuggestion, StageCore};
use crate::error::AppResult;
use crate::prompts::{guidance_prompt, is_five_whys};

const TEMPERATURE: f32 = 0.3;

/// Second stage: explain how to apply one framework and pose key questions.
#[derive(Clone)]
pub struct GuidanceStage {
    core: StageCore,
}

impl GuidanceStage {
    /// Create a new guidance stage
    pub fn new(core: StageCore) -> Self {
        Self { core }
    }

    /// Fetch guidance for `framework`
    pub async fn guide(
        &self,
        problem: &str,
        context: &str,
        framework: &FrameworkSuggestion,
    ) -> AppResult<FrameworkGuidance> {
        let guidance: FrameworkGuidance = self
            .core
            .complete("guidance", &guidance_prompt(problem, context, framework), TEMPERATURE)
            .await?;

        if is_five_whys(&framework.name) && guidance.key_questions.len() != 5 {
            warn!(
                questions = guidance.key_questions.len(),
                "Five Whys guidance did not return five questions"
            );
        }

        info!(
            framework = %framework.name,
            questions = guidance.key_questions.len(),
            "Guidance ready"
        );
        Ok(guidance)
    }
}

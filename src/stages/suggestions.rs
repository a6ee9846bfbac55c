use tracing::info;

use super::{AiResponse, StageCore};
use crate::error::{AppResult, ToolError};
use crate::prompts::suggestions_prompt;

const TEMPERATURE: f32 = 0.5;

/// First stage: analyse the problem and recommend frameworks.
#[derive(Clone)]
pub struct SuggestionStage {
    core: StageCore,
}

impl SuggestionStage {
    /// Create a new suggestions stage
    pub fn new(core: StageCore) -> Self {
        Self { core }
    }

    /// Ask the model for an analysis of `problem` in `context`
    pub async fn suggest(&self, problem: &str, context: &str) -> AppResult<AiResponse> {
        if problem.trim().is_empty() || context.trim().is_empty() {
            return Err(ToolError::validation(
                "problem",
                "Please fill in both the Problem and Context fields.",
            )
            .into());
        }

        let response: AiResponse = self
            .core
            .complete("suggestions", &suggestions_prompt(problem, context), TEMPERATURE)
            .await?;

        info!(
            frameworks = response.recommended_frameworks.len(),
            goals = response.strategic_goals.len(),
            "Suggestions ready"
        );
        Ok(response)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::AppError;
    use crate::llm::MockModelBackend;
    use std::sync::Arc;

    #[tokio::test]
    async fn test_suggest_parses_fenced_reply() {
        let mut model = MockModelBackend::new();
        model
            .expect_generate()
            .withf(|prompt, _| prompt.contains("Problem: \"Churn\""))
            .times(1)
            .returning(|_, _| {
                Ok(r#"```json
{"problemAnalysis":"Onboarding is confusing.","strategicGoals":["Reduce churn"],"recommendedFrameworks":[{"id":"5w","name":"5 Whys","type":"Analysis","description":"Drill down."}]}
```"#
                    .to_string())
            });

        let stage = SuggestionStage::new(StageCore::new(Arc::new(model)));
        let response = stage.suggest("Churn", "SaaS").await.unwrap();
        assert_eq!(response.problem_analysis, "Onboarding is confusing.");
        assert_eq!(response.recommended_frameworks[0].id, "5w");
    }

    #[tokio::test]
    async fn test_suggest_requires_problem_and_context() {
        let mut model = MockModelBackend::new();
        model.expect_generate().never();

        let stage = SuggestionStage::new(StageCore::new(Arc::new(model)));
        let err = stage.suggest("Churn", "   ").await.unwrap_err();
        assert!(matches!(err, AppError::Tool(ToolError::Validation { .. })));
    }
}

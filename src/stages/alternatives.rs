use tracing::info;

use super::{AiSuggestedSolution, FinalSolution, StageCore};
use crate::error::AppResult;
use crate::prompts::suggested_solutions_prompt;

const TEMPERATURE: f32 = 0.6;

/// Proposes alternative solutions once a plan exists.
#[derive(Clone)]
pub struct SuggestedSolutionsStage {
    core: StageCore,
}

impl SuggestedSolutionsStage {
    /// Create a new suggested-solutions stage
    pub fn new(core: StageCore) -> Self {
        Self { core }
    }

    pub async fn suggest(
        &self,
        problem: &str,
        context: &str,
        solution: &FinalSolution,
    ) -> AppResult<Vec<AiSuggestedSolution>> {
        let suggestions: Vec<AiSuggestedSolution> = self
            .core
            .complete(
                "suggested_solutions",
                &suggested_solutions_prompt(problem, context, solution),
                TEMPERATURE,
            )
            .await?;

        info!(count = suggestions.len(), "Suggested solutions ready");
        Ok(suggestions)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{AppError, ResponseFailure};
    use crate::llm::MockModelBackend;
    use std::sync::Arc;

    fn plan() -> FinalSolution {
        FinalSolution {
            title: "Plan".to_string(),
            summary: "S".to_string(),
            recommendations: vec![],
        }
    }

    #[tokio::test]
    async fn test_suggest_parses_array() {
        let mut model = MockModelBackend::new();
        model.expect_generate().returning(|_, _| {
            Ok(r#"[{"solutionTitle":"Referral program","solutionDescription":"Reward invites.","kpi":{"metric":"Referrals","target":"100/month"},"alert":{"risk":"Fraud","mitigation":"Cap rewards"},"quote":{"text":"Grow","author":"Anon"}}]"#.to_string())
        });

        let stage = SuggestedSolutionsStage::new(StageCore::new(Arc::new(model)));
        let suggestions = stage.suggest("p", "c", &plan()).await.unwrap();
        assert_eq!(suggestions.len(), 1);
        assert_eq!(suggestions[0].kpi.target, "100/month");
    }

    #[tokio::test]
    async fn test_suggest_rejects_object_reply() {
        let mut model = MockModelBackend::new();
        model
            .expect_generate()
            .returning(|_, _| Ok(r#"{"solutionTitle":"Only one"}"#.to_string()));

        let stage = SuggestedSolutionsStage::new(StageCore::new(Arc::new(model)));
        let err = stage.suggest("p", "c", &plan()).await.unwrap_err();
        match err {
            AppError::Response(e) => {
                assert_eq!(e.schema, "AISuggestedSolutions");
                assert!(matches!(e.reason, ResponseFailure::Shape { .. }));
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }
}

use tracing::info;

use super::{Answer, FinalSolution, StageCore};
use crate::error::{AppResult, ToolError};
use crate::prompts::solution_prompt;

const TEMPERATURE: f32 = 0.4;

/// Third stage: turn the answered questions into a plan.
#[derive(Clone)]
pub struct SolutionStage {
    core: StageCore,
}

impl SolutionStage {
    /// Create a new solution stage
    pub fn new(core: StageCore) -> Self {
        Self { core }
    }

    /// Generate the final plan. Every question must have an answer.
    pub async fn solve(
        &self,
        problem: &str,
        context: &str,
        framework: &str,
        answers: &[Answer],
    ) -> AppResult<FinalSolution> {
        if answers.is_empty() || !answers.iter().all(Answer::is_answered) {
            return Err(
                ToolError::validation("answers", "Answer every key question first.").into(),
            );
        }

        let solution: FinalSolution = self
            .core
            .complete(
                "solution",
                &solution_prompt(problem, context, framework, answers),
                TEMPERATURE,
            )
            .await?;

        info!(
            framework = %framework,
            recommendations = solution.recommendations.len(),
            "Final solution ready"
        );
        Ok(solution)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::AppError;
    use crate::llm::MockModelBackend;
    use std::sync::Arc;

    #[tokio::test]
    async fn test_solve_rejects_blank_answers() {
        let mut model = MockModelBackend::new();
        model.expect_generate().never();

        let stage = SolutionStage::new(StageCore::new(Arc::new(model)));
        let answers = vec![
            Answer {
                question: "Q1".to_string(),
                answer: "yes".to_string(),
            },
            Answer::blank("Q2"),
        ];
        let err = stage.solve("p", "c", "RCA", &answers).await.unwrap_err();
        assert!(matches!(err, AppError::Tool(_)));
    }

    #[tokio::test]
    async fn test_solve_returns_plan() {
        let mut model = MockModelBackend::new();
        model
            .expect_generate()
            .withf(|prompt, _| prompt.contains("Question: Q1\nAnswer: yes"))
            .returning(|_, _| {
                Ok(r#"{"title":"Plan","summary":"Sum","recommendations":[{"title":"R1","details":"D1"}]}"#.to_string())
            });

        let stage = SolutionStage::new(StageCore::new(Arc::new(model)));
        let answers = vec![Answer {
            question: "Q1".to_string(),
            answer: "yes".to_string(),
        }];
        let solution = stage.solve("p", "c", "RCA", &answers).await.unwrap();
        assert_eq!(solution.recommendations[0].details, "D1");
    }
}

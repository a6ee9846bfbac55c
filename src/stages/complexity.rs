//! Complexity scoring of a Five Whys analysis.
//!
//! The model rates three dimensions; the tier and its description are
//! computed locally from the sum of the ratings.

use serde::{Deserialize, Serialize};
use tracing::info;

use super::{Answer, ComplexityScore, FiveWhysStep, StageCore};
use crate::error::{AppResult, ToolError};
use crate::prompts::complexity_prompt;

const TEMPERATURE: f32 = 0.2;

/// Highest total still rated [`ComplexityTier::Low`].
pub const LOW_MAX_TOTAL: u32 = 6;
/// Highest total still rated [`ComplexityTier::Medium`].
pub const MEDIUM_MAX_TOTAL: u32 = 10;

/// Complexity band of a problem.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ComplexityTier {
    Low,
    Medium,
    High,
}

impl ComplexityTier {
    /// Tier for a summed score
    pub fn from_total(total: u32) -> Self {
        if total <= LOW_MAX_TOTAL {
            ComplexityTier::Low
        } else if total <= MEDIUM_MAX_TOTAL {
            ComplexityTier::Medium
        } else {
            ComplexityTier::High
        }
    }

    /// Display label
    pub fn label(&self) -> &'static str {
        match self {
            ComplexityTier::Low => "Low Complexity",
            ComplexityTier::Medium => "Medium Complexity",
            ComplexityTier::High => "High Complexity",
        }
    }

    /// Canned description of what the tier implies for the team.
    pub fn description(&self) -> &'static str {
        match self {
            ComplexityTier::Low => "The problem appears to be well-defined and isolated. It can likely be resolved with targeted, swift actions by a small, dedicated team.",
            ComplexityTier::Medium => "The problem involves multiple processes or teams and has a moderate business impact. A cross-functional team is needed to manage dependencies and implement a coordinated solution.",
            ComplexityTier::High => "This is a systemic issue with significant business impact and unclear causes. It requires a structured approach, a formal roadmap, and strong executive sponsorship to ensure success.",
        }
    }
}

/// Result of [`assess`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComplexityAssessment {
    pub total: u32,
    pub tier: ComplexityTier,
    pub label: String,
    pub description: String,
}

/// Sum the three ratings and map them to a tier.
pub fn assess(score: &ComplexityScore) -> ComplexityAssessment {
    let total = score
        .cause_ambiguity
        .score
        .saturating_add(score.interconnections.score)
        .saturating_add(score.business_impact.score);
    let tier = ComplexityTier::from_total(total);
    ComplexityAssessment {
        total,
        tier,
        label: tier.label().to_string(),
        description: tier.description().to_string(),
    }
}

/// Model score together with the local assessment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComplexityReport {
    pub score: ComplexityScore,
    pub assessment: ComplexityAssessment,
}

/// Number the answered questions of a Five Whys guidance.
pub fn five_whys_steps(answers: &[Answer]) -> Vec<FiveWhysStep> {
    answers
        .iter()
        .enumerate()
        .map(|(i, a)| FiveWhysStep {
            id: i as u32 + 1,
            question: a.question.clone(),
            answer: a.answer.clone(),
        })
        .collect()
}

/// Render steps as `Q: ...\nA: ...` blocks separated by blank lines.
pub fn five_whys_transcript(steps: &[FiveWhysStep]) -> String {
    steps
        .iter()
        .map(|s| format!("Q: {}\nA: {}", s.question, s.answer))
        .collect::<Vec<_>>()
        .join("\n\n")
}

/// Scores a completed Five Whys chain.
#[derive(Clone)]
pub struct ComplexityStage {
    core: StageCore,
}

impl ComplexityStage {
    /// Create a new complexity stage
    pub fn new(core: StageCore) -> Self {
        Self { core }
    }

    /// Ask the model to rate `steps`, then assess the ratings.
    pub async fn score(&self, steps: &[FiveWhysStep]) -> AppResult<ComplexityReport> {
        if steps.is_empty() || steps.iter().any(|s| s.answer.trim().is_empty()) {
            return Err(ToolError::validation(
                "answers",
                "Answer every step of the Five Whys before scoring complexity.",
            )
            .into());
        }

        let score: ComplexityScore = self
            .core
            .complete(
                "complexity",
                &complexity_prompt(&five_whys_transcript(steps)),
                TEMPERATURE,
            )
            .await?;
        let assessment = assess(&score);

        info!(
            total = assessment.total,
            tier = assessment.label.as_str(),
            "Complexity assessed"
        );
        Ok(ComplexityReport { score, assessment })
    }
}

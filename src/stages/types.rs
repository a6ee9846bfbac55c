//! Shapes returned by the hosted model, one per stage.

use serde::{de::Error as _, Deserialize, Deserializer, Serialize};

use super::parse::ResponseSchema;

/// Initial analysis: problem restatement, goals and candidate frameworks.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AiResponse {
    /// Free-text analysis of the problem.
    pub problem_analysis: String,
    /// High-level strategic goals.
    pub strategic_goals: Vec<String>,
    /// Frameworks the user can drill into.
    pub recommended_frameworks: Vec<FrameworkSuggestion>,
}

/// A framework recommended by the model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FrameworkSuggestion {
    pub id: String,
    pub name: String,
    #[serde(rename = "type")]
    pub framework_type: FrameworkType,
    pub description: String,
}

/// Category tag of a framework.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FrameworkType {
    Analysis,
    Strategy,
    Implementation,
    Evaluation,
}

impl std::fmt::Display for FrameworkType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FrameworkType::Analysis => write!(f, "Analysis"),
            FrameworkType::Strategy => write!(f, "Strategy"),
            FrameworkType::Implementation => write!(f, "Implementation"),
            FrameworkType::Evaluation => write!(f, "Evaluation"),
        }
    }
}

/// How to apply one framework to the problem.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FrameworkGuidance {
    pub title: String,
    pub description: String,
    /// Questions the user answers before the final plan is generated.
    pub key_questions: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub action_steps: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expected_outcome: Option<String>,
}

/// A key question paired with the user's answer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Answer {
    pub question: String,
    pub answer: String,
}

impl Answer {
    /// Blank answer slot for `question`
    pub fn blank(question: impl Into<String>) -> Self {
        Self {
            question: question.into(),
            answer: String::new(),
        }
    }

    /// Whether the user has written anything
    pub fn is_answered(&self) -> bool {
        !self.answer.trim().is_empty()
    }
}

/// The generated plan.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FinalSolution {
    pub title: String,
    pub summary: String,
    pub recommendations: Vec<Recommendation>,
}

/// One actionable recommendation of a [`FinalSolution`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Recommendation {
    pub title: String,
    pub details: String,
}

/// Model ratings of a five-whys analysis.
///
/// Scores are expected in 1..=5 but are not range-checked; fractional ones
/// are rounded.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ComplexityScore {
    pub cause_ambiguity: DimensionScore,
    pub interconnections: DimensionScore,
    pub business_impact: DimensionScore,
    pub strategic_recommendations: Vec<String>,
}

/// One rated dimension.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DimensionScore {
    #[serde(deserialize_with = "whole_score")]
    pub score: u32,
    pub reasoning: String,
}

/// Any JSON number is accepted. Fractional ratings round to the nearest
/// point; negative ones count as zero.
fn whole_score<'de, D>(deserializer: D) -> Result<u32, D::Error>
where
    D: Deserializer<'de>,
{
    let value = f64::deserialize(deserializer)?;
    if !value.is_finite() {
        return Err(D::Error::custom("score must be a finite number"));
    }
    Ok(value.round().clamp(0.0, f64::from(u32::MAX)) as u32)
}

/// One step of a five-whys chain.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FiveWhysStep {
    pub id: u32,
    pub question: String,
    pub answer: String,
}

/// An alternative solution proposed after the final plan.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AiSuggestedSolution {
    pub solution_title: String,
    pub solution_description: String,
    pub kpi: SuggestedKpi,
    pub alert: SuggestedAlert,
    pub quote: SuggestedQuote,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SuggestedKpi {
    pub metric: String,
    pub target: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SuggestedAlert {
    pub risk: String,
    pub mitigation: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SuggestedQuote {
    pub text: String,
    pub author: String,
}

impl ResponseSchema for AiResponse {
    const NAME: &'static str = "AIResponse";
}

impl ResponseSchema for FrameworkGuidance {
    const NAME: &'static str = "FrameworkGuidance";
}

impl ResponseSchema for FinalSolution {
    const NAME: &'static str = "FinalSolution";
}

impl ResponseSchema for ComplexityScore {
    const NAME: &'static str = "ComplexityScore";
}

impl ResponseSchema for Vec<AiSuggestedSolution> {
    const NAME: &'static str = "AISuggestedSolutions";
}

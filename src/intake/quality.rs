//! Word-count based input quality meter.

use serde::{Deserialize, Serialize};

/// Default word goal.
pub const DEFAULT_WORD_GOAL: usize = 50;
/// Word goal of the problem field.
pub const PROBLEM_WORD_GOAL: usize = 40;
/// Word goal of the context field.
pub const CONTEXT_WORD_GOAL: usize = 30;

/// Quality band shown next to an input field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QualityLevel {
    NeedsMoreDetail,
    Good,
    Sufficient,
    Excellent,
}

impl QualityLevel {
    pub fn label(&self) -> &'static str {
        match self {
            QualityLevel::NeedsMoreDetail => "Needs more detail",
            QualityLevel::Good => "Good",
            QualityLevel::Sufficient => "Sufficient",
            QualityLevel::Excellent => "Excellent",
        }
    }
}

/// Result of [`input_quality`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InputQuality {
    pub word_count: usize,
    pub word_goal: usize,
    /// Percent of the goal reached, capped at 100.
    pub progress: f64,
    pub level: QualityLevel,
    pub label: String,
}

/// Rate `text` against `word_goal` words.
pub fn input_quality(text: &str, word_goal: usize) -> InputQuality {
    let word_count = text.split_whitespace().count();
    let goal = word_goal.max(1);
    let progress = (word_count as f64 / goal as f64 * 100.0).min(100.0);

    let level = if progress >= 100.0 {
        QualityLevel::Excellent
    } else if progress > 60.0 {
        QualityLevel::Sufficient
    } else if progress > 30.0 {
        QualityLevel::Good
    } else {
        QualityLevel::NeedsMoreDetail
    };

    InputQuality {
        word_count,
        word_goal: goal,
        progress,
        level,
        label: level.label().to_string(),
    }
}

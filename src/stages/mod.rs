//! Model-backed stages of the facilitation flow.
//!
//! - [`SuggestionStage`]: problem analysis and recommended frameworks
//! - [`GuidanceStage`]: how to apply one framework, with key questions
//! - [`SolutionStage`]: the final plan from the answered questions
//! - [`ComplexityStage`]: ratings of a Five Whys chain plus a local tier
//! - [`SuggestedSolutionsStage`]: alternatives to an accepted plan
//!
//! All stages share model access via [`StageCore`] composition and decode
//! completions with [`parse_response`].

mod alternatives;
mod complexity;
mod core;
mod guidance;
mod parse;
mod solution;
mod suggestions;
mod types;

pub use alternatives::*;
pub use complexity::*;
pub use core::*;
pub use guidance::*;
pub use parse::*;
pub use solution::*;
pub use suggestions::*;
pub use types::*;

/// All stage clients over one model backend.
#[derive(Clone)]
pub struct Stages {
    pub suggestions: SuggestionStage,
    pub guidance: GuidanceStage,
    pub solution: SolutionStage,
    pub complexity: ComplexityStage,
    pub alternatives: SuggestedSolutionsStage,
}

impl Stages {
    /// Build every stage on top of `core`
    pub fn new(core: StageCore) -> Self {
        Self {
            suggestions: SuggestionStage::new(core.clone()),
            guidance: GuidanceStage::new(core.clone()),
            solution: SolutionStage::new(core.clone()),
            complexity: ComplexityStage::new(core.clone()),
            alternatives: SuggestedSolutionsStage::new(core),
        }
    }
}

//! Workflow state and its pure transition function.
//!
//! [`reduce`] never performs I/O. When an action needs the model it returns
//! an [`Effect`] naming the request; the controller runs it and feeds the
//! outcome back as another [`Action`].

use serde::{Deserialize, Serialize};

use crate::intake::{EXAMPLE_CONTEXT, EXAMPLE_PROBLEM};
use crate::prompts::is_five_whys;
use crate::stages::{
    five_whys_steps, AiResponse, AiSuggestedSolution, Answer, ComplexityReport, FinalSolution,
    FiveWhysStep, FrameworkGuidance, FrameworkSuggestion,
};
use crate::storage::SessionSnapshot;

/// Shown when suggestions are requested without both inputs.
pub const MISSING_INPUT_MESSAGE: &str = "Please fill in both the Problem and Context fields.";

/// Shown when the selected framework is not among the suggestions.
pub const UNKNOWN_FRAMEWORK_MESSAGE: &str =
    "An error occurred. The selected framework could not be found.";

/// Shown when the plan is requested with unanswered questions.
pub const UNANSWERED_MESSAGE: &str = "Please answer all the key questions first.";

/// Main progress of the facilitation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    #[default]
    Idle,
    SuggestionsLoading,
    SuggestionsReady,
    GuidanceLoading,
    GuidanceReady,
    SolutionLoading,
    SolutionReady,
}

impl Stage {
    /// Convert to string representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            Stage::Idle => "idle",
            Stage::SuggestionsLoading => "suggestions_loading",
            Stage::SuggestionsReady => "suggestions_ready",
            Stage::GuidanceLoading => "guidance_loading",
            Stage::GuidanceReady => "guidance_ready",
            Stage::SolutionLoading => "solution_loading",
            Stage::SolutionReady => "solution_ready",
        }
    }

    /// Stepper position (1-4): define, suggestions, guidance, solution.
    pub fn step(&self) -> u8 {
        match self {
            Stage::Idle | Stage::SuggestionsLoading => 1,
            Stage::SuggestionsReady | Stage::GuidanceLoading => 2,
            Stage::GuidanceReady | Stage::SolutionLoading => 3,
            Stage::SolutionReady => 4,
        }
    }
}

impl std::fmt::Display for Stage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Titles of the four stepper steps.
pub const STEP_TITLES: [&str; 4] = [
    "Problem Definition",
    "Initial AI Suggestions",
    "Framework Guidance",
    "Final Solution",
];

/// At most one request per kind is in flight; these flags track them.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoadingFlags {
    pub suggestions: bool,
    pub guidance: bool,
    pub solution: bool,
    pub complexity: bool,
    pub alternatives: bool,
}

/// Sequence number of the latest request issued per kind.
///
/// A result is applied only when it answers the latest request of its kind
/// and that kind is still loading.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RequestIds {
    pub suggestions: u64,
    pub guidance: u64,
    pub solution: u64,
    pub complexity: u64,
    pub alternatives: u64,
}

/// Inline error message per request kind.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StageErrors {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub suggestions: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub guidance: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub solution: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub complexity: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub alternatives: Option<String>,
}

/// Everything the facilitator knows about the current problem.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WorkflowState {
    pub problem: String,
    pub context: String,
    pub stage: Stage,
    pub suggestions: Option<AiResponse>,
    pub active_framework: Option<String>,
    pub guidance: Option<FrameworkGuidance>,
    pub answers: Vec<Answer>,
    pub solution: Option<FinalSolution>,
    pub complexity: Option<ComplexityReport>,
    pub alternatives: Option<Vec<AiSuggestedSolution>>,
    pub loading: LoadingFlags,
    pub errors: StageErrors,
    #[serde(skip)]
    pub requests: RequestIds,
}

impl WorkflowState {
    /// Stepper position of the current stage.
    pub fn current_step(&self) -> u8 {
        self.stage.step()
    }

    /// Whether the active framework is the Five Whys.
    pub fn is_five_whys(&self) -> bool {
        self.active_framework.as_deref().is_some_and(is_five_whys)
    }

    /// Whether every key question has an answer.
    pub fn all_answered(&self) -> bool {
        !self.answers.is_empty() && self.answers.iter().all(Answer::is_answered)
    }

    /// Capture the persistable part of the state.
    pub fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot {
            problem: self.problem.clone(),
            context: self.context.clone(),
            ai_response: self.suggestions.clone(),
            active_framework: self.active_framework.clone(),
            framework_guidance: self.guidance.clone(),
            answers: self.answers.clone(),
            final_solution: self.solution.clone(),
            complexity_score: self.complexity.as_ref().map(|c| c.score.clone()),
            ai_suggested_solutions: self.alternatives.clone(),
        }
    }

    /// Rebuild state from a saved snapshot.
    ///
    /// The stage is the furthest one the snapshot has data for. Nothing is
    /// loading afterwards, so late results of earlier requests are dropped.
    pub fn restore(snapshot: SessionSnapshot) -> Self {
        let stage = if snapshot.final_solution.is_some() {
            Stage::SolutionReady
        } else if snapshot.framework_guidance.is_some() {
            Stage::GuidanceReady
        } else if snapshot.ai_response.is_some() {
            Stage::SuggestionsReady
        } else {
            Stage::Idle
        };

        let complexity = snapshot.complexity_score.map(|score| ComplexityReport {
            assessment: crate::stages::assess(&score),
            score,
        });

        Self {
            problem: snapshot.problem,
            context: snapshot.context,
            stage,
            suggestions: snapshot.ai_response,
            active_framework: snapshot.active_framework,
            guidance: snapshot.framework_guidance,
            answers: snapshot.answers,
            solution: snapshot.final_solution,
            complexity,
            alternatives: snapshot.ai_suggested_solutions,
            loading: LoadingFlags::default(),
            errors: StageErrors::default(),
            requests: RequestIds::default(),
        }
    }

    fn find_framework(&self, name: &str) -> Option<FrameworkSuggestion> {
        self.suggestions
            .as_ref()?
            .recommended_frameworks
            .iter()
            .find(|f| f.name == name)
            .cloned()
    }

    // Discarding a result also abandons its pending request, so a late
    // reply finds the kind no longer loading and is dropped.
    fn clear_from_guidance(&mut self) {
        self.guidance = None;
        self.answers.clear();
        self.errors.guidance = None;
        self.loading.guidance = false;
        self.clear_from_solution();
        self.complexity = None;
        self.errors.complexity = None;
        self.loading.complexity = false;
    }

    fn clear_from_solution(&mut self) {
        self.solution = None;
        self.errors.solution = None;
        self.loading.solution = false;
        self.alternatives = None;
        self.errors.alternatives = None;
        self.loading.alternatives = false;
    }
}

/// Something that happened: user input or a finished request.
#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    SetProblem(String),
    SetContext(String),
    /// Prefill both inputs from a playbook.
    ApplyPlaybook { objective: String, context: String },
    LoadExample,
    RequestSuggestions,
    SuggestionsLoaded {
        request: u64,
        response: AiResponse,
    },
    SuggestionsFailed {
        request: u64,
        error: String,
    },
    /// Select a suggested framework by name.
    SelectFramework(String),
    GuidanceLoaded {
        request: u64,
        framework: String,
        guidance: FrameworkGuidance,
    },
    GuidanceFailed {
        request: u64,
        framework: String,
        error: String,
    },
    SetAnswer {
        index: usize,
        answer: String,
    },
    RequestSolution,
    SolutionLoaded {
        request: u64,
        solution: FinalSolution,
    },
    SolutionFailed {
        request: u64,
        error: String,
    },
    RequestComplexity,
    ComplexityLoaded {
        request: u64,
        report: ComplexityReport,
    },
    ComplexityFailed {
        request: u64,
        error: String,
    },
    RequestAlternatives,
    AlternativesLoaded {
        request: u64,
        alternatives: Vec<AiSuggestedSolution>,
    },
    AlternativesFailed {
        request: u64,
        error: String,
    },
    Restore(SessionSnapshot),
}

/// A model request the controller must issue.
///
/// `request` is echoed back in the outcome action.
#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    FetchSuggestions {
        request: u64,
        problem: String,
        context: String,
    },
    FetchGuidance {
        request: u64,
        problem: String,
        context: String,
        framework: FrameworkSuggestion,
    },
    FetchSolution {
        request: u64,
        problem: String,
        context: String,
        framework: String,
        answers: Vec<Answer>,
    },
    ScoreComplexity {
        request: u64,
        steps: Vec<FiveWhysStep>,
    },
    FetchAlternatives {
        request: u64,
        problem: String,
        context: String,
        solution: FinalSolution,
    },
}

/// New state plus the request to issue, if any.
#[derive(Debug, Clone, PartialEq)]
pub struct Transition {
    pub state: WorkflowState,
    pub effect: Option<Effect>,
}

impl Transition {
    fn unchanged(state: &WorkflowState) -> Self {
        Self {
            state: state.clone(),
            effect: None,
        }
    }

    fn to(state: WorkflowState) -> Self {
        Self {
            state,
            effect: None,
        }
    }

    fn with_effect(state: WorkflowState, effect: Effect) -> Self {
        Self {
            state,
            effect: Some(effect),
        }
    }
}

/// Apply `action` to `state`.
pub fn reduce(state: &WorkflowState, action: Action) -> Transition {
    let mut next = state.clone();

    match action {
        Action::SetProblem(problem) => {
            next.problem = problem;
            Transition::to(next)
        }
        Action::SetContext(context) => {
            next.context = context;
            Transition::to(next)
        }
        Action::ApplyPlaybook { objective, context } => {
            next.problem = objective;
            next.context = context;
            Transition::to(next)
        }
        Action::LoadExample => {
            next.problem = EXAMPLE_PROBLEM.to_string();
            next.context = EXAMPLE_CONTEXT.to_string();
            Transition::to(next)
        }

        Action::RequestSuggestions => {
            if state.loading.suggestions {
                return Transition::unchanged(state);
            }
            if state.problem.trim().is_empty() || state.context.trim().is_empty() {
                next.errors.suggestions = Some(MISSING_INPUT_MESSAGE.to_string());
                return Transition::to(next);
            }
            next.suggestions = None;
            next.active_framework = None;
            next.clear_from_guidance();
            next.errors.suggestions = None;
            next.loading.suggestions = true;
            next.requests.suggestions += 1;
            next.stage = Stage::SuggestionsLoading;
            let effect = Effect::FetchSuggestions {
                request: next.requests.suggestions,
                problem: next.problem.clone(),
                context: next.context.clone(),
            };
            Transition::with_effect(next, effect)
        }
        Action::SuggestionsLoaded { request, response } => {
            if !is_current(state.loading.suggestions, state.requests.suggestions, request) {
                return Transition::unchanged(state);
            }
            next.loading.suggestions = false;
            next.suggestions = Some(response);
            next.stage = Stage::SuggestionsReady;
            Transition::to(next)
        }
        Action::SuggestionsFailed { request, error } => {
            if !is_current(state.loading.suggestions, state.requests.suggestions, request) {
                return Transition::unchanged(state);
            }
            next.loading.suggestions = false;
            next.errors.suggestions = Some(error);
            next.stage = Stage::Idle;
            Transition::to(next)
        }

        Action::SelectFramework(name) => {
            if state.loading.guidance || state.active_framework.as_deref() == Some(name.as_str()) {
                return Transition::unchanged(state);
            }
            let Some(framework) = state.find_framework(&name) else {
                next.errors.guidance = Some(UNKNOWN_FRAMEWORK_MESSAGE.to_string());
                return Transition::to(next);
            };
            next.active_framework = Some(name);
            next.clear_from_guidance();
            next.loading.guidance = true;
            next.requests.guidance += 1;
            next.stage = Stage::GuidanceLoading;
            let effect = Effect::FetchGuidance {
                request: next.requests.guidance,
                problem: next.problem.clone(),
                context: next.context.clone(),
                framework,
            };
            Transition::with_effect(next, effect)
        }
        Action::GuidanceLoaded {
            request,
            framework,
            guidance,
        } => {
            if !is_current(state.loading.guidance, state.requests.guidance, request)
                || state.active_framework.as_ref() != Some(&framework)
            {
                return Transition::unchanged(state);
            }
            next.loading.guidance = false;
            next.answers = guidance
                .key_questions
                .iter()
                .map(|q| Answer::blank(q.as_str()))
                .collect();
            next.guidance = Some(guidance);
            next.stage = Stage::GuidanceReady;
            Transition::to(next)
        }
        Action::GuidanceFailed {
            request,
            framework,
            error,
        } => {
            if !is_current(state.loading.guidance, state.requests.guidance, request)
                || state.active_framework.as_ref() != Some(&framework)
            {
                return Transition::unchanged(state);
            }
            next.loading.guidance = false;
            next.errors.guidance = Some(error);
            // Cleared so the same framework can be selected again.
            next.active_framework = None;
            next.stage = Stage::SuggestionsReady;
            Transition::to(next)
        }

        Action::SetAnswer { index, answer } => match next.answers.get_mut(index) {
            Some(slot) => {
                slot.answer = answer;
                Transition::to(next)
            }
            None => Transition::unchanged(state),
        },

        Action::RequestSolution => {
            if state.loading.solution {
                return Transition::unchanged(state);
            }
            let Some(framework) = state.active_framework.clone().filter(|_| state.guidance.is_some())
            else {
                return Transition::unchanged(state);
            };
            if !state.all_answered() {
                next.errors.solution = Some(UNANSWERED_MESSAGE.to_string());
                return Transition::to(next);
            }
            next.clear_from_solution();
            next.loading.solution = true;
            next.requests.solution += 1;
            next.stage = Stage::SolutionLoading;
            let effect = Effect::FetchSolution {
                request: next.requests.solution,
                problem: next.problem.clone(),
                context: next.context.clone(),
                framework,
                answers: next.answers.clone(),
            };
            Transition::with_effect(next, effect)
        }
        Action::SolutionLoaded { request, solution } => {
            if !is_current(state.loading.solution, state.requests.solution, request) {
                return Transition::unchanged(state);
            }
            next.loading.solution = false;
            next.solution = Some(solution);
            next.stage = Stage::SolutionReady;
            Transition::to(next)
        }
        Action::SolutionFailed { request, error } => {
            if !is_current(state.loading.solution, state.requests.solution, request) {
                return Transition::unchanged(state);
            }
            next.loading.solution = false;
            next.errors.solution = Some(error);
            next.stage = Stage::GuidanceReady;
            Transition::to(next)
        }

        Action::RequestComplexity => {
            if state.loading.complexity {
                return Transition::unchanged(state);
            }
            if !state.is_five_whys() || state.guidance.is_none() || !state.all_answered() {
                next.errors.complexity = Some(
                    "Complete a Five Whys analysis before scoring complexity.".to_string(),
                );
                return Transition::to(next);
            }
            next.errors.complexity = None;
            next.loading.complexity = true;
            next.requests.complexity += 1;
            let effect = Effect::ScoreComplexity {
                request: next.requests.complexity,
                steps: five_whys_steps(&next.answers),
            };
            Transition::with_effect(next, effect)
        }
        Action::ComplexityLoaded { request, report } => {
            if !is_current(state.loading.complexity, state.requests.complexity, request) {
                return Transition::unchanged(state);
            }
            next.loading.complexity = false;
            next.complexity = Some(report);
            Transition::to(next)
        }
        Action::ComplexityFailed { request, error } => {
            if !is_current(state.loading.complexity, state.requests.complexity, request) {
                return Transition::unchanged(state);
            }
            next.loading.complexity = false;
            next.errors.complexity = Some(error);
            Transition::to(next)
        }

        Action::RequestAlternatives => {
            if state.loading.alternatives {
                return Transition::unchanged(state);
            }
            let Some(solution) = state.solution.clone() else {
                next.errors.alternatives =
                    Some("Generate the final solution first.".to_string());
                return Transition::to(next);
            };
            next.errors.alternatives = None;
            next.loading.alternatives = true;
            next.requests.alternatives += 1;
            let effect = Effect::FetchAlternatives {
                request: next.requests.alternatives,
                problem: next.problem.clone(),
                context: next.context.clone(),
                solution,
            };
            Transition::with_effect(next, effect)
        }
        Action::AlternativesLoaded {
            request,
            alternatives,
        } => {
            if !is_current(state.loading.alternatives, state.requests.alternatives, request) {
                return Transition::unchanged(state);
            }
            next.loading.alternatives = false;
            next.alternatives = Some(alternatives);
            Transition::to(next)
        }
        Action::AlternativesFailed { request, error } => {
            if !is_current(state.loading.alternatives, state.requests.alternatives, request) {
                return Transition::unchanged(state);
            }
            next.loading.alternatives = false;
            next.errors.alternatives = Some(error);
            Transition::to(next)
        }

        Action::Restore(snapshot) => {
            let mut restored = WorkflowState::restore(snapshot);
            restored.requests = state.requests;
            Transition::to(restored)
        }
    }
}

fn is_current(loading: bool, latest: u64, request: u64) -> bool {
    loading && latest == request
}

#[cfg(test)]
#[path = "state_tests.rs"]
mod state_tests;

//! Facilitator: runs reducer effects against the stage clients and the
//! session store.

use chrono::Utc;
use std::path::Path;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{info, warn};

use super::state::{reduce, Action, Effect, WorkflowState};
use crate::error::{StorageResult, ToolError};
use crate::intake::read_context_file;
use crate::playbooks::Playbook;
use crate::stages::Stages;
use crate::storage::{SessionStore, SessionSummary};

/// Drives one facilitation.
///
/// The state lock is never held while a request is in flight; results are
/// applied through [`reduce`], which drops them if they are no longer
/// relevant.
pub struct Facilitator {
    state: Mutex<WorkflowState>,
    stages: Stages,
    sessions: Arc<dyn SessionStore>,
}

impl Facilitator {
    /// Create a facilitator with an empty workflow.
    pub fn new(stages: Stages, sessions: Arc<dyn SessionStore>) -> Self {
        Self {
            state: Mutex::new(WorkflowState::default()),
            stages,
            sessions,
        }
    }

    /// Current state.
    pub async fn state(&self) -> WorkflowState {
        self.state.lock().await.clone()
    }

    /// Apply `action`, run the resulting request if any, and return the
    /// final state.
    pub async fn dispatch(&self, action: Action) -> WorkflowState {
        let effect = {
            let mut state = self.state.lock().await;
            let transition = reduce(&state, action);
            *state = transition.state;
            transition.effect
        };

        let Some(effect) = effect else {
            return self.state().await;
        };

        let outcome = self.run(effect).await;

        let mut state = self.state.lock().await;
        *state = reduce(&state, outcome).state;
        state.clone()
    }

    async fn run(&self, effect: Effect) -> Action {
        match effect {
            Effect::FetchSuggestions {
                request,
                problem,
                context,
            } => match self.stages.suggestions.suggest(&problem, &context).await {
                Ok(response) => Action::SuggestionsLoaded { request, response },
                Err(e) => {
                    warn!(error = %e, "Suggestions request failed");
                    Action::SuggestionsFailed {
                        request,
                        error: e.to_string(),
                    }
                }
            },
            Effect::FetchGuidance {
                request,
                problem,
                context,
                framework,
            } => {
                match self
                    .stages
                    .guidance
                    .guide(&problem, &context, &framework)
                    .await
                {
                    Ok(guidance) => Action::GuidanceLoaded {
                        request,
                        framework: framework.name,
                        guidance,
                    },
                    Err(e) => {
                        warn!(error = %e, framework = %framework.name, "Guidance request failed");
                        Action::GuidanceFailed {
                            request,
                            framework: framework.name,
                            error: e.to_string(),
                        }
                    }
                }
            }
            Effect::FetchSolution {
                request,
                problem,
                context,
                framework,
                answers,
            } => {
                match self
                    .stages
                    .solution
                    .solve(&problem, &context, &framework, &answers)
                    .await
                {
                    Ok(solution) => Action::SolutionLoaded { request, solution },
                    Err(e) => {
                        warn!(error = %e, "Solution request failed");
                        Action::SolutionFailed {
                            request,
                            error: e.to_string(),
                        }
                    }
                }
            }
            Effect::ScoreComplexity { request, steps } => {
                match self.stages.complexity.score(&steps).await {
                    Ok(report) => Action::ComplexityLoaded { request, report },
                    Err(e) => {
                        warn!(error = %e, "Complexity request failed");
                        Action::ComplexityFailed {
                            request,
                            error: e.to_string(),
                        }
                    }
                }
            }
            Effect::FetchAlternatives {
                request,
                problem,
                context,
                solution,
            } => {
                match self
                    .stages
                    .alternatives
                    .suggest(&problem, &context, &solution)
                    .await
                {
                    Ok(alternatives) => Action::AlternativesLoaded {
                        request,
                        alternatives,
                    },
                    Err(e) => {
                        warn!(error = %e, "Suggested solutions request failed");
                        Action::AlternativesFailed {
                            request,
                            error: e.to_string(),
                        }
                    }
                }
            }
        }
    }

    /// Replace whichever inputs are given.
    pub async fn set_input(
        &self,
        problem: Option<String>,
        context: Option<String>,
    ) -> WorkflowState {
        if let Some(problem) = problem {
            self.dispatch(Action::SetProblem(problem)).await;
        }
        if let Some(context) = context {
            self.dispatch(Action::SetContext(context)).await;
        }
        self.state().await
    }

    /// Fill both inputs with the worked example.
    pub async fn load_example(&self) -> WorkflowState {
        self.dispatch(Action::LoadExample).await
    }

    /// Prefill problem and context from a playbook.
    pub async fn apply_playbook(&self, playbook: &Playbook) -> WorkflowState {
        info!(playbook = %playbook.id, "Applying playbook");
        self.dispatch(Action::ApplyPlaybook {
            objective: playbook.objective.clone(),
            context: playbook.context.clone(),
        })
        .await
    }

    /// Replace the context with the contents of a text file.
    pub async fn upload_context(&self, path: &Path) -> Result<WorkflowState, ToolError> {
        let text = read_context_file(path).await?;
        Ok(self.dispatch(Action::SetContext(text)).await)
    }

    /// Request the diagnosis and framework suggestions.
    pub async fn suggest(&self) -> WorkflowState {
        self.dispatch(Action::RequestSuggestions).await
    }

    /// Select a suggested framework and fetch its guidance.
    pub async fn select_framework(&self, name: &str) -> WorkflowState {
        self.dispatch(Action::SelectFramework(name.to_string())).await
    }

    /// Answer key question `index`.
    pub async fn answer(&self, index: usize, answer: String) -> WorkflowState {
        self.dispatch(Action::SetAnswer { index, answer }).await
    }

    /// Generate the final plan.
    pub async fn solve(&self) -> WorkflowState {
        self.dispatch(Action::RequestSolution).await
    }

    /// Score the Five Whys chain.
    pub async fn score_complexity(&self) -> WorkflowState {
        self.dispatch(Action::RequestComplexity).await
    }

    /// Ask for alternatives to the final plan.
    pub async fn suggest_solutions(&self) -> WorkflowState {
        self.dispatch(Action::RequestAlternatives).await
    }

    /// Save the current state. A blank name gets a time-based default.
    ///
    /// A failed save leaves the in-memory state untouched.
    pub async fn save_session(&self, name: Option<&str>) -> StorageResult<SessionSummary> {
        let name = match name.map(str::trim) {
            Some(n) if !n.is_empty() => n.to_string(),
            _ => format!("Session {}", Utc::now().format("%H:%M:%S")),
        };
        let snapshot = self.state().await.snapshot();
        self.sessions.insert_session(&name, &snapshot).await
    }

    /// Replace the current state with a saved session.
    pub async fn load_session(&self, id: &str) -> StorageResult<WorkflowState> {
        let snapshot = self.sessions.fetch_session_content(id).await?;
        let state = self.dispatch(Action::Restore(snapshot)).await;
        info!(session_id = %id, stage = %state.stage, "Session loaded");
        Ok(state)
    }

    /// Saved sessions, newest first.
    pub async fn list_sessions(&self) -> StorageResult<Vec<SessionSummary>> {
        self.sessions.list_sessions().await
    }

    /// Delete a saved session.
    pub async fn delete_session(&self, id: &str) -> StorageResult<()> {
        self.sessions.delete_session(id).await
    }
}

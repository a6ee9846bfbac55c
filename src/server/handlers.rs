use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::path::PathBuf;
use tracing::info;

use super::SharedState;
use crate::error::{McpError, McpResult};
use crate::intake::{
    input_quality, placeholder_at, InputQuality, CONTEXT_WORD_GOAL, DEFAULT_WORD_GOAL,
    PROBLEM_WORD_GOAL,
};
use crate::playbooks::{Playbook, PlaybookSummary, ProblemCategory};
use crate::storage::SessionSummary;
use crate::tour::{PositionedStep, Rect, Size, TourStatus, TourStep, Viewport};

/// Route tool calls to appropriate handlers
pub async fn handle_tool_call(
    state: &SharedState,
    tool_name: &str,
    arguments: Option<Value>,
) -> McpResult<Value> {
    info!(tool = %tool_name, "Routing tool call");

    match tool_name {
        // Inputs
        "facilitator_set_input" => handle_set_input(state, arguments).await,
        "facilitator_load_example" => handle_load_example(state).await,
        "facilitator_upload_context" => handle_upload_context(state, arguments).await,
        "facilitator_input_quality" => handle_input_quality(state, arguments).await,
        // Stages
        "facilitator_suggest" => to_value(state.facilitator.suggest().await),
        "facilitator_select_framework" => handle_select_framework(state, arguments).await,
        "facilitator_answer" => handle_answer(state, arguments).await,
        "facilitator_solve" => to_value(state.facilitator.solve().await),
        "facilitator_score_complexity" => to_value(state.facilitator.score_complexity().await),
        "facilitator_suggest_solutions" => to_value(state.facilitator.suggest_solutions().await),
        "facilitator_state" => to_value(state.facilitator.state().await),
        // Playbooks
        "playbook_list" => handle_playbook_list(state, arguments).await,
        "playbook_get" => handle_playbook_get(state, arguments).await,
        "playbook_apply" => handle_playbook_apply(state, arguments).await,
        // Sessions
        "session_list" => handle_session_list(state).await,
        "session_save" => handle_session_save(state, arguments).await,
        "session_load" => handle_session_load(state, arguments).await,
        "session_delete" => handle_session_delete(state, arguments).await,
        // Tour
        "tour_status" => handle_tour_status(state).await,
        "tour_control" => handle_tour_control(state, arguments).await,
        "tour_position" => handle_tour_position(state, arguments).await,
        _ => Err(McpError::UnknownTool {
            tool_name: tool_name.to_string(),
        }),
    }
}

// ============================================================================
// Inputs
// ============================================================================

/// Parameters for facilitator_set_input
#[derive(Debug, Deserialize)]
pub struct SetInputParams {
    /// New problem text
    #[serde(default)]
    pub problem: Option<String>,
    /// New context text
    #[serde(default)]
    pub context: Option<String>,
}

async fn handle_set_input(state: &SharedState, arguments: Option<Value>) -> McpResult<Value> {
    let params: SetInputParams = parse_arguments("facilitator_set_input", arguments)?;
    if params.problem.is_none() && params.context.is_none() {
        return Err(McpError::InvalidParameters {
            tool_name: "facilitator_set_input".to_string(),
            message: "Provide problem, context, or both".to_string(),
        });
    }
    to_value(
        state
            .facilitator
            .set_input(params.problem, params.context)
            .await,
    )
}

async fn handle_load_example(state: &SharedState) -> McpResult<Value> {
    to_value(state.facilitator.load_example().await)
}

#[derive(Debug, Deserialize)]
struct UploadParams {
    path: PathBuf,
}

async fn handle_upload_context(state: &SharedState, arguments: Option<Value>) -> McpResult<Value> {
    execute_handler(
        "facilitator_upload_context",
        arguments,
        |params: UploadParams| async move { state.facilitator.upload_context(&params.path).await },
    )
    .await
}

/// Parameters for facilitator_input_quality
#[derive(Debug, Default, Deserialize)]
pub struct InputQualityParams {
    /// Text to rate; defaults to the current value of `field`
    #[serde(default)]
    pub text: Option<String>,
    /// `problem` or `context`
    #[serde(default)]
    pub field: Option<String>,
    /// Word goal; defaults to the field's goal
    #[serde(default)]
    pub word_goal: Option<usize>,
}

/// Response for facilitator_input_quality
#[derive(Debug, Serialize)]
pub struct InputQualityResponse {
    #[serde(flatten)]
    pub quality: InputQuality,
    /// Rotating sample problem, set while the problem field is empty
    #[serde(skip_serializing_if = "Option::is_none")]
    pub placeholder: Option<&'static str>,
}

async fn handle_input_quality(state: &SharedState, arguments: Option<Value>) -> McpResult<Value> {
    let params: InputQualityParams =
        parse_optional_arguments("facilitator_input_quality", arguments)?;

    let current = state.facilitator.state().await;
    let (field_text, field_goal) = match params.field.as_deref() {
        Some("problem") => (Some(current.problem), PROBLEM_WORD_GOAL),
        Some("context") => (Some(current.context), CONTEXT_WORD_GOAL),
        Some(other) => {
            return Err(McpError::InvalidParameters {
                tool_name: "facilitator_input_quality".to_string(),
                message: format!("Unknown field: {}", other),
            })
        }
        None => (None, DEFAULT_WORD_GOAL),
    };

    let text = params
        .text
        .or(field_text)
        .ok_or_else(|| McpError::InvalidParameters {
            tool_name: "facilitator_input_quality".to_string(),
            message: "Provide text or field".to_string(),
        })?;

    let placeholder = (params.field.as_deref() == Some("problem") && text.trim().is_empty())
        .then(|| placeholder_at(state.started.elapsed()));

    to_value(InputQualityResponse {
        quality: input_quality(&text, params.word_goal.unwrap_or(field_goal)),
        placeholder,
    })
}

// ============================================================================
// Stages
// ============================================================================

#[derive(Debug, Deserialize)]
struct SelectFrameworkParams {
    name: String,
}

async fn handle_select_framework(
    state: &SharedState,
    arguments: Option<Value>,
) -> McpResult<Value> {
    let params: SelectFrameworkParams =
        parse_arguments("facilitator_select_framework", arguments)?;
    to_value(state.facilitator.select_framework(&params.name).await)
}

/// Parameters for facilitator_answer
#[derive(Debug, Deserialize)]
pub struct AnswerParams {
    /// Zero-based key question index
    pub index: usize,
    /// Answer text
    pub answer: String,
}

async fn handle_answer(state: &SharedState, arguments: Option<Value>) -> McpResult<Value> {
    let params: AnswerParams = parse_arguments("facilitator_answer", arguments)?;
    to_value(state.facilitator.answer(params.index, params.answer).await)
}

// ============================================================================
// Playbooks
// ============================================================================

/// Parameters for playbook_list
#[derive(Debug, Default, Deserialize)]
pub struct PlaybookListParams {
    /// Filter by problem category
    #[serde(default)]
    pub category: Option<String>,
}

/// Response for playbook_list
#[derive(Debug, Serialize)]
pub struct PlaybookListResponse {
    /// Matching playbooks
    pub playbooks: Vec<PlaybookSummary>,
    /// Number of playbooks
    pub count: usize,
}

async fn handle_playbook_list(state: &SharedState, arguments: Option<Value>) -> McpResult<Value> {
    let params: PlaybookListParams = parse_optional_arguments("playbook_list", arguments)?;

    let category = params
        .category
        .as_deref()
        .map(str::parse::<ProblemCategory>)
        .transpose()
        .map_err(|message| McpError::InvalidParameters {
            tool_name: "playbook_list".to_string(),
            message,
        })?;

    info!(category = ?category, "Listing playbooks");

    let playbooks = state.playbooks.list(category);
    to_value(PlaybookListResponse {
        count: playbooks.len(),
        playbooks,
    })
}

#[derive(Debug, Deserialize)]
struct PlaybookIdParams {
    playbook_id: String,
}

fn find_playbook(state: &SharedState, tool_name: &str, id: &str) -> McpResult<Playbook> {
    state
        .playbooks
        .get(id)
        .ok_or_else(|| McpError::InvalidParameters {
            tool_name: tool_name.to_string(),
            message: format!("Playbook not found: {}", id),
        })
}

async fn handle_playbook_get(state: &SharedState, arguments: Option<Value>) -> McpResult<Value> {
    let params: PlaybookIdParams = parse_arguments("playbook_get", arguments)?;
    let playbook = find_playbook(state, "playbook_get", &params.playbook_id)?;
    to_value(playbook.to_detail())
}

async fn handle_playbook_apply(state: &SharedState, arguments: Option<Value>) -> McpResult<Value> {
    let params: PlaybookIdParams = parse_arguments("playbook_apply", arguments)?;
    let playbook = find_playbook(state, "playbook_apply", &params.playbook_id)?;
    to_value(state.facilitator.apply_playbook(&playbook).await)
}

// ============================================================================
// Sessions
// ============================================================================

/// Response for session_list
#[derive(Debug, Serialize)]
pub struct SessionListResponse {
    /// Saved sessions, newest first
    pub sessions: Vec<SessionSummary>,
    /// Number of sessions
    pub count: usize,
}

async fn handle_session_list(state: &SharedState) -> McpResult<Value> {
    let sessions = state.facilitator.list_sessions().await?;
    to_value(SessionListResponse {
        count: sessions.len(),
        sessions,
    })
}

#[derive(Debug, Default, Deserialize)]
struct SessionSaveParams {
    #[serde(default)]
    name: Option<String>,
}

async fn handle_session_save(state: &SharedState, arguments: Option<Value>) -> McpResult<Value> {
    let params: SessionSaveParams = parse_optional_arguments("session_save", arguments)?;
    let summary = state
        .facilitator
        .save_session(params.name.as_deref())
        .await?;
    to_value(summary)
}

#[derive(Debug, Deserialize)]
struct SessionIdParams {
    session_id: String,
}

async fn handle_session_load(state: &SharedState, arguments: Option<Value>) -> McpResult<Value> {
    execute_handler("session_load", arguments, |params: SessionIdParams| async move {
        state.facilitator.load_session(&params.session_id).await
    })
    .await
}

async fn handle_session_delete(state: &SharedState, arguments: Option<Value>) -> McpResult<Value> {
    let params: SessionIdParams = parse_arguments("session_delete", arguments)?;
    state.facilitator.delete_session(&params.session_id).await?;
    Ok(serde_json::json!({
        "deleted": true,
        "session_id": params.session_id,
    }))
}

// ============================================================================
// Tour
// ============================================================================

/// Response for tour_status and tour_control
#[derive(Debug, Serialize)]
pub struct TourStatusResponse {
    /// Tour progress
    pub status: TourStatus,
    /// Current step index
    pub index: usize,
    /// Number of steps
    pub total: usize,
    /// Step being shown, if running
    pub step: Option<TourStep>,
}

async fn handle_tour_status(state: &SharedState) -> McpResult<Value> {
    let tour = state.tour.lock().await;
    to_value(TourStatusResponse {
        status: tour.status(),
        index: tour.index(),
        total: tour.len(),
        step: tour.current().cloned(),
    })
}

/// Tour navigation commands
#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TourCommand {
    /// Start or restart from the first step
    Start,
    /// Advance one step
    Next,
    /// Go back one step
    Back,
    /// Dismiss the tour
    Skip,
}

#[derive(Debug, Deserialize)]
struct TourControlParams {
    action: TourCommand,
}

async fn handle_tour_control(state: &SharedState, arguments: Option<Value>) -> McpResult<Value> {
    let params: TourControlParams = parse_arguments("tour_control", arguments)?;
    {
        let mut tour = state.tour.lock().await;
        match params.action {
            TourCommand::Start => tour.start(),
            TourCommand::Next => tour.next(),
            TourCommand::Back => tour.back(),
            TourCommand::Skip => tour.skip(),
        }
    }
    handle_tour_status(state).await
}

/// Parameters for tour_position
#[derive(Debug, Deserialize)]
pub struct TourPositionParams {
    /// Measured target element, if found
    #[serde(default)]
    pub target: Option<Rect>,
    /// Measured tooltip size
    pub tooltip: Size,
    /// Visible area
    pub viewport: Viewport,
}

async fn handle_tour_position(state: &SharedState, arguments: Option<Value>) -> McpResult<Value> {
    let params: TourPositionParams = parse_arguments("tour_position", arguments)?;
    let positioned: Option<PositionedStep> =
        state
            .tour
            .lock()
            .await
            .position(params.target, params.tooltip, params.viewport);
    to_value(positioned)
}

// ============================================================================
// Helper functions
// ============================================================================

fn to_value<T: Serialize>(value: T) -> McpResult<Value> {
    serde_json::to_value(value).map_err(McpError::Json)
}

/// Helper to parse arguments with consistent error handling
fn parse_arguments<T: serde::de::DeserializeOwned>(
    tool_name: &str,
    arguments: Option<Value>,
) -> McpResult<T> {
    match arguments {
        Some(args) => serde_json::from_value(args).map_err(|e| McpError::InvalidParameters {
            tool_name: tool_name.to_string(),
            message: e.to_string(),
        }),
        None => Err(McpError::InvalidParameters {
            tool_name: tool_name.to_string(),
            message: "Missing arguments".to_string(),
        }),
    }
}

/// Like [`parse_arguments`], but missing arguments mean all defaults.
fn parse_optional_arguments<T: serde::de::DeserializeOwned + Default>(
    tool_name: &str,
    arguments: Option<Value>,
) -> McpResult<T> {
    match arguments {
        Some(Value::Null) | None => Ok(T::default()),
        Some(args) => parse_arguments(tool_name, Some(args)),
    }
}

/// Generic handler that parses arguments, runs an operation and serializes
/// its result, mapping any error to [`McpError::ExecutionFailed`].
async fn execute_handler<P, R, E, F, Fut>(
    tool_name: &str,
    arguments: Option<Value>,
    operation: F,
) -> McpResult<Value>
where
    P: serde::de::DeserializeOwned,
    R: Serialize,
    E: std::fmt::Display,
    F: FnOnce(P) -> Fut,
    Fut: std::future::Future<Output = Result<R, E>>,
{
    let params: P = parse_arguments(tool_name, arguments)?;

    let result = operation(params)
        .await
        .map_err(|e| McpError::ExecutionFailed {
            message: e.to_string(),
        })?;

    serde_json::to_value(result).map_err(McpError::Json)
}

//! End-to-end facilitation tests
//!
//! Drives the facilitator against a wiremock model endpoint and an
//! in-memory session store.

use serde_json::{json, Value};
use std::io::Write;
use std::sync::Arc;
use std::time::Duration;
use wiremock::{
    matchers::{body_string_contains, method, path},
    Mock, MockServer, ResponseTemplate,
};

use strategy_facilitator::config::{ModelConfig, RequestConfig};
use strategy_facilitator::intake::{MAX_UPLOAD_BYTES, TOO_LARGE_MESSAGE};
use strategy_facilitator::stages::{ComplexityTier, StageCore, Stages};
use strategy_facilitator::storage::SqliteStorage;
use strategy_facilitator::workflow::{Stage, UNANSWERED_MESSAGE};
use strategy_facilitator::{llm::GeminiClient, Facilitator};

const GENERATE_PATH: &str = "/v1beta/models/test-model:generateContent";

const SUGGESTIONS_MARKER: &str = "must contain between 6 and 8 frameworks";
const FIVE_WHYS_MARKER: &str = "must contain exactly five questions";
const GUIDANCE_MARKER: &str = "You are an expert business strategist";
const SOLUTION_MARKER: &str = "You are a senior business consultant";
const COMPLEXITY_MARKER: &str = "You are assessing how complex a business problem is";
const ALTERNATIVES_MARKER: &str = "Propose 3 alternative or complementary solutions";

async fn create_facilitator(base_url: &str, max_retries: u32) -> Facilitator {
    let model = GeminiClient::new(
        &ModelConfig {
            api_key: "test-api-key".to_string(),
            base_url: base_url.to_string(),
            model: "test-model".to_string(),
        },
        RequestConfig {
            timeout_ms: 5000,
            max_retries,
            retry_delay_ms: 5,
            retry_jitter_ms: 0,
        },
    )
    .unwrap();
    let storage = SqliteStorage::new_in_memory().await.unwrap();

    Facilitator::new(
        Stages::new(StageCore::new(Arc::new(model))),
        Arc::new(storage),
    )
}

/// Gemini envelope around a completion text
fn completion(text: String) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_json(json!({
        "candidates": [{"content": {"role": "model", "parts": [{"text": text}]}}]
    }))
}

async fn mount_stage(server: &MockServer, marker: &str, reply: Value, times: u64) {
    Mock::given(method("POST"))
        .and(path(GENERATE_PATH))
        .and(body_string_contains(marker))
        .respond_with(completion(reply.to_string()))
        .expect(times)
        .mount(server)
        .await;
}

/// Like `mount_stage`, but the reply arrives only after `delay`.
async fn mount_slow_stage(server: &MockServer, marker: &str, reply: Value, delay: Duration) {
    Mock::given(method("POST"))
        .and(path(GENERATE_PATH))
        .and(body_string_contains(marker))
        .respond_with(completion(reply.to_string()).set_delay(delay))
        .expect(1)
        .mount(server)
        .await;
}

fn suggestions_reply() -> Value {
    json!({
        "problemAnalysis": "Users churn after the first month because onboarding fails.",
        "strategicGoals": ["Raise month-2 retention to 60%", "Shorten time to value"],
        "recommendedFrameworks": [
            {"id": "five-whys", "name": "5 Whys", "type": "Analysis", "description": "Trace churn to its root."},
            {"id": "swot", "name": "SWOT Analysis", "type": "Strategy", "description": "Map the position."}
        ]
    })
}

fn five_whys_reply() -> Value {
    json!({
        "title": "Applying the Five Whys",
        "description": "Trace the churn symptom to its root cause.",
        "keyQuestions": [
            "Why do customers leave after a month?",
            "Why do they not see value?",
            "Why is onboarding unclear?",
            "Why was onboarding never tested?",
            "Why is there no research budget?"
        ],
        "actionSteps": ["Interview churned users"],
        "expectedOutcome": "A root cause the team can act on"
    })
}

fn swot_reply() -> Value {
    json!({
        "title": "Applying SWOT Analysis",
        "description": "Map strengths and weaknesses against the churn problem.",
        "keyQuestions": ["What do retained users value most?"],
        "actionSteps": ["List strengths"],
        "expectedOutcome": "A ranked list of levers"
    })
}

fn solution_reply() -> Value {
    json!({
        "title": "Fix onboarding",
        "summary": "Redesign the first week around the core workflow.",
        "recommendations": [
            {"title": "Guided setup", "details": "Ship a three-step setup wizard within six weeks."}
        ]
    })
}

fn complexity_reply() -> Value {
    json!({
        "causeAmbiguity": {"score": 3, "reasoning": "Several plausible causes"},
        "interconnections": {"score": 4, "reasoning": "Product, support and marketing"},
        "businessImpact": {"score": 4, "reasoning": "Churn drives revenue"},
        "strategicRecommendations": ["Form a cross-functional squad"]
    })
}

fn alternatives_reply() -> Value {
    json!([{
        "solutionTitle": "Customer success calls",
        "solutionDescription": "Call every new account in week one.",
        "kpi": {"metric": "Week-1 activation", "target": "70% by Q3"},
        "alert": {"risk": "Support load", "mitigation": "Hire two part-timers"},
        "quote": {"text": "Your most unhappy customers are your greatest source of learning.", "author": "Bill Gates"}
    }])
}

#[tokio::test]
async fn test_full_five_whys_flow() {
    let server = MockServer::start().await;
    mount_stage(&server, SUGGESTIONS_MARKER, suggestions_reply(), 1).await;
    mount_stage(&server, FIVE_WHYS_MARKER, five_whys_reply(), 1).await;
    mount_stage(&server, SOLUTION_MARKER, solution_reply(), 1).await;
    mount_stage(&server, COMPLEXITY_MARKER, complexity_reply(), 1).await;
    mount_stage(&server, ALTERNATIVES_MARKER, alternatives_reply(), 1).await;

    let facilitator = create_facilitator(&server.uri(), 0).await;
    facilitator.load_example().await;

    // Suggestions
    let state = facilitator.suggest().await;
    assert_eq!(state.stage, Stage::SuggestionsReady);
    assert_eq!(state.current_step(), 2);
    let suggestions = state.suggestions.unwrap();
    assert_eq!(suggestions.recommended_frameworks.len(), 2);

    // Guidance
    let state = facilitator.select_framework("5 Whys").await;
    assert_eq!(state.stage, Stage::GuidanceReady);
    assert!(state.is_five_whys());
    assert_eq!(state.answers.len(), 5);
    assert!(state.answers.iter().all(|a| a.answer.is_empty()));

    // Re-selecting the ready framework does not refetch
    let state = facilitator.select_framework("5 Whys").await;
    assert_eq!(state.stage, Stage::GuidanceReady);

    // Solution is blocked until every question is answered
    let state = facilitator.solve().await;
    assert_eq!(state.stage, Stage::GuidanceReady);
    assert_eq!(state.errors.solution.as_deref(), Some(UNANSWERED_MESSAGE));

    for i in 0..5 {
        facilitator.answer(i, format!("Because of cause {}", i + 1)).await;
    }
    let state = facilitator.solve().await;
    assert_eq!(state.stage, Stage::SolutionReady);
    assert_eq!(state.current_step(), 4);
    assert_eq!(state.solution.as_ref().unwrap().title, "Fix onboarding");
    assert!(state.errors.solution.is_none());

    // Complexity: 3 + 4 + 4 = 11
    let state = facilitator.score_complexity().await;
    let report = state.complexity.unwrap();
    assert_eq!(report.assessment.total, 11);
    assert_eq!(report.assessment.tier, ComplexityTier::High);

    // Alternatives
    let state = facilitator.suggest_solutions().await;
    let alternatives = state.alternatives.unwrap();
    assert_eq!(alternatives.len(), 1);
    assert_eq!(alternatives[0].quote.author, "Bill Gates");
    assert_eq!(state.stage, Stage::SolutionReady);
}

#[tokio::test]
async fn test_save_then_load_restores_state() {
    let server = MockServer::start().await;
    mount_stage(&server, SUGGESTIONS_MARKER, suggestions_reply(), 1).await;
    mount_stage(&server, FIVE_WHYS_MARKER, five_whys_reply(), 1).await;

    let facilitator = create_facilitator(&server.uri(), 0).await;
    facilitator.load_example().await;
    facilitator.suggest().await;
    facilitator.select_framework("5 Whys").await;
    facilitator.answer(0, "Onboarding".to_string()).await;
    let before = facilitator.state().await;

    let saved = facilitator.save_session(Some("Churn analysis")).await.unwrap();
    assert_eq!(saved.name, "Churn analysis");

    facilitator
        .set_input(Some("Something else".to_string()), Some(String::new()))
        .await;
    let loaded = facilitator.load_session(&saved.id).await.unwrap();

    assert_eq!(loaded.snapshot(), before.snapshot());
    assert_eq!(loaded.stage, Stage::GuidanceReady);
    assert_eq!(facilitator.list_sessions().await.unwrap(), vec![saved]);
}

#[tokio::test]
async fn test_load_unknown_session_keeps_state() {
    let server = MockServer::start().await;
    let facilitator = create_facilitator(&server.uri(), 0).await;
    facilitator.load_example().await;

    assert!(facilitator.load_session("missing").await.is_err());
    assert!(!facilitator.state().await.problem.is_empty());
}

#[tokio::test]
async fn test_persistent_overload_becomes_inline_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(GENERATE_PATH))
        .respond_with(ResponseTemplate::new(503).set_body_json(json!({
            "error": {"code": 503, "message": "The model is overloaded.", "status": "UNAVAILABLE"}
        })))
        .expect(3)
        .mount(&server)
        .await;

    let facilitator = create_facilitator(&server.uri(), 2).await;
    facilitator.load_example().await;
    let state = facilitator.suggest().await;

    assert_eq!(state.stage, Stage::Idle);
    assert!(!state.loading.suggestions);
    assert!(state
        .errors
        .suggestions
        .as_deref()
        .is_some_and(|e| e.contains("503")));
}

#[tokio::test]
async fn test_fenced_completion_is_accepted() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(GENERATE_PATH))
        .respond_with(completion(format!(
            "```json\n{}\n```",
            suggestions_reply()
        )))
        .expect(1)
        .mount(&server)
        .await;

    let facilitator = create_facilitator(&server.uri(), 0).await;
    facilitator.load_example().await;
    let state = facilitator.suggest().await;

    assert_eq!(state.stage, Stage::SuggestionsReady);
}

#[tokio::test]
async fn test_upload_limits() {
    let server = MockServer::start().await;
    let facilitator = create_facilitator(&server.uri(), 0).await;

    let big = tempfile::Builder::new().suffix(".txt").tempfile().unwrap();
    big.as_file().set_len(2 * MAX_UPLOAD_BYTES).unwrap();
    let err = facilitator.upload_context(big.path()).await.unwrap_err();
    assert!(err.to_string().contains(TOO_LARGE_MESSAGE));
    assert_eq!(facilitator.state().await.context, "");

    let text = "## Context\n".to_string() + &"Retention notes. ".repeat(640);
    assert!(text.len() > 10 * 1024);
    let mut md = tempfile::Builder::new().suffix(".md").tempfile().unwrap();
    md.write_all(text.as_bytes()).unwrap();

    let state = facilitator.upload_context(md.path()).await.unwrap();
    assert_eq!(state.context, text);
}

// ============================================================================
// Concurrent dispatch
// ============================================================================

#[tokio::test]
async fn test_regenerate_while_guidance_pending() {
    let server = MockServer::start().await;
    mount_stage(&server, SUGGESTIONS_MARKER, suggestions_reply(), 2).await;
    mount_slow_stage(&server, GUIDANCE_MARKER, swot_reply(), Duration::from_millis(300)).await;
    mount_stage(&server, FIVE_WHYS_MARKER, five_whys_reply(), 1).await;

    let facilitator = create_facilitator(&server.uri(), 0).await;
    facilitator.load_example().await;
    facilitator.suggest().await;

    tokio::join!(facilitator.select_framework("SWOT Analysis"), async {
        tokio::time::sleep(Duration::from_millis(50)).await;
        facilitator.suggest().await
    });

    // The late guidance answered a framework list that no longer exists
    let state = facilitator.state().await;
    assert_eq!(state.stage, Stage::SuggestionsReady);
    assert!(state.guidance.is_none());
    assert!(state.active_framework.is_none());
    assert!(!state.loading.guidance);

    let state = facilitator.select_framework("5 Whys").await;
    assert_eq!(state.stage, Stage::GuidanceReady);
    assert_eq!(state.answers.len(), 5);
}

#[tokio::test]
async fn test_switching_framework_while_solving() {
    let server = MockServer::start().await;
    mount_stage(&server, SUGGESTIONS_MARKER, suggestions_reply(), 1).await;
    mount_stage(&server, FIVE_WHYS_MARKER, five_whys_reply(), 1).await;
    mount_slow_stage(&server, SOLUTION_MARKER, solution_reply(), Duration::from_millis(300)).await;
    mount_stage(&server, GUIDANCE_MARKER, swot_reply(), 1).await;

    let facilitator = create_facilitator(&server.uri(), 0).await;
    facilitator.load_example().await;
    facilitator.suggest().await;
    facilitator.select_framework("5 Whys").await;
    for i in 0..5 {
        facilitator.answer(i, format!("Cause {}", i + 1)).await;
    }

    let (_, switched) = tokio::join!(facilitator.solve(), async {
        tokio::time::sleep(Duration::from_millis(50)).await;
        facilitator.select_framework("SWOT Analysis").await
    });
    assert_eq!(switched.stage, Stage::GuidanceReady);

    let state = facilitator.state().await;
    assert_eq!(state.stage, Stage::GuidanceReady);
    assert_eq!(state.active_framework.as_deref(), Some("SWOT Analysis"));
    assert!(state.solution.is_none());
    assert!(!state.loading.solution);
}

#[tokio::test]
async fn test_solution_and_complexity_in_parallel() {
    let server = MockServer::start().await;
    mount_stage(&server, SUGGESTIONS_MARKER, suggestions_reply(), 1).await;
    mount_stage(&server, FIVE_WHYS_MARKER, five_whys_reply(), 1).await;
    mount_slow_stage(&server, SOLUTION_MARKER, solution_reply(), Duration::from_millis(200)).await;
    mount_stage(&server, COMPLEXITY_MARKER, complexity_reply(), 1).await;

    let facilitator = create_facilitator(&server.uri(), 0).await;
    facilitator.load_example().await;
    facilitator.suggest().await;
    facilitator.select_framework("5 Whys").await;
    for i in 0..5 {
        facilitator.answer(i, format!("Cause {}", i + 1)).await;
    }

    tokio::join!(facilitator.solve(), facilitator.score_complexity());

    let state = facilitator.state().await;
    assert_eq!(state.stage, Stage::SolutionReady);
    assert_eq!(state.solution.unwrap().title, "Fix onboarding");
    assert_eq!(state.complexity.unwrap().assessment.total, 11);
    assert!(!state.loading.solution && !state.loading.complexity);
}

//! HTTP API for screen/UI code
//!
//! Endpoints:
//! - GET  /health                  - Health check
//! - POST /assessment/new          - Start an assessment
//! - GET  /assessment/{id}         - Session status
//! - POST /assessment/{id}/step    - Submit one step outcome
//! - POST /assessment/{id}/abandon - Discard a session (idempotent)
//! - GET  /policy/{user_id}        - Resolved UI policy for a user
//! - POST /speech                  - Cached speech synthesis
//! - POST /recognize               - Crop photo recognition

use std::sync::Arc;

use axum::{
    body::Bytes,
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Json, Response},
    routing::{get, post},
    Router,
};
use serde::{Deserialize, Serialize};

use crate::core::audio::SpeechOutcome;
use crate::core::backends::RecognitionOutcome;
use crate::core::service::Adaptive;
use crate::types::{
    AssessmentError, AudioError, LanguageCode, RecognitionError, Score, SessionId, SessionPhase,
    SignalStep, SpeechError, Tier, UIPolicy, UserId,
};

/// Error payload returned for every failed request
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub error: String,
}

/// Error wrapper mapping engine errors onto HTTP status codes
struct ApiError {
    status: StatusCode,
    message: String,
}

impl ApiError {
    fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self { status, message: message.into() }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(ErrorBody { error: self.message })).into_response()
    }
}

impl From<AssessmentError> for ApiError {
    fn from(err: AssessmentError) -> Self {
        let status = match &err {
            AssessmentError::OutOfOrderStep { .. } => StatusCode::CONFLICT,
            AssessmentError::SessionNotFound => StatusCode::NOT_FOUND,
            AssessmentError::SessionCompleted => StatusCode::GONE,
            AssessmentError::IncompleteVector { .. } => StatusCode::INTERNAL_SERVER_ERROR,
            AssessmentError::StoreWriteFailed(_) => StatusCode::BAD_GATEWAY,
        };
        Self::new(status, err.to_string())
    }
}

impl From<SpeechError> for ApiError {
    fn from(err: SpeechError) -> Self {
        Self::new(StatusCode::BAD_GATEWAY, err.to_string())
    }
}

impl From<AudioError> for ApiError {
    fn from(err: AudioError) -> Self {
        Self::new(StatusCode::BAD_GATEWAY, err.to_string())
    }
}

impl From<RecognitionError> for ApiError {
    fn from(err: RecognitionError) -> Self {
        Self::new(StatusCode::BAD_GATEWAY, err.to_string())
    }
}

/// Health response
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub sessions_active: usize,
}

/// Start-assessment request
#[derive(Debug, Deserialize)]
pub struct NewAssessmentRequest {
    pub user_id: String,
}

/// Start-assessment response
#[derive(Debug, Serialize)]
pub struct NewAssessmentResponse {
    pub session_id: String,
    pub step_index: usize,
    pub step: SignalStep,
    pub prompt: &'static str,
}

/// Session status response
#[derive(Debug, Serialize)]
pub struct SessionStatusResponse {
    pub session_id: String,
    pub user_id: String,
    pub phase: SessionPhase,
}

/// Step submission request
#[derive(Debug, Deserialize)]
pub struct SubmitStepRequest {
    pub step_index: usize,
    pub outcome: bool,
}

/// Step submission response
#[derive(Debug, Serialize)]
pub struct SubmitStepResponse {
    pub step: SignalStep,
    pub outcome: bool,
    pub next_step: Option<SignalStep>,
    pub next_prompt: Option<&'static str>,
    pub score: Option<Score>,
    pub tier: Option<Tier>,
    pub committed: bool,
}

/// Policy response
#[derive(Debug, Serialize)]
pub struct PolicyResponse {
    pub user_id: String,
    pub tier: Tier,
    pub policy: UIPolicy,
}

/// Speech request. With a `user_id` the call is gated by the user's
/// voice-assist flag; without one it synthesizes unconditionally.
#[derive(Debug, Deserialize)]
pub struct SpeechRequest {
    pub user_id: Option<String>,
    pub text: String,
    pub language: String,
}

/// Create the API router
pub fn create_router(service: Arc<Adaptive>) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/assessment/new", post(new_assessment))
        .route("/assessment/:id", get(assessment_status))
        .route("/assessment/:id/step", post(submit_step))
        .route("/assessment/:id/abandon", post(abandon_assessment))
        .route("/policy/:user_id", get(get_policy))
        .route("/speech", post(speech))
        .route("/recognize", post(recognize))
        .with_state(service)
}

/// Health check endpoint
async fn health(State(service): State<Arc<Adaptive>>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        version: crate::VERSION.to_string(),
        sessions_active: service.session_count().await,
    })
}

/// Start a new assessment session
async fn new_assessment(
    State(service): State<Arc<Adaptive>>,
    Json(req): Json<NewAssessmentRequest>,
) -> Json<NewAssessmentResponse> {
    let session_id = service.begin_assessment(UserId::new(req.user_id)).await;
    let step = SignalStep::Swipe;
    Json(NewAssessmentResponse {
        session_id: session_id.0,
        step_index: 0,
        step,
        prompt: step.prompt(),
    })
}

/// Session status
async fn assessment_status(
    State(service): State<Arc<Adaptive>>,
    Path(id): Path<String>,
) -> Result<Json<SessionStatusResponse>, ApiError> {
    let session = SessionId(id.clone());
    let phase = service
        .session_phase(&session)
        .await
        .ok_or_else(|| ApiError::new(StatusCode::NOT_FOUND, "session not found"))?;
    let user = service
        .session_user(&session)
        .await
        .ok_or_else(|| ApiError::new(StatusCode::NOT_FOUND, "session not found"))?;
    Ok(Json(SessionStatusResponse {
        session_id: id,
        user_id: user.0,
        phase,
    }))
}

/// Submit one step outcome
async fn submit_step(
    State(service): State<Arc<Adaptive>>,
    Path(id): Path<String>,
    Json(req): Json<SubmitStepRequest>,
) -> Result<Json<SubmitStepResponse>, ApiError> {
    let output = service
        .submit_signal(&SessionId(id), req.step_index, req.outcome)
        .await?;
    Ok(Json(SubmitStepResponse {
        step: output.step,
        outcome: output.outcome,
        next_step: output.next_step,
        next_prompt: output.next_step.map(|s| s.prompt()),
        score: output.score,
        tier: output.tier,
        committed: output.committed,
    }))
}

/// Abandon a session. Always 204: abandoning an unknown or terminal
/// session is a no-op, not an error.
async fn abandon_assessment(
    State(service): State<Arc<Adaptive>>,
    Path(id): Path<String>,
) -> StatusCode {
    service.abandon(&SessionId(id)).await;
    StatusCode::NO_CONTENT
}

/// Resolved UI policy for a user (default LOW before first assessment)
async fn get_policy(
    State(service): State<Arc<Adaptive>>,
    Path(user_id): Path<String>,
) -> Result<Json<PolicyResponse>, ApiError> {
    let user = UserId::new(user_id.clone());
    let tier = service
        .tier_for(&user)
        .await
        .map_err(|e| ApiError::new(StatusCode::BAD_GATEWAY, e.to_string()))?;
    Ok(Json(PolicyResponse {
        user_id,
        tier,
        policy: service.resolve_policy(tier),
    }))
}

/// Synthesize (or fetch cached) speech. Returns raw audio bytes, or
/// 204 when the user's tier has voice assist disabled.
async fn speech(
    State(service): State<Arc<Adaptive>>,
    Json(req): Json<SpeechRequest>,
) -> Result<Response, ApiError> {
    let language = LanguageCode::new(&req.language);

    let asset = match req.user_id {
        Some(user_id) => {
            match service
                .speak_for(&UserId::new(user_id), &req.text, &language)
                .await?
            {
                SpeechOutcome::Spoken(asset) => asset,
                SpeechOutcome::VoiceDisabled => {
                    return Ok(StatusCode::NO_CONTENT.into_response());
                }
            }
        }
        None => service.get_or_synthesize(&req.text, &language).await?,
    };

    Ok((
        StatusCode::OK,
        [("content-type", "application/octet-stream")],
        asset.bytes().to_vec(),
    )
        .into_response())
}

/// Identify a crop photo. The request body is the raw image bytes.
async fn recognize(
    State(service): State<Arc<Adaptive>>,
    body: Bytes,
) -> Result<Json<RecognitionOutcome>, ApiError> {
    let outcome = service.recognize_crop(&body).await?;
    Ok(Json(outcome))
}

/// Run the API server
pub async fn run_server(
    addr: &str,
    service: Arc<Adaptive>,
) -> Result<(), Box<dyn std::error::Error>> {
    let router = create_router(service);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!(%addr, "krishi API listening");
    println!("Krishi API running on {}", addr);
    println!("  POST /assessment/new          - Start assessment");
    println!("  GET  /assessment/:id          - Session status");
    println!("  POST /assessment/:id/step     - Submit step outcome");
    println!("  POST /assessment/:id/abandon  - Abandon session");
    println!("  GET  /policy/:user_id         - Resolved UI policy");
    println!("  POST /speech                  - Speech synthesis");
    println!("  POST /recognize               - Crop photo recognition");
    println!("  GET  /health                  - Health check");
    axum::serve(listener, router).await?;
    Ok(())
}

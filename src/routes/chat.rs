use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Json as ResponseJson, Response},
    routing::{get, post},
    Json, Router,
};
use crate::models::{AppState, ChatRequest, ChatResponse, ErrorResponse, HistoryResponse};
use crate::session::SessionError;
use uuid::Uuid;
use tracing::{info, warn};

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/api/chat", post(post_chat))
        .route("/api/chat/{id}/history", get(get_history).delete(clear_history))
        .with_state(state)
}

/// JSON error body with a status code
pub struct ApiError(StatusCode, String);

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.0, Json(ErrorResponse { error: self.1 })).into_response()
    }
}

impl From<SessionError> for ApiError {
    fn from(e: SessionError) -> Self {
        let status = match e {
            SessionError::RateLimited { .. } => StatusCode::TOO_MANY_REQUESTS,
            SessionError::MissingApiKey
            | SessionError::InvalidSettings(_)
            | SessionError::EmptyQuestion => StatusCode::BAD_REQUEST,
        };
        ApiError(status, e.to_string())
    }
}

pub async fn post_chat(
    State(state): State<AppState>,
    Json(request): Json<ChatRequest>,
) -> Result<ResponseJson<ChatResponse>, ApiError> {
    let (session_id, session) = state.sessions.get_or_create(request.session_id).await;
    info!(session_id = %session_id, message_len = request.message.len(), "Received chat request");

    let mut session = session.lock().await;

    if let Some(model) = request.model {
        session.set_model(model);
    }
    if let Some(max_steps) = request.max_steps {
        session.set_max_steps(max_steps)?;
    }

    let outcome = session
        .ask(&state.agent, &request.message)
        .await
        .inspect_err(|e| warn!(session_id = %session_id, error = %e, "Chat request rejected"))?;

    info!(session_id = %session_id, outcome = ?outcome.kind, steps = outcome.steps.len(), "Chat response sent");

    Ok(Json(ChatResponse {
        session_id,
        answer: outcome.answer,
        outcome: outcome.kind,
        steps: outcome.steps,
    }))
}

async fn get_history(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<ResponseJson<HistoryResponse>, ApiError> {
    let session = state.sessions.get(&id).await.ok_or_else(|| not_found(&id))?;
    let turns = session.lock().await.history().to_vec();

    Ok(Json(HistoryResponse { session_id: id, turns }))
}

async fn clear_history(State(state): State<AppState>, Path(id): Path<Uuid>) -> Result<StatusCode, ApiError> {
    let session = state.sessions.get(&id).await.ok_or_else(|| not_found(&id))?;
    session.lock().await.clear_history();
    info!(session_id = %id, "Session history cleared");

    Ok(StatusCode::NO_CONTENT)
}

fn not_found(id: &Uuid) -> ApiError {
    ApiError(StatusCode::NOT_FOUND, format!("Unknown session: {}", id))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::agents::react::testing::ScriptedLlm;
    use crate::routes::testing::state;
    use crate::tools::testing::FakeTools;
    use axum::body::Body;
    use axum::http::Request;
    use serde_json::{json, Value};
    use tower::ServiceExt;

    async fn send(app: &Router, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
        let request = Request::builder()
            .method(method)
            .uri(uri)
            .header("content-type", "application/json")
            .body(body.map(|b| Body::from(b.to_string())).unwrap_or_else(Body::empty))
            .unwrap();

        let response = app.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let json = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, json)
    }

    #[tokio::test]
    async fn test_chat_then_history() {
        let tools = FakeTools::new();
        let llm = ScriptedLlm::replying(&[
            "Thought: look it up\nAction: Wikipedia\nAction Input: Paris",
            "Final Answer: Paris.",
        ]);
        let app = router(state(llm, &tools));

        let (status, body) = send(&app, "POST", "/api/chat", Some(json!({"message": "Capital of France?"}))).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["answer"], "Paris.");
        assert_eq!(body["outcome"], "final_answer");
        assert_eq!(body["steps"][0]["tool"]["tool"], "Wikipedia");

        let session_id = body["session_id"].as_str().unwrap().to_string();
        let (status, history) = send(&app, "GET", &format!("/api/chat/{session_id}/history"), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(history["turns"][0]["assistant"], "Paris.");

        let (status, _) = send(&app, "DELETE", &format!("/api/chat/{session_id}/history"), None).await;
        assert_eq!(status, StatusCode::NO_CONTENT);
        let (_, history) = send(&app, "GET", &format!("/api/chat/{session_id}/history"), None).await;
        assert_eq!(history["turns"], json!([]));
    }

    #[tokio::test]
    async fn test_rate_limited_session_gets_429() {
        let tools = FakeTools::new();
        let replies = vec!["Final Answer: ok"; 6];
        let app = router(state(ScriptedLlm::replying(&replies), &tools));
        let session_id = Uuid::new_v4();
        let body = json!({"message": "q", "session_id": session_id});

        for _ in 0..5 {
            let (status, _) = send(&app, "POST", "/api/chat", Some(body.clone())).await;
            assert_eq!(status, StatusCode::OK);
        }
        let (status, error) = send(&app, "POST", "/api/chat", Some(body)).await;

        assert_eq!(status, StatusCode::TOO_MANY_REQUESTS);
        assert!(error["error"].as_str().unwrap().starts_with("⏱️ Too many requests. Wait "));
    }

    #[tokio::test]
    async fn test_invalid_settings_and_missing_key() {
        let tools = FakeTools::new();
        let app = router(state(ScriptedLlm::replying(&[]), &tools));
        let (status, _) = send(&app, "POST", "/api/chat", Some(json!({"message": "q", "max_steps": 9}))).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let mut llm = ScriptedLlm::replying(&[]);
        llm.configured = false;
        let app = router(state(llm, &tools));
        let (status, error) = send(&app, "POST", "/api/chat", Some(json!({"message": "q"}))).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(error["error"], "🔑 Please add your GROQ API Key.");
    }

    #[tokio::test]
    async fn test_model_override_is_used() {
        let tools = FakeTools::new();
        let app = router(state(ScriptedLlm::replying(&["Final Answer: ok"]), &tools));

        let (status, _) = send(
            &app,
            "POST",
            "/api/chat",
            Some(json!({"message": "q", "model": "gemma2-9b-it", "max_steps": 1})),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
    }

    #[tokio::test]
    async fn test_unknown_session_history() {
        let tools = FakeTools::new();
        let app = router(state(ScriptedLlm::replying(&[]), &tools));
        let (status, error) = send(&app, "GET", &format!("/api/chat/{}/history", Uuid::new_v4()), None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert!(error["error"].as_str().unwrap().starts_with("Unknown session"));
    }
}

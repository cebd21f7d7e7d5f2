use axum::{
    body::Bytes,
    extract::{Path, State},
    http::{header, HeaderMap, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use chrono::Utc;
use parking_lot::RwLock;
use serde::Serialize;
use std::{collections::HashMap, sync::Arc};
use uuid::Uuid;

use crate::{
    auth::{AuthProvider, AuthView},
    error::{AppError, ClipboardError, GenerationError},
    export::{download_headers, export_filename, ClipboardWriter},
    generator::{GenerationGuard, ScriptGenerator},
    models::{
        Catalog, EditScriptRequest, GenerationRequest, Notice, PromptPreview, RegenerateRequest,
        ScriptSession, SessionResponse,
    },
    prompt::build_prompt,
};

#[derive(Clone)]
pub struct AppState {
    pub store: Arc<RwLock<HashMap<Uuid, ScriptSession>>>,
    pub generator: Arc<dyn ScriptGenerator>,
    pub clipboard: Arc<dyn ClipboardWriter>,
    pub auth: Arc<dyn AuthProvider>,
    pub guard: GenerationGuard,
}

impl AppState {
    pub fn new(
        generator: Arc<dyn ScriptGenerator>,
        clipboard: Arc<dyn ClipboardWriter>,
        auth: Arc<dyn AuthProvider>,
    ) -> Self {
        Self { store: Arc::default(), generator, clipboard, auth, guard: GenerationGuard::default() }
    }

    fn session(&self, id: Uuid) -> Result<ScriptSession, AppError> {
        self.store.read().get(&id).cloned().ok_or(AppError::NotFound(id))
    }
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/api/catalog", get(get_catalog))
        .route("/api/prompt", post(preview_prompt))
        .route("/api/scripts", post(create_script))
        .route("/api/scripts/:id", get(get_script).put(edit_script))
        .route("/api/scripts/:id/regenerate", post(regenerate_script))
        .route("/api/scripts/:id/download", get(download_script))
        .route("/api/scripts/:id/copy", post(copy_script))
        .route("/api/auth", get(auth_state))
        .route("/api/auth/sign-out", post(sign_out))
        .with_state(state)
}

pub async fn health() -> &'static str {
    "ok"
}

pub async fn get_catalog() -> Json<Catalog> {
    Json(Catalog::standard())
}

pub async fn preview_prompt(Json(body): Json<GenerationRequest>) -> Result<Json<PromptPreview>, AppError> {
    body.validate()?;
    Ok(Json(PromptPreview { prompt: build_prompt(&body) }))
}

/// Validates, builds the prompt and runs one generation. No lock is held across the await.
async fn run_generation(state: &AppState, request: &GenerationRequest) -> Result<(String, String), GenerationError> {
    request.validate()?;
    let _permit = state.guard.try_acquire()?;

    let prompt = build_prompt(request);
    tracing::info!(
        "🚀 Generating {} script about '{}' via {}",
        request.kind().id(),
        request.topic,
        state.generator.name()
    );
    let script = state.generator.generate(&prompt, request).await?;
    Ok((prompt, script))
}

pub async fn create_script(
    State(state): State<AppState>,
    Json(body): Json<GenerationRequest>,
) -> Result<(StatusCode, Json<SessionResponse>), AppError> {
    let (prompt, script) = run_generation(&state, &body).await?;

    let now = Utc::now();
    let session = ScriptSession { id: Uuid::new_v4(), request: body, prompt, script, created_at: now, updated_at: now };
    state.store.write().insert(session.id, session.clone());
    tracing::info!("✅ Script session {} created ({} chars)", session.id, session.script.len());

    Ok((StatusCode::CREATED, Json(SessionResponse { session, notice: Notice::success("Script generated successfully!") })))
}

pub async fn get_script(Path(id): Path<Uuid>, State(state): State<AppState>) -> Result<Json<ScriptSession>, AppError> {
    state.session(id).map(Json)
}

/// An empty body means "reuse the stored parameters"; anything else must be valid JSON.
fn parse_regenerate_body(headers: &HeaderMap, body: &Bytes) -> Result<Option<RegenerateRequest>, AppError> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(None);
    }
    let is_json = headers
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .map(|v| v.trim_start().to_ascii_lowercase().starts_with("application/json"))
        .unwrap_or(false);
    if !is_json {
        return Err(AppError::InvalidBody("expected an application/json body".to_string()));
    }
    Json::<RegenerateRequest>::from_bytes(body)
        .map(|Json(parsed)| Some(parsed))
        .map_err(|rejection| AppError::InvalidBody(rejection.body_text()))
}

pub async fn regenerate_script(
    Path(id): Path<Uuid>,
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Json<SessionResponse>, AppError> {
    let current = state.session(id)?;
    let request = parse_regenerate_body(&headers, &body)?
        .and_then(|b| b.request)
        .unwrap_or(current.request);

    let (prompt, script) = run_generation(&state, &request).await?;

    let mut guard = state.store.write();
    let session = guard.get_mut(&id).ok_or(AppError::NotFound(id))?;
    session.request = request;
    session.prompt = prompt;
    session.script = script;
    session.updated_at = Utc::now();
    tracing::info!("🔄 Script session {} regenerated", id);

    Ok(Json(SessionResponse { session: session.clone(), notice: Notice::success("Script generated successfully!") }))
}

pub async fn edit_script(
    Path(id): Path<Uuid>,
    State(state): State<AppState>,
    Json(body): Json<EditScriptRequest>,
) -> Result<Json<ScriptSession>, AppError> {
    let mut guard = state.store.write();
    let session = guard.get_mut(&id).ok_or(AppError::NotFound(id))?;
    session.script = body.script;
    session.updated_at = Utc::now();
    Ok(Json(session.clone()))
}

pub async fn download_script(Path(id): Path<Uuid>, State(state): State<AppState>) -> Result<Response, AppError> {
    let session = state.session(id)?;
    let filename = export_filename(&session.request.script_type, &session.request.topic);
    let mut headers = download_headers(&filename);
    headers.insert("x-notice", HeaderValue::from_static("Script downloaded!"));
    tracing::info!("📄 Exporting script session {} as {}", id, filename);
    Ok((StatusCode::OK, headers, session.script).into_response())
}

#[derive(Debug, Serialize)]
pub struct CopyResponse {
    pub copied: bool,
    pub notice: Notice,
}

pub async fn copy_script(Path(id): Path<Uuid>, State(state): State<AppState>) -> Result<Json<CopyResponse>, AppError> {
    let session = state.session(id)?;
    let clipboard = state.clipboard.clone();
    let result = tokio::task::spawn_blocking(move || clipboard.write_text(&session.script))
        .await
        .unwrap_or_else(|e| Err(ClipboardError::Write(e.to_string())));

    let response = match result {
        Ok(()) => CopyResponse { copied: true, notice: Notice::success("Script copied to clipboard!") },
        Err(e) => {
            tracing::warn!("⚠️ Clipboard copy for {} failed: {}", id, e);
            CopyResponse { copied: false, notice: Notice::error("Failed to copy script") }
        }
    };
    Ok(Json(response))
}

pub async fn auth_state(State(state): State<AppState>, headers: HeaderMap) -> Json<AuthView> {
    let user = state.auth.current_user(&headers);
    Json(AuthView::from_user(user.as_ref(), state.auth.sign_in_path()))
}

#[derive(Debug, Serialize)]
pub struct SignOutResponse {
    pub redirect_to: String,
    pub notice: Notice,
}

pub async fn sign_out(State(state): State<AppState>, headers: HeaderMap) -> Result<Json<SignOutResponse>, AppError> {
    state.auth.sign_out(&headers).await?;
    Ok(Json(SignOutResponse {
        redirect_to: state.auth.sign_in_path().to_string(),
        notice: Notice::success("Signed out successfully"),
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{auth::AuthUser, error::AuthError, models::NoticeLevel};
    use async_trait::async_trait;
    use axum::{body::Body, http::Request};
    use serde_json::{json, Value};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use tower::ServiceExt;

    #[derive(Default)]
    struct CountingGenerator {
        calls: AtomicUsize,
    }

    #[async_trait]
    impl ScriptGenerator for CountingGenerator {
        async fn generate(&self, _prompt: &str, request: &GenerationRequest) -> Result<String, GenerationError> {
            let n = self.calls.fetch_add(1, Ordering::SeqCst) + 1;
            Ok(format!("script #{} about {}", n, request.topic))
        }

        fn name(&self) -> &'static str {
            "counting"
        }
    }

    struct FailingGenerator;

    #[async_trait]
    impl ScriptGenerator for FailingGenerator {
        async fn generate(&self, _prompt: &str, _request: &GenerationRequest) -> Result<String, GenerationError> {
            Err(GenerationError::Api { message: "bad key".into(), status: 401, body: String::new() })
        }

        fn name(&self) -> &'static str {
            "failing"
        }
    }

    #[derive(Default)]
    struct MemoryClipboard {
        contents: parking_lot::Mutex<Option<String>>,
        broken: bool,
    }

    impl ClipboardWriter for MemoryClipboard {
        fn write_text(&self, text: &str) -> Result<(), ClipboardError> {
            if self.broken {
                return Err(ClipboardError::Unavailable("no display".into()));
            }
            *self.contents.lock() = Some(text.to_string());
            Ok(())
        }
    }

    struct StubAuth {
        user: Option<AuthUser>,
        fail_sign_out: bool,
    }

    #[async_trait]
    impl AuthProvider for StubAuth {
        fn current_user(&self, _headers: &HeaderMap) -> Option<AuthUser> {
            self.user.clone()
        }

        async fn sign_out(&self, _headers: &HeaderMap) -> Result<(), AuthError> {
            if self.fail_sign_out {
                Err(AuthError::SignOut("provider offline".into()))
            } else {
                Ok(())
            }
        }

        fn sign_in_path(&self) -> &str {
            "/auth"
        }
    }

    struct Harness {
        state: AppState,
        generator: Arc<CountingGenerator>,
        clipboard: Arc<MemoryClipboard>,
    }

    fn harness() -> Harness {
        let generator = Arc::new(CountingGenerator::default());
        let clipboard = Arc::new(MemoryClipboard::default());
        let auth = Arc::new(StubAuth { user: Some(AuthUser { email: Some("sam@example.com".into()) }), fail_sign_out: false });
        let state = AppState::new(generator.clone(), clipboard.clone(), auth);
        Harness { state, generator, clipboard }
    }

    fn form() -> Value {
        json!({
            "script_type": "advertisement",
            "topic": "New Shoe Launch!!",
            "tone": "Energetic",
            "length": "short",
            "audience": "Young Adults"
        })
    }

    async fn send(state: &AppState, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, HeaderMap, Vec<u8>) {
        let builder = Request::builder().method(method).uri(uri);
        let request = match body {
            Some(v) => builder.header("content-type", "application/json").body(Body::from(v.to_string())).unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };
        let response = router(state.clone()).oneshot(request).await.unwrap();
        let status = response.status();
        let headers = response.headers().clone();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, headers, bytes.to_vec())
    }

    async fn send_json(state: &AppState, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
        let (status, _, bytes) = send(state, method, uri, body).await;
        (status, serde_json::from_slice(&bytes).unwrap_or(Value::Null))
    }

    async fn create(state: &AppState) -> Uuid {
        let (status, body) = send_json(state, "POST", "/api/scripts", Some(form())).await;
        assert_eq!(status, StatusCode::CREATED);
        body["session"]["id"].as_str().unwrap().parse().unwrap()
    }

    #[tokio::test]
    async fn generate_stores_session_and_reports_success() {
        let h = harness();
        let (status, body) = send_json(&h.state, "POST", "/api/scripts", Some(form())).await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(body["session"]["script"], "script #1 about New Shoe Launch!!");
        assert_eq!(body["notice"]["level"], "success");
        assert_eq!(body["notice"]["message"], "Script generated successfully!");
        assert!(body["session"]["prompt"].as_str().unwrap().contains("Topic: New Shoe Launch!!"));
        assert_eq!(h.state.store.read().len(), 1);
    }

    #[tokio::test]
    async fn blank_field_blocks_generation_without_calling_out() {
        let h = harness();
        let request = json!({
            "script_type": "youtube",
            "topic": "",
            "tone": "Casual",
            "length": "short",
            "audience": "Students"
        });
        let (status, body) = send_json(&h.state, "POST", "/api/scripts", Some(request)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["notice"]["message"], "Please fill in all required fields");
        assert_eq!(h.generator.calls.load(Ordering::SeqCst), 0);
        assert!(h.state.store.read().is_empty());
    }

    #[tokio::test]
    async fn in_flight_generation_rejects_a_second_one() {
        let h = harness();
        let _permit = h.state.guard.try_acquire().unwrap();
        let (status, body) = send_json(&h.state, "POST", "/api/scripts", Some(form())).await;
        assert_eq!(status, StatusCode::CONFLICT);
        assert_eq!(body["notice"]["message"], "A script is already being generated");
        assert_eq!(h.generator.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn upstream_failure_surfaces_message() {
        let state = AppState::new(
            Arc::new(FailingGenerator),
            Arc::new(MemoryClipboard::default()),
            Arc::new(StubAuth { user: None, fail_sign_out: false }),
        );
        let (status, body) = send_json(&state, "POST", "/api/scripts", Some(form())).await;
        assert_eq!(status, StatusCode::BAD_GATEWAY);
        assert_eq!(body["notice"]["level"], "error");
        assert_eq!(body["notice"]["message"], "Failed to generate script: bad key");
        assert!(!state.guard.is_busy());
    }

    #[tokio::test]
    async fn edited_script_is_what_gets_downloaded() {
        let h = harness();
        let id = create(&h.state).await;

        let (status, body) = send_json(&h.state, "PUT", &format!("/api/scripts/{}", id), Some(json!({ "script": "my edit" }))).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["script"], "my edit");

        let (status, headers, bytes) = send(&h.state, "GET", &format!("/api/scripts/{}/download", id), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(bytes, b"my edit");
        assert_eq!(
            headers["content-disposition"],
            "attachment; filename=\"advertisement-script-new-shoe-launch.txt\""
        );
        assert_eq!(headers["x-notice"], "Script downloaded!");
    }

    #[tokio::test]
    async fn regenerate_replaces_script_with_new_parameters() {
        let h = harness();
        let id = create(&h.state).await;

        let mut changed = form();
        changed["topic"] = json!("Trail Runners");
        let (status, body) = send_json(
            &h.state,
            "POST",
            &format!("/api/scripts/{}/regenerate", id),
            Some(json!({ "request": changed })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["session"]["script"], "script #2 about Trail Runners");
        assert_eq!(body["session"]["request"]["topic"], "Trail Runners");

        let (_, body) = send_json(&h.state, "POST", &format!("/api/scripts/{}/regenerate", id), None).await;
        assert_eq!(body["session"]["script"], "script #3 about Trail Runners");
    }

    #[tokio::test]
    async fn malformed_regenerate_body_is_rejected_and_keeps_script() {
        let h = harness();
        let id = create(&h.state).await;

        let (status, body) = send_json(
            &h.state,
            "POST",
            &format!("/api/scripts/{}/regenerate", id),
            Some(json!({ "request": { "topic": 5 } })),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["notice"]["level"], "error");
        assert_eq!(body["notice"]["message"], "Invalid request body");
        assert_eq!(h.generator.calls.load(Ordering::SeqCst), 1);
        assert_eq!(h.state.session(id).unwrap().script, "script #1 about New Shoe Launch!!");
    }

    #[tokio::test]
    async fn non_json_regenerate_body_is_rejected() {
        let h = harness();
        let id = create(&h.state).await;

        let request = Request::builder()
            .method("POST")
            .uri(format!("/api/scripts/{}/regenerate", id))
            .header("content-type", "text/plain")
            .body(Body::from("topic=shoes"))
            .unwrap();
        let response = router(h.state.clone()).oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(h.generator.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn unknown_session_is_not_found() {
        let h = harness();
        let (status, body) = send_json(&h.state, "GET", &format!("/api/scripts/{}", Uuid::new_v4()), None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["notice"]["level"], "error");
    }

    #[tokio::test]
    async fn copy_writes_to_clipboard() {
        let h = harness();
        let id = create(&h.state).await;
        let (status, body) = send_json(&h.state, "POST", &format!("/api/scripts/{}/copy", id), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["copied"], true);
        assert_eq!(body["notice"]["message"], "Script copied to clipboard!");
        assert_eq!(h.clipboard.contents.lock().as_deref(), Some("script #1 about New Shoe Launch!!"));
    }

    #[tokio::test]
    async fn clipboard_failure_is_only_a_notice() {
        let state = AppState::new(
            Arc::new(CountingGenerator::default()),
            Arc::new(MemoryClipboard { broken: true, ..MemoryClipboard::default() }),
            Arc::new(StubAuth { user: None, fail_sign_out: false }),
        );
        let id = create(&state).await;
        let (status, body) = send_json(&state, "POST", &format!("/api/scripts/{}/copy", id), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["copied"], false);
        assert_eq!(body["notice"]["level"], "error");
    }

    #[tokio::test]
    async fn prompt_preview_validates_first() {
        let h = harness();
        let (status, body) = send_json(&h.state, "POST", "/api/prompt", Some(form())).await;
        assert_eq!(status, StatusCode::OK);
        assert!(body["prompt"].as_str().unwrap().starts_with("Write a high-converting advertisement script"));

        let (status, _) = send_json(&h.state, "POST", "/api/prompt", Some(json!({ "script_type": "social" }))).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(h.generator.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn catalog_and_health() {
        let h = harness();
        let (status, body) = send_json(&h.state, "GET", "/api/catalog", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["script_types"].as_array().unwrap().len(), 8);
        assert_eq!(body["lengths"][3]["label"], "Extended (5+ minutes)");

        let (status, _, bytes) = send(&h.state, "GET", "/health", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(bytes, b"ok");
    }

    #[tokio::test]
    async fn auth_view_and_sign_out() {
        let h = harness();
        let (_, body) = send_json(&h.state, "GET", "/api/auth", None).await;
        assert_eq!(body["signed_in"], true);
        assert_eq!(body["email"], "sam@example.com");
        assert_eq!(body["avatar_initial"], "S");
        assert_eq!(body["action"], "sign_out");

        let (status, body) = send_json(&h.state, "POST", "/api/auth/sign-out", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["redirect_to"], "/auth");
        assert_eq!(body["notice"]["message"], "Signed out successfully");
    }

    #[tokio::test]
    async fn failed_sign_out_reports_error() {
        let state = AppState::new(
            Arc::new(CountingGenerator::default()),
            Arc::new(MemoryClipboard::default()),
            Arc::new(StubAuth { user: None, fail_sign_out: true }),
        );
        let (_, body) = send_json(&state, "GET", "/api/auth", None).await;
        assert_eq!(body["signed_in"], false);
        assert_eq!(body["action"], "sign_in");

        let (status, body) = send_json(&state, "POST", "/api/auth/sign-out", None).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["notice"]["level"], serde_json::to_value(NoticeLevel::Error).unwrap());
        assert_eq!(body["notice"]["message"], "Failed to sign out");
    }
}

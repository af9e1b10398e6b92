pub mod health;

use axum::{
    routing::{get, post},
    Router,
};

use crate::session::handlers;
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        .route("/api/v1/session", get(handlers::handle_get_session))
        .route("/api/v1/session/reset", post(handlers::handle_reset))
        .route("/api/v1/resume/upload", post(handlers::handle_upload))
        .route("/api/v1/resume/text", post(handlers::handle_upload_text))
        .route("/api/v1/resume/parse", post(handlers::handle_parse))
        .route("/api/v1/resume/retarget", post(handlers::handle_retarget))
        .route(
            "/api/v1/resume/edit",
            post(handlers::handle_begin_edit)
                .put(handlers::handle_save_edit)
                .delete(handlers::handle_cancel_edit),
        )
        .route("/api/v1/resume/export", get(handlers::handle_export))
        .route("/api/v1/resume/markdown", get(handlers::handle_markdown))
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;
    use std::sync::Arc;

    use axum::{
        body::{to_bytes, Body},
        http::{header, Method, Request, StatusCode},
    };
    use serde_json::{json, Value};
    use tower::ServiceExt;

    use super::*;
    use crate::config::Config;
    use crate::extract::testing::FixedExtractor;
    use crate::llm_client::testing::ScriptedGenerator;
    use crate::llm_client::{DEFAULT_BASE_URL, DEFAULT_MODEL};
    use crate::profile::models::fixtures::jane_doe;
    use crate::profile::retarget::ImmutableFieldPolicy;
    use crate::session::SessionController;
    use crate::store::JsonFileStore;

    struct TestApp {
        _dir: tempfile::TempDir,
        store: JsonFileStore,
        router: Router,
    }

    fn test_app(generator: ScriptedGenerator, saved: bool) -> TestApp {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonFileStore::new(dir.path().join("resume-data.json"));
        if saved {
            store.save(&jane_doe()).unwrap();
        }
        let controller = SessionController::restore(
            store.clone(),
            Arc::new(generator),
            Arc::new(FixedExtractor("Jane Doe resume")),
            ImmutableFieldPolicy::Reject,
        )
        .unwrap();
        let config = Config {
            openai_api_key: None,
            openai_base_url: DEFAULT_BASE_URL.to_string(),
            openai_model: DEFAULT_MODEL.to_string(),
            resume_data_path: PathBuf::from(store.path()),
            immutable_field_policy: ImmutableFieldPolicy::Reject,
            port: 0,
            rust_log: "info".to_string(),
        };
        TestApp {
            _dir: dir,
            store,
            router: build_router(AppState::new(controller, config)),
        }
    }

    async fn send(router: &Router, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
        let request = Request::builder().method(method).uri(uri);
        let request = match body {
            Some(body) => request
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string())),
            None => request.body(Body::empty()),
        }
        .unwrap();

        let response = router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let value = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
        (status, value)
    }

    #[tokio::test]
    async fn test_health_reports_missing_credential() {
        let app = test_app(ScriptedGenerator::default(), false);
        let (status, body) = send(&app.router, Method::GET, "/health", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["credential_configured"], false);
    }

    #[tokio::test]
    async fn test_fresh_session_is_empty() {
        let app = test_app(ScriptedGenerator::default(), false);
        let (status, body) = send(&app.router, Method::GET, "/api/v1/session", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["phase"], "empty");
        assert!(body.get("profile").is_none());
    }

    #[tokio::test]
    async fn test_text_upload_then_parse() {
        let reply = json!({
            "personalInfo": {"name": "Jane Doe"},
            "experience": [{"title": "Engineer", "company": "Acme", "duration": "2019-2021", "description": "built APIs"}]
        })
        .to_string();
        let app = test_app(ScriptedGenerator::replying(&[reply.as_str()]), false);

        let (status, body) = send(
            &app.router,
            Method::POST,
            "/api/v1/resume/text",
            Some(json!({"text": "Jane Doe, Engineer at Acme"})),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["phase"], "uploaded");

        let (status, body) = send(&app.router, Method::POST, "/api/v1/resume/parse", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["phase"], "ready");
        assert_eq!(body["profile"]["personalInfo"]["name"], "Jane Doe");
        assert_eq!(body["profile"]["personalInfo"]["email"], "");
        assert!(app.store.load().unwrap().is_some());
    }

    #[tokio::test]
    async fn test_malformed_parse_returns_error_body() {
        let app = test_app(ScriptedGenerator::replying(&["nope"]), false);
        send(
            &app.router,
            Method::POST,
            "/api/v1/resume/text",
            Some(json!({"text": "Jane Doe"})),
        )
        .await;

        let (status, body) = send(&app.router, Method::POST, "/api/v1/resume/parse", None).await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(body["error"]["code"], "MALFORMED_OUTPUT");

        let (_, body) = send(&app.router, Method::GET, "/api/v1/session", None).await;
        assert_eq!(body["phase"], "uploaded");
    }

    #[tokio::test]
    async fn test_retarget_without_job_description_is_bad_request() {
        let app = test_app(ScriptedGenerator::default(), true);
        let (status, body) = send(
            &app.router,
            Method::POST,
            "/api/v1/resume/retarget",
            Some(json!({"job_description": ""})),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"]["code"], "VALIDATION_ERROR");
    }

    #[tokio::test]
    async fn test_missing_body_field_uses_error_envelope() {
        let app = test_app(ScriptedGenerator::default(), false);
        let (status, body) = send(
            &app.router,
            Method::POST,
            "/api/v1/resume/text",
            Some(json!({"content": "Jane Doe"})),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"]["code"], "VALIDATION_ERROR");
        assert!(body["error"]["message"].as_str().unwrap().contains("text"));

        let (_, body) = send(&app.router, Method::GET, "/api/v1/session", None).await;
        assert_eq!(body["phase"], "empty");
    }

    #[tokio::test]
    async fn test_non_json_body_uses_error_envelope() {
        let app = test_app(ScriptedGenerator::default(), true);
        let request = Request::builder()
            .method(Method::POST)
            .uri("/api/v1/resume/retarget")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from("{ job_description"))
            .unwrap();
        let response = app.router.clone().oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body: Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body["error"]["code"], "VALIDATION_ERROR");
    }

    #[tokio::test]
    async fn test_upload_without_multipart_uses_error_envelope() {
        let app = test_app(ScriptedGenerator::default(), false);
        let (status, body) = send(&app.router, Method::POST, "/api/v1/resume/upload", None).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"]["code"], "VALIDATION_ERROR");
    }

    #[tokio::test]
    async fn test_retarget_before_upload_is_conflict() {
        let app = test_app(ScriptedGenerator::default(), false);
        let (status, body) = send(
            &app.router,
            Method::POST,
            "/api/v1/resume/retarget",
            Some(json!({"job_description": "Seeking a data scientist..."})),
        )
        .await;
        assert_eq!(status, StatusCode::CONFLICT);
        assert_eq!(body["error"]["code"], "INVALID_STATE");
    }

    #[tokio::test]
    async fn test_edit_with_comma_skills() {
        let app = test_app(ScriptedGenerator::default(), true);
        let (status, _) = send(&app.router, Method::POST, "/api/v1/resume/edit", None).await;
        assert_eq!(status, StatusCode::OK);

        let mut profile = serde_json::to_value(jane_doe()).unwrap();
        profile["skills"] = json!("Python, Statistics ,");
        let (status, body) = send(
            &app.router,
            Method::PUT,
            "/api/v1/resume/edit",
            Some(json!({ "profile": profile })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["phase"], "ready");
        assert_eq!(body["profile"]["skills"], json!(["Python", "Statistics"]));
        assert_eq!(
            app.store.load().unwrap().unwrap().skills,
            vec!["Python", "Statistics"]
        );
    }

    #[tokio::test]
    async fn test_export_is_json_attachment() {
        let app = test_app(ScriptedGenerator::default(), true);
        let request = Request::builder()
            .uri("/api/v1/resume/export")
            .body(Body::empty())
            .unwrap();
        let response = app.router.clone().oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            response.headers()[header::CONTENT_DISPOSITION],
            "attachment; filename=\"resume.json\""
        );
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let exported: crate::profile::Profile = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(exported, jane_doe());
    }

    #[tokio::test]
    async fn test_reset_returns_to_empty() {
        let app = test_app(ScriptedGenerator::default(), true);
        let (status, body) = send(&app.router, Method::POST, "/api/v1/session/reset", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["phase"], "empty");
        assert!(app.store.load().unwrap().is_some());
    }
}

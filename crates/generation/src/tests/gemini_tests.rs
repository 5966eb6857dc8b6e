use std::sync::Arc;

use super::*;
use crate::{build_request, generate, GenerationErrorKind};
use axum::{
    extract::{Path, State},
    http::{HeaderMap, StatusCode},
    routing::post,
    Json, Router,
};
use serde_json::json;
use shared::domain::{FormData, GraduateDimension, LearnerProfile, PromptProfile};
use tokio::{net::TcpListener, sync::Mutex};

#[derive(Clone)]
struct UpstreamState {
    status: StatusCode,
    reply: Value,
    seen: Arc<Mutex<Vec<(String, HeaderMap, Value)>>>,
}

async fn handle_generate(
    State(state): State<UpstreamState>,
    Path(call): Path<String>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> (StatusCode, Json<Value>) {
    state.seen.lock().await.push((call, headers, body));
    (state.status, Json(state.reply.clone()))
}

async fn spawn_upstream(state: UpstreamState) -> String {
    let app = Router::new()
        .route("/v1beta/models/*call", post(handle_generate))
        .with_state(state);
    let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
    let addr = listener.local_addr().expect("addr");
    tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });
    format!("http://{addr}")
}

fn client_for(base_url: &str, api_key: &str) -> GeminiClient {
    GeminiClient::new(GeminiConfig {
        base_url: Url::parse(base_url).expect("url"),
        model: "test-model".into(),
        api_key: api_key.into(),
    })
}

fn sample_request() -> GenerationRequest {
    let mut form = FormData::default();
    form.school_name = "SD Negeri 2".into();
    form.dimensions.insert(GraduateDimension::Health);
    build_request(&form, PromptProfile::Standard)
}

fn envelope(text: &str) -> Value {
    json!({
        "candidates": [{
            "content": { "role": "model", "parts": [{ "text": text }] },
            "finishReason": "STOP"
        }]
    })
}

fn valid_rpm_text() -> String {
    json!({
        "identifikasi": {
            "siswa": "Siswa kelas 1",
            "lintasDisiplin": "Seni",
            "kemitraan": "Puskesmas",
            "lingkungan": "Halaman sekolah",
            "pemanfaatanDigital": "Padlet",
            "topik": "Hidup Sehat"
        },
        "pengalamanBelajar": {
            "pertemuan": [{ "memahami": "a", "mengaplikasi": "b", "refleksi": "c" }]
        },
        "asesmen": { "awal": "x", "proses": "y", "akhir": "z" }
    })
    .to_string()
}

#[tokio::test]
async fn sends_instruction_schema_and_key_header() {
    let state = UpstreamState {
        status: StatusCode::OK,
        reply: envelope(&valid_rpm_text()),
        seen: Arc::new(Mutex::new(Vec::new())),
    };
    let base = spawn_upstream(state.clone()).await;
    let client = client_for(&base, "secret-key");
    let request = sample_request();

    let rpm = generate(&client, &request).await.expect("generate");
    assert_eq!(
        rpm.identification.learner,
        LearnerProfile::Narrative {
            text: "Siswa kelas 1".into()
        }
    );

    let seen = state.seen.lock().await;
    assert_eq!(seen.len(), 1);
    let (call, headers, body) = &seen[0];
    assert_eq!(call, "test-model:generateContent");
    assert_eq!(headers["x-goog-api-key"], "secret-key");
    assert_eq!(body["contents"][0]["role"], "user");
    assert_eq!(body["contents"][0]["parts"][0]["text"], request.instruction);
    assert_eq!(
        body["generationConfig"]["responseMimeType"],
        "application/json"
    );
    assert_eq!(
        &body["generationConfig"]["responseSchema"],
        request.schema.as_value()
    );
}

#[tokio::test]
async fn non_success_status_is_a_service_error() {
    let state = UpstreamState {
        status: StatusCode::TOO_MANY_REQUESTS,
        reply: json!({ "error": { "message": "quota" } }),
        seen: Arc::new(Mutex::new(Vec::new())),
    };
    let base = spawn_upstream(state).await;
    let err = generate(&client_for(&base, "k"), &sample_request())
        .await
        .expect_err("should fail");
    match &err {
        GenerationError::Status { status, body } => {
            assert_eq!(*status, 429);
            assert!(body.contains("quota"));
        }
        other => panic!("unexpected error: {other:?}"),
    }
    assert_eq!(err.kind(), GenerationErrorKind::Service);
}

#[tokio::test]
async fn empty_candidate_list_fails_validation() {
    let state = UpstreamState {
        status: StatusCode::OK,
        reply: json!({ "candidates": [] }),
        seen: Arc::new(Mutex::new(Vec::new())),
    };
    let base = spawn_upstream(state).await;
    let err = generate(&client_for(&base, "k"), &sample_request())
        .await
        .expect_err("should fail");
    assert_eq!(err.kind(), GenerationErrorKind::Malformed);
}

#[tokio::test]
async fn missing_key_fails_before_any_request() {
    let state = UpstreamState {
        status: StatusCode::OK,
        reply: envelope(&valid_rpm_text()),
        seen: Arc::new(Mutex::new(Vec::new())),
    };
    let base = spawn_upstream(state.clone()).await;
    let err = generate(&client_for(&base, "  "), &sample_request())
        .await
        .expect_err("should fail");
    assert!(matches!(err, GenerationError::MissingApiKey));
    assert_eq!(err.kind(), GenerationErrorKind::Configuration);
    assert!(state.seen.lock().await.is_empty());
}

#[tokio::test]
async fn unreachable_service_is_a_transport_error() {
    let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
    let addr = listener.local_addr().expect("addr");
    drop(listener);

    let err = generate(
        &client_for(&format!("http://{addr}"), "k"),
        &sample_request(),
    )
    .await
    .expect_err("should fail");
    assert_eq!(err.kind(), GenerationErrorKind::Transport);
}

#[test]
fn endpoint_joins_model_path() {
    let client = client_for("https://example.test/", "k");
    assert_eq!(
        client.endpoint().expect("endpoint").as_str(),
        "https://example.test/v1beta/models/test-model:generateContent"
    );
}

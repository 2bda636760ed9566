use axum::Router;
use axum::response::IntoResponse;
use axum::routing::post;
use tokio::net::TcpListener;
use tokio::sync::oneshot;

use murmur::application::ports::{
    CleanupError, TranscriptCleanup, TranscriptionEngine, TranscriptionError,
};
use murmur::infrastructure::openai::{OpenAiCleanupService, OpenAiTranscriptionEngine};

async fn start_mock_server(
    route: &'static str,
    response_status: u16,
    response_body: &'static str,
) -> (String, oneshot::Sender<()>) {
    let (shutdown_tx, shutdown_rx) = oneshot::channel::<()>();

    let app = Router::new().route(
        route,
        post(move || async move {
            let status = axum::http::StatusCode::from_u16(response_status).unwrap();
            (status, response_body).into_response()
        }),
    );

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let base_url = format!("http://{}", addr);

    tokio::spawn(async move {
        axum::serve(listener, app)
            .with_graceful_shutdown(async {
                shutdown_rx.await.ok();
            })
            .await
            .ok();
    });

    (base_url, shutdown_tx)
}

#[tokio::test]
async fn given_valid_audio_when_transcribing_then_returns_text() {
    let (base_url, shutdown_tx) =
        start_mock_server("/audio/transcriptions", 200, r#"{"text": " Hello there. "}"#).await;

    let engine =
        OpenAiTranscriptionEngine::new(Some("test-key".to_string()), Some(base_url), None);
    let result = engine.transcribe(b"fake audio", "part-000.mp3").await;

    assert_eq!(result.unwrap(), "Hello there.");
    shutdown_tx.send(()).ok();
}

#[tokio::test]
async fn given_api_error_status_when_transcribing_then_api_request_failed() {
    let (base_url, shutdown_tx) = start_mock_server(
        "/audio/transcriptions",
        429,
        r#"{"error": {"message": "rate limited"}}"#,
    )
    .await;

    let engine =
        OpenAiTranscriptionEngine::new(Some("test-key".to_string()), Some(base_url), None);
    let result = engine.transcribe(b"fake audio", "part-000.mp3").await;

    assert!(matches!(
        result,
        Err(TranscriptionError::ApiRequestFailed(_))
    ));
    shutdown_tx.send(()).ok();
}

#[tokio::test]
async fn given_missing_api_key_when_transcribing_then_not_configured() {
    let engine = OpenAiTranscriptionEngine::new(None, None, None);

    let result = engine.transcribe(b"fake audio", "part-000.mp3").await;

    assert!(matches!(result, Err(TranscriptionError::NotConfigured)));
}

#[tokio::test]
async fn given_blank_api_key_when_transcribing_then_not_configured() {
    let engine = OpenAiTranscriptionEngine::new(Some(String::new()), None, None);

    let result = engine.transcribe(b"fake audio", "part-000.mp3").await;

    assert!(matches!(result, Err(TranscriptionError::NotConfigured)));
}

#[tokio::test]
async fn given_chat_completion_when_cleaning_then_returns_markdown() {
    let body = r##"{"choices": [{"message": {"role": "assistant", "content": "# Transcript\n\nSpeaker 1: Hi."}}]}"##;
    let (base_url, shutdown_tx) = start_mock_server("/chat/completions", 200, body).await;

    let cleanup = OpenAiCleanupService::new(Some("test-key".to_string()), Some(base_url), None);
    let result = cleanup.clean("hi um hello").await;

    assert_eq!(result.unwrap(), "# Transcript\n\nSpeaker 1: Hi.");
    shutdown_tx.send(()).ok();
}

#[tokio::test]
async fn given_api_error_status_when_cleaning_then_api_request_failed() {
    let (base_url, shutdown_tx) =
        start_mock_server("/chat/completions", 500, "internal error").await;

    let cleanup = OpenAiCleanupService::new(Some("test-key".to_string()), Some(base_url), None);
    let result = cleanup.clean("raw").await;

    assert!(matches!(result, Err(CleanupError::ApiRequestFailed(_))));
    shutdown_tx.send(()).ok();
}

#[tokio::test]
async fn given_empty_choices_when_cleaning_then_invalid_response() {
    let (base_url, shutdown_tx) =
        start_mock_server("/chat/completions", 200, r#"{"choices": []}"#).await;

    let cleanup = OpenAiCleanupService::new(Some("test-key".to_string()), Some(base_url), None);
    let result = cleanup.clean("raw").await;

    assert!(matches!(result, Err(CleanupError::InvalidResponse(_))));
    shutdown_tx.send(()).ok();
}

#[tokio::test]
async fn given_missing_api_key_when_cleaning_then_not_configured() {
    let cleanup = OpenAiCleanupService::new(None, None, None);

    let result = cleanup.clean("raw").await;

    assert!(matches!(result, Err(CleanupError::NotConfigured)));
}

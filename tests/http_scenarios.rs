use std::sync::{Arc, OnceLock};

use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode, header};
use http_body_util::BodyExt;
use serde_json::{Value, json};
use tower::ServiceExt;

use sentiscope::artifact::{ArtifactStore, TrainedArtifact};
use sentiscope::config::{ServerConfig, TrainingConfig};
use sentiscope::corpus::{Corpus, LabeledExample};
use sentiscope::sentiment::Sentiment;
use sentiscope::server::router;
use sentiscope::service::{SentimentService, ServiceState};
use sentiscope::storage::MemoryStorage;
use sentiscope::training::TrainingPipeline;

fn artifact() -> TrainedArtifact {
    static ARTIFACT: OnceLock<TrainedArtifact> = OnceLock::new();
    ARTIFACT
        .get_or_init(|| {
            let positive = ["great video loved it", "awesome song great voice"];
            let negative = ["terrible video hated it", "awful song terrible voice"];
            let neutral = ["video uploaded on tuesday", "song from the second album"];
            let mut examples = Vec::new();
            for i in 0..12 {
                examples.push(LabeledExample::new(positive[i % 2], Sentiment::Positive));
                examples.push(LabeledExample::new(negative[i % 2], Sentiment::Negative));
                examples.push(LabeledExample::new(neutral[i % 2], Sentiment::Neutral));
            }
            let pipeline = TrainingPipeline::new(TrainingConfig::default()).unwrap();
            let (artifact, _) = pipeline.train(&Corpus::new(examples)).unwrap();
            artifact
        })
        .clone()
}

fn ready_app() -> Router {
    let config = ServerConfig {
        worker_threads: Some(2),
        ..ServerConfig::default()
    };
    let state = ServiceState::from_artifact(artifact());
    router(Arc::new(SentimentService::ready(state, &config).unwrap()))
}

fn unavailable_app() -> Router {
    let store = ArtifactStore::new(Arc::new(MemoryStorage::new()));
    let service = SentimentService::from_store(&store, &ServerConfig::default()).unwrap();
    assert!(!service.is_ready());
    router(Arc::new(service))
}

fn batch_body(texts: &[String]) -> String {
    let comments: Vec<Value> = texts.iter().map(|t| json!({ "text": t })).collect();
    json!({ "comments": comments }).to_string()
}

async fn post_raw(app: Router, body: String) -> (StatusCode, Value) {
    let request = Request::builder()
        .method("POST")
        .uri("/predict_batch")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body))
        .unwrap();
    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    (status, serde_json::from_slice(&bytes).unwrap())
}

async fn post_batch(app: Router, texts: &[String]) -> (StatusCode, Value) {
    post_raw(app, batch_body(texts)).await
}

async fn get(app: Router, uri: &str) -> (StatusCode, Value) {
    let request = Request::builder().uri(uri).body(Body::empty()).unwrap();
    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    (status, serde_json::from_slice(&bytes).unwrap())
}

fn texts(n: usize, text: &str) -> Vec<String> {
    vec![text.to_string(); n]
}

#[tokio::test]
async fn root_describes_endpoints() {
    let (status, body) = get(unavailable_app(), "/").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["endpoints"]["health"], "/health");
    assert_eq!(body["endpoints"]["predict"], "/predict_batch");
    assert_eq!(body["version"], sentiscope::VERSION);
}

#[tokio::test]
async fn health_reflects_readiness() {
    let (status, body) = get(unavailable_app(), "/health").await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(body["detail"], "Model not loaded");

    let (status, body) = get(ready_app(), "/health").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "healthy");
    assert_eq!(body["model_loaded"], true);
    assert_eq!(body["vectorizer_loaded"], true);
    assert!(body["timestamp"].as_f64().unwrap() > 0.0);
}

#[tokio::test]
async fn predict_without_model_is_unavailable() {
    let (status, body) = post_batch(unavailable_app(), &texts(1, "great video")).await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(body["detail"], "Model not loaded");
}

#[tokio::test]
async fn batch_size_boundaries() {
    let (status, _) = post_batch(ready_app(), &[]).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);

    let (status, body) = post_batch(ready_app(), &texts(1, "great video")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["results"].as_array().unwrap().len(), 1);

    let (status, body) = post_batch(ready_app(), &texts(500, "great video")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["results"].as_array().unwrap().len(), 500);
    assert_eq!(body["statistics"]["total_comments"], 500);

    let (status, body) = post_batch(ready_app(), &texts(501, "great video")).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert!(body["detail"].as_str().unwrap().contains("501"));
}

#[tokio::test]
async fn text_length_boundaries() {
    let (status, body) = post_batch(ready_app(), &[String::new()]).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert!(body["detail"].as_str().unwrap().contains("comments[0]"));

    let (status, _) = post_batch(ready_app(), &texts(1, "a")).await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = post_batch(ready_app(), &["x".repeat(10_000)]).await;
    assert_eq!(status, StatusCode::OK);

    let batch = vec!["fine".to_string(), "x".repeat(10_001)];
    let (status, body) = post_batch(ready_app(), &batch).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert!(body["detail"].as_str().unwrap().contains("comments[1]"));
}

#[tokio::test]
async fn long_text_is_truncated_for_display() {
    let long = "w".repeat(150);
    let (status, body) = post_batch(ready_app(), &[long.clone(), "short".to_string()]).await;
    assert_eq!(status, StatusCode::OK);

    let shown = body["results"][0]["text"].as_str().unwrap();
    assert_eq!(shown.chars().count(), 103);
    assert!(shown.ends_with("..."));
    assert_eq!(&shown[..100], &long[..100]);
    assert_eq!(body["results"][1]["text"], "short");
}

#[tokio::test]
async fn malformed_bodies_are_unprocessable() {
    let (status, body) = post_raw(ready_app(), "not json".to_string()).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert!(body["detail"].is_string());

    let (status, _) = post_raw(ready_app(), r#"{"comments": [{"body": "x"}]}"#.to_string()).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);

    let (status, _) = post_raw(ready_app(), r#"{"items": []}"#.to_string()).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn results_align_with_inputs_and_statistics_add_up() {
    let batch = vec![
        "great video loved it".to_string(),
        "terrible video hated it".to_string(),
        "song from the second album".to_string(),
    ];
    let (status, body) = post_batch(ready_app(), &batch).await;
    assert_eq!(status, StatusCode::OK);

    let results = body["results"].as_array().unwrap();
    assert_eq!(results.len(), 3);
    for (result, text) in results.iter().zip(&batch) {
        assert_eq!(result["text"], text.as_str());
        let confidence = result["confidence"].as_f64().unwrap();
        assert!((0.0..=1.0).contains(&confidence));
        let score = result["sentiment_score"].as_i64().unwrap();
        let expected = match result["sentiment"].as_str().unwrap() {
            "negative" => -1,
            "neutral" => 0,
            "positive" => 1,
            other => panic!("unexpected label {other}"),
        };
        assert_eq!(score, expected);
    }
    assert_eq!(results[0]["sentiment"], "positive");
    assert_eq!(results[1]["sentiment"], "negative");

    let stats = &body["statistics"];
    let counts: i64 = ["positive", "neutral", "negative"]
        .iter()
        .map(|k| stats[*k].as_i64().unwrap())
        .sum();
    assert_eq!(counts, 3);
    let percentages: f64 = ["positive_percentage", "neutral_percentage", "negative_percentage"]
        .iter()
        .map(|k| stats[*k].as_f64().unwrap())
        .sum();
    assert!((percentages - 100.0).abs() <= 0.02);
    assert!(body["processing_time_ms"].as_f64().unwrap() >= 0.0);
}

#[tokio::test]
async fn responses_carry_request_id() {
    let request = Request::builder()
        .method("POST")
        .uri("/predict_batch")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(batch_body(&texts(2, "great video"))))
        .unwrap();
    let response = ready_app().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let id = response.headers().get("x-request-id").unwrap();
    assert!(uuid::Uuid::parse_str(id.to_str().unwrap()).is_ok());
}

#[tokio::test]
async fn identical_batches_score_identically() {
    let batch = vec![
        "awesome song great voice".to_string(),
        "awful song terrible voice".to_string(),
        "unseen words entirely".to_string(),
    ];
    let (_, first) = post_batch(ready_app(), &batch).await;
    let (_, second) = post_batch(ready_app(), &batch).await;
    assert_eq!(first["results"], second["results"]);
    assert_eq!(first["statistics"], second["statistics"]);
}

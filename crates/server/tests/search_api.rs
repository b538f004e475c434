use axum::body::Body;
use axum::http::{Request, StatusCode};
use http_body_util::BodyExt;
use medrag_core::{AppResult, DocumentId};
use medrag_server::{build_router, AppState, MAX_BODY_BYTES};
use medrag_vector::{
    FlatIndex, IdentifierMap, LoadedResources, Metric, Neighbors, VectorIndex, VectorSearchService,
};
use serde_json::{json, Value as JsonValue};
use std::io::Write;
use std::sync::Arc;
use tower::ServiceExt;

fn scenario_state() -> Arc<AppState> {
    let index = FlatIndex::from_vectors(
        4,
        Metric::L2,
        &[
            vec![0.1, 0.2, 0.3, 0.4],
            vec![0.9, 0.8, 0.7, 0.6],
            vec![0.0, 0.0, 0.0, 1.0],
        ],
    )
    .expect("index");
    // Position 2 deliberately unmapped.
    let ids: IdentifierMap = vec![(0, DocumentId::Int(501)), (1, DocumentId::from("who-flu-2023"))]
        .into_iter()
        .collect();

    let resources = LoadedResources::new(Some(Arc::new(index)), ids);
    Arc::new(AppState::new(VectorSearchService::new(Arc::new(resources))))
}

fn unloaded_state() -> Arc<AppState> {
    Arc::new(AppState::new(VectorSearchService::new(Arc::new(
        LoadedResources::default(),
    ))))
}

/// Index whose search always panics.
struct PanickingIndex;

impl VectorIndex for PanickingIndex {
    fn dimension(&self) -> usize {
        4
    }

    fn ntotal(&self) -> usize {
        1
    }

    fn metric(&self) -> Metric {
        Metric::L2
    }

    fn search(&self, _queries: &[Vec<f32>], _k: usize) -> AppResult<Vec<Neighbors>> {
        panic!("simulated failure inside the index");
    }
}

async fn post_search(state: Arc<AppState>, body: impl Into<Body>) -> (StatusCode, JsonValue) {
    let resp = build_router(state)
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/search")
                .header("content-type", "application/json")
                .body(body.into())
                .unwrap(),
        )
        .await
        .unwrap();

    let status = resp.status();
    let bytes = resp
        .into_body()
        .collect()
        .await
        .expect("collect body")
        .to_bytes();
    let json: JsonValue = serde_json::from_slice(&bytes).expect("valid JSON response");
    (status, json)
}

async fn get_health(state: Arc<AppState>) -> (StatusCode, JsonValue) {
    let resp = build_router(state)
        .oneshot(
            Request::builder()
                .method("GET")
                .uri("/health")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    let status = resp.status();
    let bytes = resp.into_body().collect().await.unwrap().to_bytes();
    (status, serde_json::from_slice(&bytes).unwrap())
}

#[tokio::test]
async fn search_pads_missing_neighbors_with_null() {
    let body = json!({"queries": [[0.1, 0.2, 0.3, 0.4]], "k": 5}).to_string();
    let (status, json) = post_search(scenario_state(), body).await;

    assert_eq!(status, StatusCode::OK);
    let ids = json["ids"].as_array().unwrap();
    let distances = json["distances"].as_array().unwrap();
    assert_eq!(ids.len(), 1);
    assert_eq!(distances.len(), 1);

    let row = ids[0].as_array().unwrap();
    assert_eq!(row.len(), 5);
    assert_eq!(row[0], json!(501));
    assert_eq!(row.iter().filter(|v| !v.is_null()).count(), 3);
    assert!(row[3].is_null() && row[4].is_null());
    assert_eq!(distances[0].as_array().unwrap().len(), 5);
}

#[tokio::test]
async fn search_falls_back_to_stringified_position() {
    let body = json!({"queries": [[0.0, 0.0, 0.0, 1.0]], "k": 1}).to_string();
    let (status, json) = post_search(scenario_state(), body).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["ids"], json!([["2"]]));
}

#[tokio::test]
async fn search_dimension_mismatch_is_400() {
    let body = json!({"queries": [[0.1, 0.2, 0.3]]}).to_string();
    let (status, json) = post_search(scenario_state(), body).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    let message = json["error"].as_str().unwrap();
    assert!(message.contains('3'));
    assert!(message.contains('4'));
}

#[tokio::test]
async fn search_missing_queries_is_400() {
    let (status, json) = post_search(scenario_state(), json!({"k": 2}).to_string()).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["error"], "Missing \"queries\" field");

    let (status, json) = post_search(scenario_state(), "{not json").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["error"], "Missing \"queries\" field");
}

#[tokio::test]
async fn search_malformed_numbers_is_400() {
    let body = json!({"queries": [[0.1, "abc", 0.3, 0.4]]}).to_string();
    let (status, json) = post_search(scenario_state(), body).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(json["error"].as_str().unwrap().contains("queries"));
}

#[tokio::test]
async fn search_oversized_body_is_413_json() {
    let (status, json) = post_search(scenario_state(), vec![b' '; MAX_BODY_BYTES + 1]).await;

    assert_eq!(status, StatusCode::PAYLOAD_TOO_LARGE);
    assert!(json["error"].as_str().unwrap().contains("exceeds"));
}

#[tokio::test]
async fn search_out_of_range_values_are_400() {
    let (status, json) =
        post_search(scenario_state(), r#"{"queries": [[1e39, 0.2, 0.3, 0.4]], "k": 2}"#).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["error"], "Invalid \"queries\": value out of f32 range");
}

#[tokio::test]
async fn search_without_index_is_500() {
    let body = json!({"queries": [[0.1, 0.2, 0.3, 0.4]]}).to_string();
    let (status, json) = post_search(unloaded_state(), body).await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(json["error"], "Index not loaded on server");
}

#[tokio::test]
async fn search_panic_becomes_500_and_server_survives() {
    let resources = LoadedResources::new(Some(Arc::new(PanickingIndex)), IdentifierMap::empty());
    let state = Arc::new(AppState::new(VectorSearchService::new(Arc::new(resources))));
    let router = build_router(state);

    let body = json!({"queries": [[0.1, 0.2, 0.3, 0.4]]}).to_string();
    for _ in 0..2 {
        let resp = router
            .clone()
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/search")
                    .body(Body::from(body.clone()))
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let bytes = resp.into_body().collect().await.unwrap().to_bytes();
        let json: JsonValue = serde_json::from_slice(&bytes).unwrap();
        assert!(json["error"].as_str().is_some());
    }
}

#[tokio::test]
async fn search_is_idempotent() {
    let state = scenario_state();
    let body = json!({"queries": [[0.5, 0.5, 0.5, 0.5], [0.0, 0.1, 0.0, 0.9]], "k": 3}).to_string();

    let (_, first) = post_search(state.clone(), body.clone()).await;
    let (_, second) = post_search(state, body).await;
    assert_eq!(first, second);
}

#[tokio::test]
async fn health_reports_loaded_index() {
    let (status, json) = get_health(scenario_state()).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["status"], "ok");
    assert_eq!(json["dimension"], 4);
    assert_eq!(json["ntotal"], 3);
    assert_eq!(json["mapped_ids"], 2);
    assert!(json["version"].as_str().is_some());
}

#[tokio::test]
async fn health_reports_degraded_mode() {
    let (status, json) = get_health(unloaded_state()).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["status"], "degraded");
    assert_eq!(json["index_loaded"], false);
    assert!(json["dimension"].is_null());
}

#[tokio::test]
async fn loads_artifacts_from_disk() {
    let mut index_file = tempfile::NamedTempFile::new().unwrap();
    let mut bytes = Vec::new();
    bytes.extend_from_slice(b"IxF2");
    bytes.extend_from_slice(&2i32.to_le_bytes());
    bytes.extend_from_slice(&2i64.to_le_bytes());
    bytes.extend_from_slice(&(1i64 << 20).to_le_bytes());
    bytes.extend_from_slice(&(1i64 << 20).to_le_bytes());
    bytes.push(1);
    bytes.extend_from_slice(&1i32.to_le_bytes());
    bytes.extend_from_slice(&4u64.to_le_bytes());
    for x in [0.0f32, 0.0, 1.0, 1.0] {
        bytes.extend_from_slice(&x.to_le_bytes());
    }
    index_file.write_all(&bytes).unwrap();

    let mut map_file = tempfile::NamedTempFile::new().unwrap();
    writeln!(map_file, "Index,ID\n0,origin\n1,corner").unwrap();

    let resources = LoadedResources::load(index_file.path(), map_file.path());
    let state = Arc::new(AppState::new(VectorSearchService::new(Arc::new(resources))));

    let body = json!({"queries": [[0.9, 0.9]], "k": 2}).to_string();
    let (status, json) = post_search(state, body).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["ids"], json!([["corner", "origin"]]));
}

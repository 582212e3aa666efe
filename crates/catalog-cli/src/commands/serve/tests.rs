use super::*;
use async_trait::async_trait;
use axum::body::Body;
use axum::extract::FromRequest;
use axum::http::{header::CONTENT_TYPE, Request};
use catalog_core::MemoryWishlistStore;

fn entry(title: &str) -> WishlistEntry {
    WishlistEntry::new(NewWishlistEntry {
        title: title.to_string(),
        notes: String::new(),
        format: "DVD".to_string(),
    })
}

fn state_with(titles: &[&str]) -> AppState {
    let entries = titles.iter().map(|t| entry(t)).collect();
    AppState::new(Box::new(MemoryWishlistStore::with_entries(entries)))
}

async fn body_json(response: Response) -> Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

async fn json_body<T: serde::de::DeserializeOwned>(raw: &'static str) -> Result<Json<T>, JsonRejection> {
    let request = Request::builder()
        .header(CONTENT_TYPE, "application/json")
        .body(Body::from(raw))
        .unwrap();
    Json::<T>::from_request(request, &()).await
}

struct BrokenStore;

#[async_trait]
impl WishlistStore for BrokenStore {
    async fn load(&self) -> anyhow::Result<Vec<WishlistEntry>> {
        Err(anyhow::anyhow!("spreadsheet unavailable"))
    }

    async fn save(&self, _entries: &[WishlistEntry]) -> anyhow::Result<()> {
        Err(anyhow::anyhow!("spreadsheet unavailable"))
    }

    fn describe(&self) -> String {
        "broken".to_string()
    }
}

#[tokio::test]
async fn test_health() {
    let Json(value) = health().await;
    assert_eq!(value, json!({"status": "ok"}));
}

#[tokio::test]
async fn test_list_entries_in_order() {
    let state = state_with(&["Heat", "Ran"]);
    let Json(entries) = list_entries(State(state)).await.unwrap();
    let titles: Vec<_> = entries.iter().map(|e| e.title.as_str()).collect();
    assert_eq!(titles, ["Heat", "Ran"]);
}

#[tokio::test]
async fn test_add_entry_returns_created() {
    let state = state_with(&[]);
    let body = json_body(r#"{"Title": "Alien", "Desired Format": "Blue-ray"}"#).await;
    let response = add_entry(State(state.clone()), body).await.into_response();
    assert_eq!(response.status(), StatusCode::CREATED);

    let value = body_json(response).await;
    assert_eq!(value["message"], "Item added");
    assert_eq!(value["entry"]["title"], "Alien");
    assert_eq!(value["entry"]["format"], "Blue-ray");

    let Json(entries) = list_entries(State(state)).await.unwrap();
    assert_eq!(entries.len(), 1);
}

#[tokio::test]
async fn test_add_entry_without_title_is_bad_request() {
    let state = state_with(&[]);
    let body = json_body(r#"{"notes": "no title"}"#).await;
    let response = add_entry(State(state), body).await.into_response();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(response).await["error"], "Title is required");
}

#[tokio::test]
async fn test_add_entry_with_malformed_json_is_bad_request() {
    let state = state_with(&[]);
    let body = json_body::<NewWishlistEntry>("{not json").await;
    assert!(body.is_err());
    let response = add_entry(State(state), body).await.into_response();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_update_entry_overwrites_supplied_fields() {
    let state = state_with(&["Heat", "Ran"]);
    let body = json_body(r#"{"notes": "criterion"}"#).await;
    let response = update_entry(State(state), Ok(Path(1)), body).await.into_response();
    assert_eq!(response.status(), StatusCode::OK);

    let value = body_json(response).await;
    assert_eq!(value["message"], "Item updated");
    assert_eq!(value["entry"]["title"], "Ran");
    assert_eq!(value["entry"]["notes"], "criterion");
    assert_eq!(value["entry"]["format"], "DVD");
}

#[tokio::test]
async fn test_update_out_of_range_is_not_found() {
    let state = state_with(&["Heat"]);
    let body = json_body(r#"{"title": "x"}"#).await;
    let response = update_entry(State(state), Ok(Path(5)), body).await.into_response();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert_eq!(body_json(response).await, json!({"error": "Invalid index"}));
}

#[tokio::test]
async fn test_delete_entry_shifts_the_rest() {
    let state = state_with(&["Heat", "Ran", "Alien"]);
    let response = delete_entry(State(state.clone()), Ok(Path(0))).await.into_response();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await, json!({"message": "Item deleted"}));

    let Json(entries) = list_entries(State(state.clone())).await.unwrap();
    assert_eq!(entries[0].title, "Ran");

    let missing = delete_entry(State(state), Ok(Path(2))).await.into_response();
    assert_eq!(missing.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_store_failure_is_bad_gateway() {
    let state = AppState::new(Box::new(BrokenStore));
    let response = list_entries(State(state)).await.into_response();
    assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
    let value = body_json(response).await;
    assert!(value["error"].as_str().unwrap().contains("spreadsheet unavailable"));
}

mod handlers;

use std::net::SocketAddr;
use std::sync::Arc;

use axum::{
    extract::Extension,
    routing::{get, post},
    Router,
};

use crate::api::{DynAPI, API};
use crate::error::{unexpected_error, Error};
use crate::server::handlers::{health, rides};

pub fn router(api: DynAPI) -> Router {
    Router::new()
        .route("/health", get(health::check))
        .route("/rides", post(rides::create).get(rides::list))
        .route("/rides/:id", get(rides::find))
        .layer(Extension(api))
}

pub async fn serve<T: API + Sync + Send + 'static>(api: T, addr: SocketAddr) -> Result<(), Error> {
    let api = Arc::new(api) as DynAPI;

    let app = router(api);

    tracing::info!("listening on {}", addr);

    axum::Server::try_bind(&addr)
        .map_err(unexpected_error)?
        .serve(app.into_make_service())
        .await
        .map_err(unexpected_error)
}

#[cfg(test)]
async fn send(
    app: &Router,
    method: &str,
    uri: &str,
    content_type: Option<&str>,
    body: &str,
) -> (axum::http::StatusCode, String) {
    use axum::body::{Body, HttpBody};
    use axum::http::{header::CONTENT_TYPE, Request};
    use tower::ServiceExt;

    let mut request = Request::builder().method(method).uri(uri);
    if let Some(content_type) = content_type {
        request = request.header(CONTENT_TYPE, content_type);
    }
    let request = request.body(Body::from(body.to_string())).unwrap();

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();

    let mut body = response.into_body();
    let mut bytes = Vec::new();
    while let Some(chunk) = body.data().await {
        bytes.extend_from_slice(&chunk.unwrap());
    }

    (status, String::from_utf8(bytes).unwrap())
}

#[test]
fn routes() {
    use crate::{db, engine::Engine};
    use axum::http::StatusCode;
    use serde_json::{json, Value};
    use tokio_test::block_on;

    block_on(async {
        let pool = db::connect("sqlite::memory:", 1).await.unwrap();
        let api = Arc::new(Engine::new(pool).await.unwrap()) as DynAPI;
        let app = router(api);

        let (status, body) = send(&app, "GET", "/health", None, "").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, "Healthy");

        let (status, body) = send(&app, "GET", "/rides", None, "").await;
        assert_eq!(status, StatusCode::OK);
        let body: Value = serde_json::from_str(&body).unwrap();
        assert_eq!(body["error_code"], "RIDES_NOT_FOUND_ERROR");

        let ride = json!({
            "start_lat": 1.3521,
            "start_long": 103.8198,
            "end_lat": 1.3421,
            "end_long": 103.8198,
            "rider_name": "mary",
            "driver_name": "john",
            "driver_vehicle": "toyota",
        })
        .to_string();

        for content_type in [None, Some("text/plain")] {
            let (status, body) = send(&app, "POST", "/rides", content_type, "{}").await;
            assert_eq!(status, StatusCode::OK);
            let body: Value = serde_json::from_str(&body).unwrap();
            assert_eq!(body["error_code"], "VALIDATION_ERROR", "{:?}", content_type);
        }

        let (status, body) = send(&app, "POST", "/rides", Some("application/json"), "{}").await;
        assert_eq!(status, StatusCode::OK);
        let body: Value = serde_json::from_str(&body).unwrap();
        assert_eq!(body["error_code"], "VALIDATION_ERROR");

        let (status, body) = send(&app, "POST", "/rides", Some("application/json"), &ride).await;
        assert_eq!(status, StatusCode::OK);
        let created: Value = serde_json::from_str(&body).unwrap();
        assert_eq!(created.as_array().unwrap().len(), 1);
        let id = created[0]["rideID"].as_i64().unwrap();
        assert!(id > 0);

        let (status, body) = send(&app, "GET", "/rides", None, "").await;
        assert_eq!(status, StatusCode::OK);
        let listed: Value = serde_json::from_str(&body).unwrap();
        assert_eq!(listed, created);

        let (status, body) = send(&app, "GET", &format!("/rides/{}", id), None, "").await;
        assert_eq!(status, StatusCode::OK);
        let found: Value = serde_json::from_str(&body).unwrap();
        assert_eq!(found, created);

        let (status, body) = send(&app, "GET", "/rides/999", None, "").await;
        assert_eq!(status, StatusCode::OK);
        let body: Value = serde_json::from_str(&body).unwrap();
        assert_eq!(body["error_code"], "RIDES_NOT_FOUND_ERROR");
        assert_eq!(body["message"], "Could not find any rides");
    });
}

use axum::body::Bytes;
use axum::extract::{Extension, Json, Path};
use axum::http::{header::CONTENT_TYPE, HeaderMap};
use axum_macros::debug_handler;

use crate::api::DynAPI;
use crate::entities::Ride;
use crate::error::{rides_not_found_error, Error};
use crate::validation::RideSubmission;

/// The body is read by hand so that a missing or non-JSON body is still
/// answered with a validation error.
#[debug_handler]
pub async fn create(
    Extension(api): Extension<DynAPI>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Json<Vec<Ride>>, Error> {
    let content_type = headers
        .get(CONTENT_TYPE)
        .and_then(|value| value.to_str().ok());

    let params = RideSubmission::from_body(content_type, &body);

    let rides = api.create_ride(params).await?;

    Ok(rides.into())
}

#[debug_handler]
pub async fn list(Extension(api): Extension<DynAPI>) -> Result<Json<Vec<Ride>>, Error> {
    let rides = api.list_rides().await?;

    Ok(rides.into())
}

/// Only decimal integers are ids; `1.0` or `abc` cannot match a row.
#[debug_handler]
pub async fn find(
    Extension(api): Extension<DynAPI>,
    Path(id): Path<String>,
) -> Result<Json<Vec<Ride>>, Error> {
    let id = id.parse::<i64>().map_err(|_| rides_not_found_error())?;

    let rides = api.find_rides(id).await?;

    Ok(rides.into())
}

#[cfg(test)]
fn json_headers() -> HeaderMap {
    let mut headers = HeaderMap::new();
    headers.insert(CONTENT_TYPE, "application/json".parse().unwrap());

    headers
}

#[cfg(test)]
async fn test_api() -> DynAPI {
    use crate::{db, engine::Engine};
    use std::sync::Arc;

    let pool = db::connect("sqlite::memory:", 1).await.unwrap();

    Arc::new(Engine::new(pool).await.unwrap()) as DynAPI
}

#[cfg(test)]
fn ride_body() -> serde_json::Value {
    serde_json::json!({
        "start_lat": 1.3521,
        "start_long": 103.8198,
        "end_lat": 1.3421,
        "end_long": 103.8198,
        "rider_name": "mary",
        "driver_name": "john",
        "driver_vehicle": "toyota",
    })
}

#[cfg(test)]
async fn render<T: axum::response::IntoResponse>(result: T) -> serde_json::Value {
    use axum::body::HttpBody;
    use axum::http::StatusCode;

    let response = result.into_response();
    assert_eq!(response.status(), StatusCode::OK);

    let bytes = response.into_body().data().await.unwrap().unwrap();

    serde_json::from_slice(&bytes).unwrap()
}

#[test]
fn create_returns_single_ride() {
    use tokio_test::block_on;

    block_on(async {
        let api = test_api().await;

        let body = Bytes::from(ride_body().to_string());
        let body = render(create(Extension(api), json_headers(), body).await).await;

        let rides = body.as_array().unwrap();
        assert_eq!(rides.len(), 1);
        assert!(rides[0]["rideID"].as_i64().unwrap() > 0);
        assert_eq!(rides[0]["riderName"], "mary");
    });
}

#[test]
fn create_renders_validation_error() {
    use tokio_test::block_on;

    block_on(async {
        let api = test_api().await;

        let mut ride = ride_body();
        ride.as_object_mut().unwrap().remove("rider_name");

        let body = Bytes::from(ride.to_string());
        let body = render(create(Extension(api), json_headers(), body).await).await;

        assert_eq!(
            body,
            serde_json::json!({
                "error_code": "VALIDATION_ERROR",
                "message": "Rider name must be a non empty string",
            })
        );
    });
}

#[test]
fn list_and_find_round_trip() {
    use tokio_test::block_on;

    block_on(async {
        let api = test_api().await;

        let body = render(list(Extension(api.clone())).await).await;
        assert_eq!(body["error_code"], "RIDES_NOT_FOUND_ERROR");
        assert_eq!(body["message"], "Could not find any rides");

        for _ in 0..2 {
            let body = Bytes::from(ride_body().to_string());
            create(Extension(api.clone()), json_headers(), body)
                .await
                .unwrap();
        }

        let body = render(list(Extension(api.clone())).await).await;
        let rides = body.as_array().unwrap();
        assert_eq!(rides.len(), 2);

        let id = rides[1]["rideID"].as_i64().unwrap();
        assert!(id > rides[0]["rideID"].as_i64().unwrap());

        let body = render(find(Extension(api.clone()), Path(id.to_string())).await).await;
        let found = body.as_array().unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0], rides[1]);
        assert_eq!(found[0]["startLat"], 1.3521);
        assert_eq!(found[0]["startLong"], 103.8198);
        assert_eq!(found[0]["endLat"], 1.3421);
        assert_eq!(found[0]["endLong"], 103.8198);
        assert_eq!(found[0]["riderName"], "mary");
        assert_eq!(found[0]["driverName"], "john");
        assert_eq!(found[0]["driverVehicle"], "toyota");
    });
}

#[test]
fn find_unknown_or_malformed_id() {
    use tokio_test::block_on;

    block_on(async {
        let api = test_api().await;

        for id in ["3", "abc", "1' OR '1'='1"] {
            let body = render(find(Extension(api.clone()), Path(id.into())).await).await;
            assert_eq!(body["error_code"], "RIDES_NOT_FOUND_ERROR", "id = {}", id);
        }
    });
}

#[test]
fn create_without_json_body_is_validation_error() {
    use tokio_test::block_on;

    block_on(async {
        let api = test_api().await;

        let mut text_headers = HeaderMap::new();
        text_headers.insert(CONTENT_TYPE, "text/plain".parse().unwrap());

        for (headers, body) in [
            (HeaderMap::new(), Bytes::new()),
            (HeaderMap::new(), Bytes::from(ride_body().to_string())),
            (text_headers, Bytes::from(ride_body().to_string())),
            (json_headers(), Bytes::new()),
            (json_headers(), Bytes::from("not json")),
        ] {
            let body = render(create(Extension(api.clone()), headers, body).await).await;

            assert_eq!(body["error_code"], "VALIDATION_ERROR");
            assert_eq!(
                body["message"],
                "Start latitude and longitude must be between -90 - 90 and -180 to 180 degrees respectively"
            );
        }

        let body = render(list(Extension(api)).await).await;
        assert_eq!(body["error_code"], "RIDES_NOT_FOUND_ERROR");
    });
}

#[test]
fn find_accepts_only_integer_ids() {
    use tokio_test::block_on;

    block_on(async {
        let api = test_api().await;

        let body = Bytes::from(ride_body().to_string());
        let created = create(Extension(api.clone()), json_headers(), body)
            .await
            .unwrap();
        assert_eq!(created.0[0].ride_id, 1);

        for id in ["1", "01", "+1"] {
            let body = render(find(Extension(api.clone()), Path(id.into())).await).await;
            assert_eq!(body[0]["rideID"], 1, "id = {}", id);
        }

        for id in ["1.0", "1e0", " 1"] {
            let body = render(find(Extension(api.clone()), Path(id.into())).await).await;
            assert_eq!(body["error_code"], "RIDES_NOT_FOUND_ERROR", "id = {}", id);
        }
    });
}

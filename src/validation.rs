//! Checks for submitted ride bodies.
//!
//! Rules run in a fixed order and the first violation wins: start pose, end
//! pose, rider name, driver name, driver vehicle.

use serde::Deserialize;
use serde_json::Value;

use crate::entities::{NewRide, Pose};
use crate::error::{
    validation_error, Error, DRIVER_NAME_ERROR_MESSAGE, END_POSE_ERROR_MESSAGE,
    RIDER_NAME_ERROR_MESSAGE, START_POSE_ERROR_MESSAGE, VEHICLE_NAME_ERROR_MESSAGE,
};

/// The untyped body of `POST /rides`. Fields stay raw JSON so that wrong
/// types surface as validation errors instead of extractor rejections.
#[derive(Clone, Debug, Default, Deserialize)]
pub struct RideSubmission {
    #[serde(default)]
    pub start_lat: Option<Value>,
    #[serde(default)]
    pub start_long: Option<Value>,
    #[serde(default)]
    pub end_lat: Option<Value>,
    #[serde(default)]
    pub end_long: Option<Value>,
    #[serde(default)]
    pub rider_name: Option<Value>,
    #[serde(default)]
    pub driver_name: Option<Value>,
    #[serde(default)]
    pub driver_vehicle: Option<Value>,
}

impl RideSubmission {
    /// Reads a request body. Anything other than a JSON object sent as JSON
    /// counts as an empty submission, so it fails the first rule.
    pub fn from_body(content_type: Option<&str>, body: &[u8]) -> Self {
        let is_json = content_type
            .map(|value| value.trim().to_ascii_lowercase())
            .map(|value| value.starts_with("application/json") || value.contains("+json"))
            .unwrap_or(false);

        if !is_json {
            return Self::default();
        }

        serde_json::from_slice(body).unwrap_or_default()
    }

    pub fn validate(&self) -> Result<NewRide, Error> {
        let start = pose(&self.start_lat, &self.start_long)
            .ok_or_else(|| validation_error(START_POSE_ERROR_MESSAGE))?;

        let end = pose(&self.end_lat, &self.end_long)
            .ok_or_else(|| validation_error(END_POSE_ERROR_MESSAGE))?;

        let rider_name = non_empty_string(&self.rider_name)
            .ok_or_else(|| validation_error(RIDER_NAME_ERROR_MESSAGE))?;

        let driver_name = non_empty_string(&self.driver_name)
            .ok_or_else(|| validation_error(DRIVER_NAME_ERROR_MESSAGE))?;

        let driver_vehicle = non_empty_string(&self.driver_vehicle)
            .ok_or_else(|| validation_error(VEHICLE_NAME_ERROR_MESSAGE))?;

        Ok(NewRide {
            start,
            end,
            rider_name,
            driver_name,
            driver_vehicle,
        })
    }
}

fn pose(lat: &Option<Value>, long: &Option<Value>) -> Option<Pose> {
    let pose = Pose::new(number(lat)?, number(long)?);

    if pose.is_valid() {
        Some(pose)
    } else {
        None
    }
}

/// Accepts JSON numbers and strings holding a finite decimal.
fn number(value: &Option<Value>) -> Option<f64> {
    let n = match value.as_ref()? {
        Value::Number(n) => n.as_f64()?,
        Value::String(s) => s.trim().parse::<f64>().ok()?,
        _ => return None,
    };

    if n.is_finite() {
        Some(n)
    } else {
        None
    }
}

fn non_empty_string(value: &Option<Value>) -> Option<String> {
    match value {
        Some(Value::String(s)) if !s.is_empty() => Some(s.clone()),
        _ => None,
    }
}

#[cfg(test)]
fn submission(body: Value) -> RideSubmission {
    serde_json::from_value(body).unwrap()
}

#[cfg(test)]
fn valid_body() -> Value {
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

#[test]
fn valid_submission() {
    let ride = submission(valid_body()).validate().unwrap();

    assert_eq!(ride.start, Pose::new(1.3521, 103.8198));
    assert_eq!(ride.end, Pose::new(1.3421, 103.8198));
    assert_eq!(ride.rider_name, "mary");
    assert_eq!(ride.driver_name, "john");
    assert_eq!(ride.driver_vehicle, "toyota");
}

#[test]
fn out_of_range_start_pose() {
    for (key, value) in [
        ("start_lat", 90.5),
        ("start_lat", -91.0),
        ("start_long", 180.5),
        ("start_long", -181.0),
    ] {
        let mut body = valid_body();
        body[key] = serde_json::json!(value);

        let err = submission(body).validate().unwrap_err();
        assert!(err.is_validation_error());
        assert_eq!(err.message, START_POSE_ERROR_MESSAGE, "{} = {}", key, value);
    }
}

#[test]
fn out_of_range_end_pose() {
    for (key, value) in [
        ("end_lat", 100.0),
        ("end_lat", -100.0),
        ("end_long", 200.0),
        ("end_long", -200.0),
    ] {
        let mut body = valid_body();
        body[key] = serde_json::json!(value);

        let err = submission(body).validate().unwrap_err();
        assert!(err.is_validation_error());
        assert_eq!(err.message, END_POSE_ERROR_MESSAGE, "{} = {}", key, value);
    }
}

#[test]
fn start_pose_is_checked_before_end_pose() {
    let mut body = valid_body();
    body["start_lat"] = serde_json::json!(100.0);
    body["end_lat"] = serde_json::json!(100.0);

    let err = submission(body).validate().unwrap_err();
    assert_eq!(err.message, START_POSE_ERROR_MESSAGE);
}

#[test]
fn non_numeric_pose_is_rejected() {
    for value in [
        serde_json::json!("north"),
        serde_json::json!(""),
        serde_json::json!("NaN"),
        serde_json::json!("inf"),
        serde_json::json!(true),
        serde_json::json!(null),
        serde_json::json!([1.0]),
        serde_json::json!({ "lat": 1.0 }),
    ] {
        let mut body = valid_body();
        body["end_long"] = value.clone();

        let err = submission(body).validate().unwrap_err();
        assert_eq!(err.message, END_POSE_ERROR_MESSAGE, "end_long = {}", value);
    }

    let mut body = valid_body();
    body.as_object_mut().unwrap().remove("start_lat");

    let err = submission(body).validate().unwrap_err();
    assert_eq!(err.message, START_POSE_ERROR_MESSAGE);
}

#[test]
fn numeric_strings_are_coerced() {
    let mut body = valid_body();
    body["start_lat"] = serde_json::json!(" 45.5 ");
    body["end_long"] = serde_json::json!("-120");

    let ride = submission(body).validate().unwrap();
    assert_eq!(ride.start.lat, 45.5);
    assert_eq!(ride.end.long, -120.0);
}

#[test]
fn names_are_checked_in_order() {
    let mut body = valid_body();
    let fields = body.as_object_mut().unwrap();
    fields.remove("rider_name");
    fields.remove("driver_name");
    fields.remove("driver_vehicle");

    let err = submission(body.clone()).validate().unwrap_err();
    assert_eq!(err.message, RIDER_NAME_ERROR_MESSAGE);

    body["rider_name"] = serde_json::json!("mary");
    let err = submission(body.clone()).validate().unwrap_err();
    assert_eq!(err.message, DRIVER_NAME_ERROR_MESSAGE);

    body["driver_name"] = serde_json::json!("john");
    let err = submission(body).validate().unwrap_err();
    assert_eq!(err.message, VEHICLE_NAME_ERROR_MESSAGE);
}

#[test]
fn blank_or_non_string_names_are_rejected() {
    for (key, message) in [
        ("rider_name", RIDER_NAME_ERROR_MESSAGE),
        ("driver_name", DRIVER_NAME_ERROR_MESSAGE),
        ("driver_vehicle", VEHICLE_NAME_ERROR_MESSAGE),
    ] {
        for value in [
            serde_json::json!(""),
            serde_json::json!(42),
            serde_json::json!(null),
        ] {
            let mut body = valid_body();
            body[key] = value;

            let err = submission(body).validate().unwrap_err();
            assert!(err.is_validation_error());
            assert_eq!(err.message, message);
        }
    }
}

#[test]
fn body_without_json_content_type_is_empty() {
    let body = valid_body().to_string();

    for content_type in [None, Some("text/plain"), Some("application/x-www-form-urlencoded")] {
        let submission = RideSubmission::from_body(content_type, body.as_bytes());
        let err = submission.validate().unwrap_err();
        assert_eq!(err.message, START_POSE_ERROR_MESSAGE, "{:?}", content_type);
    }
}

#[test]
fn json_body_is_read() {
    let body = valid_body().to_string();

    for content_type in ["application/json", "application/json; charset=utf-8", "application/vnd.api+json"] {
        let ride = RideSubmission::from_body(Some(content_type), body.as_bytes())
            .validate()
            .unwrap();
        assert_eq!(ride.rider_name, "mary");
    }
}

#[test]
fn empty_or_malformed_json_body_is_empty() {
    for body in ["", "{", "[1, 2]", "42", "null"] {
        let submission = RideSubmission::from_body(Some("application/json"), body.as_bytes());
        let err = submission.validate().unwrap_err();
        assert_eq!(err.message, START_POSE_ERROR_MESSAGE, "body = {:?}", body);
    }
}

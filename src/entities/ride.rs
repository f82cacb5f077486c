use chrono::NaiveDateTime;
use serde::Serialize;

use crate::entities::Pose;

/// A persisted ride. Rows are never updated once written.
#[derive(Clone, Debug, PartialEq, Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Ride {
    #[serde(rename = "rideID")]
    #[sqlx(rename = "rideID")]
    pub ride_id: i64,
    #[sqlx(rename = "startLat")]
    pub start_lat: f64,
    #[sqlx(rename = "startLong")]
    pub start_long: f64,
    #[sqlx(rename = "endLat")]
    pub end_lat: f64,
    #[sqlx(rename = "endLong")]
    pub end_long: f64,
    #[sqlx(rename = "riderName")]
    pub rider_name: String,
    #[sqlx(rename = "driverName")]
    pub driver_name: String,
    #[sqlx(rename = "driverVehicle")]
    pub driver_vehicle: String,
    #[serde(serialize_with = "serialize_timestamp")]
    pub created: NaiveDateTime,
}

/// Same text SQLite's `CURRENT_TIMESTAMP` produces.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

fn serialize_timestamp<S>(created: &NaiveDateTime, serializer: S) -> Result<S::Ok, S::Error>
where
    S: serde::Serializer,
{
    serializer.collect_str(&created.format(TIMESTAMP_FORMAT))
}

/// A validated ride that has not been stored yet.
#[derive(Clone, Debug, PartialEq)]
pub struct NewRide {
    pub start: Pose,
    pub end: Pose,
    pub rider_name: String,
    pub driver_name: String,
    pub driver_vehicle: String,
}

#[test]
fn ride_serializes_with_column_names() {
    use chrono::NaiveDate;

    let ride = Ride {
        ride_id: 7,
        start_lat: 1.3521,
        start_long: 103.8198,
        end_lat: 1.3421,
        end_long: 103.8198,
        rider_name: "mary".into(),
        driver_name: "john".into(),
        driver_vehicle: "toyota".into(),
        created: NaiveDate::from_ymd_opt(2024, 1, 2)
            .unwrap()
            .and_hms_opt(3, 4, 5)
            .unwrap(),
    };

    let body = serde_json::to_value(&ride).unwrap();

    assert_eq!(body["rideID"], 7);
    assert_eq!(body["startLat"], 1.3521);
    assert_eq!(body["startLong"], 103.8198);
    assert_eq!(body["endLat"], 1.3421);
    assert_eq!(body["endLong"], 103.8198);
    assert_eq!(body["riderName"], "mary");
    assert_eq!(body["driverName"], "john");
    assert_eq!(body["driverVehicle"], "toyota");
    assert_eq!(body["created"], "2024-01-02 03:04:05");
}

#[test]
fn ride_decodes_from_rides_row() {
    use sqlx::Executor;
    use tokio_test::block_on;

    block_on(async {
        let pool = crate::db::connect("sqlite::memory:", 1).await.unwrap();

        pool.execute(
            "CREATE TABLE Rides (rideID INTEGER PRIMARY KEY AUTOINCREMENT, startLat REAL, startLong REAL, endLat REAL, endLong REAL, riderName TEXT, driverName TEXT, driverVehicle TEXT, created DATETIME default CURRENT_TIMESTAMP)",
        )
        .await
        .unwrap();
        pool.execute(
            "INSERT INTO Rides (startLat, startLong, endLat, endLong, riderName, driverName, driverVehicle, created) VALUES (1.5, 2.5, -3.5, -4.5, 'mary', 'john', 'toyota', '2024-01-02 03:04:05')",
        )
        .await
        .unwrap();

        let ride = sqlx::query_as::<_, Ride>("SELECT * FROM Rides")
            .fetch_one(&pool)
            .await
            .unwrap();

        assert_eq!(ride.ride_id, 1);
        assert_eq!(ride.start_lat, 1.5);
        assert_eq!(ride.end_long, -4.5);
        assert_eq!(ride.driver_vehicle, "toyota");
        assert_eq!(
            ride.created.format(TIMESTAMP_FORMAT).to_string(),
            "2024-01-02 03:04:05"
        );
    });
}

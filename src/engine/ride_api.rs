use super::Engine;

use async_trait::async_trait;
use futures::TryStreamExt;
use sqlx::Executor;

use crate::{
    api::RideAPI,
    entities::Ride,
    error::{rides_not_found_error, Error},
    validation::RideSubmission,
};

#[async_trait]
impl RideAPI for Engine {
    #[tracing::instrument(skip(self))]
    async fn create_ride(&self, submission: RideSubmission) -> Result<Vec<Ride>, Error> {
        let ride = submission.validate()?;

        let mut conn = self.pool.acquire().await?;

        let result = conn
            .execute(
                sqlx::query(
                    "INSERT INTO Rides (startLat, startLong, endLat, endLong, riderName, driverName, driverVehicle) VALUES (?, ?, ?, ?, ?, ?, ?)",
                )
                .bind(ride.start.lat)
                .bind(ride.start.long)
                .bind(ride.end.lat)
                .bind(ride.end.long)
                .bind(&ride.rider_name)
                .bind(&ride.driver_name)
                .bind(&ride.driver_vehicle),
            )
            .await?;

        let id = result.last_insert_rowid();

        tracing::info!(ride_id = id, "ride created");

        let rides = sqlx::query_as::<_, Ride>("SELECT * FROM Rides WHERE rideID = ?")
            .bind(id)
            .fetch_all(&mut *conn)
            .await?;

        Ok(rides)
    }

    #[tracing::instrument(skip(self))]
    async fn list_rides(&self) -> Result<Vec<Ride>, Error> {
        let mut conn = self.pool.acquire().await?;

        let rides: Vec<Ride> = sqlx::query_as::<_, Ride>("SELECT * FROM Rides ORDER BY rideID")
            .fetch(&mut *conn)
            .try_collect()
            .await?;

        if rides.is_empty() {
            return Err(rides_not_found_error());
        }

        Ok(rides)
    }

    #[tracing::instrument(skip(self))]
    async fn find_rides(&self, id: i64) -> Result<Vec<Ride>, Error> {
        let mut conn = self.pool.acquire().await?;

        let rides = sqlx::query_as::<_, Ride>("SELECT * FROM Rides WHERE rideID = ?")
            .bind(id)
            .fetch_all(&mut *conn)
            .await?;

        if rides.is_empty() {
            return Err(rides_not_found_error());
        }

        Ok(rides)
    }
}

#[cfg(test)]
async fn new_engine() -> Engine {
    let pool = crate::db::connect("sqlite::memory:", 1).await.unwrap();

    Engine::new(pool).await.unwrap()
}

#[cfg(test)]
fn submission(rider_name: &str, start_lat: f64) -> RideSubmission {
    serde_json::from_value(serde_json::json!({
        "start_lat": start_lat,
        "start_long": 103.8198,
        "end_lat": 1.3421,
        "end_long": 103.8198,
        "rider_name": rider_name,
        "driver_name": "john",
        "driver_vehicle": "toyota",
    }))
    .unwrap()
}

#[test]
fn create_ride_returns_stored_row() {
    use tokio_test::block_on;

    block_on(async {
        let engine = new_engine().await;

        let rides = engine.create_ride(submission("mary", 1.3521)).await.unwrap();

        assert_eq!(rides.len(), 1);
        let ride = &rides[0];
        assert!(ride.ride_id > 0);
        assert_eq!(ride.start_lat, 1.3521);
        assert_eq!(ride.start_long, 103.8198);
        assert_eq!(ride.end_lat, 1.3421);
        assert_eq!(ride.end_long, 103.8198);
        assert_eq!(ride.rider_name, "mary");
        assert_eq!(ride.driver_name, "john");
        assert_eq!(ride.driver_vehicle, "toyota");
    });
}

#[test]
fn ride_ids_increase() {
    use tokio_test::block_on;

    block_on(async {
        let engine = new_engine().await;

        let mut last_id = 0;
        for name in ["a", "b", "c", "d"] {
            let rides = engine.create_ride(submission(name, 10.0)).await.unwrap();
            assert!(rides[0].ride_id > last_id);
            last_id = rides[0].ride_id;
        }
    });
}

#[test]
fn invalid_submission_is_not_stored() {
    use tokio_test::block_on;

    block_on(async {
        let engine = new_engine().await;

        let err = engine
            .create_ride(submission("mary", 95.0))
            .await
            .unwrap_err();
        assert!(err.is_validation_error());

        let err = engine.create_ride(submission("", 1.0)).await.unwrap_err();
        assert!(err.is_validation_error());

        let err = engine.list_rides().await.unwrap_err();
        assert!(err.is_not_found_error());
    });
}

#[test]
fn list_rides_in_creation_order() {
    use tokio_test::block_on;

    block_on(async {
        let engine = new_engine().await;

        let err = engine.list_rides().await.unwrap_err();
        assert!(err.is_not_found_error());
        assert_eq!(err.message, "Could not find any rides");

        let names = ["mary", "ana", "zoe"];
        for name in names {
            engine.create_ride(submission(name, 1.0)).await.unwrap();
        }

        let rides = engine.list_rides().await.unwrap();
        assert_eq!(rides.len(), names.len());

        let listed: Vec<&str> = rides.iter().map(|r| r.rider_name.as_str()).collect();
        assert_eq!(listed, names);
    });
}

#[test]
fn find_rides_by_id() {
    use tokio_test::block_on;

    block_on(async {
        let engine = new_engine().await;

        let err = engine.find_rides(3).await.unwrap_err();
        assert!(err.is_not_found_error());

        let created = engine.create_ride(submission("mary", -45.25)).await.unwrap();
        engine.create_ride(submission("ana", 2.0)).await.unwrap();

        let found = engine.find_rides(created[0].ride_id).await.unwrap();
        assert_eq!(found, created);

        let err = engine.find_rides(created[0].ride_id + 100).await.unwrap_err();
        assert!(err.is_not_found_error());
    });
}

#[test]
fn store_failure_is_server_error() {
    use tokio_test::block_on;

    block_on(async {
        let engine = new_engine().await;

        engine.pool.execute("DROP TABLE Rides").await.unwrap();

        let err = engine.create_ride(submission("mary", 1.0)).await.unwrap_err();
        assert!(err.is_server_error());
        assert_eq!(err.message, "Unknown error");

        let err = engine.list_rides().await.unwrap_err();
        assert!(err.is_server_error());

        let err = engine.find_rides(1).await.unwrap_err();
        assert!(err.is_server_error());
    });
}

#[test]
fn read_back_failure_is_server_error() {
    use tokio_test::block_on;

    block_on(async {
        let engine = new_engine().await;

        // rows from this table insert fine but cannot be decoded as a Ride
        engine.pool.execute("DROP TABLE Rides").await.unwrap();
        engine
            .pool
            .execute(
                "CREATE TABLE Rides (
                    rideID INTEGER PRIMARY KEY AUTOINCREMENT,
                    startLat REAL NOT NULL,
                    startLong REAL NOT NULL,
                    endLat REAL NOT NULL,
                    endLong REAL NOT NULL,
                    riderName TEXT NOT NULL,
                    driverName TEXT NOT NULL,
                    driverVehicle TEXT NOT NULL,
                    created DATETIME default 'not a timestamp'
                )",
            )
            .await
            .unwrap();

        let err = engine.create_ride(submission("mary", 1.0)).await.unwrap_err();
        assert!(err.is_server_error());
        assert_eq!(err.message, "Unknown error");

        let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM Rides")
            .fetch_one(&engine.pool)
            .await
            .unwrap();
        assert_eq!(count, 1);
    });
}

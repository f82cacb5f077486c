mod ride_api;

use sqlx::{Executor, Pool};

use crate::{api::API, db::Database, error::Error};

pub struct Engine {
    pool: Pool<Database>,
}

impl Engine {
    #[tracing::instrument(name = "Engine::new", skip_all)]
    pub async fn new(pool: Pool<Database>) -> Result<Self, Error> {
        // ride service
        pool.execute(
            "CREATE TABLE IF NOT EXISTS Rides (
                rideID INTEGER PRIMARY KEY AUTOINCREMENT,
                startLat REAL NOT NULL,
                startLong REAL NOT NULL,
                endLat REAL NOT NULL,
                endLong REAL NOT NULL,
                riderName TEXT NOT NULL,
                driverName TEXT NOT NULL,
                driverVehicle TEXT NOT NULL,
                created DATETIME default CURRENT_TIMESTAMP
            )",
        )
        .await?;

        Ok(Self { pool })
    }
}

impl API for Engine {}

#[test]
fn new_engine_is_idempotent() {
    use crate::db;
    use tokio_test::block_on;

    block_on(async {
        let pool = db::connect("sqlite::memory:", 1).await.unwrap();

        Engine::new(pool.clone()).await.unwrap();
        Engine::new(pool).await.unwrap();
    });
}

use sqlx::sqlite::{Sqlite, SqlitePoolOptions};
use sqlx::Pool;

pub type Database = Sqlite;

/// Opens the ride store. An in-memory database only lives as long as its
/// connection, so it gets exactly one that is never recycled.
#[tracing::instrument]
pub async fn connect(db_uri: &str, max_connections: u32) -> Result<Pool<Database>, sqlx::Error> {
    let options = if is_in_memory(db_uri) {
        SqlitePoolOptions::new()
            .max_connections(1)
            .min_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
    } else {
        SqlitePoolOptions::new().max_connections(max_connections)
    };

    options.connect(db_uri).await
}

fn is_in_memory(db_uri: &str) -> bool {
    db_uri.contains(":memory:") || db_uri.contains("mode=memory")
}

#[test]
fn in_memory_uris() {
    assert!(is_in_memory("sqlite::memory:"));
    assert!(is_in_memory("sqlite://:memory:"));
    assert!(is_in_memory("sqlite://rides.db?mode=memory"));
    assert!(!is_in_memory("sqlite://rides.db"));
}

#[test]
fn connect_in_memory() {
    use sqlx::Executor;
    use tokio_test::block_on;

    block_on(async {
        let pool = connect("sqlite::memory:", 5).await.unwrap();

        pool.execute("CREATE TABLE t (x INTEGER)").await.unwrap();
        pool.execute("INSERT INTO t (x) VALUES (1)").await.unwrap();

        let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM t")
            .fetch_one(&pool)
            .await
            .unwrap();

        assert_eq!(count, 1);
    });
}

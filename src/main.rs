use rides::config::Config;
use rides::db;
use rides::engine::Engine;
use rides::error::Error;
use rides::server::serve;

#[tokio::main]
async fn main() -> Result<(), Error> {
    tracing_subscriber::fmt::init();

    let config = Config::from_env()?;

    let pool = db::connect(&config.database_url, config.max_connections).await?;

    let engine = Engine::new(pool).await?;

    serve(engine, config.listen_addr).await
}

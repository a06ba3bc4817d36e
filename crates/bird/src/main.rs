use bird::{BirdError, BirdServer, ServerConfig};

#[tokio::main]
async fn main() -> Result<(), BirdError> {
    bird::telemetry::init();

    let config = ServerConfig::from_env()?;
    let server = BirdServer::builder().config(config).build().await?;
    server.run().await
}

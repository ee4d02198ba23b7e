use log::info;
use songcards::server;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();
    env_logger::init();

    let bind = std::env::var("SONGCARDS_BIND").unwrap_or_else(|_| server::DEFAULT_BIND.to_string());
    info!("Starting songcards HTTP API ...");
    server::serve(&bind).await?;

    Ok(())
}

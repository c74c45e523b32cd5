use env_logger::{Builder, Env};
use log::LevelFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables from .env file if it exists
    dotenvy::dotenv().ok();

    // Info by default, RUST_LOG overrides; keep the HTTP client stack quiet
    Builder::from_env(Env::default().default_filter_or("info"))
        .filter_module("hyper", LevelFilter::Warn)
        .filter_module("reqwest", LevelFilter::Warn)
        .init();

    log::info!("Dealership API");

    dealership_api::run_server().await
}

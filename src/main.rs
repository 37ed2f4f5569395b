use anyhow::Result;

use tokstr_relay::app::config::Config;
use tokstr_relay::service::main_axum::start_axum_server;
use tokstr_relay::utils::log::init_logger_once;

#[tokio::main]
async fn main() -> Result<()> {
    init_logger_once();

    // Optional first argument overrides BIND_ADDR, e.g. `tokstr-relay 0.0.0.0:8080`
    let config = Config::from_env()?.with_bind_addr(std::env::args().nth(1))?;

    start_axum_server(config).await
}

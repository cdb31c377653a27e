//! Backlot site backend binary.

use backlot_api::setup;
use backlot_core::Config;

#[global_allocator]
static GLOBAL: mimalloc::MiMalloc = mimalloc::MiMalloc;

#[tokio::main]
async fn main() -> Result<(), anyhow::Error> {
    let config = Config::from_env()?;

    let (_state, app) = setup::initialize_app(config.clone()).await?;

    setup::server::start_server(&config, app).await?;

    Ok(())
}

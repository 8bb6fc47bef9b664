use std::sync::Arc;
use thumbnail_renderer::config::ServerSettings;
use thumbnail_renderer::utils::logging::{init_logging, log_settings};
use thumbnail_renderer::{RenderApp, RenderServer, APP_NAME, VERSION};
use tracing::info;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_logging();
    info!("{} {}", APP_NAME, VERSION);

    let settings = ServerSettings::load()?;
    log_settings(&settings);

    let app = Arc::new(RenderApp::from_settings(&settings)?);
    let server = RenderServer::bind(&settings.server_address, app).await?;
    server.run().await?;

    Ok(())
}

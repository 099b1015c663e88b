//! HTTP Server for the SQL for Humans page

use sql_for_humans::config::DemoConfig;
use sql_for_humans::server::LessonServer;
use sql_for_humans::{logging, Dataset};
use std::sync::Arc;
use tracing::info;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    logging::init();

    let config = DemoConfig::from_env()?;
    let dataset = Arc::new(Dataset::sample()?);
    info!(
        "Loaded {} sample orders, starting server on {}",
        dataset.rows().len(),
        config.addr
    );

    LessonServer::new(dataset).run(config.addr).await?;
    Ok(())
}

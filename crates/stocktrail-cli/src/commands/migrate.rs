use stocktrail_core::db;
use tracing::info;

use super::connect;
use crate::Result;

pub async fn run(database_url: Option<&str>) -> Result<()> {
    let (config, pool) = connect(database_url).await?;

    db::run_migrations(&pool).await?;
    info!(url = %config.database.url, "Schema up to date");
    println!("Migrations applied to {}", config.database.url);

    pool.close().await;
    Ok(())
}

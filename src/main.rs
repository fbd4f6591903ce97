use anyhow::{Context, Result};
use camp_signups_lib::{Database, StoreConfig};
use log::info;

#[tokio::main]
async fn main() -> Result<()> {
    // Reads RUST_LOG, defaulting to info
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config = StoreConfig::from_env().context("failed to load configuration")?;
    info!(
        "Opening camp database at {} (delete policy: {:?})",
        config.database_path.display(),
        config.delete_policy
    );

    let database = Database::open(&config)?;
    let (activities, campers, signups) = database.table_counts().await?;
    info!("{activities} activities, {campers} campers, {signups} signups");

    Ok(())
}

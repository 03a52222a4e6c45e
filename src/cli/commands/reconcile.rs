use super::{open_store, print_outcome};
use crate::config::Config;
use crate::domain::{ProfileId, ShowId};
use crate::services::{SeaOrmWatchStatusService, WatchStatusService};
use std::sync::Arc;

pub async fn cmd_reconcile(config: &Config, profile: i32, show: i32) -> anyhow::Result<()> {
    let store = Arc::new(open_store(config).await?);
    let service = SeaOrmWatchStatusService::new(store);

    let outcome = service
        .check_and_update_show_status(ProfileId::new(profile), ShowId::new(show))
        .await?;

    print_outcome(&outcome);
    Ok(())
}

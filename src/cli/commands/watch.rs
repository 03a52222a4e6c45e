use super::{open_store, print_outcome};
use crate::config::Config;
use crate::domain::{EpisodeId, ProfileId, SeasonId, ShowId, WatchStatus};
use crate::services::{SeaOrmWatchStatusService, WatchStatusService};
use anyhow::Context;
use std::sync::Arc;

fn parse_status(raw: &str) -> anyhow::Result<WatchStatus> {
    raw.parse::<WatchStatus>()
        .map_err(|e| anyhow::anyhow!(e))
        .context("Expected one of: watched, not-watched, watching, up-to-date, unaired")
}

pub async fn cmd_watch_episode(
    config: &Config,
    profile: i32,
    episode: i32,
    status: &str,
) -> anyhow::Result<()> {
    let target = parse_status(status)?;
    let store = Arc::new(open_store(config).await?);
    let service = SeaOrmWatchStatusService::new(store);

    let outcome = service
        .update_episode_status(ProfileId::new(profile), EpisodeId::new(episode), target)
        .await?;

    print_outcome(&outcome);
    Ok(())
}

pub async fn cmd_watch_season(
    config: &Config,
    profile: i32,
    season: i32,
    status: &str,
) -> anyhow::Result<()> {
    let target = parse_status(status)?;
    let store = Arc::new(open_store(config).await?);
    let service = SeaOrmWatchStatusService::new(store);

    let outcome = service
        .update_season_status(ProfileId::new(profile), SeasonId::new(season), target)
        .await?;

    print_outcome(&outcome);
    Ok(())
}

pub async fn cmd_watch_show(
    config: &Config,
    profile: i32,
    show: i32,
    status: &str,
) -> anyhow::Result<()> {
    let target = parse_status(status)?;
    let store = Arc::new(open_store(config).await?);
    let service = SeaOrmWatchStatusService::new(store);

    let outcome = service
        .update_show_status(ProfileId::new(profile), ShowId::new(show), target)
        .await?;

    print_outcome(&outcome);
    Ok(())
}

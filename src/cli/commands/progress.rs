use super::open_store;
use crate::config::Config;
use crate::domain::WatchStatus;
use std::collections::HashMap;

pub async fn cmd_progress(config: &Config, profile: i32, show: i32) -> anyhow::Result<()> {
    let store = open_store(config).await?;

    let show_row = store
        .get_show(show)
        .await?
        .ok_or_else(|| anyhow::anyhow!("Show with ID {show} not found"))?;

    let show_ctx = store.show_watch_context(profile, show).await?;
    let seasons = store.seasons_for_show(show).await?;
    let episodes = store.episodes_for_show(show).await?;

    let season_statuses: HashMap<i32, WatchStatus> = store
        .season_watch_rows(profile, show)
        .await?
        .into_iter()
        .filter_map(|row| row.status.map(|status| (row.season_id, status)))
        .collect();
    let episode_statuses: HashMap<i32, WatchStatus> = store
        .episode_watch_rows(profile, show)
        .await?
        .into_iter()
        .filter_map(|row| row.status.map(|status| (row.episode_id, status)))
        .collect();

    let show_status = show_ctx
        .and_then(|ctx| ctx.show_status)
        .map_or_else(|| "-".to_string(), |s| s.to_string());

    println!("{} [{}]", show_row.title, show_status);
    println!("{:-<70}", "");

    for season in &seasons {
        let season_status = season_statuses
            .get(&season.id)
            .map_or("-", WatchStatus::as_str);
        let label = season
            .title
            .clone()
            .unwrap_or_else(|| format!("Season {}", season.season_number));
        println!("{label} [{season_status}]");

        for episode in episodes.iter().filter(|ep| ep.season_id == season.id) {
            let status = episode_statuses.get(&episode.id).copied();
            let icon = match status {
                Some(WatchStatus::Watched) => "✓",
                Some(WatchStatus::Unaired) => "·",
                _ => "○",
            };
            let title = episode.title.as_deref().unwrap_or("(No title)");
            let aired = episode
                .air_date
                .as_deref()
                .map(|d| format!(" - {d}"))
                .unwrap_or_default();
            println!("  {icon} Episode {}: {title}{aired}", episode.episode_number);
        }
    }

    println!();
    println!("Legend: ✓ Watched | ○ Not watched | · Unaired");

    Ok(())
}

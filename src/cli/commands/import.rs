use super::open_store;
use crate::config::Config;
use crate::models::catalog::ShowInput;
use anyhow::Context;

pub async fn cmd_import(config: &Config, path: &str) -> anyhow::Result<()> {
    let content = tokio::fs::read_to_string(path)
        .await
        .with_context(|| format!("Failed to read catalog file: {path}"))?;

    let shows: Vec<ShowInput> = serde_json::from_str(&content)
        .with_context(|| format!("Failed to parse catalog file: {path}"))?;

    let store = open_store(config).await?;

    let mut episode_count = 0usize;
    for show in &shows {
        store.add_show(show).await?;
        episode_count += show
            .seasons
            .iter()
            .map(|season| season.episodes.len())
            .sum::<usize>();
    }

    println!(
        "Imported {} show(s), {} episode(s)",
        shows.len(),
        episode_count
    );

    Ok(())
}

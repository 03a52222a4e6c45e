use super::open_store;
use crate::config::Config;

pub async fn cmd_list_shows(config: &Config) -> anyhow::Result<()> {
    let store = open_store(config).await?;
    let shows = store.list_shows().await?;

    if shows.is_empty() {
        println!("Catalog is empty. Add shows with 'trackarr import <file>'");
        return Ok(());
    }

    for show in shows {
        let flag = if show.in_production {
            "in production"
        } else {
            "ended"
        };
        let premiered = show.release_date.as_deref().unwrap_or("TBA");
        println!("{:>6}  {} ({premiered}, {flag})", show.id, show.title);
    }
    Ok(())
}

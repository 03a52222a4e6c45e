mod import;
mod list;
mod profile;
mod progress;
mod reconcile;
mod watch;

pub use import::cmd_import;
pub use list::cmd_list_shows;
pub use profile::{cmd_profile_add, cmd_profile_list};
pub use progress::cmd_progress;
pub use reconcile::cmd_reconcile;
pub use watch::{cmd_watch_episode, cmd_watch_season, cmd_watch_show};

use crate::config::Config;
use crate::db::Store;
use crate::status::PropagationOutcome;

async fn open_store(config: &Config) -> anyhow::Result<Store> {
    Store::with_pool_options(
        &config.general.database_path,
        config.general.max_db_connections,
        config.general.min_db_connections,
    )
    .await
}

fn print_outcome(outcome: &PropagationOutcome) {
    if outcome.is_noop() {
        println!("Already up to date, nothing written.");
        return;
    }

    println!(
        "{} row(s) written, {} status change(s)",
        outcome.affected_rows,
        outcome.changes.len()
    );
    for change in &outcome.changes {
        println!(
            "  {} {}: {} -> {} ({})",
            change.entity, change.entity_id, change.from, change.to, change.reason
        );
    }
}

//! `SeaORM` implementation of the [`WatchStatusService`] trait.
//!
//! Each public operation is one propagation run: it opens a single
//! transaction through [`Store::run_in_transaction`], performs every read
//! and write on that transaction, and commits only when the whole hierarchy
//! is consistent again. Episode writes always precede the season recompute,
//! which precedes the show recompute.

use crate::db::Store;
use crate::db::repositories::watch_status::{
    EpisodeWatchRow, SeasonWatchRow, WatchStatusRepository,
};
use crate::domain::{EpisodeId, ProfileId, SeasonId, ShowId, WatchStatus};
use crate::services::watch_status_service::{WatchStatusError, WatchStatusService};
use crate::status::calculator::{self, EpisodeSnapshot, SeasonSnapshot, ShowSnapshot};
use crate::status::{ChangeRecorder, PropagationOutcome, WatchEntity};
use chrono::{DateTime, Utc};
use sea_orm::ConnectionTrait;
use std::sync::Arc;
use tracing::info;

const REASON_EPISODE_SET: &str = "episode watch status set";
const REASON_SEASON_SET: &str = "season watch status set";
const REASON_SHOW_SET: &str = "show watch status set";
const REASON_ROLLUP: &str = "recomputed from child statuses";
const REASON_CONTENT_UPDATES: &str = "content updates detected";

/// SeaORM-based implementation of [`WatchStatusService`].
///
/// Stateless: one `Arc<Store>` injected at construction, no mutable fields.
/// Concurrent runs touching the same rows serialize at the store's locking
/// level; there is no in-process coordination.
#[derive(Clone)]
pub struct SeaOrmWatchStatusService {
    store: Arc<Store>,
}

impl SeaOrmWatchStatusService {
    #[must_use]
    pub fn new(store: Arc<Store>) -> Self {
        Self { store }
    }
}

#[async_trait::async_trait]
impl WatchStatusService for SeaOrmWatchStatusService {
    async fn update_episode_status(
        &self,
        profile_id: ProfileId,
        episode_id: EpisodeId,
        target: WatchStatus,
    ) -> Result<PropagationOutcome, WatchStatusError> {
        let now = Utc::now();
        let outcome = self
            .store
            .run_in_transaction(move |txn| {
                Box::pin(async move {
                    propagate_episode(txn, profile_id, episode_id, target, now).await
                })
            })
            .await?;

        info!(
            event = "episode_status_propagated",
            profile = %profile_id,
            episode = %episode_id,
            target = %target,
            changes = outcome.changes.len(),
            affected_rows = outcome.affected_rows,
            "Episode status propagated"
        );

        Ok(outcome)
    }

    async fn update_season_status(
        &self,
        profile_id: ProfileId,
        season_id: SeasonId,
        target: WatchStatus,
    ) -> Result<PropagationOutcome, WatchStatusError> {
        let now = Utc::now();
        let outcome = self
            .store
            .run_in_transaction(move |txn| {
                Box::pin(async move {
                    propagate_season(txn, profile_id, season_id, target, now).await
                })
            })
            .await?;

        info!(
            event = "season_status_propagated",
            profile = %profile_id,
            season = %season_id,
            target = %target,
            changes = outcome.changes.len(),
            affected_rows = outcome.affected_rows,
            "Season status propagated"
        );

        Ok(outcome)
    }

    async fn update_show_status(
        &self,
        profile_id: ProfileId,
        show_id: ShowId,
        target: WatchStatus,
    ) -> Result<PropagationOutcome, WatchStatusError> {
        let now = Utc::now();
        let outcome = self
            .store
            .run_in_transaction(move |txn| {
                Box::pin(async move { propagate_show(txn, profile_id, show_id, target, now).await })
            })
            .await?;

        info!(
            event = "show_status_propagated",
            profile = %profile_id,
            show = %show_id,
            target = %target,
            changes = outcome.changes.len(),
            affected_rows = outcome.affected_rows,
            "Show status propagated"
        );

        Ok(outcome)
    }

    async fn check_and_update_show_status(
        &self,
        profile_id: ProfileId,
        show_id: ShowId,
    ) -> Result<PropagationOutcome, WatchStatusError> {
        let now = Utc::now();
        let outcome = self
            .store
            .run_in_transaction(move |txn| {
                Box::pin(async move { reconcile_show(txn, profile_id, show_id, now).await })
            })
            .await?;

        info!(
            event = "show_status_reconciled",
            profile = %profile_id,
            show = %show_id,
            changes = outcome.changes.len(),
            affected_rows = outcome.affected_rows,
            "Show status reconciled"
        );

        Ok(outcome)
    }
}

// ============================================================================
// Propagation internals
// ============================================================================

/// Show-level fields needed by the rollup, independent of which context
/// query loaded them.
#[derive(Debug, Clone)]
struct ShowMeta {
    show_id: i32,
    release_date: Option<String>,
    in_production: bool,
    status: Option<WatchStatus>,
}

/// In-memory working copy of one show's seasons and episodes for a profile.
/// Episode and season edits land here first, so the season and show
/// recomputations see the state the pending writes will produce.
#[derive(Debug, Clone)]
struct ShowTree {
    seasons: Vec<SeasonWatchRow>,
    episodes: Vec<EpisodeWatchRow>,
}

impl ShowTree {
    fn season(&self, season_id: i32) -> Option<&SeasonWatchRow> {
        self.seasons.iter().find(|s| s.season_id == season_id)
    }

    fn episode_snapshots(&self, season_id: i32, now: DateTime<Utc>) -> Vec<EpisodeSnapshot> {
        self.episodes
            .iter()
            .filter(|ep| ep.season_id == season_id)
            .map(|ep| EpisodeSnapshot {
                episode_id: ep.episode_id,
                air_date: ep.air_date.clone(),
                status: calculator::effective_episode_status(
                    ep.status,
                    ep.air_date.as_deref(),
                    now,
                ),
            })
            .collect()
    }

    fn season_snapshot(&self, season: &SeasonWatchRow, now: DateTime<Utc>) -> SeasonSnapshot {
        SeasonSnapshot {
            season_id: season.season_id,
            release_date: season.release_date.clone(),
            status: season.status,
            episodes: self.episode_snapshots(season.season_id, now),
        }
    }

    fn show_snapshot(&self, meta: &ShowMeta, now: DateTime<Utc>) -> ShowSnapshot {
        ShowSnapshot {
            release_date: meta.release_date.clone(),
            in_production: meta.in_production,
            seasons: self
                .seasons
                .iter()
                .map(|season| self.season_snapshot(season, now))
                .collect(),
        }
    }

    /// Season status derived from episodes alone, ignoring the stored value.
    fn derived_season_status(&self, season: &SeasonWatchRow, now: DateTime<Utc>) -> WatchStatus {
        calculator::season_status(&self.season_snapshot(season, now), now)
    }

    fn set_episode_status(&mut self, episode_id: i32, status: WatchStatus) {
        if let Some(ep) = self
            .episodes
            .iter_mut()
            .find(|ep| ep.episode_id == episode_id)
        {
            ep.status = Some(status);
        }
    }

    fn set_season_status(&mut self, season_id: i32, status: WatchStatus) {
        if let Some(season) = self.seasons.iter_mut().find(|s| s.season_id == season_id) {
            season.status = Some(status);
        }
    }
}

async fn load_tree<C: ConnectionTrait>(
    repo: &WatchStatusRepository<'_, C>,
    profile_id: i32,
    show_id: i32,
) -> Result<ShowTree, WatchStatusError> {
    let seasons = repo.seasons_for_show(profile_id, show_id).await?;
    let episodes = repo.episodes_for_show(profile_id, show_id).await?;
    Ok(ShowTree { seasons, episodes })
}

/// Applies `target` to every aired episode (unaired ones become `Unaired`),
/// optionally restricted to one season. Returns the rows to write.
fn apply_bulk_target(
    tree: &mut ShowTree,
    season_filter: Option<i32>,
    target: WatchStatus,
    recorder: &mut ChangeRecorder,
    reason: &str,
    now: DateTime<Utc>,
) -> Vec<(i32, WatchStatus)> {
    let mut writes = Vec::new();

    for ep in tree
        .episodes
        .iter_mut()
        .filter(|ep| season_filter.is_none_or(|sid| ep.season_id == sid))
    {
        let new_status = if calculator::has_aired(ep.air_date.as_deref(), now) {
            target
        } else {
            WatchStatus::Unaired
        };
        if ep.status != Some(new_status) {
            let old = calculator::effective_episode_status(ep.status, ep.air_date.as_deref(), now);
            recorder.record(WatchEntity::Episode, ep.episode_id, old, new_status, reason);
            ep.status = Some(new_status);
            writes.push((ep.episode_id, new_status));
        }
    }

    writes
}

/// Promotes episodes whose stored status is `Unaired` but whose air date has
/// since passed to `NotWatched`, closing the "aired while pending" gap.
fn promote_aged_episodes(
    tree: &mut ShowTree,
    season_filter: Option<i32>,
    skip_episode: Option<i32>,
    recorder: &mut ChangeRecorder,
    now: DateTime<Utc>,
) -> Vec<(i32, WatchStatus)> {
    let mut writes = Vec::new();

    for ep in tree
        .episodes
        .iter_mut()
        .filter(|ep| season_filter.is_none_or(|sid| ep.season_id == sid))
    {
        if skip_episode == Some(ep.episode_id) {
            continue;
        }
        if ep.status == Some(WatchStatus::Unaired)
            && calculator::has_aired(ep.air_date.as_deref(), now)
        {
            recorder.record(
                WatchEntity::Episode,
                ep.episode_id,
                WatchStatus::Unaired,
                WatchStatus::NotWatched,
                REASON_CONTENT_UPDATES,
            );
            ep.status = Some(WatchStatus::NotWatched);
            writes.push((ep.episode_id, WatchStatus::NotWatched));
        }
    }

    writes
}

/// Recomputes the listed seasons and then the show, writing and recording
/// only statuses that actually moved. `pre` is the tree as loaded, used to
/// derive the prior status of parents that had no stored row yet.
#[allow(clippy::too_many_arguments)]
async fn rollup_parents<C: ConnectionTrait>(
    repo: &WatchStatusRepository<'_, C>,
    profile_id: i32,
    pre: &ShowTree,
    tree: &mut ShowTree,
    meta: &ShowMeta,
    season_ids: &[i32],
    recorder: &mut ChangeRecorder,
    reason: &str,
    now: DateTime<Utc>,
) -> Result<u64, WatchStatusError> {
    let mut affected = 0u64;

    for &season_id in season_ids {
        let Some(season) = tree.season(season_id).cloned() else {
            continue;
        };
        let new_status = tree.derived_season_status(&season, now);
        let old_status = season.status.unwrap_or_else(|| {
            pre.season(season_id)
                .map_or(new_status, |s| pre.derived_season_status(s, now))
        });

        if season.status != Some(new_status) {
            repo.upsert_season_status(profile_id, season_id, new_status, now)
                .await?;
            affected += 1;
            recorder.record(
                WatchEntity::Season,
                season_id,
                old_status,
                new_status,
                reason,
            );
            tree.set_season_status(season_id, new_status);
        }
    }

    let new_show = calculator::show_status(&tree.show_snapshot(meta, now), now);
    let old_show = meta
        .status
        .unwrap_or_else(|| calculator::show_status(&pre.show_snapshot(meta, now), now));

    if meta.status != Some(new_show) {
        repo.upsert_show_status(profile_id, meta.show_id, new_show, now)
            .await?;
        affected += 1;
        recorder.record(WatchEntity::Show, meta.show_id, old_show, new_show, reason);
    }

    Ok(affected)
}

async fn propagate_episode<C: ConnectionTrait>(
    conn: &C,
    profile_id: ProfileId,
    episode_id: EpisodeId,
    target: WatchStatus,
    now: DateTime<Utc>,
) -> Result<PropagationOutcome, WatchStatusError> {
    let repo = WatchStatusRepository::new(conn);
    let pid = profile_id.value();
    let eid = episode_id.value();

    let ctx = repo
        .episode_context(pid, eid)
        .await?
        .ok_or(WatchStatusError::EpisodeNotFound(episode_id))?;

    let mut tree = load_tree(&repo, pid, ctx.show_id).await?;
    let pre = tree.clone();
    let mut recorder = ChangeRecorder::new(now);

    // Siblings that aired while still stored UNAIRED are reset first so the
    // season recompute sees them as unwatched rather than pending.
    let mut writes =
        promote_aged_episodes(&mut tree, Some(ctx.season_id), Some(eid), &mut recorder, now);

    let new_status = if calculator::has_aired(ctx.air_date.as_deref(), now) {
        target
    } else {
        WatchStatus::Unaired
    };
    if ctx.episode_status != Some(new_status) {
        let old =
            calculator::effective_episode_status(ctx.episode_status, ctx.air_date.as_deref(), now);
        recorder.record(WatchEntity::Episode, eid, old, new_status, REASON_EPISODE_SET);
        tree.set_episode_status(eid, new_status);
        writes.push((eid, new_status));
    }

    let mut affected = repo.upsert_episode_statuses(pid, &writes, now).await?;

    let meta = ShowMeta {
        show_id: ctx.show_id,
        release_date: ctx.show_release_date.clone(),
        in_production: ctx.in_production,
        status: ctx.show_status,
    };
    affected += rollup_parents(
        &repo,
        pid,
        &pre,
        &mut tree,
        &meta,
        &[ctx.season_id],
        &mut recorder,
        REASON_ROLLUP,
        now,
    )
    .await?;

    Ok(PropagationOutcome {
        changes: recorder.into_changes(),
        affected_rows: affected,
    })
}

async fn propagate_season<C: ConnectionTrait>(
    conn: &C,
    profile_id: ProfileId,
    season_id: SeasonId,
    target: WatchStatus,
    now: DateTime<Utc>,
) -> Result<PropagationOutcome, WatchStatusError> {
    let repo = WatchStatusRepository::new(conn);
    let pid = profile_id.value();
    let sid = season_id.value();

    let ctx = repo
        .season_context(pid, sid)
        .await?
        .ok_or(WatchStatusError::SeasonNotFound(season_id))?;

    let mut tree = load_tree(&repo, pid, ctx.show_id).await?;
    let pre = tree.clone();
    let mut recorder = ChangeRecorder::new(now);

    let writes = apply_bulk_target(
        &mut tree,
        Some(sid),
        target,
        &mut recorder,
        REASON_SEASON_SET,
        now,
    );
    let mut affected = repo.upsert_episode_statuses(pid, &writes, now).await?;

    let meta = ShowMeta {
        show_id: ctx.show_id,
        release_date: ctx.show_release_date.clone(),
        in_production: ctx.in_production,
        status: ctx.show_status,
    };
    affected += rollup_parents(
        &repo,
        pid,
        &pre,
        &mut tree,
        &meta,
        &[sid],
        &mut recorder,
        REASON_ROLLUP,
        now,
    )
    .await?;

    Ok(PropagationOutcome {
        changes: recorder.into_changes(),
        affected_rows: affected,
    })
}

async fn propagate_show<C: ConnectionTrait>(
    conn: &C,
    profile_id: ProfileId,
    show_id: ShowId,
    target: WatchStatus,
    now: DateTime<Utc>,
) -> Result<PropagationOutcome, WatchStatusError> {
    let repo = WatchStatusRepository::new(conn);
    let pid = profile_id.value();

    let ctx = repo
        .show_context(pid, show_id.value())
        .await?
        .ok_or(WatchStatusError::ShowNotFound(show_id))?;

    let mut tree = load_tree(&repo, pid, ctx.show_id).await?;
    let pre = tree.clone();
    let mut recorder = ChangeRecorder::new(now);

    let writes = apply_bulk_target(&mut tree, None, target, &mut recorder, REASON_SHOW_SET, now);
    let mut affected = repo.upsert_episode_statuses(pid, &writes, now).await?;

    let season_ids: Vec<i32> = tree.seasons.iter().map(|s| s.season_id).collect();
    let meta = ShowMeta {
        show_id: ctx.show_id,
        release_date: ctx.release_date.clone(),
        in_production: ctx.in_production,
        status: ctx.show_status,
    };
    affected += rollup_parents(
        &repo,
        pid,
        &pre,
        &mut tree,
        &meta,
        &season_ids,
        &mut recorder,
        REASON_ROLLUP,
        now,
    )
    .await?;

    Ok(PropagationOutcome {
        changes: recorder.into_changes(),
        affected_rows: affected,
    })
}

async fn reconcile_show<C: ConnectionTrait>(
    conn: &C,
    profile_id: ProfileId,
    show_id: ShowId,
    now: DateTime<Utc>,
) -> Result<PropagationOutcome, WatchStatusError> {
    let repo = WatchStatusRepository::new(conn);
    let pid = profile_id.value();

    let ctx = repo
        .show_context(pid, show_id.value())
        .await?
        .ok_or(WatchStatusError::ShowNotFound(show_id))?;

    let mut tree = load_tree(&repo, pid, ctx.show_id).await?;
    let pre = tree.clone();
    let mut recorder = ChangeRecorder::new(now);

    let writes = promote_aged_episodes(&mut tree, None, None, &mut recorder, now);
    let mut affected = repo.upsert_episode_statuses(pid, &writes, now).await?;

    let season_ids: Vec<i32> = tree.seasons.iter().map(|s| s.season_id).collect();
    let meta = ShowMeta {
        show_id: ctx.show_id,
        release_date: ctx.release_date.clone(),
        in_production: ctx.in_production,
        status: ctx.show_status,
    };
    affected += rollup_parents(
        &repo,
        pid,
        &pre,
        &mut tree,
        &meta,
        &season_ids,
        &mut recorder,
        REASON_CONTENT_UPDATES,
        now,
    )
    .await?;

    Ok(PropagationOutcome {
        changes: recorder.into_changes(),
        affected_rows: affected,
    })
}

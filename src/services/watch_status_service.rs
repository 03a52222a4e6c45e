//! Domain service for watch-status propagation.
//!
//! This module provides the [`WatchStatusService`] trait, abstracting the
//! propagation engine that keeps episode, season and show statuses
//! consistent for a profile.

use crate::domain::{EpisodeId, ProfileId, SeasonId, ShowId, WatchStatus};
use crate::status::PropagationOutcome;
use thiserror::Error;

/// Domain errors for propagation runs.
///
/// Any error aborts the whole transaction: partial propagation is never
/// observable. Target statuses are assumed pre-validated by the caller, so
/// there is no validation variant.
#[derive(Debug, Error)]
pub enum WatchStatusError {
    #[error("Episode {0} not found")]
    EpisodeNotFound(EpisodeId),

    #[error("Season {0} not found")]
    SeasonNotFound(SeasonId),

    #[error("Show {0} not found")]
    ShowNotFound(ShowId),

    #[error("Database error: {0}")]
    Database(String),
}

impl From<sea_orm::DbErr> for WatchStatusError {
    fn from(err: sea_orm::DbErr) -> Self {
        Self::Database(err.to_string())
    }
}

impl From<anyhow::Error> for WatchStatusError {
    fn from(err: anyhow::Error) -> Self {
        Self::Database(err.to_string())
    }
}

/// Propagation engine contract. Each operation executes as exactly one
/// store transaction; within it, episode writes happen before the season
/// recompute, which happens before the show recompute. Operations are
/// idempotent: repeating a call with no new data yields an empty outcome.
#[async_trait::async_trait]
pub trait WatchStatusService: Send + Sync {
    /// Sets one episode's status for a profile and propagates the change
    /// upward through its season and show. Sibling episodes whose stored
    /// status is `Unaired` but whose air date has passed are promoted to
    /// `NotWatched` before the season recompute.
    ///
    /// # Errors
    ///
    /// - Returns [`WatchStatusError::EpisodeNotFound`] if the episode does not exist
    /// - Returns [`WatchStatusError::Database`] on store failures (rolled back)
    async fn update_episode_status(
        &self,
        profile_id: ProfileId,
        episode_id: EpisodeId,
        target: WatchStatus,
    ) -> Result<PropagationOutcome, WatchStatusError>;

    /// Applies `target` to every aired episode of a season (unaired
    /// episodes become `Unaired`), then recomputes the season and show.
    ///
    /// # Errors
    ///
    /// - Returns [`WatchStatusError::SeasonNotFound`] if the season does not exist
    /// - Returns [`WatchStatusError::Database`] on store failures (rolled back)
    async fn update_season_status(
        &self,
        profile_id: ProfileId,
        season_id: SeasonId,
        target: WatchStatus,
    ) -> Result<PropagationOutcome, WatchStatusError>;

    /// Applies `target` to every aired episode under every season of a
    /// show, then recomputes each season and finally the show.
    ///
    /// # Errors
    ///
    /// - Returns [`WatchStatusError::ShowNotFound`] if the show does not exist
    /// - Returns [`WatchStatusError::Database`] on store failures (rolled back)
    async fn update_show_status(
        &self,
        profile_id: ProfileId,
        show_id: ShowId,
        target: WatchStatus,
    ) -> Result<PropagationOutcome, WatchStatusError>;

    /// Reconciliation pass with no target: promotes episodes whose air date
    /// has passed since they were stored `Unaired`, then recomputes every
    /// season and the show from current data. Used when new content may
    /// have appeared without a user action.
    ///
    /// # Errors
    ///
    /// - Returns [`WatchStatusError::ShowNotFound`] if the show does not exist
    /// - Returns [`WatchStatusError::Database`] on store failures (rolled back)
    async fn check_and_update_show_status(
        &self,
        profile_id: ProfileId,
        show_id: ShowId,
    ) -> Result<PropagationOutcome, WatchStatusError>;
}

use crate::domain::WatchStatus;
use crate::entities::{
    episode_watch_status, episodes, prelude::*, season_watch_status, seasons, show_watch_status,
    shows,
};
use anyhow::Result;
use chrono::{DateTime, Utc};
use sea_orm::sea_query::{Expr, OnConflict};
use sea_orm::{
    ColumnTrait, Condition, ConnectionTrait, EntityTrait, FromQueryResult, JoinType, QueryFilter,
    QueryOrder, QuerySelect, RelationTrait, Set,
};

/// Repository for per-profile watch-status rows.
///
/// Generic over the connection so every read and write of one propagation
/// run can go through the same open transaction.
pub struct WatchStatusRepository<'c, C> {
    conn: &'c C,
}

impl<'c, C: ConnectionTrait> WatchStatusRepository<'c, C> {
    pub const fn new(conn: &'c C) -> Self {
        Self { conn }
    }

    // ========================================================================
    // Reads
    // ========================================================================

    /// Loads an episode with its season and show context plus the profile's
    /// current statuses at every level, in one joined query.
    pub async fn episode_context(
        &self,
        profile_id: i32,
        episode_id: i32,
    ) -> Result<Option<EpisodeContextRow>> {
        let row = Episodes::find()
            .select_only()
            .column_as(episodes::Column::Id, "episode_id")
            .column(episodes::Column::SeasonId)
            .column(episodes::Column::ShowId)
            .column(episodes::Column::AirDate)
            .column_as(episode_watch_status::Column::Status, "episode_status")
            .column_as(seasons::Column::ReleaseDate, "season_release_date")
            .column_as(season_watch_status::Column::Status, "season_status")
            .column_as(shows::Column::ReleaseDate, "show_release_date")
            .column(shows::Column::InProduction)
            .column_as(show_watch_status::Column::Status, "show_status")
            .join(JoinType::InnerJoin, episodes::Relation::Seasons.def())
            .join(JoinType::InnerJoin, episodes::Relation::Shows.def())
            .join(
                JoinType::LeftJoin,
                episodes::Entity::belongs_to(episode_watch_status::Entity)
                    .from(episodes::Column::Id)
                    .to(episode_watch_status::Column::EpisodeId)
                    .on_condition(move |_left, _right| {
                        Condition::all().add(
                            Expr::col((
                                episode_watch_status::Entity,
                                episode_watch_status::Column::ProfileId,
                            ))
                            .eq(profile_id),
                        )
                    })
                    .into(),
            )
            .join(
                JoinType::LeftJoin,
                seasons::Entity::belongs_to(season_watch_status::Entity)
                    .from(seasons::Column::Id)
                    .to(season_watch_status::Column::SeasonId)
                    .on_condition(move |_left, _right| {
                        Condition::all().add(
                            Expr::col((
                                season_watch_status::Entity,
                                season_watch_status::Column::ProfileId,
                            ))
                            .eq(profile_id),
                        )
                    })
                    .into(),
            )
            .join(
                JoinType::LeftJoin,
                shows::Entity::belongs_to(show_watch_status::Entity)
                    .from(shows::Column::Id)
                    .to(show_watch_status::Column::ShowId)
                    .on_condition(move |_left, _right| {
                        Condition::all().add(
                            Expr::col((
                                show_watch_status::Entity,
                                show_watch_status::Column::ProfileId,
                            ))
                            .eq(profile_id),
                        )
                    })
                    .into(),
            )
            .filter(episodes::Column::Id.eq(episode_id))
            .into_model::<EpisodeContextRow>()
            .one(self.conn)
            .await?;

        Ok(row)
    }

    /// Loads a season with its show context and the profile's season/show
    /// statuses.
    pub async fn season_context(
        &self,
        profile_id: i32,
        season_id: i32,
    ) -> Result<Option<SeasonContextRow>> {
        let row = Seasons::find()
            .select_only()
            .column_as(seasons::Column::Id, "season_id")
            .column(seasons::Column::ShowId)
            .column(seasons::Column::ReleaseDate)
            .column_as(season_watch_status::Column::Status, "season_status")
            .column_as(shows::Column::ReleaseDate, "show_release_date")
            .column(shows::Column::InProduction)
            .column_as(show_watch_status::Column::Status, "show_status")
            .join(JoinType::InnerJoin, seasons::Relation::Shows.def())
            .join(
                JoinType::LeftJoin,
                seasons::Entity::belongs_to(season_watch_status::Entity)
                    .from(seasons::Column::Id)
                    .to(season_watch_status::Column::SeasonId)
                    .on_condition(move |_left, _right| {
                        Condition::all().add(
                            Expr::col((
                                season_watch_status::Entity,
                                season_watch_status::Column::ProfileId,
                            ))
                            .eq(profile_id),
                        )
                    })
                    .into(),
            )
            .join(
                JoinType::LeftJoin,
                shows::Entity::belongs_to(show_watch_status::Entity)
                    .from(shows::Column::Id)
                    .to(show_watch_status::Column::ShowId)
                    .on_condition(move |_left, _right| {
                        Condition::all().add(
                            Expr::col((
                                show_watch_status::Entity,
                                show_watch_status::Column::ProfileId,
                            ))
                            .eq(profile_id),
                        )
                    })
                    .into(),
            )
            .filter(seasons::Column::Id.eq(season_id))
            .into_model::<SeasonContextRow>()
            .one(self.conn)
            .await?;

        Ok(row)
    }

    /// Loads a show row with the profile's stored show status.
    pub async fn show_context(
        &self,
        profile_id: i32,
        show_id: i32,
    ) -> Result<Option<ShowContextRow>> {
        let row = Shows::find()
            .select_only()
            .column_as(shows::Column::Id, "show_id")
            .column(shows::Column::ReleaseDate)
            .column(shows::Column::InProduction)
            .column_as(show_watch_status::Column::Status, "show_status")
            .join(
                JoinType::LeftJoin,
                shows::Entity::belongs_to(show_watch_status::Entity)
                    .from(shows::Column::Id)
                    .to(show_watch_status::Column::ShowId)
                    .on_condition(move |_left, _right| {
                        Condition::all().add(
                            Expr::col((
                                show_watch_status::Entity,
                                show_watch_status::Column::ProfileId,
                            ))
                            .eq(profile_id),
                        )
                    })
                    .into(),
            )
            .filter(shows::Column::Id.eq(show_id))
            .into_model::<ShowContextRow>()
            .one(self.conn)
            .await?;

        Ok(row)
    }

    /// All episodes of a show with the profile's stored statuses, left-joined
    /// so untouched episodes come back with `status: None`.
    pub async fn episodes_for_show(
        &self,
        profile_id: i32,
        show_id: i32,
    ) -> Result<Vec<EpisodeWatchRow>> {
        let rows = Episodes::find()
            .select_only()
            .column_as(episodes::Column::Id, "episode_id")
            .column(episodes::Column::SeasonId)
            .column(episodes::Column::EpisodeNumber)
            .column(episodes::Column::AirDate)
            .column_as(episode_watch_status::Column::Status, "status")
            .join(
                JoinType::LeftJoin,
                episodes::Entity::belongs_to(episode_watch_status::Entity)
                    .from(episodes::Column::Id)
                    .to(episode_watch_status::Column::EpisodeId)
                    .on_condition(move |_left, _right| {
                        Condition::all().add(
                            Expr::col((
                                episode_watch_status::Entity,
                                episode_watch_status::Column::ProfileId,
                            ))
                            .eq(profile_id),
                        )
                    })
                    .into(),
            )
            .filter(episodes::Column::ShowId.eq(show_id))
            .order_by_asc(episodes::Column::SeasonId)
            .order_by_asc(episodes::Column::EpisodeNumber)
            .into_model::<EpisodeWatchRow>()
            .all(self.conn)
            .await?;

        Ok(rows)
    }

    /// All seasons of a show with the profile's stored statuses.
    pub async fn seasons_for_show(
        &self,
        profile_id: i32,
        show_id: i32,
    ) -> Result<Vec<SeasonWatchRow>> {
        let rows = Seasons::find()
            .select_only()
            .column_as(seasons::Column::Id, "season_id")
            .column(seasons::Column::SeasonNumber)
            .column(seasons::Column::ReleaseDate)
            .column_as(season_watch_status::Column::Status, "status")
            .join(
                JoinType::LeftJoin,
                seasons::Entity::belongs_to(season_watch_status::Entity)
                    .from(seasons::Column::Id)
                    .to(season_watch_status::Column::SeasonId)
                    .on_condition(move |_left, _right| {
                        Condition::all().add(
                            Expr::col((
                                season_watch_status::Entity,
                                season_watch_status::Column::ProfileId,
                            ))
                            .eq(profile_id),
                        )
                    })
                    .into(),
            )
            .filter(seasons::Column::ShowId.eq(show_id))
            .order_by_asc(seasons::Column::SeasonNumber)
            .into_model::<SeasonWatchRow>()
            .all(self.conn)
            .await?;

        Ok(rows)
    }

    // ========================================================================
    // Writes
    // ========================================================================

    /// Batch insert-or-update of episode statuses keyed by
    /// (profile id, episode id). Returns the number of rows written.
    pub async fn upsert_episode_statuses(
        &self,
        profile_id: i32,
        updates: &[(i32, WatchStatus)],
        now: DateTime<Utc>,
    ) -> Result<u64> {
        if updates.is_empty() {
            return Ok(0);
        }

        let updated_at = now.to_rfc3339();
        let models: Vec<episode_watch_status::ActiveModel> = updates
            .iter()
            .map(|&(episode_id, status)| episode_watch_status::ActiveModel {
                profile_id: Set(profile_id),
                episode_id: Set(episode_id),
                status: Set(status),
                updated_at: Set(updated_at.clone()),
            })
            .collect();

        EpisodeWatchStatus::insert_many(models)
            .on_conflict(
                OnConflict::columns([
                    episode_watch_status::Column::ProfileId,
                    episode_watch_status::Column::EpisodeId,
                ])
                .update_columns([
                    episode_watch_status::Column::Status,
                    episode_watch_status::Column::UpdatedAt,
                ])
                .to_owned(),
            )
            .exec(self.conn)
            .await?;

        Ok(updates.len() as u64)
    }

    /// Insert-or-update of one season status row.
    pub async fn upsert_season_status(
        &self,
        profile_id: i32,
        season_id: i32,
        status: WatchStatus,
        now: DateTime<Utc>,
    ) -> Result<()> {
        let model = season_watch_status::ActiveModel {
            profile_id: Set(profile_id),
            season_id: Set(season_id),
            status: Set(status),
            updated_at: Set(now.to_rfc3339()),
        };

        SeasonWatchStatus::insert(model)
            .on_conflict(
                OnConflict::columns([
                    season_watch_status::Column::ProfileId,
                    season_watch_status::Column::SeasonId,
                ])
                .update_columns([
                    season_watch_status::Column::Status,
                    season_watch_status::Column::UpdatedAt,
                ])
                .to_owned(),
            )
            .exec(self.conn)
            .await?;

        Ok(())
    }

    /// Insert-or-update of one show status row.
    pub async fn upsert_show_status(
        &self,
        profile_id: i32,
        show_id: i32,
        status: WatchStatus,
        now: DateTime<Utc>,
    ) -> Result<()> {
        let model = show_watch_status::ActiveModel {
            profile_id: Set(profile_id),
            show_id: Set(show_id),
            status: Set(status),
            updated_at: Set(now.to_rfc3339()),
        };

        ShowWatchStatus::insert(model)
            .on_conflict(
                OnConflict::columns([
                    show_watch_status::Column::ProfileId,
                    show_watch_status::Column::ShowId,
                ])
                .update_columns([
                    show_watch_status::Column::Status,
                    show_watch_status::Column::UpdatedAt,
                ])
                .to_owned(),
            )
            .exec(self.conn)
            .await?;

        Ok(())
    }
}

/// Episode row with full hierarchy context for one profile.
#[derive(Debug, Clone, FromQueryResult)]
pub struct EpisodeContextRow {
    pub episode_id: i32,
    pub season_id: i32,
    pub show_id: i32,
    pub air_date: Option<String>,
    pub episode_status: Option<WatchStatus>,
    pub season_release_date: Option<String>,
    pub season_status: Option<WatchStatus>,
    pub show_release_date: Option<String>,
    pub in_production: bool,
    pub show_status: Option<WatchStatus>,
}

/// Season row with show context for one profile.
#[derive(Debug, Clone, FromQueryResult)]
pub struct SeasonContextRow {
    pub season_id: i32,
    pub show_id: i32,
    pub release_date: Option<String>,
    pub season_status: Option<WatchStatus>,
    pub show_release_date: Option<String>,
    pub in_production: bool,
    pub show_status: Option<WatchStatus>,
}

/// Show row with the profile's stored status.
#[derive(Debug, Clone, FromQueryResult)]
pub struct ShowContextRow {
    pub show_id: i32,
    pub release_date: Option<String>,
    pub in_production: bool,
    pub show_status: Option<WatchStatus>,
}

/// Episode row for aggregation; `status` is None when the profile has never
/// touched the episode.
#[derive(Debug, Clone, FromQueryResult)]
pub struct EpisodeWatchRow {
    pub episode_id: i32,
    pub season_id: i32,
    pub episode_number: i32,
    pub air_date: Option<String>,
    pub status: Option<WatchStatus>,
}

/// Season row for aggregation.
#[derive(Debug, Clone, FromQueryResult)]
pub struct SeasonWatchRow {
    pub season_id: i32,
    pub season_number: i32,
    pub release_date: Option<String>,
    pub status: Option<WatchStatus>,
}

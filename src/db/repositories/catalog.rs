use crate::entities::{episodes, prelude::*, seasons, shows};
use crate::models::catalog::ShowInput;
use anyhow::Result;
use sea_orm::sea_query::OnConflict;
use sea_orm::{ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, Set};

/// Repository for the content hierarchy (shows, seasons, episodes).
///
/// The hierarchy is produced by an upstream metadata refresher; this
/// repository only ingests and reads it. Watch-status rows live in
/// [`super::watch_status`] and the propagation engine never writes the
/// hierarchy shape.
pub struct CatalogRepository {
    conn: DatabaseConnection,
}

impl CatalogRepository {
    pub const fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }

    /// Insert-or-update of a show and its nested seasons and episodes.
    /// `added_at` is preserved on conflict so re-imports keep the original
    /// library timestamp.
    pub async fn upsert_show(&self, show: &ShowInput) -> Result<()> {
        let show_model = shows::ActiveModel {
            id: Set(show.id),
            title: Set(show.title.clone()),
            release_date: Set(show.release_date.clone()),
            in_production: Set(show.in_production),
            added_at: Set(chrono::Utc::now().to_rfc3339()),
        };

        Shows::insert(show_model)
            .on_conflict(
                OnConflict::column(shows::Column::Id)
                    .update_columns([
                        shows::Column::Title,
                        shows::Column::ReleaseDate,
                        shows::Column::InProduction,
                    ])
                    .to_owned(),
            )
            .exec(&self.conn)
            .await?;

        let season_models: Vec<seasons::ActiveModel> = show
            .seasons
            .iter()
            .map(|season| seasons::ActiveModel {
                id: Set(season.id),
                show_id: Set(show.id),
                season_number: Set(season.season_number),
                title: Set(season.title.clone()),
                release_date: Set(season.release_date.clone()),
            })
            .collect();

        if !season_models.is_empty() {
            Seasons::insert_many(season_models)
                .on_conflict(
                    OnConflict::column(seasons::Column::Id)
                        .update_columns([
                            seasons::Column::SeasonNumber,
                            seasons::Column::Title,
                            seasons::Column::ReleaseDate,
                        ])
                        .to_owned(),
                )
                .exec(&self.conn)
                .await?;
        }

        let episode_models: Vec<episodes::ActiveModel> = show
            .seasons
            .iter()
            .flat_map(|season| {
                season.episodes.iter().map(|episode| episodes::ActiveModel {
                    id: Set(episode.id),
                    season_id: Set(season.id),
                    show_id: Set(show.id),
                    episode_number: Set(episode.episode_number),
                    title: Set(episode.title.clone()),
                    air_date: Set(episode.air_date.clone()),
                })
            })
            .collect();

        if !episode_models.is_empty() {
            Episodes::insert_many(episode_models)
                .on_conflict(
                    OnConflict::column(episodes::Column::Id)
                        .update_columns([
                            episodes::Column::EpisodeNumber,
                            episodes::Column::Title,
                            episodes::Column::AirDate,
                        ])
                        .to_owned(),
                )
                .exec(&self.conn)
                .await?;
        }

        Ok(())
    }

    pub async fn get_show(&self, show_id: i32) -> Result<Option<shows::Model>> {
        let row = Shows::find_by_id(show_id).one(&self.conn).await?;
        Ok(row)
    }

    pub async fn list_shows(&self) -> Result<Vec<shows::Model>> {
        let rows = Shows::find()
            .order_by_asc(shows::Column::Title)
            .all(&self.conn)
            .await?;
        Ok(rows)
    }

    pub async fn seasons_for_show(&self, show_id: i32) -> Result<Vec<seasons::Model>> {
        let rows = Seasons::find()
            .filter(seasons::Column::ShowId.eq(show_id))
            .order_by_asc(seasons::Column::SeasonNumber)
            .all(&self.conn)
            .await?;
        Ok(rows)
    }

    pub async fn episodes_for_show(&self, show_id: i32) -> Result<Vec<episodes::Model>> {
        let rows = Episodes::find()
            .filter(episodes::Column::ShowId.eq(show_id))
            .order_by_asc(episodes::Column::SeasonId)
            .order_by_asc(episodes::Column::EpisodeNumber)
            .all(&self.conn)
            .await?;
        Ok(rows)
    }
}

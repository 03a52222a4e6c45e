use crate::entities::prelude::*;
use crate::entities::{episodes, seasons};
use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_seasons_show_id")
                    .table(Seasons)
                    .col(seasons::Column::ShowId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_episodes_season_id")
                    .table(Episodes)
                    .col(episodes::Column::SeasonId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_episodes_show_id")
                    .table(Episodes)
                    .col(episodes::Column::ShowId)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_index(Index::drop().name("idx_episodes_show_id").to_owned())
            .await?;
        manager
            .drop_index(Index::drop().name("idx_episodes_season_id").to_owned())
            .await?;
        manager
            .drop_index(Index::drop().name("idx_seasons_show_id").to_owned())
            .await?;

        Ok(())
    }
}

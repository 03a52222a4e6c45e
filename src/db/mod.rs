use crate::entities::{episodes, profiles, seasons, shows};
use crate::models::catalog::ShowInput;
use anyhow::Result;
use futures::future::BoxFuture;
use sea_orm::{
    ConnectOptions, ConnectionTrait, Database, DatabaseConnection, DatabaseTransaction, DbErr,
    Statement, TransactionTrait,
};
use std::path::Path;
use std::time::Duration;
use tracing::{info, warn};

pub mod migrator;
pub mod repositories;

pub use repositories::watch_status::{
    EpisodeContextRow, EpisodeWatchRow, SeasonContextRow, SeasonWatchRow, ShowContextRow,
    WatchStatusRepository,
};

#[derive(Clone)]
pub struct Store {
    pub conn: DatabaseConnection,
}

impl Store {
    pub async fn new(db_url: &str) -> Result<Self> {
        Self::with_pool_options(db_url, 5, 1).await
    }

    pub async fn with_pool_options(
        db_url: &str,
        max_connections: u32,
        min_connections: u32,
    ) -> Result<Self> {
        use sea_orm_migration::MigratorTrait;

        if !db_url.contains(":memory:") {
            let path_str = db_url.trim_start_matches("sqlite:");
            if let Some(parent) = Path::new(path_str).parent() {
                tokio::fs::create_dir_all(parent).await.ok();
            }
            if !Path::new(path_str).exists() {
                std::fs::File::create(path_str)?;
            }
        }

        let mut opt = ConnectOptions::new(db_url.to_string());
        opt.max_connections(max_connections)
            .min_connections(min_connections)
            .connect_timeout(Duration::from_secs(10))
            .acquire_timeout(Duration::from_secs(10))
            .idle_timeout(Duration::from_secs(300))
            .max_lifetime(Duration::from_secs(600))
            .sqlx_logging(false);

        let conn = Database::connect(opt).await?;

        migrator::Migrator::up(&conn, None).await?;

        info!(
            "Database connected & migrations applied (pool: {}-{})",
            min_connections, max_connections
        );

        Ok(Self { conn })
    }

    pub async fn ping(&self) -> Result<()> {
        let backend = self.conn.get_database_backend();
        self.conn
            .query_one(Statement::from_string(backend, "SELECT 1".to_string()))
            .await?;
        Ok(())
    }

    /// Transactional update driver: acquires one connection, begins a
    /// transaction, runs `work` with it, commits on success, and rolls back
    /// on any error before handing it back to the caller. All reads and
    /// writes of one propagation run go through the supplied transaction so
    /// the run is atomic; concurrent runs on the same rows serialize at the
    /// store's locking level, not in process memory.
    pub async fn run_in_transaction<F, T, E>(&self, work: F) -> Result<T, E>
    where
        F: for<'c> FnOnce(&'c DatabaseTransaction) -> BoxFuture<'c, Result<T, E>> + Send,
        T: Send,
        E: From<DbErr> + Send,
    {
        let txn = self.conn.begin().await.map_err(E::from)?;

        match work(&txn).await {
            Ok(value) => {
                txn.commit().await.map_err(E::from)?;
                Ok(value)
            }
            Err(err) => {
                if let Err(rollback_err) = txn.rollback().await {
                    warn!(error = %rollback_err, "transaction rollback failed");
                }
                Err(err)
            }
        }
    }

    fn catalog_repo(&self) -> repositories::catalog::CatalogRepository {
        repositories::catalog::CatalogRepository::new(self.conn.clone())
    }

    fn profile_repo(&self) -> repositories::profile::ProfileRepository {
        repositories::profile::ProfileRepository::new(self.conn.clone())
    }

    fn watch_repo(&self) -> WatchStatusRepository<'_, DatabaseConnection> {
        WatchStatusRepository::new(&self.conn)
    }

    // ========================================================================
    // Catalog
    // ========================================================================

    pub async fn add_show(&self, show: &ShowInput) -> Result<()> {
        self.catalog_repo().upsert_show(show).await
    }

    pub async fn get_show(&self, show_id: i32) -> Result<Option<shows::Model>> {
        self.catalog_repo().get_show(show_id).await
    }

    pub async fn list_shows(&self) -> Result<Vec<shows::Model>> {
        self.catalog_repo().list_shows().await
    }

    pub async fn seasons_for_show(&self, show_id: i32) -> Result<Vec<seasons::Model>> {
        self.catalog_repo().seasons_for_show(show_id).await
    }

    pub async fn episodes_for_show(&self, show_id: i32) -> Result<Vec<episodes::Model>> {
        self.catalog_repo().episodes_for_show(show_id).await
    }

    // ========================================================================
    // Profiles
    // ========================================================================

    pub async fn create_profile(&self, name: &str) -> Result<profiles::Model> {
        self.profile_repo().create(name).await
    }

    pub async fn get_profile(&self, profile_id: i32) -> Result<Option<profiles::Model>> {
        self.profile_repo().get(profile_id).await
    }

    pub async fn list_profiles(&self) -> Result<Vec<profiles::Model>> {
        self.profile_repo().list().await
    }

    // ========================================================================
    // Watch status (read-only outside the engine)
    // ========================================================================

    pub async fn show_watch_context(
        &self,
        profile_id: i32,
        show_id: i32,
    ) -> Result<Option<ShowContextRow>> {
        self.watch_repo().show_context(profile_id, show_id).await
    }

    pub async fn season_watch_rows(
        &self,
        profile_id: i32,
        show_id: i32,
    ) -> Result<Vec<SeasonWatchRow>> {
        self.watch_repo()
            .seasons_for_show(profile_id, show_id)
            .await
    }

    pub async fn episode_watch_rows(
        &self,
        profile_id: i32,
        show_id: i32,
    ) -> Result<Vec<EpisodeWatchRow>> {
        self.watch_repo()
            .episodes_for_show(profile_id, show_id)
            .await
    }
}

use crate::entities::{prelude::*, profiles};
use anyhow::Result;
use sea_orm::{ActiveValue::NotSet, DatabaseConnection, EntityTrait, QueryOrder, Set};

/// Minimal profile access. Full account/profile management lives in the
/// service layer consuming this crate; the engine only needs rows to key
/// status against.
pub struct ProfileRepository {
    conn: DatabaseConnection,
}

impl ProfileRepository {
    pub const fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }

    pub async fn create(&self, name: &str) -> Result<profiles::Model> {
        let model = profiles::ActiveModel {
            id: NotSet,
            name: Set(name.to_string()),
            created_at: Set(chrono::Utc::now().to_rfc3339()),
        };

        let insert = Profiles::insert(model).exec(&self.conn).await?;
        let created = Profiles::find_by_id(insert.last_insert_id)
            .one(&self.conn)
            .await?
            .ok_or_else(|| anyhow::anyhow!("profile {} vanished after insert", name))?;

        Ok(created)
    }

    pub async fn get(&self, profile_id: i32) -> Result<Option<profiles::Model>> {
        let row = Profiles::find_by_id(profile_id).one(&self.conn).await?;
        Ok(row)
    }

    pub async fn list(&self) -> Result<Vec<profiles::Model>> {
        let rows = Profiles::find()
            .order_by_asc(profiles::Column::Id)
            .all(&self.conn)
            .await?;
        Ok(rows)
    }
}

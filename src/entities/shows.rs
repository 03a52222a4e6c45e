use sea_orm::entity::prelude::*;

/// Show hierarchy row. Ids come from the upstream metadata provider, so the
/// primary key is not auto-incremented.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "shows")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: i32,

    pub title: String,

    /// First air date, RFC 3339 or `YYYY-MM-DD`; None when unannounced.
    pub release_date: Option<String>,

    pub in_production: bool,

    pub added_at: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::seasons::Entity")]
    Seasons,
}

impl Related<super::seasons::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Seasons.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "shows")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    /// JSON id container, e.g. `{"externalId":"anilist:20"}`.
    pub external_ids: String,
    pub title_preferred: String,
    pub title_original: Option<String>,
    /// JSON array of strings.
    pub alt_titles: String,
    #[sea_orm(column_name = "type")]
    pub show_type: String,
    pub status: String,
    pub synopsis: Option<String>,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
    pub poster_url: Option<String>,
    pub banner_url: Option<String>,
    pub season_count: Option<i64>,
    pub episode_count: Option<i64>,
    pub created_at: String,
    pub updated_at: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::episodes::Entity")]
    Episodes,
    #[sea_orm(has_many = "super::job_shows::Entity")]
    JobShows,
}

impl Related<super::episodes::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Episodes.def()
    }
}

impl Related<super::job_shows::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::JobShows.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

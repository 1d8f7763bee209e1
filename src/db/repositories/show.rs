use crate::domain::{ShowStatus, ShowType, normalize_status_or_default};
use crate::entities::{prelude::*, shows};
use crate::models::{Show, ShowExternalIds, StoredShow};
use anyhow::Result;
use sea_orm::{
    ActiveModelTrait, ConnectionTrait, DatabaseConnection, DbErr, EntityTrait, QueryOrder,
    QuerySelect, Set,
};

/// Repository for show rows
pub struct ShowRepository {
    conn: DatabaseConnection,
}

impl ShowRepository {
    #[must_use]
    pub const fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }

    pub(crate) fn to_stored(m: shows::Model) -> StoredShow {
        let ids: ShowExternalIds = serde_json::from_str(&m.external_ids).unwrap_or_default();
        StoredShow {
            internal_show_id: m.id,
            show: Show {
                external_id: ids.external_id,
                title_preferred: m.title_preferred,
                title_original: m.title_original,
                alt_titles: serde_json::from_str(&m.alt_titles).unwrap_or_default(),
                show_type: ShowType::parse(&m.show_type).unwrap_or_default(),
                status: normalize_status_or_default(&m.status, ShowStatus::Ongoing),
                synopsis: m.synopsis,
                start_date: m.start_date,
                end_date: m.end_date,
                poster_url: m.poster_url,
                banner_url: m.banner_url,
                season_count: m.season_count,
                episode_count: m.episode_count,
            },
            created_at: m.created_at,
            updated_at: m.updated_at,
        }
    }

    fn encode(show: &Show) -> Result<(String, String), DbErr> {
        let ids = ShowExternalIds {
            external_id: show.external_id.trim().to_string(),
        };
        let external_ids =
            serde_json::to_string(&ids).map_err(|e| DbErr::Custom(e.to_string()))?;
        let alt_titles =
            serde_json::to_string(&show.alt_titles).map_err(|e| DbErr::Custom(e.to_string()))?;
        Ok((external_ids, alt_titles))
    }

    /// Inserts a show on any connection, including an open transaction.
    pub(crate) async fn insert_in<C: ConnectionTrait>(
        conn: &C,
        show: &Show,
    ) -> Result<shows::Model, DbErr> {
        let (external_ids, alt_titles) = Self::encode(show)?;
        let now = chrono::Utc::now().to_rfc3339();

        let active_model = shows::ActiveModel {
            id: Set(uuid::Uuid::new_v4().to_string()),
            external_ids: Set(external_ids),
            title_preferred: Set(show.title_preferred.clone()),
            title_original: Set(show.title_original.clone()),
            alt_titles: Set(alt_titles),
            show_type: Set(show.show_type.as_str().to_string()),
            status: Set(show.status.as_str().to_string()),
            synopsis: Set(show.synopsis.clone()),
            start_date: Set(show.start_date.clone()),
            end_date: Set(show.end_date.clone()),
            poster_url: Set(show.poster_url.clone()),
            banner_url: Set(show.banner_url.clone()),
            season_count: Set(show.season_count),
            episode_count: Set(show.episode_count),
            created_at: Set(now.clone()),
            updated_at: Set(now),
        };

        active_model.insert(conn).await
    }

    pub async fn add(&self, show: &Show) -> Result<StoredShow> {
        let model = Self::insert_in(&self.conn, show).await?;
        Ok(Self::to_stored(model))
    }

    pub async fn get(&self, id: &str) -> Result<Option<StoredShow>> {
        let row = Shows::find_by_id(id.to_string()).one(&self.conn).await?;
        Ok(row.map(Self::to_stored))
    }

    pub async fn list(&self, limit: u64, offset: u64) -> Result<Vec<StoredShow>> {
        let rows = Shows::find()
            .order_by_asc(shows::Column::TitlePreferred)
            .order_by_asc(shows::Column::Id)
            .limit(limit)
            .offset(offset)
            .all(&self.conn)
            .await?;

        Ok(rows.into_iter().map(Self::to_stored).collect())
    }

    /// Replaces every field of an existing show. Returns `None` when the id is
    /// unknown.
    pub async fn update(&self, id: &str, show: &Show) -> Result<Option<StoredShow>> {
        let Some(existing) = Shows::find_by_id(id.to_string()).one(&self.conn).await? else {
            return Ok(None);
        };

        let (external_ids, alt_titles) = Self::encode(show)?;
        let mut active: shows::ActiveModel = existing.into();
        active.external_ids = Set(external_ids);
        active.title_preferred = Set(show.title_preferred.clone());
        active.title_original = Set(show.title_original.clone());
        active.alt_titles = Set(alt_titles);
        active.show_type = Set(show.show_type.as_str().to_string());
        active.status = Set(show.status.as_str().to_string());
        active.synopsis = Set(show.synopsis.clone());
        active.start_date = Set(show.start_date.clone());
        active.end_date = Set(show.end_date.clone());
        active.poster_url = Set(show.poster_url.clone());
        active.banner_url = Set(show.banner_url.clone());
        active.season_count = Set(show.season_count);
        active.episode_count = Set(show.episode_count);
        active.updated_at = Set(chrono::Utc::now().to_rfc3339());

        let model = active.update(&self.conn).await?;
        Ok(Some(Self::to_stored(model)))
    }

    /// Deletes a show; episodes and jobs go with it.
    pub async fn remove(&self, id: &str) -> Result<bool> {
        let result = Shows::delete_by_id(id.to_string()).exec(&self.conn).await?;
        Ok(result.rows_affected > 0)
    }
}

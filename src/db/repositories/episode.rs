use crate::entities::{episodes, prelude::*};
use crate::models::{Episode, EpisodeExternalIds, EpisodeInput, StoredEpisode};
use anyhow::Result;
use sea_orm::sea_query::OnConflict;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, DbErr, EntityTrait,
    QueryFilter, QueryOrder, Set,
};

/// Repository for episode rows
pub struct EpisodeRepository {
    conn: DatabaseConnection,
}

impl EpisodeRepository {
    #[must_use]
    pub const fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }

    fn to_stored(m: episodes::Model) -> StoredEpisode {
        StoredEpisode {
            internal_episode_id: m.id,
            show_id: m.show_id,
            season_number: m.season_number,
            episode_number: m.episode_number,
            title: m.title,
            air_date: m.air_date,
            runtime_minutes: m.runtime_minutes,
            external_ids: serde_json::from_str(&m.external_ids).unwrap_or_default(),
            created_at: m.created_at,
            updated_at: m.updated_at,
        }
    }

    fn encode_ids(ids: &EpisodeExternalIds) -> Result<String, DbErr> {
        serde_json::to_string(ids).map_err(|e| DbErr::Custom(e.to_string()))
    }

    /// Inserts provider episodes for a show, skipping any
    /// `(show, season, episode)` that already exists. Returns the number of
    /// rows actually inserted.
    pub(crate) async fn insert_ignoring_conflicts<C: ConnectionTrait>(
        conn: &C,
        show_id: &str,
        items: &[Episode],
    ) -> Result<u64, DbErr> {
        if items.is_empty() {
            return Ok(0);
        }

        let now = chrono::Utc::now().to_rfc3339();
        let mut models = Vec::with_capacity(items.len());
        for item in items {
            let ids = EpisodeExternalIds {
                external_id: Some(item.external_id.clone()).filter(|id| !id.is_empty()),
                ..EpisodeExternalIds::default()
            };
            models.push(episodes::ActiveModel {
                id: Set(uuid::Uuid::new_v4().to_string()),
                show_id: Set(show_id.to_string()),
                season_number: Set(item.season_number),
                episode_number: Set(item.episode_number),
                title: Set(item.title.clone()),
                air_date: Set(item.air_date.clone()),
                runtime_minutes: Set(item.runtime_minutes),
                external_ids: Set(Self::encode_ids(&ids)?),
                created_at: Set(now.clone()),
                updated_at: Set(now.clone()),
            });
        }

        Episodes::insert_many(models)
            .on_conflict(
                OnConflict::columns([
                    episodes::Column::ShowId,
                    episodes::Column::SeasonNumber,
                    episodes::Column::EpisodeNumber,
                ])
                .do_nothing()
                .to_owned(),
            )
            .exec_without_returning(conn)
            .await
    }

    /// Inserts one episode. A duplicate `(show, season, episode)` surfaces
    /// as a unique-constraint error.
    pub async fn add(&self, input: &EpisodeInput) -> Result<StoredEpisode> {
        let now = chrono::Utc::now().to_rfc3339();
        let active_model = episodes::ActiveModel {
            id: Set(uuid::Uuid::new_v4().to_string()),
            show_id: Set(input.show_id.clone()),
            season_number: Set(input.season_number),
            episode_number: Set(input.episode_number),
            title: Set(input.title.clone()),
            air_date: Set(input.air_date.clone()),
            runtime_minutes: Set(input.runtime_minutes),
            external_ids: Set(Self::encode_ids(&input.external_ids)?),
            created_at: Set(now.clone()),
            updated_at: Set(now),
        };

        let model = active_model.insert(&self.conn).await?;
        Ok(Self::to_stored(model))
    }

    pub async fn get(&self, id: &str) -> Result<Option<StoredEpisode>> {
        let row = Episodes::find_by_id(id.to_string()).one(&self.conn).await?;
        Ok(row.map(Self::to_stored))
    }

    pub async fn list(&self, show_id: Option<&str>) -> Result<Vec<StoredEpisode>> {
        let mut query = Episodes::find();
        if let Some(show_id) = show_id {
            query = query.filter(episodes::Column::ShowId.eq(show_id));
        }

        let rows = query
            .order_by_asc(episodes::Column::ShowId)
            .order_by_asc(episodes::Column::SeasonNumber)
            .order_by_asc(episodes::Column::EpisodeNumber)
            .all(&self.conn)
            .await?;

        Ok(rows.into_iter().map(Self::to_stored).collect())
    }

    pub async fn count_for_show(&self, show_id: &str) -> Result<u64> {
        use sea_orm::PaginatorTrait;

        let count = Episodes::find()
            .filter(episodes::Column::ShowId.eq(show_id))
            .count(&self.conn)
            .await?;
        Ok(count)
    }

    pub async fn update(&self, id: &str, input: &EpisodeInput) -> Result<Option<StoredEpisode>> {
        let Some(existing) = Episodes::find_by_id(id.to_string()).one(&self.conn).await? else {
            return Ok(None);
        };

        let mut active: episodes::ActiveModel = existing.into();
        active.show_id = Set(input.show_id.clone());
        active.season_number = Set(input.season_number);
        active.episode_number = Set(input.episode_number);
        active.title = Set(input.title.clone());
        active.air_date = Set(input.air_date.clone());
        active.runtime_minutes = Set(input.runtime_minutes);
        active.external_ids = Set(Self::encode_ids(&input.external_ids)?);
        active.updated_at = Set(chrono::Utc::now().to_rfc3339());

        let model = active.update(&self.conn).await?;
        Ok(Some(Self::to_stored(model)))
    }

    pub async fn remove(&self, id: &str) -> Result<bool> {
        let result = Episodes::delete_by_id(id.to_string())
            .exec(&self.conn)
            .await?;
        Ok(result.rows_affected > 0)
    }
}

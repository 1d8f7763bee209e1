use crate::entities::{hook_settings, prelude::*};
use crate::models::HookSetting;
use anyhow::Result;
use sea_orm::sea_query::OnConflict;
use sea_orm::{DatabaseConnection, EntityTrait, QueryOrder, Set};

/// Repository for per-event webhook URLs
pub struct HookSettingRepository {
    conn: DatabaseConnection,
}

impl HookSettingRepository {
    #[must_use]
    pub const fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }

    fn to_setting(m: hook_settings::Model) -> HookSetting {
        HookSetting {
            event: m.event_name,
            url: m.url,
            updated_at: m.updated_at,
        }
    }

    fn blank(event: &str, now: &str) -> hook_settings::ActiveModel {
        hook_settings::ActiveModel {
            event_name: Set(event.to_string()),
            url: Set(String::new()),
            updated_at: Set(now.to_string()),
        }
    }

    /// Inserts an empty URL for every event that has no row yet.
    pub async fn ensure_defaults(&self, events: &[&str]) -> Result<()> {
        if events.is_empty() {
            return Ok(());
        }

        let now = chrono::Utc::now().to_rfc3339();
        HookSettings::insert_many(events.iter().map(|event| Self::blank(event, &now)))
            .on_conflict(
                OnConflict::column(hook_settings::Column::EventName)
                    .do_nothing()
                    .to_owned(),
            )
            .exec_without_returning(&self.conn)
            .await?;

        Ok(())
    }

    pub async fn list(&self) -> Result<Vec<HookSetting>> {
        let rows = HookSettings::find()
            .order_by_asc(hook_settings::Column::EventName)
            .all(&self.conn)
            .await?;

        Ok(rows.into_iter().map(Self::to_setting).collect())
    }

    pub async fn upsert(&self, event: &str, url: &str) -> Result<HookSetting> {
        let now = chrono::Utc::now().to_rfc3339();
        let active_model = hook_settings::ActiveModel {
            event_name: Set(event.to_string()),
            url: Set(url.trim().to_string()),
            updated_at: Set(now),
        };

        HookSettings::insert(active_model)
            .on_conflict(
                OnConflict::column(hook_settings::Column::EventName)
                    .update_columns([
                        hook_settings::Column::Url,
                        hook_settings::Column::UpdatedAt,
                    ])
                    .to_owned(),
            )
            .exec_without_returning(&self.conn)
            .await?;

        let row = HookSettings::find_by_id(event.to_string())
            .one(&self.conn)
            .await?
            .ok_or_else(|| anyhow::anyhow!("hook setting {event} vanished after upsert"))?;

        Ok(Self::to_setting(row))
    }

    /// URL configured for `event`. A missing row is created empty.
    pub async fn url_for(&self, event: &str) -> Result<String> {
        if let Some(row) = HookSettings::find_by_id(event.to_string())
            .one(&self.conn)
            .await?
        {
            return Ok(row.url.trim().to_string());
        }

        let now = chrono::Utc::now().to_rfc3339();
        HookSettings::insert(Self::blank(event, &now))
            .on_conflict(
                OnConflict::column(hook_settings::Column::EventName)
                    .do_nothing()
                    .to_owned(),
            )
            .exec_without_returning(&self.conn)
            .await?;

        Ok(String::new())
    }
}

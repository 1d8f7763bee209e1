use crate::entities::prelude::*;
use sea_orm_migration::prelude::*;
use sea_orm_migration::sea_orm::Schema;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let backend = manager.get_database_backend();
        let schema = Schema::new(backend);

        manager
            .create_table(
                schema
                    .create_table_from_entity(Shows)
                    .if_not_exists()
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                schema
                    .create_table_from_entity(Episodes)
                    .if_not_exists()
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                schema
                    .create_table_from_entity(JobShows)
                    .if_not_exists()
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                schema
                    .create_table_from_entity(HookSettings)
                    .if_not_exists()
                    .to_owned(),
            )
            .await?;

        let conn = manager.get_connection();

        conn.execute_unprepared(
            "CREATE UNIQUE INDEX IF NOT EXISTS idx_episodes_show_season_episode \
             ON episodes(show_id, season_number, episode_number)",
        )
        .await?;

        // At most one pending job per external id.
        conn.execute_unprepared(
            "CREATE UNIQUE INDEX IF NOT EXISTS idx_job_shows_pending_external_id \
             ON job_shows(external_id) WHERE status = 'pending'",
        )
        .await?;

        conn.execute_unprepared(
            "CREATE INDEX IF NOT EXISTS idx_job_shows_show_id ON job_shows(show_id)",
        )
        .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(JobShows).if_exists().to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Episodes).if_exists().to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(HookSettings).if_exists().to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Shows).if_exists().to_owned())
            .await?;
        Ok(())
    }
}

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // Create the pipeline's schema
        manager
            .get_connection()
            .execute_unprepared("CREATE SCHEMA IF NOT EXISTS callscope;")
            .await?;

        manager
            .get_connection()
            .execute_unprepared("SET search_path TO callscope, public;")
            .await?;

        // Grant the base DB user that will execute all pipeline queries
        manager
            .get_connection()
            .execute_unprepared(r#"
                DO $$ BEGIN
                    GRANT ALL PRIVILEGES ON DATABASE callscope TO callscope;
                    GRANT ALL ON SCHEMA callscope TO callscope;

                    ALTER DEFAULT PRIVILEGES IN SCHEMA callscope GRANT ALL ON TABLES TO callscope;
                    ALTER DEFAULT PRIVILEGES IN SCHEMA callscope GRANT ALL ON SEQUENCES TO callscope;
                    ALTER DEFAULT PRIVILEGES IN SCHEMA callscope GRANT ALL ON FUNCTIONS TO callscope;
                END $$;
            "#)
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // Revoke default privileges first
        manager
            .get_connection()
            .execute_unprepared(r#"
                DO $$ BEGIN
                    ALTER DEFAULT PRIVILEGES IN SCHEMA callscope REVOKE ALL ON FUNCTIONS FROM callscope;
                    ALTER DEFAULT PRIVILEGES IN SCHEMA callscope REVOKE ALL ON SEQUENCES FROM callscope;
                    ALTER DEFAULT PRIVILEGES IN SCHEMA callscope REVOKE ALL ON TABLES FROM callscope;
                    REVOKE ALL ON SCHEMA callscope FROM callscope;
                    REVOKE ALL PRIVILEGES ON DATABASE callscope FROM callscope;
                END $$;
            "#)
            .await?;

        // Drop the schema (CASCADE will remove all objects in it)
        manager
            .get_connection()
            .execute_unprepared("DROP SCHEMA IF EXISTS callscope CASCADE;")
            .await?;

        Ok(())
    }
}

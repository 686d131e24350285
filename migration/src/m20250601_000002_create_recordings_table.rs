use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // Create recording_status enum
        manager
            .get_connection()
            .execute_unprepared(
                "CREATE TYPE callscope.recording_status AS ENUM (
                    'queued',
                    'processing',
                    'ready',
                    'failed'
                )",
            )
            .await?;

        manager
            .get_connection()
            .execute_unprepared("ALTER TYPE callscope.recording_status OWNER TO callscope")
            .await?;

        // Create talk_time_judgement enum
        manager
            .get_connection()
            .execute_unprepared(
                "CREATE TYPE callscope.talk_time_judgement AS ENUM (
                    'low',
                    'good',
                    'high'
                )",
            )
            .await?;

        manager
            .get_connection()
            .execute_unprepared("ALTER TYPE callscope.talk_time_judgement OWNER TO callscope")
            .await?;

        // Create recordings table. Utterances, highlights, speakers and HITL
        // payloads live as JSONB sub-documents: they are only ever read or
        // written as a unit with their parent row.
        let create_recordings_sql = r#"
            CREATE TABLE IF NOT EXISTS callscope.recordings (
                id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
                organization_id UUID NOT NULL,
                user_id UUID NOT NULL,
                bot_id VARCHAR(255),
                meeting_id VARCHAR(255),
                contact_id VARCHAR(255),
                title TEXT,
                status callscope.recording_status NOT NULL DEFAULT 'queued',
                source_media_url TEXT,
                storage_key TEXT,
                storage_url TEXT,
                attendees JSONB,
                transcript JSONB,
                transcript_text TEXT,
                language_code VARCHAR(10),
                duration_seconds INTEGER,
                word_count INTEGER,
                speaker_count INTEGER,
                summary TEXT,
                highlights JSONB,
                action_items JSONB,
                sentiment_score DOUBLE PRECISION,
                talk_time_rep_pct DOUBLE PRECISION,
                talk_time_customer_pct DOUBLE PRECISION,
                talk_time_judgement callscope.talk_time_judgement,
                coach_rating INTEGER,
                coach_summary TEXT,
                speakers JSONB,
                hitl_required BOOLEAN NOT NULL DEFAULT FALSE,
                hitl_type VARCHAR(100),
                hitl_data JSONB,
                error_message TEXT,
                created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
                updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
            )
        "#;

        manager
            .get_connection()
            .execute_unprepared(create_recordings_sql)
            .await?;

        manager
            .get_connection()
            .execute_unprepared("ALTER TABLE callscope.recordings OWNER TO callscope")
            .await?;

        // Create indexes for efficient querying
        manager
            .get_connection()
            .execute_unprepared(
                "CREATE INDEX IF NOT EXISTS idx_recordings_organization
                 ON callscope.recordings(organization_id)",
            )
            .await?;

        manager
            .get_connection()
            .execute_unprepared(
                "CREATE INDEX IF NOT EXISTS idx_recordings_bot
                 ON callscope.recordings(bot_id)",
            )
            .await?;

        manager
            .get_connection()
            .execute_unprepared(
                "CREATE INDEX IF NOT EXISTS idx_recordings_status
                 ON callscope.recordings(status)",
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .get_connection()
            .execute_unprepared("DROP TABLE IF EXISTS callscope.recordings")
            .await?;

        // Drop enum types
        manager
            .get_connection()
            .execute_unprepared("DROP TYPE IF EXISTS callscope.talk_time_judgement")
            .await?;

        manager
            .get_connection()
            .execute_unprepared("DROP TYPE IF EXISTS callscope.recording_status")
            .await?;

        Ok(())
    }
}

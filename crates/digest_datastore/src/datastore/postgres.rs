use anyhow::Context;
use chrono::{DateTime, Utc};
use itertools::Itertools;
use sqlx::{migrate::Migrator, postgres::PgPoolOptions, PgPool};

use crate::{datastore::DataStore, Channel, Summary};

static MIGRATOR: Migrator = sqlx::migrate!();

#[derive(Debug, Clone)]
pub struct PgDataStore {
    pub pool: PgPool,
}

impl PgDataStore {
    /// Establish connection to database and bring the ledger tables up to date
    pub async fn init(database_url: &str) -> anyhow::Result<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(5)
            .connect(database_url)
            .await
            .inspect_err(
                |e| tracing::error!(error = ?e, "Failed to establish connection to database"),
            )
            .context("Failed to connect to postgres database")?;

        MIGRATOR
            .run(&pool)
            .await
            .inspect_err(|e| tracing::error!(error = ?e, "Failed to run database migrations"))
            .context("Failed to run database migrations")?;

        Ok(PgDataStore { pool })
    }
}

#[derive(sqlx::FromRow)]
struct SummaryRow {
    id: String,
    video_id: String,
    video_title: String,
    channel_name: String,
    summary: String,
    created_at: DateTime<Utc>,
    status: String,
    video_url: String,
    published_at: DateTime<Utc>,
    thumbnail_url: String,
    duration: String,
    view_count: i64,
}

impl TryFrom<SummaryRow> for Summary {
    type Error = anyhow::Error;

    fn try_from(row: SummaryRow) -> Result<Self, Self::Error> {
        Ok(Summary {
            status: row
                .status
                .parse()
                .with_context(|| format!("Invalid status on summary {}", row.id))?,
            id: row.id,
            video_id: row.video_id,
            video_title: row.video_title,
            channel_name: row.channel_name,
            summary: row.summary,
            created_at: row.created_at,
            video_url: row.video_url,
            published_at: row.published_at,
            thumbnail_url: row.thumbnail_url,
            duration: row.duration,
            view_count: row.view_count,
        })
    }
}

impl DataStore for PgDataStore {
    async fn list_channels(&self) -> anyhow::Result<Vec<Channel>> {
        sqlx::query_as::<_, Channel>("SELECT id, name, handle FROM channels ORDER BY added_at, id")
            .fetch_all(&self.pool)
            .await
            .inspect_err(|e| tracing::error!(error = ?e, "Failed to fetch channels"))
            .context("Failed to fetch channels")
    }

    async fn add_channel(&self, channel: &Channel) -> anyhow::Result<()> {
        sqlx::query("INSERT INTO channels (id, name, handle) VALUES ($1, $2, $3) ON CONFLICT DO NOTHING")
            .bind(&channel.id)
            .bind(&channel.name)
            .bind(&channel.handle)
            .execute(&self.pool)
            .await
            .inspect_err(|e| {
                tracing::error!(error = ?e, channel_id = %channel.id, "Failed to insert channel")
            })
            .context("Failed to insert channel")?;

        Ok(())
    }

    async fn is_video_processed(&self, video_id: &str) -> anyhow::Result<bool> {
        let exists = sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS(SELECT 1 FROM processed_videos WHERE video_id = $1)",
        )
        .bind(video_id)
        .fetch_one(&self.pool)
        .await
        .inspect_err(|e| {
            tracing::error!(error = ?e, %video_id, "Failed to check processed video");
        })
        .context("Failed to check processed video")?;

        Ok(exists)
    }

    async fn mark_video_processed(&self, video_id: &str) -> anyhow::Result<()> {
        sqlx::query("INSERT INTO processed_videos (video_id) VALUES ($1) ON CONFLICT DO NOTHING")
            .bind(video_id)
            .execute(&self.pool)
            .await
            .inspect_err(|e| {
                tracing::error!(error = ?e, %video_id, "Failed to mark video as processed")
            })
            .context("Failed to mark video as processed")?;

        Ok(())
    }

    async fn save_summary(&self, summary: &Summary) -> anyhow::Result<()> {
        sqlx::query(
            r#"
            INSERT INTO summaries (id, video_id, video_title, channel_name, summary, created_at,
                status, video_url, published_at, thumbnail_url, duration, view_count)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)
            "#,
        )
        .bind(&summary.id)
        .bind(&summary.video_id)
        .bind(&summary.video_title)
        .bind(&summary.channel_name)
        .bind(&summary.summary)
        .bind(summary.created_at)
        .bind(summary.status.as_str())
        .bind(&summary.video_url)
        .bind(summary.published_at)
        .bind(&summary.thumbnail_url)
        .bind(&summary.duration)
        .bind(summary.view_count)
        .execute(&self.pool)
        .await
        .inspect_err(|err| {
            tracing::error!(
                error = ?err,
                summary_id = %summary.id,
                video_id = %summary.video_id,
                "Failed to insert summary"
            )
        })
        .context("Failed to insert summary")?;

        Ok(())
    }

    async fn list_pending_summaries(&self) -> anyhow::Result<Vec<Summary>> {
        let rows = sqlx::query_as::<_, SummaryRow>(
            r#"
            SELECT id, video_id, video_title, channel_name, summary, created_at, status,
                video_url, published_at, thumbnail_url, duration, view_count
            FROM summaries
            WHERE status = 'New'
            ORDER BY created_at
            "#,
        )
        .fetch_all(&self.pool)
        .await
        .inspect_err(|e| tracing::error!(error = ?e, "Failed to fetch pending summaries"))
        .context("Failed to fetch pending summaries")?;

        rows.into_iter().map(Summary::try_from).collect()
    }

    async fn mark_summaries_processed(&self, summary_ids: &[String]) -> anyhow::Result<()> {
        if summary_ids.is_empty() {
            return Ok(());
        }
        let ids = summary_ids.iter().unique().cloned().collect::<Vec<_>>();

        let result = sqlx::query(
            "UPDATE summaries SET status = 'Processed' WHERE id = ANY($1) AND status = 'New'",
        )
        .bind(&ids)
        .execute(&self.pool)
        .await
        .inspect_err(|e| tracing::error!(error = ?e, "Failed to mark summaries as processed"))
        .context("Failed to mark summaries as processed")?;

        tracing::debug!(
            requested = ids.len(),
            updated = result.rows_affected(),
            "Marked summaries as processed"
        );

        Ok(())
    }
}

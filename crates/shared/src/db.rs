//! Database utilities and the Postgres-backed channel directory

use async_trait::async_trait;
use sqlx::postgres::{PgConnectOptions, PgPool, PgPoolOptions};
use std::{str::FromStr, time::Duration};

use crate::{Channel, ChannelDirectory, DirectoryResult};

/// Create a database connection pool
/// Note: Disables statement cache for PgBouncer compatibility
pub async fn create_pool(database_url: &str, max_connections: u32) -> Result<PgPool, sqlx::Error> {
    // PgBouncer in transaction mode doesn't support prepared statements
    let options = PgConnectOptions::from_str(database_url)?.statement_cache_capacity(0);

    PgPoolOptions::new()
        .max_connections(max_connections)
        .min_connections(0)
        .acquire_timeout(Duration::from_secs(30))
        .idle_timeout(Duration::from_secs(60))
        .max_lifetime(Duration::from_secs(300))
        .connect_with(options)
        .await
}

/// Run database migrations
pub async fn run_migrations(pool: &PgPool) -> Result<(), sqlx::migrate::MigrateError> {
    sqlx::migrate!("../../migrations").run(pool).await
}

/// Channel directory backed by the `channels` table
#[derive(Clone)]
pub struct PgChannelDirectory {
    pool: PgPool,
}

impl PgChannelDirectory {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

#[async_trait]
impl ChannelDirectory for PgChannelDirectory {
    async fn find_by_code(&self, code: &str) -> DirectoryResult<Option<Channel>> {
        let channel = sqlx::query_as::<_, Channel>(
            "SELECT id, code, name, hostname FROM channels WHERE code = $1 LIMIT 1",
        )
        .bind(code)
        .fetch_optional(&self.pool)
        .await?;

        Ok(channel)
    }

    async fn list_all(&self) -> DirectoryResult<Vec<Channel>> {
        // No filtering here: stored hostnames come in several shapes and are
        // compared after canonicalization on our side.
        let channels = sqlx::query_as::<_, Channel>(
            "SELECT id, code, name, hostname FROM channels ORDER BY id",
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(channels)
    }

    async fn find_by_hostname(&self, hostname: &str) -> DirectoryResult<Option<Channel>> {
        let channel = sqlx::query_as::<_, Channel>(
            r#"
            SELECT id, code, name, hostname
            FROM channels
            WHERE LOWER(hostname) = $1
               OR LOWER(hostname) = 'https://' || $1
               OR LOWER(hostname) = 'http://' || $1
            ORDER BY id
            LIMIT 1
            "#,
        )
        .bind(hostname)
        .fetch_optional(&self.pool)
        .await?;

        Ok(channel)
    }

    async fn ping(&self) -> DirectoryResult<()> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}

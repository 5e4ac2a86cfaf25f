use anyhow::{Context, Result};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use sqlx::postgres::{PgPool, PgPoolOptions};
use std::time::Duration;

/// One macro-economic observation, as stored in `macro_trends`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct MacroIndicatorRow {
    pub indicator: String,
    pub period: String,
    pub value: Option<f64>,
    pub source: String,
}

/// Read-only access to recent macro indicators, most recent period first.
#[async_trait]
pub trait MacroDataSource: Send + Sync + 'static {
    async fn recent_indicators(&self, limit: usize) -> Result<Vec<MacroIndicatorRow>>;

    async fn ping(&self) -> Result<()>;
}

// `period` is cast for transport, so ordering must name the table column.
const RECENT_INDICATORS_SQL: &str = r#"
    SELECT indicator,
           period::text AS period,
           value::float8 AS value,
           COALESCE(source, '') AS source
    FROM public.macro_trends
    WHERE country = $1
    ORDER BY macro_trends.period DESC
    LIMIT $2
"#;

#[derive(Clone)]
pub struct PgMacroStore {
    pool: PgPool,
    country: String,
    query_timeout: Duration,
}

impl PgMacroStore {
    /// Builds a lazily-connecting pool; nothing is dialled until the first query.
    pub fn connect_lazy(
        database_url: &str,
        country: String,
        max_connections: u32,
        query_timeout: Duration,
    ) -> Result<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .acquire_timeout(query_timeout)
            .connect_lazy(database_url)
            .context("Invalid macro data store URL")?;

        Ok(Self {
            pool,
            country,
            query_timeout,
        })
    }

    pub fn country(&self) -> &str {
        &self.country
    }
}

#[async_trait]
impl MacroDataSource for PgMacroStore {
    async fn recent_indicators(&self, limit: usize) -> Result<Vec<MacroIndicatorRow>> {
        let query = sqlx::query_as::<_, MacroIndicatorRow>(RECENT_INDICATORS_SQL)
            .bind(&self.country)
            .bind(limit as i64)
            .fetch_all(&self.pool);

        let rows = tokio::time::timeout(self.query_timeout, query)
            .await
            .map_err(|_| anyhow::anyhow!("macro query timed out after {:?}", self.query_timeout))?
            .context("Failed to query macro trends")?;

        tracing::debug!(country = %self.country, rows = rows.len(), "Fetched macro indicators");
        Ok(rows)
    }

    async fn ping(&self) -> Result<()> {
        tokio::time::timeout(self.query_timeout, sqlx::query("SELECT 1").execute(&self.pool))
            .await
            .map_err(|_| anyhow::anyhow!("database ping timed out"))?
            .context("Database ping failed")?;
        Ok(())
    }
}

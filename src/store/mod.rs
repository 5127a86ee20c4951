//! Record storage using SQLite
//!
//! All writes are idempotent upserts: incidents merge field-by-field on
//! `rg_id`, sources collapse on the `(rg_id, name, url)` triple and
//! chronicles are keyed on the chronicler name. Nothing is ever deleted.

mod schema;

pub use schema::*;

use crate::config::Config;
use crate::error::Result;
use crate::extract::{Chronicle, Incident, SourceRef};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use sqlx::FromRow;
use tracing::{debug, info};

/// A stored incident as read back from the database.
#[derive(Debug, Clone, FromRow)]
pub struct IncidentRow {
    pub rg_id: String,
    pub chronicler_name: String,
    pub title: String,
    pub description: String,
    pub city: Option<String>,
    pub date: String,
    pub url: Option<String>,
    pub county: Option<String>,
    pub motives: Option<String>,
}

/// A stored source row.
#[derive(Debug, Clone, PartialEq, Eq, FromRow)]
pub struct SourceRow {
    pub rg_id: String,
    pub name: String,
    pub url: Option<String>,
}

/// Per-chronicler record counts, used by the status command.
#[derive(Debug, Clone, FromRow)]
pub struct ChroniclerCounts {
    pub chronicler_name: String,
    pub incidents: i64,
    pub sources: i64,
}

/// Record store handle
#[derive(Clone)]
pub struct RecordStore {
    pool: SqlitePool,
}

impl RecordStore {
    /// Open (or create) the configured database file.
    pub async fn connect(config: &Config) -> Result<Self> {
        let db_path = &config.db_path;

        if let Some(parent) = db_path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }

        let options = SqliteConnectOptions::new()
            .filename(db_path)
            .create_if_missing(true)
            .journal_mode(sqlx::sqlite::SqliteJournalMode::Wal)
            .synchronous(sqlx::sqlite::SqliteSynchronous::Normal);

        debug!("Connecting to SQLite database at {:?}", db_path);

        let pool = SqlitePoolOptions::new()
            .max_connections(5)
            .connect_with(options)
            .await?;

        Ok(Self { pool })
    }

    /// In-memory store, primarily for tests.
    pub async fn in_memory() -> Result<Self> {
        let options = SqliteConnectOptions::new().in_memory(true);

        // One connection only: each in-memory connection is its own database.
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect_with(options)
            .await?;

        Ok(Self { pool })
    }

    /// Initialize the database schema
    pub async fn init_schema(&self) -> Result<()> {
        info!("Initializing database schema");
        sqlx::query(SCHEMA_SQL).execute(&self.pool).await?;
        Ok(())
    }

    /// Upsert the static reference row for a chronicle site.
    pub async fn upsert_chronicle(&self, chronicle: &Chronicle) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO chronicles (
                iso3166_1, iso3166_2, chronicler_name,
                chronicler_description, chronicler_url, chronicle_source
            )
            VALUES (?, ?, ?, ?, ?, ?)
            ON CONFLICT(chronicler_name) DO UPDATE SET
                iso3166_1 = excluded.iso3166_1,
                iso3166_2 = excluded.iso3166_2,
                chronicler_description = excluded.chronicler_description,
                chronicler_url = excluded.chronicler_url,
                chronicle_source = excluded.chronicle_source
            "#,
        )
        .bind(&chronicle.iso3166_1)
        .bind(&chronicle.iso3166_2)
        .bind(&chronicle.chronicler_name)
        .bind(&chronicle.chronicler_description)
        .bind(&chronicle.chronicler_url)
        .bind(&chronicle.chronicle_source)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    /// Upsert an incident keyed on `rg_id`.
    ///
    /// Nullable columns merge with COALESCE so a pass that observed the
    /// record without a field (filtered walks carry no canonical URL) can
    /// never erase a previously stored value.
    pub async fn upsert_incident(&self, incident: &Incident) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO incidents (
                rg_id, chronicler_name, title, description,
                city, date, url, county, motives
            )
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)
            ON CONFLICT(rg_id) DO UPDATE SET
                chronicler_name = excluded.chronicler_name,
                title = excluded.title,
                description = excluded.description,
                date = excluded.date,
                city = COALESCE(excluded.city, city),
                url = COALESCE(excluded.url, url),
                county = COALESCE(excluded.county, county),
                motives = COALESCE(excluded.motives, motives)
            "#,
        )
        .bind(&incident.rg_id)
        .bind(&incident.chronicler_name)
        .bind(&incident.title)
        .bind(&incident.description)
        .bind(&incident.city)
        .bind(incident.date.to_string())
        .bind(&incident.url)
        .bind(&incident.county)
        .bind(&incident.motives)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    /// Upsert a source, collapsing on the `(rg_id, name, url)` triple.
    /// Returns whether a new row was inserted.
    ///
    /// SQLite UNIQUE indexes treat NULLs as distinct, so url-less duplicates
    /// need an explicit null-aware existence check.
    pub async fn upsert_source(&self, source: &SourceRef) -> Result<bool> {
        let existing: Option<(i64,)> = sqlx::query_as(
            r#"
            SELECT 1 FROM sources
            WHERE rg_id = ?1 AND name = ?2
              AND (url = ?3 OR (url IS NULL AND ?3 IS NULL))
            "#,
        )
        .bind(&source.rg_id)
        .bind(&source.name)
        .bind(&source.url)
        .fetch_optional(&self.pool)
        .await?;

        if existing.is_some() {
            return Ok(false);
        }

        sqlx::query("INSERT INTO sources (rg_id, name, url) VALUES (?, ?, ?)")
            .bind(&source.rg_id)
            .bind(&source.name)
            .bind(&source.url)
            .execute(&self.pool)
            .await?;
        Ok(true)
    }

    /// Fetch one incident by its record identifier.
    pub async fn incident(&self, rg_id: &str) -> Result<Option<IncidentRow>> {
        let row = sqlx::query_as::<_, IncidentRow>("SELECT * FROM incidents WHERE rg_id = ?")
            .bind(rg_id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row)
    }

    /// All sources of one incident, in insertion order.
    pub async fn sources_for(&self, rg_id: &str) -> Result<Vec<SourceRow>> {
        let rows = sqlx::query_as::<_, SourceRow>(
            "SELECT rg_id, name, url FROM sources WHERE rg_id = ? ORDER BY rowid",
        )
        .bind(rg_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    /// Incident and source counts grouped by chronicler.
    pub async fn counts_by_chronicler(&self) -> Result<Vec<ChroniclerCounts>> {
        let rows = sqlx::query_as::<_, ChroniclerCounts>(
            r#"
            SELECT i.chronicler_name AS chronicler_name,
                   COUNT(DISTINCT i.rg_id) AS incidents,
                   COUNT(s.rowid) AS sources
            FROM incidents i
            LEFT JOIN sources s ON s.rg_id = i.rg_id
            GROUP BY i.chronicler_name
            ORDER BY i.chronicler_name
            "#,
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }
}

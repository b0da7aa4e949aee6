//! Postgres-backed `MapStore`.
//!
//! Connects to the hosted database with the privileged service credential.
//! Row-level security is enforced by the database itself; this store only
//! issues the four queries the service needs.

use crate::{
    models::map_record::{MapPayloadUpdate, MapRecord, NewMapRecord},
    services::map_store::{MapStore, StoreResult, expect_single},
};
use async_trait::async_trait;
use sqlx::{
    PgPool,
    postgres::{PgConnectOptions, PgPoolOptions},
};
use std::str::FromStr;
use tracing::{debug, info};

const INIT_SQL: &str = include_str!("../../migrations/0001_init.sql");

const SELECT_MAPS: &str = "SELECT id, name, description, map, uri, creator, object_id, created_at \
                           FROM super_map";

#[derive(Clone)]
pub struct PgMapStore {
    pool: PgPool,
}

impl PgMapStore {
    /// Open a pool against `database_url`, authenticating with `service_key`.
    ///
    /// The key replaces any password embedded in the URL.
    pub async fn connect(
        database_url: &str,
        service_key: &str,
        max_connections: u32,
    ) -> StoreResult<Self> {
        let options = PgConnectOptions::from_str(database_url)?.password(service_key);
        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .connect_with(options)
            .await?;
        Ok(Self { pool })
    }

    /// Apply the embedded schema. Every statement is idempotent.
    pub async fn migrate(&self) -> StoreResult<()> {
        let statements = INIT_SQL
            .split(';')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .collect::<Vec<_>>();

        info!("Running {} migration statements...", statements.len());

        for stmt in statements {
            debug!("Executing migration SQL: {}", stmt);
            sqlx::query(stmt).execute(&self.pool).await?;
        }
        Ok(())
    }
}

#[async_trait]
impl MapStore for PgMapStore {
    async fn list(&self) -> StoreResult<Vec<MapRecord>> {
        let rows = sqlx::query_as::<_, MapRecord>(&format!("{SELECT_MAPS} ORDER BY id"))
            .fetch_all(&self.pool)
            .await?;
        Ok(rows)
    }

    async fn find_by_id(&self, id: i64) -> StoreResult<MapRecord> {
        let rows = sqlx::query_as::<_, MapRecord>(&format!("{SELECT_MAPS} WHERE id = $1 LIMIT 2"))
            .bind(id)
            .fetch_all(&self.pool)
            .await?;
        expect_single(rows)
    }

    async fn find_by_name(&self, name: &str) -> StoreResult<MapRecord> {
        let rows =
            sqlx::query_as::<_, MapRecord>(&format!("{SELECT_MAPS} WHERE name ILIKE $1 LIMIT 2"))
                .bind(format!("%{}%", name))
                .fetch_all(&self.pool)
                .await?;
        expect_single(rows)
    }

    async fn insert(&self, record: NewMapRecord) -> StoreResult<MapRecord> {
        let row = sqlx::query_as::<_, MapRecord>(
            r#"
            INSERT INTO super_map (name, description, map, uri, creator, object_id)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING id, name, description, map, uri, creator, object_id, created_at
            "#,
        )
        .bind(&record.name)
        .bind(&record.description)
        .bind(&record.map)
        .bind(&record.uri)
        .bind(&record.creator)
        .bind(&record.object_id)
        .fetch_one(&self.pool)
        .await?;
        Ok(row)
    }

    async fn update_payload(&self, id: i64, update: MapPayloadUpdate) -> StoreResult<u64> {
        let result = sqlx::query(
            r#"
            UPDATE super_map
            SET map = CASE WHEN $2 THEN $3 ELSE map END,
                uri = CASE WHEN $4 THEN $5 ELSE uri END
            WHERE id = $1
            "#,
        )
        .bind(id)
        .bind(update.map.is_some())
        .bind(update.map.flatten())
        .bind(update.uri.is_some())
        .bind(update.uri.flatten())
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected())
    }

    async fn ping(&self) -> StoreResult<()> {
        sqlx::query_scalar::<_, i32>("SELECT 1")
            .fetch_one(&self.pool)
            .await?;
        Ok(())
    }
}

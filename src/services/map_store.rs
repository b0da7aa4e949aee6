//! Storage contract for map records.
//!
//! Handlers never talk to a database directly: they go through `MapService`,
//! which holds an `Arc<dyn MapStore>`. The Postgres store is used in
//! production; the in-memory store backs local runs and tests.

use crate::models::map_record::{MapPayloadUpdate, MapRecord, NewMapRecord};
use async_trait::async_trait;
use serde_json::{Value, json};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("expected exactly one row, found {0}")]
    NotSingleRow(usize),
    #[error(transparent)]
    Sqlx(#[from] sqlx::Error),
}

impl StoreError {
    /// JSON description of the failure, attached to 404 lookup responses.
    pub fn details(&self) -> Value {
        match self {
            StoreError::NotSingleRow(rows) => json!({
                "code": "not_single_row",
                "message": self.to_string(),
                "rows": rows,
            }),
            StoreError::Sqlx(err) => json!({
                "code": err
                    .as_database_error()
                    .and_then(|db| db.code().map(|c| c.into_owned()))
                    .unwrap_or_else(|| "database_error".into()),
                "message": err.to_string(),
            }),
        }
    }
}

pub type StoreResult<T> = Result<T, StoreError>;

#[async_trait]
pub trait MapStore: Send + Sync + 'static {
    /// Every record, ordered by `id`.
    async fn list(&self) -> StoreResult<Vec<MapRecord>>;

    /// Exact match on `id`; anything but one row is `NotSingleRow`.
    async fn find_by_id(&self, id: i64) -> StoreResult<MapRecord>;

    /// Case-insensitive `%name%` match; anything but one row is `NotSingleRow`.
    async fn find_by_name(&self, name: &str) -> StoreResult<MapRecord>;

    /// Insert and return the stored row.
    async fn insert(&self, record: NewMapRecord) -> StoreResult<MapRecord>;

    /// Overwrite `map`/`uri` on the row with `id`. Returns rows affected;
    /// zero is not an error.
    async fn update_payload(&self, id: i64, update: MapPayloadUpdate) -> StoreResult<u64>;

    /// Cheap round trip used by the readiness probe.
    async fn ping(&self) -> StoreResult<()>;
}

/// Collapse a result set to its only row.
pub fn expect_single<T>(mut rows: Vec<T>) -> StoreResult<T> {
    match rows.len() {
        1 => Ok(rows.remove(0)),
        n => Err(StoreError::NotSingleRow(n)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn single_row_is_returned() {
        assert_eq!(expect_single(vec![5]).unwrap(), 5);
    }

    #[test]
    fn zero_or_many_rows_are_errors() {
        assert!(matches!(
            expect_single(Vec::<i32>::new()),
            Err(StoreError::NotSingleRow(0))
        ));
        assert!(matches!(
            expect_single(vec![1, 2]),
            Err(StoreError::NotSingleRow(2))
        ));
    }

    #[test]
    fn details_carry_row_count() {
        let details = StoreError::NotSingleRow(0).details();
        assert_eq!(details["code"], "not_single_row");
        assert_eq!(details["rows"], 0);
    }

    #[test]
    fn sqlx_details_fall_back_to_generic_code() {
        let details = StoreError::from(sqlx::Error::PoolTimedOut).details();
        assert_eq!(details["code"], "database_error");
    }
}

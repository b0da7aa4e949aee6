//! Represents a minted "map" and the fields written when it is created.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A persisted map record.
///
/// Only `map` and `uri` change after creation; everything else is fixed
/// when the row is inserted.
#[derive(Serialize, Deserialize, Clone, FromRow, Debug, PartialEq)]
pub struct MapRecord {
    /// Storage-assigned key.
    pub id: i64,

    /// Display name, searched case-insensitively by `/one?name=`.
    pub name: String,

    pub description: Option<String>,

    /// Serialized map payload. Stored as-is, never interpreted.
    pub map: Option<String>,

    /// Pointer to the off-service asset.
    pub uri: Option<String>,

    /// Identifier of the user who created the map.
    pub creator: String,

    /// Random `0x`-prefixed hex tag stamped at creation.
    pub object_id: String,

    pub created_at: DateTime<Utc>,
}

/// Column values for an insert; `id` and `created_at` come from storage.
#[derive(Clone, Debug)]
pub struct NewMapRecord {
    pub name: String,
    pub description: Option<String>,
    pub map: Option<String>,
    pub uri: Option<String>,
    pub creator: String,
    pub object_id: String,
}

/// The mutable part of a record. The outer `None` leaves the column
/// unchanged; `Some(None)` writes NULL.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct MapPayloadUpdate {
    pub map: Option<Option<String>>,
    pub uri: Option<Option<String>>,
}

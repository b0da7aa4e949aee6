//! MapService — the four record operations, sitting between the HTTP
//! handlers and whichever `MapStore` was configured at startup.
//!
//! Input has already been validated into typed commands by the time it
//! reaches this layer. Here storage errors are logged and mapped to the
//! caller-facing `AppError` for each operation.

use crate::{
    errors::AppError,
    models::{
        map_record::{MapRecord, NewMapRecord},
        requests::{CreateMap, MapSelector, UpdateMap},
    },
    services::{
        map_store::{MapStore, StoreResult},
        object_id,
    },
};
use std::sync::Arc;
use tracing::{debug, error, info, warn};

#[derive(Clone)]
pub struct MapService {
    /// Storage backend shared by every request.
    pub store: Arc<dyn MapStore>,

    /// Hex length of generated `object_id`s.
    pub object_id_len: usize,
}

impl MapService {
    pub fn new(store: Arc<dyn MapStore>, object_id_len: usize) -> Self {
        Self {
            store,
            object_id_len,
        }
    }

    /// Every record. A backend failure is a 500, so an empty table (`[]`)
    /// and a failed query can be told apart.
    pub async fn list_all(&self) -> Result<Vec<MapRecord>, AppError> {
        self.store.list().await.map_err(|err| {
            error!(error = %err, "listing map records failed");
            AppError::internal("Failed to list records")
        })
    }

    /// Exactly one record by id or by name pattern. Any lookup failure,
    /// including zero or several matches, is a 404 carrying the backend error.
    pub async fn get_one(&self, selector: MapSelector) -> Result<MapRecord, AppError> {
        let result = match &selector {
            MapSelector::Id(id) => self.store.find_by_id(*id).await,
            MapSelector::Name(name) => self.store.find_by_name(name).await,
        };
        result.map_err(|err| {
            warn!(?selector, error = %err, "map lookup failed");
            AppError::not_found("Map not found").with_details(err.details())
        })
    }

    /// Stamp a fresh `object_id` and insert.
    pub async fn create(&self, req: CreateMap) -> Result<MapRecord, AppError> {
        let record = NewMapRecord {
            name: req.name,
            description: req.description,
            map: req.map,
            uri: req.uri,
            creator: req.creator,
            object_id: object_id::generate(self.object_id_len),
        };

        let created = self.store.insert(record).await.map_err(|err| {
            error!(error = %err, "creating map record failed");
            AppError::internal("Failed to create record")
        })?;
        info!(id = created.id, object_id = %created.object_id, "created map record");
        Ok(created)
    }

    /// Overwrite `map`/`uri`. A missing id is a silent no-op.
    pub async fn update(&self, req: UpdateMap) -> Result<(), AppError> {
        let affected = self
            .store
            .update_payload(req.id, req.payload)
            .await
            .map_err(|err| {
                error!(id = req.id, error = %err, "Error updating data");
                AppError::internal("Failed to update record")
            })?;
        if affected == 0 {
            debug!(id = req.id, "update matched no map record");
        }
        Ok(())
    }

    pub async fn ping(&self) -> StoreResult<()> {
        self.store.ping().await
    }
}

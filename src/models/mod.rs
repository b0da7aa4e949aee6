//! Data models for the map record service.
//!
//! `MapRecord` maps to the `super_map` table via `sqlx::FromRow` and
//! serializes as JSON via `serde`. Request bodies and query strings live in
//! `requests` together with their validation.

pub mod map_record;
pub mod requests;

pub mod map_service;
pub mod map_store;
pub mod memory_store;
pub mod object_id;
pub mod pg_store;

//! Data-access layer: content store abstraction and row models.

pub mod content_store;
pub mod models;
pub mod storage;

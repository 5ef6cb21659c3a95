//! Abstraction over the remote content store and its object storage.

pub mod config;
pub mod error;
pub mod rest;

use futures::future::BoxFuture;

use crate::dao::models::{
    AdminSessionRow, AudioQuestionRow, FaceQuestionRow, IconRow, QuoteQuestionRow,
};
use crate::dao::storage::StorageResult;
use crate::dto::question::Difficulty;

pub use config::RestStoreConfig;
pub use rest::RestContentStore;

/// Abstraction over the persistence layer for question rows, round icons,
/// admin sessions, and binary media.
///
/// Question listings are ordered by creation time ascending. Question media
/// uploads never overwrite; icon uploads overwrite by design.
pub trait ContentStore: Send + Sync {
    fn face_questions(
        &self,
        difficulty: Difficulty,
    ) -> BoxFuture<'static, StorageResult<Vec<FaceQuestionRow>>>;
    fn melody_questions(
        &self,
        difficulty: Difficulty,
    ) -> BoxFuture<'static, StorageResult<Vec<AudioQuestionRow>>>;
    fn voice_questions(
        &self,
        difficulty: Difficulty,
    ) -> BoxFuture<'static, StorageResult<Vec<AudioQuestionRow>>>;
    fn quote_questions(
        &self,
        difficulty: Difficulty,
    ) -> BoxFuture<'static, StorageResult<Vec<QuoteQuestionRow>>>;
    fn insert_face_question(&self, row: FaceQuestionRow) -> BoxFuture<'static, StorageResult<()>>;
    fn insert_melody_question(
        &self,
        row: AudioQuestionRow,
    ) -> BoxFuture<'static, StorageResult<()>>;
    fn insert_voice_question(&self, row: AudioQuestionRow)
    -> BoxFuture<'static, StorageResult<()>>;
    fn insert_quote_question(&self, row: QuoteQuestionRow)
    -> BoxFuture<'static, StorageResult<()>>;
    fn round_icons(&self) -> BoxFuture<'static, StorageResult<Vec<IconRow>>>;
    fn upsert_round_icon(&self, row: IconRow) -> BoxFuture<'static, StorageResult<()>>;
    fn latest_session(
        &self,
        operator_id: i64,
    ) -> BoxFuture<'static, StorageResult<Option<AdminSessionRow>>>;
    fn insert_session(&self, row: AdminSessionRow) -> BoxFuture<'static, StorageResult<()>>;
    fn delete_sessions(&self, operator_id: i64) -> BoxFuture<'static, StorageResult<()>>;
    /// Upload binary media and return its publicly fetchable URL.
    fn put_object(
        &self,
        path: String,
        bytes: Vec<u8>,
        content_type: String,
        overwrite: bool,
    ) -> BoxFuture<'static, StorageResult<String>>;
    fn health_check(&self) -> BoxFuture<'static, StorageResult<()>>;
}

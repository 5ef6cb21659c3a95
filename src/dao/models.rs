//! Row entities exchanged with the content store tables.

use serde::{Deserialize, Serialize};

use crate::dto::question::Difficulty;

/// Row of the `guess_face_questions` table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FaceQuestionRow {
    /// Difficulty tier the question belongs to.
    pub difficulty: Difficulty,
    /// Public URL of the uploaded face photo.
    pub image_url: String,
    /// Reveal order of the photo fragments; `None` means the default order.
    pub parts: Option<Vec<String>>,
    /// Ordered answer options.
    pub options: Vec<String>,
    /// The correct option.
    pub correct_answer: String,
}

/// Row of the `guess_melody_questions` and `guess_voice_questions` tables.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AudioQuestionRow {
    /// Difficulty tier the question belongs to.
    pub difficulty: Difficulty,
    /// Public URL of the uploaded audio clip.
    pub audio_url: String,
    /// Ordered answer options.
    pub options: Vec<String>,
    /// The correct option.
    pub correct_answer: String,
}

/// Row of the `bible_quote_questions` table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuoteQuestionRow {
    /// Difficulty tier the question belongs to.
    pub difficulty: Difficulty,
    /// The quoted text.
    pub quote: String,
    /// Quiz sub-type (`source` or `continue`).
    pub question_type: String,
    /// Ordered answer options.
    pub options: Vec<String>,
    /// The correct option.
    pub correct_answer: String,
    /// Reference for the quote, when provided.
    pub source: Option<String>,
}

/// Row of the `round_icons` table, one per round at most.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IconRow {
    /// Round the icon belongs to.
    pub round_id: String,
    /// Public URL of the uploaded icon.
    pub icon_url: String,
    /// RFC 3339 timestamp of the last overwrite.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<String>,
}

/// Row of the `admin_sessions` table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AdminSessionRow {
    /// Telegram user the session belongs to.
    pub telegram_user_id: i64,
    /// RFC 3339 timestamp after which the session is invalid.
    pub expires_at: String,
}

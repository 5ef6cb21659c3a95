//! Inbound Telegram update envelope and outbound Bot API payloads.

use serde::{Deserialize, Serialize};
use serde_with::skip_serializing_none;

/// One inbound webhook update from the Telegram transport.
#[derive(Debug, Clone, Deserialize)]
pub struct Update {
    /// Monotonic update identifier assigned by Telegram.
    pub update_id: i64,
    /// New chat message, if this update carries one.
    #[serde(default)]
    pub message: Option<Message>,
    /// Edited chat message; treated like a fresh message.
    #[serde(default)]
    pub edited_message: Option<Message>,
    /// Inline-button press, if this update carries one.
    #[serde(default)]
    pub callback_query: Option<CallbackQuery>,
}

/// A chat message with optional text and attachments.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Message {
    /// Message identifier within the chat.
    #[serde(default)]
    pub message_id: i64,
    /// Author of the message.
    #[serde(default)]
    pub from: Option<User>,
    /// Chat the message was posted to.
    pub chat: Chat,
    /// Plain text content.
    #[serde(default)]
    pub text: Option<String>,
    /// Caption accompanying an attachment.
    #[serde(default)]
    pub caption: Option<String>,
    /// Photo attachment in ascending resolution order.
    #[serde(default)]
    pub photo: Option<Vec<PhotoSize>>,
    /// Generic file attachment.
    #[serde(default)]
    pub document: Option<Document>,
    /// Dedicated audio attachment.
    #[serde(default)]
    pub audio: Option<Audio>,
    /// Voice-note attachment.
    #[serde(default)]
    pub voice: Option<Voice>,
}

impl Message {
    /// Text or caption, trimmed; empty string when neither is present.
    pub fn text_or_caption(&self) -> &str {
        self.text
            .as_deref()
            .or(self.caption.as_deref())
            .map(str::trim)
            .unwrap_or("")
    }
}

/// Telegram account that authored a message or pressed a button.
#[derive(Debug, Clone, Deserialize)]
pub struct User {
    /// Numeric user identifier; keys operator state and sessions.
    pub id: i64,
    /// Optional public username.
    #[serde(default)]
    pub username: Option<String>,
}

/// Chat a message belongs to.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Chat {
    /// Numeric chat identifier used for replies.
    pub id: i64,
}

/// One resolution of a photo attachment.
#[derive(Debug, Clone, Deserialize)]
pub struct PhotoSize {
    /// File handle usable with `getFile`.
    pub file_id: String,
}

/// Generic file attachment.
#[derive(Debug, Clone, Deserialize)]
pub struct Document {
    /// File handle usable with `getFile`.
    pub file_id: String,
    /// MIME type reported by the sender.
    #[serde(default)]
    pub mime_type: Option<String>,
}

/// Dedicated audio attachment.
#[derive(Debug, Clone, Deserialize)]
pub struct Audio {
    /// File handle usable with `getFile`.
    pub file_id: String,
}

/// Voice-note attachment.
#[derive(Debug, Clone, Deserialize)]
pub struct Voice {
    /// File handle usable with `getFile`.
    pub file_id: String,
}

/// Inline-button press event.
#[derive(Debug, Clone, Deserialize)]
pub struct CallbackQuery {
    /// Callback identifier to acknowledge.
    pub id: String,
    /// User who pressed the button.
    pub from: User,
    /// Message the button was attached to.
    #[serde(default)]
    pub message: Option<Message>,
    /// Callback data configured on the button.
    #[serde(default)]
    pub data: Option<String>,
}

/// Envelope of every Bot API response.
#[derive(Debug, Clone, Deserialize)]
pub struct ApiResponse<T> {
    /// Whether the call succeeded.
    pub ok: bool,
    /// Payload present on success. The explicit default path keeps the
    /// derived impl free of a `T: Default` bound.
    #[serde(default = "Option::default")]
    pub result: Option<T>,
    /// Human-readable error present on failure.
    #[serde(default)]
    pub description: Option<String>,
}

/// Result of a `getFile` call.
#[derive(Debug, Clone, Deserialize)]
pub struct TelegramFile {
    /// Server-side path used to download the bytes.
    #[serde(default)]
    pub file_path: Option<String>,
}

/// Outbound `sendMessage` payload.
#[skip_serializing_none]
#[derive(Debug, Clone, Serialize)]
pub struct SendMessage {
    /// Destination chat.
    pub chat_id: i64,
    /// Message text; sent without a parse mode.
    pub text: String,
    /// Optional inline keyboard below the message.
    pub reply_markup: Option<InlineKeyboardMarkup>,
}

/// Outbound `answerCallbackQuery` payload.
#[skip_serializing_none]
#[derive(Debug, Clone, Serialize)]
pub struct AnswerCallbackQuery {
    /// Identifier of the callback being acknowledged.
    pub callback_query_id: String,
    /// Optional toast text shown to the operator.
    pub text: Option<String>,
}

/// Inline keyboard attached to an outbound message.
#[derive(Debug, Clone, Serialize)]
pub struct InlineKeyboardMarkup {
    /// Button rows, top to bottom.
    pub inline_keyboard: Vec<Vec<InlineKeyboardButton>>,
}

/// One inline button.
#[derive(Debug, Clone, Serialize)]
pub struct InlineKeyboardButton {
    /// Button label.
    pub text: String,
    /// Data delivered back in the callback query.
    pub callback_data: String,
}

impl InlineKeyboardButton {
    /// Shorthand for a label/callback pair.
    pub fn new(text: impl Into<String>, callback_data: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            callback_data: callback_data.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // TelegramFile has no Default impl, so this only compiles while the
    // envelope's `result` default does not demand one from its payload.
    #[test]
    fn api_envelope_tolerates_a_missing_result_for_any_payload() {
        let failure: ApiResponse<TelegramFile> =
            serde_json::from_str(r#"{"ok":false,"description":"file is too big"}"#).unwrap();
        assert!(!failure.ok);
        assert!(failure.result.is_none());
        assert_eq!(failure.description.as_deref(), Some("file is too big"));

        let success: ApiResponse<TelegramFile> =
            serde_json::from_str(r#"{"ok":true,"result":{"file_path":"voice/file_7.oga"}}"#)
                .unwrap();
        assert_eq!(
            success.result.unwrap().file_path.as_deref(),
            Some("voice/file_7.oga")
        );
    }
}

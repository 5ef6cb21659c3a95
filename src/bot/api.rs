//! Outbound Telegram Bot API client.

use serde::{Serialize, de::DeserializeOwned};
use thiserror::Error;
use tracing::debug;

use crate::dto::telegram::{AnswerCallbackQuery, ApiResponse, SendMessage, TelegramFile};

const API_BASE: &str = "https://api.telegram.org";

/// Errors raised by Telegram Bot API calls.
#[derive(Debug, Error)]
pub enum BotApiError {
    /// Transport-level failure reaching the Bot API.
    #[error("telegram request failed")]
    Request(#[source] reqwest::Error),
    /// The Bot API answered with `ok: false`.
    #[error("telegram method {method} rejected: {description}")]
    Api {
        /// Bot API method name.
        method: &'static str,
        /// Error description returned by Telegram.
        description: String,
    },
    /// `getFile` returned a file object without a download path.
    #[error("telegram file has no download path")]
    MissingFilePath,
}

/// A file fetched from Telegram's file storage.
#[derive(Debug, Clone)]
pub struct DownloadedFile {
    /// Raw file content.
    pub bytes: Vec<u8>,
    /// Content type reported by the file server, when present.
    pub content_type: Option<String>,
    /// Extension taken from the server-side file path, when present.
    pub extension: Option<String>,
}

/// Thin client over the Telegram Bot API.
#[derive(Clone)]
pub struct TelegramApi {
    client: reqwest::Client,
    token: String,
}

impl TelegramApi {
    /// Build a client for the given bot token.
    pub fn new(token: String) -> Self {
        Self {
            client: reqwest::Client::new(),
            token,
        }
    }

    fn method_url(&self, method: &str) -> String {
        format!("{API_BASE}/bot{}/{method}", self.token)
    }

    async fn call<B, T>(&self, method: &'static str, body: &B) -> Result<T, BotApiError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        debug!(method, "calling telegram bot api");
        let response = self
            .client
            .post(self.method_url(method))
            .json(body)
            .send()
            .await
            .map_err(BotApiError::Request)?;

        let api: ApiResponse<T> = response.json().await.map_err(BotApiError::Request)?;
        if !api.ok {
            return Err(BotApiError::Api {
                method,
                description: api
                    .description
                    .unwrap_or_else(|| "no description".to_owned()),
            });
        }
        api.result.ok_or(BotApiError::Api {
            method,
            description: "missing result".to_owned(),
        })
    }

    /// Send a text message, optionally with an inline keyboard.
    pub async fn send_message(&self, message: &SendMessage) -> Result<(), BotApiError> {
        self.call::<_, serde_json::Value>("sendMessage", message)
            .await
            .map(|_| ())
    }

    /// Acknowledge an inline keyboard press so the client stops its spinner.
    pub async fn answer_callback(
        &self,
        answer: &AnswerCallbackQuery,
    ) -> Result<(), BotApiError> {
        self.call::<_, bool>("answerCallbackQuery", answer)
            .await
            .map(|_| ())
    }

    /// Resolve a `file_id` to a downloadable file path.
    pub async fn get_file(&self, file_id: &str) -> Result<TelegramFile, BotApiError> {
        self.call("getFile", &serde_json::json!({ "file_id": file_id }))
            .await
    }

    /// Download a file by the path returned from [`TelegramApi::get_file`].
    pub async fn download(&self, file_path: &str) -> Result<DownloadedFile, BotApiError> {
        let url = format!("{API_BASE}/file/bot{}/{file_path}", self.token);
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(BotApiError::Request)?
            .error_for_status()
            .map_err(BotApiError::Request)?;

        let content_type = response
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .map(str::to_owned);
        let extension = extension_of(file_path);
        let bytes = response
            .bytes()
            .await
            .map_err(BotApiError::Request)?
            .to_vec();

        Ok(DownloadedFile {
            bytes,
            content_type,
            extension,
        })
    }

    /// Fetch a file end to end from its `file_id`.
    pub async fn fetch_file(&self, file_id: &str) -> Result<DownloadedFile, BotApiError> {
        let file = self.get_file(file_id).await?;
        let path = file.file_path.ok_or(BotApiError::MissingFilePath)?;
        self.download(&path).await
    }
}

fn extension_of(file_path: &str) -> Option<String> {
    let name = file_path.rsplit('/').next()?;
    let (stem, extension) = name.rsplit_once('.')?;
    if stem.is_empty() || extension.is_empty() {
        return None;
    }
    Some(extension.to_ascii_lowercase())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extension_comes_from_the_last_path_segment() {
        assert_eq!(extension_of("photos/file_42.JPG"), Some("jpg".into()));
        assert_eq!(extension_of("voice/file_7.oga"), Some("oga".into()));
        assert_eq!(extension_of("documents/archive"), None);
        assert_eq!(extension_of("documents/.hidden"), None);
    }
}

//! PostgREST-style client for the remote content store and its object storage.

use futures::future::BoxFuture;
use reqwest::{Client, Method, header::CONTENT_TYPE};
use serde::{Serialize, de::DeserializeOwned};
use time::{OffsetDateTime, format_description::well_known::Rfc3339};

use crate::dao::content_store::ContentStore;
use crate::dao::models::{
    AdminSessionRow, AudioQuestionRow, FaceQuestionRow, IconRow, QuoteQuestionRow,
};
use crate::dao::storage::{StorageError, StorageResult};
use crate::dto::question::Difficulty;

use super::{
    config::RestStoreConfig,
    error::{RestDaoError, RestResult},
};

const FACE_TABLE: &str = "guess_face_questions";
const MELODY_TABLE: &str = "guess_melody_questions";
const VOICE_TABLE: &str = "guess_voice_questions";
const QUOTE_TABLE: &str = "bible_quote_questions";
const ICON_TABLE: &str = "round_icons";
const SESSION_TABLE: &str = "admin_sessions";

impl From<RestDaoError> for StorageError {
    fn from(err: RestDaoError) -> Self {
        StorageError::unavailable(err.to_string(), err)
    }
}

/// Content store backed by a key-column REST interface plus object storage.
#[derive(Clone)]
pub struct RestContentStore {
    client: Client,
    config: RestStoreConfig,
}

impl RestContentStore {
    /// Build the HTTP client and probe the store before handing it out.
    pub async fn connect(config: RestStoreConfig) -> RestResult<Self> {
        let client = Client::builder()
            .build()
            .map_err(|source| RestDaoError::ClientBuilder { source })?;

        let store = Self {
            client,
            config: RestStoreConfig {
                base_url: config.base_url.trim_end_matches('/').to_owned(),
                ..config
            },
        };

        store.probe().await?;
        Ok(store)
    }

    fn table_request(&self, method: Method, table: &str) -> reqwest::RequestBuilder {
        let url = format!("{}/rest/v1/{}", self.config.base_url, table);
        self.client
            .request(method, url)
            .header("apikey", &self.config.api_key)
            .bearer_auth(&self.config.api_key)
    }

    /// Cheap read used both at connect time and by the health poll.
    async fn probe(&self) -> RestResult<()> {
        let _rows: Vec<serde_json::Value> = self
            .select(ICON_TABLE, &[("select", "round_id".into()), ("limit", "1".into())])
            .await?;
        Ok(())
    }

    async fn select<T>(&self, table: &str, query: &[(&str, String)]) -> RestResult<Vec<T>>
    where
        T: DeserializeOwned,
    {
        let response = self
            .table_request(Method::GET, table)
            .query(query)
            .send()
            .await
            .map_err(|source| RestDaoError::RequestSend {
                path: table.to_owned(),
                source,
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(RestDaoError::RequestStatus {
                path: table.to_owned(),
                status,
            });
        }

        response
            .json::<Vec<T>>()
            .await
            .map_err(|source| RestDaoError::DecodeResponse {
                path: table.to_owned(),
                source,
            })
    }

    async fn insert<T>(&self, table: &str, body: &T) -> RestResult<()>
    where
        T: ?Sized + Serialize,
    {
        let response = self
            .table_request(Method::POST, table)
            .header("Prefer", "return=minimal")
            .json(body)
            .send()
            .await
            .map_err(|source| RestDaoError::RequestSend {
                path: table.to_owned(),
                source,
            })?;

        let status = response.status();
        if status.is_success() {
            Ok(())
        } else {
            Err(RestDaoError::RequestStatus {
                path: table.to_owned(),
                status,
            })
        }
    }

    /// Insert with merge-on-conflict semantics keyed by `on_conflict`.
    async fn upsert<T>(&self, table: &str, on_conflict: &str, body: &T) -> RestResult<()>
    where
        T: ?Sized + Serialize,
    {
        let response = self
            .table_request(Method::POST, table)
            .query(&[("on_conflict", on_conflict)])
            .header("Prefer", "resolution=merge-duplicates,return=minimal")
            .json(body)
            .send()
            .await
            .map_err(|source| RestDaoError::RequestSend {
                path: table.to_owned(),
                source,
            })?;

        let status = response.status();
        if status.is_success() {
            Ok(())
        } else {
            Err(RestDaoError::RequestStatus {
                path: table.to_owned(),
                status,
            })
        }
    }

    async fn delete(&self, table: &str, query: &[(&str, String)]) -> RestResult<()> {
        let response = self
            .table_request(Method::DELETE, table)
            .query(query)
            .send()
            .await
            .map_err(|source| RestDaoError::RequestSend {
                path: table.to_owned(),
                source,
            })?;

        let status = response.status();
        if status.is_success() {
            Ok(())
        } else {
            Err(RestDaoError::RequestStatus {
                path: table.to_owned(),
                status,
            })
        }
    }

    async fn list_questions<T>(&self, table: &str, difficulty: Difficulty) -> RestResult<Vec<T>>
    where
        T: DeserializeOwned,
    {
        self.select(
            table,
            &[
                ("select", "*".into()),
                ("difficulty", format!("eq.{difficulty}")),
                ("order", "created_at.asc".into()),
            ],
        )
        .await
    }

    async fn upload(
        &self,
        path: &str,
        bytes: Vec<u8>,
        content_type: &str,
        overwrite: bool,
    ) -> RestResult<String> {
        let object_path = path.trim_start_matches('/');

        if let Some(token) = &self.config.blob_token {
            return self
                .blob_upload(object_path, bytes, content_type, token.clone())
                .await;
        }

        let url = format!(
            "{}/storage/v1/object/{}/{}",
            self.config.base_url, self.config.bucket, object_path
        );
        let mut builder = self
            .client
            .post(&url)
            .header("apikey", &self.config.api_key)
            .bearer_auth(&self.config.api_key)
            .header(CONTENT_TYPE, content_type)
            .body(bytes);
        if overwrite {
            builder = builder.header("x-upsert", "true");
        }

        let response = builder
            .send()
            .await
            .map_err(|source| RestDaoError::RequestSend {
                path: object_path.to_owned(),
                source,
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(RestDaoError::RequestStatus {
                path: object_path.to_owned(),
                status,
            });
        }

        Ok(format!(
            "{}/storage/v1/object/public/{}/{}",
            self.config.base_url, self.config.bucket, object_path
        ))
    }

    /// Upload via the dedicated blob service, which returns the public URL itself.
    async fn blob_upload(
        &self,
        object_path: &str,
        bytes: Vec<u8>,
        content_type: &str,
        token: String,
    ) -> RestResult<String> {
        let url = format!("{}/{}", self.config.blob_base_url, object_path);
        let response = self
            .client
            .put(&url)
            .bearer_auth(token)
            .header(CONTENT_TYPE, content_type)
            .header("x-content-type", content_type)
            .header("x-add-random-suffix", "false")
            .body(bytes)
            .send()
            .await
            .map_err(|source| RestDaoError::RequestSend {
                path: object_path.to_owned(),
                source,
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(RestDaoError::RequestStatus {
                path: object_path.to_owned(),
                status,
            });
        }

        let body: serde_json::Value =
            response
                .json()
                .await
                .map_err(|source| RestDaoError::DecodeResponse {
                    path: object_path.to_owned(),
                    source,
                })?;

        body.get("url")
            .and_then(|url| url.as_str())
            .map(str::to_owned)
            .ok_or_else(|| RestDaoError::BlobMissingUrl {
                path: object_path.to_owned(),
            })
    }
}

impl ContentStore for RestContentStore {
    fn face_questions(
        &self,
        difficulty: Difficulty,
    ) -> BoxFuture<'static, StorageResult<Vec<FaceQuestionRow>>> {
        let store = self.clone();
        Box::pin(async move {
            store
                .list_questions(FACE_TABLE, difficulty)
                .await
                .map_err(Into::into)
        })
    }

    fn melody_questions(
        &self,
        difficulty: Difficulty,
    ) -> BoxFuture<'static, StorageResult<Vec<AudioQuestionRow>>> {
        let store = self.clone();
        Box::pin(async move {
            store
                .list_questions(MELODY_TABLE, difficulty)
                .await
                .map_err(Into::into)
        })
    }

    fn voice_questions(
        &self,
        difficulty: Difficulty,
    ) -> BoxFuture<'static, StorageResult<Vec<AudioQuestionRow>>> {
        let store = self.clone();
        Box::pin(async move {
            store
                .list_questions(VOICE_TABLE, difficulty)
                .await
                .map_err(Into::into)
        })
    }

    fn quote_questions(
        &self,
        difficulty: Difficulty,
    ) -> BoxFuture<'static, StorageResult<Vec<QuoteQuestionRow>>> {
        let store = self.clone();
        Box::pin(async move {
            store
                .list_questions(QUOTE_TABLE, difficulty)
                .await
                .map_err(Into::into)
        })
    }

    fn insert_face_question(&self, row: FaceQuestionRow) -> BoxFuture<'static, StorageResult<()>> {
        let store = self.clone();
        Box::pin(async move { store.insert(FACE_TABLE, &row).await.map_err(Into::into) })
    }

    fn insert_melody_question(
        &self,
        row: AudioQuestionRow,
    ) -> BoxFuture<'static, StorageResult<()>> {
        let store = self.clone();
        Box::pin(async move { store.insert(MELODY_TABLE, &row).await.map_err(Into::into) })
    }

    fn insert_voice_question(
        &self,
        row: AudioQuestionRow,
    ) -> BoxFuture<'static, StorageResult<()>> {
        let store = self.clone();
        Box::pin(async move { store.insert(VOICE_TABLE, &row).await.map_err(Into::into) })
    }

    fn insert_quote_question(
        &self,
        row: QuoteQuestionRow,
    ) -> BoxFuture<'static, StorageResult<()>> {
        let store = self.clone();
        Box::pin(async move { store.insert(QUOTE_TABLE, &row).await.map_err(Into::into) })
    }

    fn round_icons(&self) -> BoxFuture<'static, StorageResult<Vec<IconRow>>> {
        let store = self.clone();
        Box::pin(async move {
            store
                .select(ICON_TABLE, &[("select", "round_id,icon_url".into())])
                .await
                .map_err(Into::into)
        })
    }

    fn upsert_round_icon(&self, row: IconRow) -> BoxFuture<'static, StorageResult<()>> {
        let store = self.clone();
        let row = IconRow {
            updated_at: Some(
                OffsetDateTime::now_utc()
                    .format(&Rfc3339)
                    .unwrap_or_default(),
            ),
            ..row
        };
        Box::pin(async move {
            store
                .upsert(ICON_TABLE, "round_id", &row)
                .await
                .map_err(Into::into)
        })
    }

    fn latest_session(
        &self,
        operator_id: i64,
    ) -> BoxFuture<'static, StorageResult<Option<AdminSessionRow>>> {
        let store = self.clone();
        Box::pin(async move {
            let rows: Vec<AdminSessionRow> = store
                .select(
                    SESSION_TABLE,
                    &[
                        ("select", "*".into()),
                        ("telegram_user_id", format!("eq.{operator_id}")),
                        ("order", "expires_at.desc".into()),
                        ("limit", "1".into()),
                    ],
                )
                .await?;
            Ok(rows.into_iter().next())
        })
    }

    fn insert_session(&self, row: AdminSessionRow) -> BoxFuture<'static, StorageResult<()>> {
        let store = self.clone();
        Box::pin(async move { store.insert(SESSION_TABLE, &row).await.map_err(Into::into) })
    }

    fn delete_sessions(&self, operator_id: i64) -> BoxFuture<'static, StorageResult<()>> {
        let store = self.clone();
        Box::pin(async move {
            store
                .delete(
                    SESSION_TABLE,
                    &[("telegram_user_id", format!("eq.{operator_id}"))],
                )
                .await
                .map_err(Into::into)
        })
    }

    fn put_object(
        &self,
        path: String,
        bytes: Vec<u8>,
        content_type: String,
        overwrite: bool,
    ) -> BoxFuture<'static, StorageResult<String>> {
        let store = self.clone();
        Box::pin(async move {
            store
                .upload(&path, bytes, &content_type, overwrite)
                .await
                .map_err(Into::into)
        })
    }

    fn health_check(&self) -> BoxFuture<'static, StorageResult<()>> {
        let store = self.clone();
        Box::pin(async move { store.probe().await.map_err(Into::into) })
    }
}

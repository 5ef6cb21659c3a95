//! Operator authentication sessions for the bot console.
//!
//! A session is a store row carrying an absolute expiry; there is no sliding
//! renewal. Logging in supersedes every earlier session of the same operator.

use time::{Duration, OffsetDateTime, format_description::well_known::Rfc3339};
use tracing::warn;

use crate::dao::models::AdminSessionRow;
use crate::error::ServiceError;
use crate::state::SharedState;

/// Lifetime of an operator session from the moment of login.
pub const SESSION_TTL: Duration = Duration::hours(12);

/// Result of a `/login` attempt with a reachable credential check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoginOutcome {
    /// Password matched and a fresh session row was written.
    Success,
    /// Password did not match the configured one.
    WrongPassword,
    /// No admin password is configured, so login is impossible.
    PasswordUnset,
}

/// Result of an authorization probe before a privileged operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthCheck {
    /// A non-expired session exists for the operator.
    Authorized,
    /// No session, or only expired ones.
    NotLoggedIn,
    /// The session store could not be consulted; access is denied
    /// distinctly from "not logged in".
    Unavailable,
}

/// Validate the password and open a fresh 12 hour session.
///
/// Prior sessions of the operator are deleted first so exactly one row
/// remains. A store failure surfaces as an error and leaves no partial
/// session behind that would grant access.
pub async fn login(
    state: &SharedState,
    operator_id: i64,
    supplied: &str,
) -> Result<LoginOutcome, ServiceError> {
    let Some(expected) = state.config().admin_password.as_deref() else {
        return Ok(LoginOutcome::PasswordUnset);
    };
    if supplied != expected {
        return Ok(LoginOutcome::WrongPassword);
    }

    let store = state.content_store().await.ok_or(ServiceError::Degraded)?;
    let expires_at = (OffsetDateTime::now_utc() + SESSION_TTL)
        .format(&Rfc3339)
        .map_err(|err| ServiceError::InvalidInput(format!("timestamp formatting: {err}")))?;

    store.delete_sessions(operator_id).await?;
    store
        .insert_session(AdminSessionRow {
            telegram_user_id: operator_id,
            expires_at,
        })
        .await?;

    Ok(LoginOutcome::Success)
}

/// Probe whether the operator holds a live session.
pub async fn check(state: &SharedState, operator_id: i64) -> AuthCheck {
    let Some(store) = state.content_store().await else {
        return AuthCheck::Unavailable;
    };

    let row = match store.latest_session(operator_id).await {
        Ok(row) => row,
        Err(err) => {
            warn!(error = %err, operator_id, "session lookup failed");
            return AuthCheck::Unavailable;
        }
    };

    let Some(row) = row else {
        return AuthCheck::NotLoggedIn;
    };

    match OffsetDateTime::parse(&row.expires_at, &Rfc3339) {
        Ok(expiry) if expiry > OffsetDateTime::now_utc() => AuthCheck::Authorized,
        Ok(_) => AuthCheck::NotLoggedIn,
        Err(err) => {
            warn!(error = %err, operator_id, "malformed session expiry; treating as expired");
            AuthCheck::NotLoggedIn
        }
    }
}

/// Delete every session of the operator.
pub async fn logout(state: &SharedState, operator_id: i64) -> Result<(), ServiceError> {
    let store = state.content_store().await.ok_or(ServiceError::Degraded)?;
    store.delete_sessions(operator_id).await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use futures::future::BoxFuture;

    use super::*;
    use crate::catalog::StaticContentCatalog;
    use crate::config::AppConfig;
    use crate::dao::content_store::ContentStore;
    use crate::dao::models::{AudioQuestionRow, FaceQuestionRow, IconRow, QuoteQuestionRow};
    use crate::dao::storage::{StorageError, StorageResult};
    use crate::dto::question::Difficulty;
    use crate::state::AppState;

    /// Session-focused store stub backed by a plain vector of rows.
    #[derive(Default)]
    struct SessionStore {
        fail: bool,
        rows: Arc<Mutex<Vec<AdminSessionRow>>>,
    }

    fn offline() -> StorageError {
        StorageError::unavailable("stub offline".into(), std::io::Error::other("stub"))
    }

    impl ContentStore for SessionStore {
        fn face_questions(
            &self,
            _difficulty: Difficulty,
        ) -> BoxFuture<'static, StorageResult<Vec<FaceQuestionRow>>> {
            Box::pin(async { Ok(Vec::new()) })
        }

        fn melody_questions(
            &self,
            _difficulty: Difficulty,
        ) -> BoxFuture<'static, StorageResult<Vec<AudioQuestionRow>>> {
            Box::pin(async { Ok(Vec::new()) })
        }

        fn voice_questions(
            &self,
            _difficulty: Difficulty,
        ) -> BoxFuture<'static, StorageResult<Vec<AudioQuestionRow>>> {
            Box::pin(async { Ok(Vec::new()) })
        }

        fn quote_questions(
            &self,
            _difficulty: Difficulty,
        ) -> BoxFuture<'static, StorageResult<Vec<QuoteQuestionRow>>> {
            Box::pin(async { Ok(Vec::new()) })
        }

        fn insert_face_question(
            &self,
            _row: FaceQuestionRow,
        ) -> BoxFuture<'static, StorageResult<()>> {
            Box::pin(async { Ok(()) })
        }

        fn insert_melody_question(
            &self,
            _row: AudioQuestionRow,
        ) -> BoxFuture<'static, StorageResult<()>> {
            Box::pin(async { Ok(()) })
        }

        fn insert_voice_question(
            &self,
            _row: AudioQuestionRow,
        ) -> BoxFuture<'static, StorageResult<()>> {
            Box::pin(async { Ok(()) })
        }

        fn insert_quote_question(
            &self,
            _row: QuoteQuestionRow,
        ) -> BoxFuture<'static, StorageResult<()>> {
            Box::pin(async { Ok(()) })
        }

        fn round_icons(&self) -> BoxFuture<'static, StorageResult<Vec<IconRow>>> {
            Box::pin(async { Ok(Vec::new()) })
        }

        fn upsert_round_icon(&self, _row: IconRow) -> BoxFuture<'static, StorageResult<()>> {
            Box::pin(async { Ok(()) })
        }

        fn latest_session(
            &self,
            operator_id: i64,
        ) -> BoxFuture<'static, StorageResult<Option<AdminSessionRow>>> {
            if self.fail {
                return Box::pin(async { Err(offline()) });
            }
            let rows = self.rows.clone();
            Box::pin(async move {
                let rows = rows.lock().unwrap();
                Ok(rows
                    .iter()
                    .filter(|row| row.telegram_user_id == operator_id)
                    .next_back()
                    .cloned())
            })
        }

        fn insert_session(&self, row: AdminSessionRow) -> BoxFuture<'static, StorageResult<()>> {
            if self.fail {
                return Box::pin(async { Err(offline()) });
            }
            let rows = self.rows.clone();
            Box::pin(async move {
                rows.lock().unwrap().push(row);
                Ok(())
            })
        }

        fn delete_sessions(&self, operator_id: i64) -> BoxFuture<'static, StorageResult<()>> {
            if self.fail {
                return Box::pin(async { Err(offline()) });
            }
            let rows = self.rows.clone();
            Box::pin(async move {
                rows.lock()
                    .unwrap()
                    .retain(|row| row.telegram_user_id != operator_id);
                Ok(())
            })
        }

        fn put_object(
            &self,
            path: String,
            _bytes: Vec<u8>,
            _content_type: String,
            _overwrite: bool,
        ) -> BoxFuture<'static, StorageResult<String>> {
            Box::pin(async move { Ok(format!("https://store.example/{path}")) })
        }

        fn health_check(&self) -> BoxFuture<'static, StorageResult<()>> {
            Box::pin(async { Ok(()) })
        }
    }

    fn config_with_password() -> AppConfig {
        AppConfig {
            admin_password: Some("nutcracker".into()),
            ..AppConfig::default()
        }
    }

    async fn state_with(config: AppConfig, store: SessionStore) -> SharedState {
        let state = AppState::new(config, None, StaticContentCatalog::default());
        state.install_content_store(Arc::new(store)).await;
        state
    }

    fn stamp(offset: Duration) -> String {
        (OffsetDateTime::now_utc() + offset)
            .format(&Rfc3339)
            .unwrap()
    }

    #[tokio::test]
    async fn login_replaces_previous_sessions_with_one_fresh_row() {
        let rows = Arc::new(Mutex::new(vec![AdminSessionRow {
            telegram_user_id: 7,
            expires_at: stamp(Duration::hours(1)),
        }]));
        let store = SessionStore {
            fail: false,
            rows: rows.clone(),
        };
        let state = state_with(config_with_password(), store).await;

        let outcome = login(&state, 7, "nutcracker").await.unwrap();
        assert_eq!(outcome, LoginOutcome::Success);

        let rows = rows.lock().unwrap();
        assert_eq!(rows.len(), 1);
        let expiry = OffsetDateTime::parse(&rows[0].expires_at, &Rfc3339).unwrap();
        let remaining = expiry - OffsetDateTime::now_utc();
        assert!(remaining > Duration::hours(11) && remaining <= SESSION_TTL);
    }

    #[tokio::test]
    async fn wrong_and_unset_passwords_never_touch_the_store() {
        let rows = Arc::new(Mutex::new(Vec::new()));
        let store = SessionStore {
            fail: false,
            rows: rows.clone(),
        };
        let state = state_with(config_with_password(), store).await;
        assert_eq!(
            login(&state, 7, "grinch").await.unwrap(),
            LoginOutcome::WrongPassword
        );

        let state = state_with(AppConfig::default(), SessionStore::default()).await;
        assert_eq!(
            login(&state, 7, "anything").await.unwrap(),
            LoginOutcome::PasswordUnset
        );
        assert!(rows.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn expired_sessions_do_not_authorize() {
        let rows = Arc::new(Mutex::new(vec![AdminSessionRow {
            telegram_user_id: 7,
            expires_at: stamp(-Duration::minutes(1)),
        }]));
        let state = state_with(
            config_with_password(),
            SessionStore { fail: false, rows },
        )
        .await;

        assert_eq!(check(&state, 7).await, AuthCheck::NotLoggedIn);
    }

    #[tokio::test]
    async fn live_session_authorizes_only_its_own_operator() {
        let rows = Arc::new(Mutex::new(vec![AdminSessionRow {
            telegram_user_id: 7,
            expires_at: stamp(Duration::hours(2)),
        }]));
        let state = state_with(
            config_with_password(),
            SessionStore { fail: false, rows },
        )
        .await;

        assert_eq!(check(&state, 7).await, AuthCheck::Authorized);
        assert_eq!(check(&state, 8).await, AuthCheck::NotLoggedIn);
    }

    #[tokio::test]
    async fn store_failure_is_distinct_from_not_logged_in() {
        let state = state_with(
            config_with_password(),
            SessionStore {
                fail: true,
                rows: Arc::new(Mutex::new(Vec::new())),
            },
        )
        .await;
        assert_eq!(check(&state, 7).await, AuthCheck::Unavailable);
        assert!(login(&state, 7, "nutcracker").await.is_err());

        // Degraded mode (no store at all) behaves the same way.
        let degraded = AppState::new(
            config_with_password(),
            None,
            StaticContentCatalog::default(),
        );
        assert_eq!(check(&degraded, 7).await, AuthCheck::Unavailable);
    }

    #[tokio::test]
    async fn logout_deletes_every_session_of_the_operator() {
        let rows = Arc::new(Mutex::new(vec![
            AdminSessionRow {
                telegram_user_id: 7,
                expires_at: stamp(Duration::hours(2)),
            },
            AdminSessionRow {
                telegram_user_id: 9,
                expires_at: stamp(Duration::hours(2)),
            },
        ]));
        let state = state_with(
            config_with_password(),
            SessionStore {
                fail: false,
                rows: rows.clone(),
            },
        )
        .await;

        logout(&state, 7).await.unwrap();
        let rows = rows.lock().unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].telegram_user_id, 9);
    }
}

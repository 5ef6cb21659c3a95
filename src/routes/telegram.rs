//! Telegram webhook and deployment status endpoints.

use axum::{
    Json, Router,
    extract::State,
    http::HeaderMap,
    routing::post,
};
use serde_json::{Value, json};
use tracing::{debug, warn};

use crate::{
    bot, dto::status::StatusResponse, dto::telegram::Update, error::AppError, services::status,
    state::SharedState,
};

const SECRET_HEADER: &str = "x-telegram-bot-api-secret-token";

#[utoipa::path(
    post,
    path = "/api/telegram",
    tag = "telegram",
    responses(
        (status = 200, description = "Update accepted"),
        (status = 401, description = "Secret token mismatch"),
    )
)]
/// Receive one webhook update from Telegram.
///
/// When a shared secret is configured the matching header is required.
/// Past that gate the route always acknowledges with 200, even for
/// unparseable bodies, so Telegram never retries a poison update.
pub async fn webhook(
    State(state): State<SharedState>,
    headers: HeaderMap,
    body: String,
) -> Result<Json<Value>, AppError> {
    if let Some(expected) = state.config().webhook_secret.as_deref() {
        let supplied = headers
            .get(SECRET_HEADER)
            .and_then(|value| value.to_str().ok());
        if supplied != Some(expected) {
            warn!("webhook secret mismatch");
            return Err(AppError::Unauthorized("invalid secret token".to_owned()));
        }
    }

    match serde_json::from_str::<Update>(&body) {
        Ok(update) => {
            debug!(update_id = update.update_id, "processing webhook update");
            bot::process_update(&state, update).await;
        }
        Err(err) => warn!(error = %err, "discarding unparseable webhook body"),
    }

    Ok(Json(json!({ "ok": true })))
}

#[utoipa::path(
    get,
    path = "/api/telegram",
    tag = "telegram",
    responses((status = 200, description = "Configuration status flags", body = StatusResponse))
)]
/// Report which subsystems are configured, without exposing any values.
pub async fn status(State(state): State<SharedState>) -> Json<StatusResponse> {
    Json(status::report(&state).await)
}

/// Configure the Telegram routes subtree.
pub fn router() -> Router<SharedState> {
    Router::<SharedState>::new().route("/api/telegram", post(webhook).get(status))
}

#[cfg(test)]
mod tests {
    use axum::http::HeaderValue;

    use super::*;
    use crate::catalog::StaticContentCatalog;
    use crate::config::AppConfig;
    use crate::state::AppState;

    fn state_with_secret(secret: Option<&str>) -> SharedState {
        AppState::new(
            AppConfig {
                webhook_secret: secret.map(str::to_owned),
                ..AppConfig::default()
            },
            None,
            StaticContentCatalog::default(),
        )
    }

    #[tokio::test]
    async fn missing_or_wrong_secret_is_rejected() {
        let state = state_with_secret(Some("tinsel"));

        let result = webhook(State(state.clone()), HeaderMap::new(), "{}".into()).await;
        assert!(result.is_err());

        let mut headers = HeaderMap::new();
        headers.insert(SECRET_HEADER, HeaderValue::from_static("garland"));
        let result = webhook(State(state), headers, "{}".into()).await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn matching_secret_and_unparseable_bodies_still_acknowledge() {
        let state = state_with_secret(Some("tinsel"));
        let mut headers = HeaderMap::new();
        headers.insert(SECRET_HEADER, HeaderValue::from_static("tinsel"));

        let result = webhook(State(state), headers, "not json".into()).await;
        assert!(result.is_ok());
    }

    #[tokio::test]
    async fn no_configured_secret_accepts_everything() {
        let state = state_with_secret(None);
        let result = webhook(State(state), HeaderMap::new(), "{}".into()).await;
        assert!(result.is_ok());
    }
}

//! Deployment status report shared by the HTTP surface and the bot console.

use time::{OffsetDateTime, format_description::well_known::Rfc3339};

use crate::dto::status::StatusResponse;
use crate::state::SharedState;

/// Assemble the current status snapshot.
pub async fn report(state: &SharedState) -> StatusResponse {
    let config = state.config();
    let store_config = state.store_config();
    let degraded = state.is_degraded().await;

    StatusResponse {
        status: if degraded { "degraded" } else { "ok" }.to_owned(),
        bot_configured: config.bot_token.is_some(),
        store_configured: store_config.is_some(),
        blob_configured: store_config.is_some_and(|cfg| cfg.blob_enabled()),
        admin_password_set: config.admin_password.is_some(),
        secret_token_set: config.webhook_secret.is_some(),
        timestamp: OffsetDateTime::now_utc()
            .format(&Rfc3339)
            .unwrap_or_default(),
    }
}

/// Render the snapshot as the operator-facing `/status` message.
pub fn console_text(report: &StatusResponse) -> String {
    fn mark(set: bool) -> &'static str {
        if set { "yes" } else { "no" }
    }

    format!(
        "Deployment status: {}\n\
         Bot token: {}\n\
         Content store: {}\n\
         Blob uploads: {}\n\
         Admin password: {}\n\
         Webhook secret: {}",
        report.status,
        mark(report.bot_configured),
        mark(report.store_configured),
        mark(report.blob_configured),
        mark(report.admin_password_set),
        mark(report.secret_token_set),
    )
}

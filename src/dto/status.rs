//! Configuration status body served by `GET /api/telegram`.

use serde::Serialize;
use utoipa::ToSchema;

/// Per-subsystem configuration flags, safe to expose (presence only, no values).
#[derive(Debug, Serialize, ToSchema)]
pub struct StatusResponse {
    /// "ok" when the content store is installed, "degraded" otherwise.
    pub status: String,
    /// Whether a bot token is configured.
    pub bot_configured: bool,
    /// Whether the content store URL and key are configured.
    pub store_configured: bool,
    /// Whether the dedicated blob service token is configured.
    pub blob_configured: bool,
    /// Whether the admin password is set.
    pub admin_password_set: bool,
    /// Whether the webhook shared secret is set.
    pub secret_token_set: bool,
    /// RFC 3339 timestamp of the report.
    pub timestamp: String,
}

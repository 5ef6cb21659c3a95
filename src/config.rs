//! Application-level configuration read from the environment.

use std::env;

/// Immutable runtime configuration shared across the application.
///
/// Every field is optional: the server starts and serves fallback content
/// even when the bot or the content store is unconfigured. Missing values
/// surface as operator-facing status text, never as a crash.
#[derive(Debug, Clone, Default)]
pub struct AppConfig {
    /// Telegram bot token; without it the admin console is disabled.
    pub bot_token: Option<String>,
    /// Shared admin password checked by `/login`.
    pub admin_password: Option<String>,
    /// Shared secret expected in the webhook header when set.
    pub webhook_secret: Option<String>,
}

impl AppConfig {
    /// Read the configuration from environment variables.
    pub fn from_env() -> Self {
        Self {
            bot_token: non_empty(env::var("TELEGRAM_BOT_TOKEN").ok()),
            admin_password: non_empty(env::var("TELEGRAM_ADMIN_PASSWORD").ok()),
            webhook_secret: non_empty(env::var("TELEGRAM_SECRET_TOKEN").ok()),
        }
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

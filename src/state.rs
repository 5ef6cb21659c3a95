//! Central application state shared across routes, services, and the bot.

use std::sync::Arc;

use dashmap::DashMap;
use tokio::sync::RwLock;

use crate::{
    bot::{api::TelegramApi, conversation::ConversationState},
    catalog::StaticContentCatalog,
    config::AppConfig,
    dao::content_store::{ContentStore, RestStoreConfig},
};

/// Cheaply cloneable handle to the application state.
pub type SharedState = Arc<AppState>;

/// Central application state.
///
/// The conversation map is process-local by design: a multi-step admin flow
/// must stay pinned to the instance that started it, and is lost on restart.
pub struct AppState {
    config: AppConfig,
    store_config: Option<RestStoreConfig>,
    catalog: StaticContentCatalog,
    telegram: Option<TelegramApi>,
    content_store: RwLock<Option<Arc<dyn ContentStore>>>,
    conversations: DashMap<i64, ConversationState>,
}

impl AppState {
    /// Construct the state wrapped in an [`Arc`] so it can be cloned cheaply.
    ///
    /// The application starts in degraded mode until a content store is
    /// installed by the supervisor.
    pub fn new(
        config: AppConfig,
        store_config: Option<RestStoreConfig>,
        catalog: StaticContentCatalog,
    ) -> SharedState {
        let telegram = config.bot_token.clone().map(TelegramApi::new);
        Arc::new(Self {
            config,
            store_config,
            catalog,
            telegram,
            content_store: RwLock::new(None),
            conversations: DashMap::new(),
        })
    }

    /// Immutable runtime configuration.
    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    /// Content store connection settings, if the environment provides them.
    pub fn store_config(&self) -> Option<&RestStoreConfig> {
        self.store_config.as_ref()
    }

    /// Bundled fallback question sets.
    pub fn catalog(&self) -> &StaticContentCatalog {
        &self.catalog
    }

    /// Outbound Telegram client, if a bot token is configured.
    pub fn telegram(&self) -> Option<&TelegramApi> {
        self.telegram.as_ref()
    }

    /// Obtain a handle to the current content store, if one is installed.
    pub async fn content_store(&self) -> Option<Arc<dyn ContentStore>> {
        let guard = self.content_store.read().await;
        guard.as_ref().cloned()
    }

    /// Install a content store implementation and leave degraded mode.
    pub async fn install_content_store(&self, store: Arc<dyn ContentStore>) {
        let mut guard = self.content_store.write().await;
        *guard = Some(store);
    }

    /// Remove the current content store and enter degraded mode.
    pub async fn clear_content_store(&self) {
        let mut guard = self.content_store.write().await;
        guard.take();
    }

    /// Whether the application currently serves fallback content only.
    pub async fn is_degraded(&self) -> bool {
        let guard = self.content_store.read().await;
        guard.is_none()
    }

    /// Per-operator conversation states keyed by Telegram user id.
    pub fn conversations(&self) -> &DashMap<i64, ConversationState> {
        &self.conversations
    }
}

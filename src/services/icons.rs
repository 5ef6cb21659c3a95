//! Round icon lookup with the same silent degradation as question content.

use indexmap::IndexMap;
use tracing::warn;

use crate::state::SharedState;

/// Icon URLs keyed by round id, in store order.
///
/// Degraded mode and store failures both yield an empty map; clients render
/// their built-in icons when a round id is absent.
pub async fn round_icons(state: &SharedState) -> IndexMap<String, String> {
    let Some(store) = state.content_store().await else {
        return IndexMap::new();
    };

    match store.round_icons().await {
        Ok(rows) => rows
            .into_iter()
            .map(|row| (row.round_id, row.icon_url))
            .collect(),
        Err(err) => {
            warn!(error = %err, "round icon lookup failed; serving empty map");
            IndexMap::new()
        }
    }
}

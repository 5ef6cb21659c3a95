//! Response bodies for the player-facing round content endpoints.

use indexmap::IndexMap;
use serde::Serialize;
use utoipa::ToSchema;

use crate::dto::question::Question;

/// Body of `GET /api/round-data/...`.
///
/// Always returned with status 200; content-store failures degrade to the
/// static catalog or, at worst, an empty list.
#[derive(Debug, Serialize, ToSchema)]
pub struct RoundDataResponse {
    /// Questions for the requested round and tier, oldest first.
    pub questions: Vec<Question>,
}

/// Body of `GET /api/round-icons`.
#[derive(Debug, Serialize, ToSchema)]
pub struct RoundIconsResponse {
    /// Uploaded icon URL per round; rounds without an override are absent.
    #[schema(value_type = Object)]
    pub icons: IndexMap<String, String>,
}

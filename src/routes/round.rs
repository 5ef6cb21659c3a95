//! Player-facing round content endpoints.
//!
//! These routes never answer with an error status: unknown rounds, missing
//! tiers, and store failures all degrade to benign bodies.

use axum::{Json, Router, extract::Path, extract::State, routing::get};
use tracing::debug;

use crate::{
    dto::question::{Difficulty, RoundKind},
    dto::round::{RoundDataResponse, RoundIconsResponse},
    services::{icons, resolver},
    state::SharedState,
};

#[utoipa::path(
    get,
    path = "/api/round-data/{round_id}",
    tag = "rounds",
    params(("round_id" = String, Path, description = "Round identifier, e.g. guess-melody")),
    responses((status = 200, description = "Questions for the round at the default tier", body = RoundDataResponse))
)]
/// Serve the question list for a round at the default difficulty.
pub async fn round_data(
    State(state): State<SharedState>,
    Path(round_id): Path<String>,
) -> Json<RoundDataResponse> {
    serve_round(&state, &round_id, None).await
}

#[utoipa::path(
    get,
    path = "/api/round-data/{round_id}/{difficulty}",
    tag = "rounds",
    params(
        ("round_id" = String, Path, description = "Round identifier, e.g. guess-melody"),
        ("difficulty" = String, Path, description = "easy, medium, or hard"),
    ),
    responses((status = 200, description = "Questions for the round and tier", body = RoundDataResponse))
)]
/// Serve the question list for a round at an explicit difficulty.
pub async fn round_data_with_difficulty(
    State(state): State<SharedState>,
    Path((round_id, difficulty)): Path<(String, String)>,
) -> Json<RoundDataResponse> {
    serve_round(&state, &round_id, Some(&difficulty)).await
}

async fn serve_round(
    state: &SharedState,
    round_id: &str,
    difficulty: Option<&str>,
) -> Json<RoundDataResponse> {
    let Ok(round) = round_id.parse::<RoundKind>() else {
        debug!(round_id, "unknown round requested");
        return Json(RoundDataResponse {
            questions: Vec::new(),
        });
    };
    let difficulty = difficulty.and_then(|raw| raw.parse::<Difficulty>().ok());
    let questions = resolver::resolve(state, round, difficulty).await;
    Json(RoundDataResponse { questions })
}

#[utoipa::path(
    get,
    path = "/api/round-icons",
    tag = "rounds",
    responses((status = 200, description = "Uploaded icon URL per round", body = RoundIconsResponse))
)]
/// Serve the uploaded round icon overrides.
pub async fn round_icons(State(state): State<SharedState>) -> Json<RoundIconsResponse> {
    let icons = icons::round_icons(&state).await;
    Json(RoundIconsResponse { icons })
}

/// Configure the round content routes subtree.
pub fn router() -> Router<SharedState> {
    Router::<SharedState>::new()
        .route("/api/round-data/{round_id}", get(round_data))
        .route(
            "/api/round-data/{round_id}/{difficulty}",
            get(round_data_with_difficulty),
        )
        .route("/api/round-icons", get(round_icons))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::StaticContentCatalog;
    use crate::config::AppConfig;
    use crate::state::AppState;

    fn state() -> SharedState {
        AppState::new(AppConfig::default(), None, StaticContentCatalog::default())
    }

    #[tokio::test]
    async fn unknown_round_yields_an_empty_list_not_an_error() {
        let response = serve_round(&state(), "guess-reindeer", None).await;
        assert!(response.0.questions.is_empty());
    }

    #[tokio::test]
    async fn invalid_difficulty_falls_back_to_the_default_tier() {
        let state = state();
        let explicit = serve_round(&state, "bible-quotes", Some("impossible")).await;
        let default = serve_round(&state, "bible-quotes", None).await;
        assert_eq!(explicit.0.questions, default.0.questions);
        assert!(!explicit.0.questions.is_empty());
    }
}

use utoipa::OpenApi;

#[derive(OpenApi)]
/// Aggregated OpenAPI specification for the Christmas Mysteries backend.
#[openapi(
    paths(
        crate::routes::health::healthcheck,
        crate::routes::round::round_data,
        crate::routes::round::round_data_with_difficulty,
        crate::routes::round::round_icons,
        crate::routes::telegram::webhook,
        crate::routes::telegram::status,
    ),
    components(
        schemas(
            crate::dto::health::HealthResponse,
            crate::dto::round::RoundDataResponse,
            crate::dto::round::RoundIconsResponse,
            crate::dto::status::StatusResponse,
            crate::dto::question::Question,
            crate::dto::question::FaceQuestion,
            crate::dto::question::AudioQuestion,
            crate::dto::question::QuoteQuestion,
            crate::dto::question::CalendarQuestion,
        )
    ),
    tags(
        (name = "health", description = "Health check endpoints"),
        (name = "rounds", description = "Round content served to the game client"),
        (name = "telegram", description = "Telegram webhook and deployment status"),
    )
)]
pub struct ApiDoc;

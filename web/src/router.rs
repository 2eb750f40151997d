use crate::controller::{health_check_controller, stats_controller};
use crate::response::hub_stats::{GroupStatsResponse, HubStatsResponse};
use crate::stream::handler;
use crate::AppState;
use axum::{routing::get, Router};

use utoipa::OpenApi;
use utoipa_rapidoc::RapiDoc;

// This is the global definition of our OpenAPI document. To be a part
// of the rendered document, a path and schema must be listed here.
#[derive(OpenApi)]
#[openapi(
        info(
            title = "Notification Hub API"
        ),
        paths(
            health_check_controller::health_check,
            stats_controller::read,
            stats_controller::read_group,
            handler::group_stream,
            handler::user_stream,
        ),
        components(
            schemas(
                HubStatsResponse,
                GroupStatsResponse,
            )
        ),
        tags(
            (name = "notification_hub", description = "Real-time event streams for circles and users")
        )
    )]
pub struct ApiDoc;

pub fn define_routes(app_state: AppState) -> Router {
    Router::new()
        .merge(health_routes())
        .merge(stats_routes(app_state.clone()))
        .merge(stream_routes(app_state))
        .merge(RapiDoc::with_openapi("/api-docs/openapi.json", ApiDoc::openapi()).path("/rapidoc"))
}

fn health_routes() -> Router {
    Router::new().route("/health", get(health_check_controller::health_check))
}

fn stats_routes(app_state: AppState) -> Router {
    Router::new()
        .route("/stats", get(stats_controller::read))
        .route("/stats/groups/{group_key}", get(stats_controller::read_group))
        .with_state(app_state)
}

fn stream_routes(app_state: AppState) -> Router {
    Router::new()
        .route("/events/groups/{group_key}", get(handler::group_stream))
        .route("/events/users/{user_id}", get(handler::user_stream))
        .with_state(app_state)
}

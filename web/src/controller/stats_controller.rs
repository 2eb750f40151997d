use crate::controller::ApiResponse;
use crate::response::hub_stats::{GroupStatsResponse, HubStatsResponse};
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use log::*;
use service::AppState;

/// GET a snapshot of how many listeners the hub is serving
#[utoipa::path(
    get,
    path = "/stats",
    responses(
        (status = 200, description = "Successfully retrieved hub listener counts", body = HubStatsResponse),
    )
)]
pub async fn read(State(app_state): State<AppState>) -> impl IntoResponse {
    let stats = HubStatsResponse::from(app_state.hub.stats());
    debug!("Hub stats: {stats:?}");

    Json(ApiResponse::new(StatusCode::OK.into(), stats))
}

/// GET the number of listeners subscribed to one group
#[utoipa::path(
    get,
    path = "/stats/groups/{group_key}",
    params(
        ("group_key" = String, Path, description = "Routing key of the group")
    ),
    responses(
        (status = 200, description = "Successfully retrieved the group's listener count", body = GroupStatsResponse),
    )
)]
pub async fn read_group(
    State(app_state): State<AppState>,
    Path(group_key): Path<String>,
) -> impl IntoResponse {
    let listeners = app_state.hub.group_listener_count(&group_key);

    Json(ApiResponse::new(
        StatusCode::OK.into(),
        GroupStatsResponse {
            group_key,
            listeners,
        },
    ))
}

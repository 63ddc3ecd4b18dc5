//! Route handlers.

use axum::body::Bytes;
use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use chrono::Utc;
use nline_core::{
    DeviceId, DeviceInfo, DeviceListResponse, GameError, MatchId, MatchRequest,
    MatchRequestOutcome, MatchState, MoveRequest, MoveResponse, RegisterRequest,
    RegisterResponse, SurrenderRequest, WaitingResponse, WaitingStatus, WaitingStatusQuery,
};

use crate::error::ApiError;
use crate::state::AppState;

pub async fn health() -> &'static str {
    "ok"
}

/// `POST /devices`. The body is optional; anything unparsable registers without an alias.
pub async fn register_device(
    State(state): State<AppState>,
    body: Bytes,
) -> (StatusCode, Json<RegisterResponse>) {
    let request: RegisterRequest = serde_json::from_slice(&body).unwrap_or_default();
    let device_id = state.lobby.write().await.register(request.alias, Utc::now());
    (StatusCode::CREATED, Json(RegisterResponse { device_id }))
}

/// `GET /devices`
pub async fn list_devices(State(state): State<AppState>) -> Json<DeviceListResponse> {
    let connected_devices = state.lobby.write().await.connected_devices(Utc::now());
    Json(DeviceListResponse { connected_devices })
}

/// `GET /devices/:device_id/info`
pub async fn device_info(
    State(state): State<AppState>,
    Path(device_id): Path<String>,
) -> Result<Json<DeviceInfo>, ApiError> {
    let info = state
        .lobby
        .write()
        .await
        .device_info(&DeviceId::new(device_id), Utc::now())?;
    Ok(Json(info))
}

/// `POST /matches`: 201 with the pairing, or 202 while waiting.
pub async fn request_match(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<Response, ApiError> {
    let request = parse_match_request(&body)?;
    let outcome =
        state
            .lobby
            .write()
            .await
            .request_match(&request.device_id, request.size, Utc::now())?;

    let response = match outcome {
        MatchRequestOutcome::Matched(assignment) => {
            (StatusCode::CREATED, Json(assignment)).into_response()
        }
        waiting => {
            let message = waiting.message().unwrap_or_default();
            (StatusCode::ACCEPTED, Json(WaitingResponse { message })).into_response()
        }
    };
    Ok(response)
}

/// A body without a usable `device_id` is an invalid device; any other decoding
/// failure is reported as is.
fn parse_match_request(body: &[u8]) -> Result<MatchRequest, ApiError> {
    serde_json::from_slice(body).map_err(|err| {
        let has_device_id = serde_json::from_slice::<serde_json::Value>(body)
            .ok()
            .is_some_and(|value| value.get("device_id").is_some_and(serde_json::Value::is_string));
        if has_device_id {
            ApiError::BadRequest(err.to_string())
        } else {
            GameError::InvalidDevice.into()
        }
    })
}

/// `GET /matches/waiting-status?device_id=`
pub async fn waiting_status(
    State(state): State<AppState>,
    query: Result<Query<WaitingStatusQuery>, QueryRejection>,
) -> Result<Json<WaitingStatus>, ApiError> {
    let device_id = query
        .ok()
        .and_then(|Query(q)| q.device_id)
        .ok_or(GameError::InvalidDevice)?;
    let status = state
        .lobby
        .write()
        .await
        .waiting_status(&device_id, Utc::now())?;
    Ok(Json(status))
}

/// `POST /matches/:match_id/moves`
pub async fn make_move(
    State(state): State<AppState>,
    Path(match_id): Path<String>,
    body: Result<Json<MoveRequest>, JsonRejection>,
) -> Result<Json<MoveResponse>, ApiError> {
    let Json(request) = body.map_err(|e| ApiError::BadRequest(e.body_text()))?;
    let response = state.lobby.write().await.make_move(
        &MatchId::new(match_id),
        &request.device_id,
        request.x,
        request.y,
        Utc::now(),
    )?;
    Ok(Json(response))
}

/// `POST /matches/:match_id/surrender`
pub async fn surrender(
    State(state): State<AppState>,
    Path(match_id): Path<String>,
    body: Result<Json<SurrenderRequest>, JsonRejection>,
) -> Result<Json<MoveResponse>, ApiError> {
    let Json(request) = body.map_err(|e| ApiError::BadRequest(e.body_text()))?;
    let response = state.lobby.write().await.surrender(
        &MatchId::new(match_id),
        &request.device_id,
        Utc::now(),
    )?;
    Ok(Json(response))
}

/// `GET /matches/:match_id`
pub async fn match_state(
    State(state): State<AppState>,
    Path(match_id): Path<String>,
) -> Result<Json<MatchState>, ApiError> {
    let state = state.lobby.read().await.match_state(&MatchId::new(match_id))?;
    Ok(Json(state))
}

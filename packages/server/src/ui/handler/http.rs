//! HTTP API endpoint handlers.

use std::sync::Arc;

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};

use crate::{
    domain::{MeetingId, MeetingTitle},
    infrastructure::dto::http::{
        CreateMeetingRequestDto, ErrorResponseDto, HealthDto, MeetingDetailDto, MeetingSummaryDto,
    },
    ui::state::AppState,
    usecase::MeetingError,
};

type ApiError = (StatusCode, Json<ErrorResponseDto>);

fn error_response(error: MeetingError) -> ApiError {
    let status = match error {
        MeetingError::InvalidInput(_) => StatusCode::BAD_REQUEST,
        MeetingError::NotFound(_) => StatusCode::NOT_FOUND,
        MeetingError::AlreadyExists(_) => StatusCode::CONFLICT,
        MeetingError::NoSession => StatusCode::BAD_REQUEST,
        MeetingError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
    };
    (
        status,
        Json(ErrorResponseDto {
            error: error.client_message(),
        }),
    )
}

/// Health check endpoint
pub async fn health_check(State(state): State<Arc<AppState>>) -> Json<HealthDto> {
    let health = state.list_meetings_usecase.health().await;
    Json(HealthDto {
        status: "ok".to_string(),
        active_meetings: health.active_meetings,
        active_connections: health.active_connections,
    })
}

/// Get list of meetings
pub async fn list_meetings(State(state): State<Arc<AppState>>) -> Json<Vec<MeetingSummaryDto>> {
    let meetings = state.list_meetings_usecase.execute().await;
    Json(meetings.iter().map(MeetingSummaryDto::from).collect())
}

/// Get meeting detail by ID
pub async fn get_meeting_detail(
    State(state): State<Arc<AppState>>,
    Path(meeting_id): Path<String>,
) -> Result<Json<MeetingDetailDto>, ApiError> {
    let meeting_id = MeetingId::try_from(meeting_id.clone())
        .map_err(|_| error_response(MeetingError::NotFound(meeting_id)))?;

    match state.get_meeting_info_usecase.find(&meeting_id).await {
        Some(meeting) => Ok(Json(MeetingDetailDto::from(&meeting))),
        None => Err(error_response(MeetingError::NotFound(
            meeting_id.into_string(),
        ))),
    }
}

/// Create a meeting explicitly
pub async fn create_meeting(
    State(state): State<Arc<AppState>>,
    Json(request): Json<CreateMeetingRequestDto>,
) -> Result<(StatusCode, Json<MeetingDetailDto>), ApiError> {
    let meeting_id = MeetingId::try_from(request.meeting_id.unwrap_or_default())
        .map_err(|e| error_response(e.into()))?;
    let title = request
        .title
        .map(MeetingTitle::try_from)
        .transpose()
        .map_err(|e| error_response(e.into()))?;

    match state
        .create_meeting_usecase
        .execute(meeting_id, title)
        .await
    {
        Ok(meeting) => Ok((StatusCode::CREATED, Json(MeetingDetailDto::from(&meeting)))),
        Err(e) => {
            tracing::warn!("Failed to create meeting: {}", e);
            Err(error_response(e))
        }
    }
}

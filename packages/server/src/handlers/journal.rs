use axum::extract::{DefaultBodyLimit, Path, Request, State};
use axum::http::{StatusCode, header};
use axum::{Json, RequestExt};
use chrono::Utc;
use tracing::instrument;
use uuid::Uuid;

use crate::decoder::DecodedForm;
use crate::error::{AppError, ErrorBody};
use crate::extractors::auth::AuthUser;
use crate::extractors::query::AppQuery;
use crate::journal::MonthPeriod;
use crate::models::journal::*;
use crate::state::AppState;

#[utoipa::path(
    post,
    path = "/",
    tag = "Journals",
    operation_id = "createJournal",
    summary = "Create a journal",
    description = "Creates a journal from `multipart/form-data` with a required `title`, an optional `note`, \
        an optional `video` file (`video/webm`) and an optional `photo` file (`image/*`). Files are limited to \
        50 MiB each. A JSON body with `title` and `note` is accepted too. Sentiment fields are filled in when \
        analysis is available and left null otherwise.",
    request_body(content_type = "multipart/form-data", description = "Journal fields with optional media"),
    responses(
        (status = 201, description = "Journal created", body = JournalResponse),
        (status = 400, description = "Validation error (VALIDATION_ERROR)", body = ErrorBody),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user, request), fields(user_id = %auth_user.user_id))]
pub async fn create_journal(
    auth_user: AuthUser,
    State(state): State<AppState>,
    request: Request,
) -> Result<(StatusCode, Json<JournalResponse>), AppError> {
    let form = decode_body(&state, request).await?;
    let record = state.lifecycle.create(&auth_user.user_id, form).await?;
    Ok((StatusCode::CREATED, Json(JournalResponse { data: record })))
}

#[utoipa::path(
    get,
    path = "/",
    tag = "Journals",
    operation_id = "listJournals",
    summary = "List journals of a month",
    description = "Returns the caller's journals created within the given UTC month, newest first. \
        `month` and `year` default to the current month.",
    params(MonthQuery),
    responses(
        (status = 200, description = "Journals of the month", body = JournalListResponse),
        (status = 400, description = "Invalid month or year (VALIDATION_ERROR)", body = ErrorBody),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user), fields(user_id = %auth_user.user_id))]
pub async fn list_journals(
    auth_user: AuthUser,
    State(state): State<AppState>,
    AppQuery(query): AppQuery<MonthQuery>,
) -> Result<Json<JournalListResponse>, AppError> {
    let period = MonthPeriod::resolve(query.year, query.month, Utc::now())?;
    let listing = state.lifecycle.list_month(&auth_user.user_id, period).await?;
    Ok(Json(listing.into()))
}

#[utoipa::path(
    get,
    path = "/mood-calendar",
    tag = "Journals",
    operation_id = "getMoodCalendar",
    summary = "Mood per day of a month",
    description = "For every day of the month with at least one journal, returns the emotion and \
        expression of the most recent journal of that day.",
    params(MonthQuery),
    responses(
        (status = 200, description = "Mood calendar", body = MoodCalendarResponse),
        (status = 400, description = "Invalid month or year (VALIDATION_ERROR)", body = ErrorBody),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user), fields(user_id = %auth_user.user_id))]
pub async fn mood_calendar(
    auth_user: AuthUser,
    State(state): State<AppState>,
    AppQuery(query): AppQuery<MonthQuery>,
) -> Result<Json<MoodCalendarResponse>, AppError> {
    let period = MonthPeriod::resolve(query.year, query.month, Utc::now())?;
    let moods = state.lifecycle.mood_calendar(&auth_user.user_id, period).await?;
    Ok(Json(MoodCalendarResponse {
        year: period.year,
        month: period.month,
        moods,
    }))
}

#[utoipa::path(
    get,
    path = "/{id}",
    tag = "Journals",
    operation_id = "getJournal",
    summary = "Get a journal",
    params(("id" = String, Path, description = "Journal ID (UUID)")),
    responses(
        (status = 200, description = "Journal", body = JournalResponse),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 404, description = "Journal not found (NOT_FOUND)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user), fields(user_id = %auth_user.user_id))]
pub async fn get_journal(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<JournalResponse>, AppError> {
    let record = state
        .lifecycle
        .get(&auth_user.user_id, parse_id(&id)?)
        .await?;
    Ok(Json(JournalResponse { data: record }))
}

#[utoipa::path(
    put,
    path = "/{id}",
    tag = "Journals",
    operation_id = "updateJournal",
    summary = "Update a journal",
    description = "Partial update from `multipart/form-data` or JSON. Absent fields are left unchanged. \
        A new `photo` or `video` replaces the stored one; the old file is deleted once the journal \
        has been saved.",
    params(("id" = String, Path, description = "Journal ID (UUID)")),
    request_body(content_type = "multipart/form-data", description = "Fields to change"),
    responses(
        (status = 200, description = "Updated journal", body = JournalResponse),
        (status = 400, description = "Validation error (VALIDATION_ERROR)", body = ErrorBody),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 404, description = "Journal not found (NOT_FOUND)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user, request), fields(user_id = %auth_user.user_id))]
pub async fn update_journal(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<String>,
    request: Request,
) -> Result<Json<JournalResponse>, AppError> {
    apply_update(&state, &auth_user, &id, request).await
}

#[utoipa::path(
    patch,
    path = "/{id}",
    tag = "Journals",
    operation_id = "patchJournal",
    summary = "Update a journal",
    description = "Same as `PUT /journals/{id}`.",
    params(("id" = String, Path, description = "Journal ID (UUID)")),
    request_body(content_type = "multipart/form-data", description = "Fields to change"),
    responses(
        (status = 200, description = "Updated journal", body = JournalResponse),
        (status = 400, description = "Validation error (VALIDATION_ERROR)", body = ErrorBody),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 404, description = "Journal not found (NOT_FOUND)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user, request), fields(user_id = %auth_user.user_id))]
pub async fn patch_journal(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<String>,
    request: Request,
) -> Result<Json<JournalResponse>, AppError> {
    apply_update(&state, &auth_user, &id, request).await
}

#[utoipa::path(
    delete,
    path = "/{id}",
    tag = "Journals",
    operation_id = "deleteJournal",
    summary = "Delete a journal",
    description = "Deletes the journal's media files, then the journal. Media that cannot be deleted \
        is left behind and does not fail the request.",
    params(("id" = String, Path, description = "Journal ID (UUID)")),
    responses(
        (status = 200, description = "Journal deleted", body = DeleteResponse),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 404, description = "Journal not found (NOT_FOUND)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user), fields(user_id = %auth_user.user_id))]
pub async fn delete_journal(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<DeleteResponse>, AppError> {
    state
        .lifecycle
        .delete(&auth_user.user_id, parse_id(&id)?)
        .await?;
    Ok(Json(DeleteResponse {
        data: MessageBody {
            message: "Journal and its media deleted".into(),
        },
    }))
}

/// Body limit layer for journal routes: two files plus form overhead.
pub fn body_limit(max_file_size: u64) -> DefaultBodyLimit {
    let limit = max_file_size
        .saturating_mul(2)
        .saturating_add(1024 * 1024);
    DefaultBodyLimit::max(usize::try_from(limit).unwrap_or(usize::MAX))
}

async fn apply_update(
    state: &AppState,
    auth_user: &AuthUser,
    id: &str,
    request: Request,
) -> Result<Json<JournalResponse>, AppError> {
    let id = parse_id(id)?;
    let form = decode_body(state, request).await?;
    let record = state.lifecycle.update(&auth_user.user_id, id, form).await?;
    Ok(Json(JournalResponse { data: record }))
}

async fn decode_body(state: &AppState, request: Request) -> Result<DecodedForm, AppError> {
    let content_type = request
        .headers()
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .map(str::to_owned);
    let body = request.with_limited_body().into_body();
    Ok(state
        .decoder
        .decode(body.into_data_stream(), content_type.as_deref())
        .await?)
}

/// Ids that are not UUIDs cannot name a journal, so they are reported as missing.
fn parse_id(id: &str) -> Result<Uuid, AppError> {
    Uuid::parse_str(id).map_err(|_| AppError::NotFound("Journal not found".into()))
}

use axum::extract::{Path, State};
use serde::Deserialize;
use serde_json::json;
use uuid::Uuid;
use validator::Validate;

use crate::http::envelope::{build_success, ErrorEnvelope, SuccessEnvelope};
use crate::http::error::ApiError;
use crate::http::pagination::{build_paginated, Page, Pagination};
use crate::http::request::RequestId;
use crate::http::server::AppState;
use crate::http::status::StatusKey;
use crate::http::validation::{ValidatedJson, ValidatedQuery};
use crate::notes::store::Note;

#[derive(Debug, Deserialize, Validate)]
pub struct CreateNote {
    #[validate(length(min = 1, max = 120))]
    pub title: String,
    #[serde(default)]
    #[validate(length(max = 10000))]
    pub body: String,
    #[serde(default)]
    #[validate(length(max = 10, message = "At most 10 tags are allowed"))]
    pub tags: Vec<String>,
}

fn default_page() -> u64 {
    1
}

fn default_limit() -> u64 {
    20
}

#[derive(Debug, Deserialize, Validate)]
pub struct ListNotes {
    #[serde(default = "default_page")]
    #[validate(range(min = 1))]
    pub page: u64,
    #[serde(default = "default_limit")]
    #[validate(range(min = 1, max = 100))]
    pub limit: u64,
    #[serde(default)]
    #[validate(length(max = 120))]
    pub q: Option<String>,
}

fn parse_id(id: &str) -> Result<Uuid, ApiError> {
    Uuid::parse_str(id).map_err(|_| ApiError::BadRequest(format!("'{}' is not a valid note id", id)))
}

pub async fn create_note(
    State(state): State<AppState>,
    request_id: RequestId,
    ValidatedJson(input): ValidatedJson<CreateNote>,
) -> Result<SuccessEnvelope<Note>, ErrorEnvelope> {
    let note = state
        .notes
        .insert(input.title, input.body, input.tags)
        .map_err(|e| {
            state.logger.warn("Rejected duplicate note title", ());
            state.error(ApiError::Conflict(e.to_string()), &request_id)
        })?;

    state.logger.log("Note created", json!({ "noteId": note.id }));

    Ok(build_success(
        state
            .success_options(&request_id)
            .status(StatusKey::Created)
            .data(note),
    ))
}

pub async fn list_notes(
    State(state): State<AppState>,
    request_id: RequestId,
    ValidatedQuery(query): ValidatedQuery<ListNotes>,
) -> SuccessEnvelope<Page<Note>> {
    let offset = query.page.saturating_sub(1).saturating_mul(query.limit);
    let (items, total) = state.notes.page(
        query.q.as_deref(),
        usize::try_from(offset).unwrap_or(usize::MAX),
        usize::try_from(query.limit).unwrap_or(usize::MAX),
    );

    state.logger.debug(
        "Listing notes",
        json!({ "page": query.page, "limit": query.limit, "total": total }),
    );

    build_paginated(
        items,
        Pagination::from_total(query.page, query.limit, total as u64),
        state.paginated_options(&request_id),
    )
}

pub async fn get_note(
    State(state): State<AppState>,
    request_id: RequestId,
    Path(id): Path<String>,
) -> Result<SuccessEnvelope<Note>, ErrorEnvelope> {
    let note = parse_id(&id)
        .and_then(|id| {
            state
                .notes
                .get(&id)
                .ok_or_else(|| ApiError::NotFound(format!("Note {} not found", id)))
        })
        .map_err(|e| state.error(e, &request_id))?;

    Ok(build_success(state.success_options(&request_id).data(note)))
}

pub async fn delete_note(
    State(state): State<AppState>,
    request_id: RequestId,
    Path(id): Path<String>,
) -> Result<SuccessEnvelope<Note>, ErrorEnvelope> {
    let removed = parse_id(&id)
        .and_then(|id| {
            state
                .notes
                .remove(&id)
                .ok_or_else(|| ApiError::NotFound(format!("Note {} not found", id)))
        })
        .map_err(|e| state.error(e, &request_id))?;

    state.logger.log("Note deleted", json!({ "noteId": removed.id }));

    Ok(build_success(
        state
            .success_options(&request_id)
            .status(StatusKey::NoContent),
    ))
}

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;

use crate::error::{AppError, AppResult};
use crate::models::{NewNote, Note};
use crate::providers::ai::fallback_enhancement;
use crate::state::AppState;

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NoteFilter {
    pub job_id: Option<i64>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateNoteRequest {
    pub job_id: i64,
    pub technician_id: i64,
    pub content: String,
}

pub async fn list_notes(
    State(state): State<AppState>,
    Query(filter): Query<NoteFilter>,
) -> Json<Vec<Note>> {
    let notes = match filter.job_id {
        Some(job_id) => state.store.notes_for_job(job_id),
        None => state.store.list_notes(),
    };
    Json(notes)
}

pub async fn create_note(
    State(state): State<AppState>,
    Json(payload): Json<CreateNoteRequest>,
) -> AppResult<(StatusCode, Json<Note>)> {
    if payload.content.trim().is_empty() {
        return Err(AppError::bad_request("content must not be empty"));
    }
    if state.store.get_job(payload.job_id).is_none() {
        return Err(AppError::bad_request("job does not exist"));
    }
    if state.store.get_user(payload.technician_id).is_none() {
        return Err(AppError::bad_request("technician does not exist"));
    }

    let note = state.store.create_note(NewNote {
        job_id: payload.job_id,
        technician_id: payload.technician_id,
        content: payload.content,
    });
    Ok((StatusCode::CREATED, Json(note)))
}

/// Rewrites the note through the text model; each call overwrites the
/// previous enhancement. Model failure produces the deterministic local
/// formatting instead of an error.
pub async fn enhance_note(
    State(state): State<AppState>,
    Path(note_id): Path<i64>,
) -> AppResult<Json<Note>> {
    let note = state
        .store
        .get_note(note_id)
        .ok_or_else(AppError::not_found)?;

    let enhanced = match state.ai.enhance_note(&note.content).await {
        Ok(enhanced) => enhanced,
        Err(err) => {
            tracing::warn!(note_id, error = %err, "note enhancement unavailable, using fallback");
            fallback_enhancement(&note.content)
        }
    };

    let updated = state
        .store
        .set_note_enhancement(note_id, enhanced)
        .ok_or_else(AppError::not_found)?;
    Ok(Json(updated))
}

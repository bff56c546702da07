//! Note listing and editing

use axum::extract::rejection::FormRejection;
use axum::extract::{Form, State};
use axum::response::Html;
use serde::Deserialize;

use super::pages;
use crate::AppState;
use crate::auth::CurrentUser;
use crate::error::AppError;

const INVALID_FORM_MESSAGE: &str =
    r#"Please submit a valid form with "title" and "text" parameters."#;
const MISSING_FIELDS_MESSAGE: &str = "Both title and text must be specified.";

#[derive(Debug, Deserialize)]
pub struct NoteForm {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub text: String,
}

/// GET /notes/
pub async fn list_notes(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
) -> Result<Html<String>, AppError> {
    let notes = state.db.get_notes(&user).await?;
    Ok(Html(pages::notes_page(&user, &notes)))
}

/// POST /notes
///
/// Adds a note, or edits the caller's note with the same title, then
/// renders the updated list.
pub async fn save_note(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    form: Result<Form<NoteForm>, FormRejection>,
) -> Result<Html<String>, AppError> {
    let Form(form) = form.map_err(|rejection| {
        tracing::debug!(%rejection, "malformed note form");
        AppError::Validation(INVALID_FORM_MESSAGE.to_string())
    })?;

    if form.title.is_empty() || form.text.is_empty() {
        return Err(AppError::Validation(MISSING_FIELDS_MESSAGE.to_string()));
    }

    state
        .db
        .add_or_edit_note(&user, &form.title, &form.text)
        .await?;
    tracing::debug!(username = %user, title = %form.title, "note saved");

    let notes = state.db.get_notes(&user).await?;
    Ok(Html(pages::notes_page(&user, &notes)))
}

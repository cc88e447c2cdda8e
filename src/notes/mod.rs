//! Example resource wired through the envelope and validation layers.
//!
//! # Routes
//! - `POST /api/notes`: create (validated body, 201)
//! - `GET /api/notes`: list (validated query, paginated)
//! - `GET /api/notes/{id}`: fetch (404 envelope when missing)
//! - `DELETE /api/notes/{id}`: delete (204)

pub mod handlers;
pub mod store;

use axum::{routing::get, Router};

use crate::http::server::AppState;
use self::handlers::*;

pub use store::{Note, NoteStore};

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/api/notes", get(list_notes).post(create_note))
        .route("/api/notes/{id}", get(get_note).delete(delete_note))
}

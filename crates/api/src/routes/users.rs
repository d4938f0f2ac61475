//! User profile routes.

use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Multipart, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
};
use serde_json::json;
use tracing::{error, info};

use crate::AppState;
use crate::middleware::AuthUser;
use crate::routes::user_info;
use mugshot_core::media::{MediaError, ProfileImageService};
use mugshot_db::UserRepository;

/// Multipart field name carrying the uploaded image.
const IMAGE_FIELD: &str = "image";

/// Creates the user routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/users/me", get(me))
        .route("/users/me/profile-image", post(upload_profile_image))
}

/// GET /users/me - Current user profile.
async fn me(State(state): State<AppState>, user: AuthUser) -> impl IntoResponse {
    let user_repo = UserRepository::new((*state.db).clone());

    match user_repo.find_by_id(user.user_id()).await {
        Ok(Some(u)) => (
            StatusCode::OK,
            Json(json!({ "user": user_info(u, &state.storage) })),
        )
            .into_response(),
        Ok(None) => (
            StatusCode::NOT_FOUND,
            Json(json!({ "error": "not_found", "message": "User not found" })),
        )
            .into_response(),
        Err(e) => {
            error!(error = %e, "Failed to fetch user profile");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({
                    "error": "internal_error",
                    "message": "Failed to fetch user profile"
                })),
            )
                .into_response()
        }
    }
}

/// POST /users/me/profile-image - Upload a new profile image.
///
/// Accepts a multipart form with an `image` field, re-encodes it under the
/// size ceiling, and swaps it in as the current profile image.
async fn upload_profile_image(
    State(state): State<AppState>,
    user: AuthUser,
    multipart: Multipart,
) -> impl IntoResponse {
    let Some((bytes, content_type)) = read_image_field(multipart).await else {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({
                "error": "missing_image",
                "message": "No image file provided"
            })),
        )
            .into_response();
    };

    let user_repo = UserRepository::new((*state.db).clone());

    // The display name only seeds the object key.
    let owner = match user_repo.find_by_id(user.user_id()).await {
        Ok(Some(u)) => u,
        Ok(None) => {
            return (
                StatusCode::NOT_FOUND,
                Json(json!({ "error": "not_found", "message": "User not found" })),
            )
                .into_response();
        }
        Err(e) => {
            error!(error = %e, "Failed to load user for upload");
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({
                    "error": "internal_error",
                    "message": "Failed to upload profile image"
                })),
            )
                .into_response();
        }
    };

    let service = ProfileImageService::new(
        Arc::clone(&state.storage),
        Arc::new(user_repo),
        state.encoder,
    );

    match service
        .ingest(user.user_id(), &owner.name, &bytes, &content_type)
        .await
    {
        Ok(key) => {
            info!(user_id = %user.user_id(), key = %key, "Profile image updated");
            (
                StatusCode::OK,
                Json(json!({
                    "message": "Profile image uploaded successfully",
                    "profile_image_key": key,
                    "profile_image_url": state.storage.url_for(&key)
                })),
            )
                .into_response()
        }
        Err(e) => media_error_response(&e),
    }
}

/// Pulls the bytes and declared content type of the `image` field.
async fn read_image_field(mut multipart: Multipart) -> Option<(Vec<u8>, String)> {
    while let Ok(Some(field)) = multipart.next_field().await {
        if field.name() != Some(IMAGE_FIELD) {
            continue;
        }
        let content_type = field.content_type().unwrap_or_default().to_string();
        let bytes = field.bytes().await.ok()?;
        return Some((bytes.to_vec(), content_type));
    }
    None
}

/// Maps media pipeline errors onto HTTP responses.
fn media_error_response(e: &MediaError) -> axum::response::Response {
    let (status, code) = match e {
        MediaError::Validation(_) => (StatusCode::BAD_REQUEST, "invalid_upload"),
        MediaError::Decode(_) => (StatusCode::BAD_REQUEST, "undecodable_image"),
        MediaError::Encoding { .. } => (StatusCode::BAD_REQUEST, "image_not_compressible"),
        MediaError::Storage(_) => (StatusCode::INTERNAL_SERVER_ERROR, "storage_error"),
        MediaError::Record(_) => (StatusCode::INTERNAL_SERVER_ERROR, "internal_error"),
    };

    if status.is_server_error() {
        error!(error = %e, "Profile image upload failed");
    }

    (
        status,
        Json(json!({ "error": code, "message": e.to_string() })),
    )
        .into_response()
}

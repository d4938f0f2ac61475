//! API route definitions.

use axum::{Router, middleware};

use mugshot_core::storage::StorageService;
use mugshot_db::entities::users::Model as UserModel;
use mugshot_shared::auth::UserInfo;

use crate::{AppState, middleware::auth::auth_middleware};

pub mod auth;
pub mod health;
pub mod users;

/// Builds the user payload returned by auth and profile endpoints. The
/// public image URL is composed here; only the key is stored.
pub(crate) fn user_info(user: UserModel, storage: &StorageService) -> UserInfo {
    let profile_image_url = user
        .profile_image_key
        .as_deref()
        .and_then(|key| storage.url_for(key));

    UserInfo {
        id: user.id,
        name: user.name,
        email: user.email,
        profile_image_key: user.profile_image_key,
        profile_image_url,
        created_at: user.created_at,
    }
}

/// Creates the API router with public and protected routes.
#[allow(clippy::needless_pass_by_value)]
pub fn api_routes_with_state(state: AppState) -> Router<AppState> {
    // Protected routes that require authentication
    let protected_routes = Router::new()
        .merge(users::routes())
        .layer(middleware::from_fn_with_state(
            state.clone(),
            auth_middleware,
        ));

    // Combine public and protected routes
    Router::new()
        .merge(health::routes())
        .merge(auth::routes())
        .merge(protected_routes)
}

//! Authentication routes for registration and login.

use axum::{Json, Router, extract::State, http::StatusCode, response::IntoResponse, routing::post};
use serde_json::json;
use tracing::{error, info};

use crate::AppState;
use crate::routes::user_info;
use mugshot_core::auth::{hash_password, verify_password};
use mugshot_db::UserRepository;
use mugshot_shared::auth::{LoginRequest, LoginResponse, RegisterRequest};

/// Creates the auth router.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/auth/register", post(register))
        .route("/auth/login", post(login))
}

/// POST /auth/register - Register a new user.
async fn register(
    State(state): State<AppState>,
    Json(payload): Json<RegisterRequest>,
) -> impl IntoResponse {
    let name = payload.name.trim().to_string();
    let email = payload.email.trim().to_lowercase();

    if let Err(message) = validate_registration(&name, &email, &payload.password) {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({ "error": "validation_error", "message": message })),
        )
            .into_response();
    }

    let user_repo = UserRepository::new((*state.db).clone());

    // Check if email already exists
    match user_repo.email_exists(&email).await {
        Ok(true) => {
            return (
                StatusCode::CONFLICT,
                Json(json!({
                    "error": "email_exists",
                    "message": "An account with this email already exists"
                })),
            )
                .into_response();
        }
        Ok(false) => {}
        Err(e) => {
            error!(error = %e, "Database error checking email");
            return internal_error("An error occurred during registration");
        }
    }

    // Hash password
    let password_hash = match hash_password(&payload.password) {
        Ok(h) => h,
        Err(e) => {
            error!(error = %e, "Failed to hash password");
            return internal_error("An error occurred during registration");
        }
    };

    // Create user
    let user = match user_repo.create(&name, &email, &password_hash).await {
        Ok(u) => u,
        Err(e) => {
            error!(error = %e, "Failed to create user");
            return internal_error("An error occurred during registration");
        }
    };

    let access_token = match state.jwt_service.generate_token(user.id) {
        Ok(t) => t,
        Err(e) => {
            error!(error = %e, "Failed to generate access token");
            return internal_error("An error occurred during registration");
        }
    };

    info!(user_id = %user.id, email = %user.email, "New user registered");

    let response = LoginResponse {
        user: user_info(user, &state.storage),
        access_token,
        expires_in: state.jwt_service.token_expires_in(),
    };

    (StatusCode::CREATED, Json(response)).into_response()
}

/// POST /auth/login - Authenticate user and return a token.
async fn login(
    State(state): State<AppState>,
    Json(payload): Json<LoginRequest>,
) -> impl IntoResponse {
    let email = payload.email.trim().to_lowercase();

    let user_repo = UserRepository::new((*state.db).clone());

    // Find user by email
    let user = match user_repo.find_by_email(&email).await {
        Ok(Some(u)) => u,
        Ok(None) => {
            info!(email = %email, "Login attempt for non-existent user");
            return invalid_credentials();
        }
        Err(e) => {
            error!(error = %e, "Database error during login");
            return internal_error("An error occurred during login");
        }
    };

    // Verify password
    match verify_password(&payload.password, &user.password_hash) {
        Ok(true) => {}
        Ok(false) => {
            info!(user_id = %user.id, "Failed login attempt - invalid password");
            return invalid_credentials();
        }
        Err(e) => {
            error!(error = %e, "Password verification error");
            return internal_error("An error occurred during login");
        }
    }

    let access_token = match state.jwt_service.generate_token(user.id) {
        Ok(t) => t,
        Err(e) => {
            error!(error = %e, "Failed to generate access token");
            return internal_error("An error occurred during login");
        }
    };

    info!(user_id = %user.id, "User logged in successfully");

    let response = LoginResponse {
        user: user_info(user, &state.storage),
        access_token,
        expires_in: state.jwt_service.token_expires_in(),
    };

    (StatusCode::OK, Json(response)).into_response()
}

/// Validates registration input, returning a user-facing message on failure.
fn validate_registration(name: &str, email: &str, password: &str) -> Result<(), &'static str> {
    if name.is_empty() || email.is_empty() || password.is_empty() {
        return Err("Name, email, and password are required");
    }
    if name.len() < 2 || name.len() > 100 {
        return Err("Name must be between 2 and 100 characters");
    }
    // Shape check only; deliverability is the mail server's problem.
    let valid_email = email.split_once('@').is_some_and(|(local, domain)| {
        !local.is_empty() && domain.contains('.') && !domain.starts_with('.') && !domain.ends_with('.')
    });
    if !valid_email {
        return Err("Invalid email format");
    }
    if password.len() < 6 {
        return Err("Password must be at least 6 characters");
    }
    Ok(())
}

fn invalid_credentials() -> axum::response::Response {
    (
        StatusCode::UNAUTHORIZED,
        Json(json!({
            "error": "invalid_credentials",
            "message": "Invalid email or password"
        })),
    )
        .into_response()
}

fn internal_error(message: &str) -> axum::response::Response {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(json!({ "error": "internal_error", "message": message })),
    )
        .into_response()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_registration_accepts_normal_input() {
        assert!(validate_registration("Alice", "alice@example.com", "secret1").is_ok());
    }

    #[test]
    fn test_validate_registration_rejects_bad_input() {
        assert!(validate_registration("", "alice@example.com", "secret1").is_err());
        assert!(validate_registration("A", "alice@example.com", "secret1").is_err());
        assert!(validate_registration("Alice", "not-an-email", "secret1").is_err());
        assert!(validate_registration("Alice", "alice@nodot", "secret1").is_err());
        assert!(validate_registration("Alice", "alice@example.com", "short").is_err());
    }
}

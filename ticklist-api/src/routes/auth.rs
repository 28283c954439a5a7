/// Authentication endpoints
///
/// # Endpoints
///
/// - `POST /auth/signup` - Create an account, returns `{user, token}`
/// - `POST /auth/login` - Authenticate, returns `{user, token}`
/// - `GET /me` - Current user identity (bearer-authenticated)
///
/// Login failures always produce one generic message whether the email is
/// unknown or the password is wrong, so accounts cannot be enumerated.
use crate::{
    app::AppState,
    error::{ApiError, ApiResult},
};
use axum::{extract::State, http::StatusCode, Extension, Json};
use serde::{Deserialize, Serialize};
use ticklist_shared::{
    auth::{jwt, middleware::AuthContext, password},
    models::user::{CreateUser, User},
};
use uuid::Uuid;
use validator::Validate;

/// Signup request
#[derive(Debug, Deserialize, Validate)]
pub struct SignupRequest {
    /// Email address
    #[validate(email(message = "Invalid email format"))]
    pub email: String,

    /// Password (at least 8 characters)
    #[validate(length(min = 8, message = "Password must be at least 8 characters"))]
    pub password: String,
}

/// Login request
#[derive(Debug, Deserialize, Validate)]
pub struct LoginRequest {
    /// Email address
    #[validate(email(message = "Invalid email format"))]
    pub email: String,

    /// Password
    pub password: String,
}

/// Public view of a user: never carries the password hash
#[derive(Debug, Serialize, Deserialize)]
pub struct PublicUser {
    /// User ID
    pub id: Uuid,

    /// Email address
    pub email: String,
}

impl From<&User> for PublicUser {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            email: user.email.clone(),
        }
    }
}

/// Signup and login response
#[derive(Debug, Serialize, Deserialize)]
pub struct AuthResponse {
    /// The authenticated user
    pub user: PublicUser,

    /// Bearer token bound to `{userId, email}`
    pub token: String,
}

/// `/me` response
#[derive(Debug, Serialize, Deserialize)]
pub struct MeResponse {
    /// User ID
    pub id: Uuid,

    /// Email address
    pub email: String,
}

/// Flattens validator output into the single message of the first failure
fn validation_message(errors: &validator::ValidationErrors) -> String {
    errors
        .field_errors()
        .values()
        .flat_map(|errs| errs.iter())
        .filter_map(|e| e.message.as_ref().map(|m| m.to_string()))
        .next()
        .unwrap_or_else(|| "Request validation failed".to_string())
}

/// Register a new user
///
/// # Endpoint
///
/// ```text
/// POST /auth/signup
/// Content-Type: application/json
///
/// { "email": "a@x.com", "password": "password1" }
/// ```
///
/// # Errors
///
/// - `400 Bad Request`: invalid email or password shorter than 8 chars
/// - `409 Conflict`: email already registered
pub async fn signup(
    State(state): State<AppState>,
    Json(req): Json<SignupRequest>,
) -> ApiResult<(StatusCode, Json<AuthResponse>)> {
    req.validate()
        .map_err(|e| ApiError::Validation(validation_message(&e)))?;

    if User::email_exists(&state.db, &req.email).await? {
        return Err(ApiError::Conflict("Email is already in use".to_string()));
    }

    let password_hash = password::hash_password(&req.password)?;

    // A concurrent signup with the same email loses on the unique
    // constraint, which the error layer also maps to 409.
    let user = User::create(
        &state.db,
        CreateUser {
            email: req.email,
            password_hash,
        },
    )
    .await?;

    let claims = jwt::Claims::new(user.id, user.email.clone());
    let token = jwt::create_token(&claims, state.jwt_secret())?;

    tracing::info!(user_id = %user.id, "New user registered");

    Ok((
        StatusCode::CREATED,
        Json(AuthResponse {
            user: PublicUser::from(&user),
            token,
        }),
    ))
}

/// Login endpoint
///
/// # Endpoint
///
/// ```text
/// POST /auth/login
/// Content-Type: application/json
///
/// { "email": "a@x.com", "password": "password1" }
/// ```
///
/// # Errors
///
/// - `401 Unauthorized`: unknown email or wrong password, with the same
///   message for both
pub async fn login(
    State(state): State<AppState>,
    Json(req): Json<LoginRequest>,
) -> ApiResult<Json<AuthResponse>> {
    req.validate()
        .map_err(|e| ApiError::Validation(validation_message(&e)))?;

    let user = User::find_by_email(&state.db, &req.email)
        .await?
        .ok_or_else(|| ApiError::Unauthorized("Invalid email or password".to_string()))?;

    let valid = password::verify_password(&req.password, &user.password_hash)?;
    if !valid {
        return Err(ApiError::Unauthorized(
            "Invalid email or password".to_string(),
        ));
    }

    let claims = jwt::Claims::new(user.id, user.email.clone());
    let token = jwt::create_token(&claims, state.jwt_secret())?;

    Ok(Json(AuthResponse {
        user: PublicUser::from(&user),
        token,
    }))
}

/// Current-user endpoint
///
/// Echoes the identity carried by the bearer token; used by clients to
/// hydrate their session on startup.
///
/// # Endpoint
///
/// ```text
/// GET /me
/// Authorization: Bearer <token>
/// ```
pub async fn me(Extension(auth): Extension<AuthContext>) -> ApiResult<Json<MeResponse>> {
    Ok(Json(MeResponse {
        id: auth.user_id,
        email: auth.email,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_signup_request_validation() {
        let ok = SignupRequest {
            email: "a@x.com".to_string(),
            password: "password1".to_string(),
        };
        assert!(ok.validate().is_ok());

        let bad_email = SignupRequest {
            email: "not-an-email".to_string(),
            password: "password1".to_string(),
        };
        assert!(bad_email.validate().is_err());

        let short_password = SignupRequest {
            email: "a@x.com".to_string(),
            password: "short".to_string(),
        };
        let err = short_password.validate().unwrap_err();
        assert!(validation_message(&err).contains("at least 8 characters"));
    }

    #[test]
    fn test_public_user_has_no_hash() {
        let user = User {
            id: Uuid::new_v4(),
            email: "a@x.com".to_string(),
            password_hash: "$argon2id$secret".to_string(),
            created_at: chrono::Utc::now(),
            updated_at: chrono::Utc::now(),
        };

        let json = serde_json::to_string(&PublicUser::from(&user)).unwrap();
        assert!(!json.contains("argon2id"));
        assert!(!json.contains("password"));
    }
}

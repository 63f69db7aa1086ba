use std::sync::Arc;

use axum::{
    extract::{FromRef, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use chrono::{DateTime, Utc};
use domain::{
    AuthTokens, ProfileUpdate, Registration, User, UserAddress, UserPreferences, UserRole,
    UserService,
};
use serde::{Deserialize, Serialize};

use crate::auth::AuthUser;
use crate::error::ApiError;

#[derive(Clone)]
pub struct UserState {
    pub service: Arc<UserService>,
    pub tokens: AuthTokens,
}

impl FromRef<UserState> for AuthTokens {
    fn from_ref(state: &UserState) -> AuthTokens {
        state.tokens.clone()
    }
}

#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub email: String,
    pub password: String,
    pub name: String,
    pub phone: Option<String>,
    pub role: Option<UserRole>,
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct UpdateProfileRequest {
    pub name: Option<String>,
    pub phone: Option<String>,
    pub addresses: Option<Vec<UserAddress>>,
    pub preferences: Option<UserPreferences>,
}

/// Profile projection; the password hash never leaves the service.
#[derive(Debug, Serialize)]
pub struct UserResponse {
    pub id: Option<String>,
    pub email: String,
    pub name: String,
    pub phone: Option<String>,
    pub role: UserRole,
    pub is_active: bool,
    pub addresses: Vec<UserAddress>,
    pub preferences: UserPreferences,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<User> for UserResponse {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            email: user.email,
            name: user.name,
            phone: user.phone,
            role: user.role,
            is_active: user.is_active,
            addresses: user.addresses,
            preferences: user.preferences,
            created_at: user.created_at,
            updated_at: user.updated_at,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct AuthResponse {
    pub success: bool,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user: Option<UserResponse>,
}

pub fn router(state: UserState) -> Router {
    Router::new()
        .route("/api/users/register", post(register))
        .route("/api/users/login", post(login))
        .route(
            "/api/users/profile",
            get(profile).put(update_profile).delete(deactivate),
        )
        .route("/api/users/logout", post(logout))
        .route("/api/users/health", get(health))
        .with_state(state)
}

async fn register(
    State(state): State<UserState>,
    Json(payload): Json<RegisterRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let authenticated = state
        .service
        .register(Registration {
            email: payload.email,
            password: payload.password,
            name: payload.name,
            phone: payload.phone,
            role: payload.role.unwrap_or(UserRole::Customer),
        })
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(AuthResponse {
            success: true,
            message: "User registered successfully".to_string(),
            token: Some(authenticated.token),
            user: Some(authenticated.user.into()),
        }),
    ))
}

async fn login(
    State(state): State<UserState>,
    Json(payload): Json<LoginRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let authenticated = state.service.login(&payload.email, &payload.password).await?;

    Ok(Json(AuthResponse {
        success: true,
        message: "Login successful".to_string(),
        token: Some(authenticated.token),
        user: Some(authenticated.user.into()),
    }))
}

async fn profile(
    State(state): State<UserState>,
    AuthUser(claims): AuthUser,
) -> Result<Json<UserResponse>, ApiError> {
    let user = state.service.profile(claims.user_id()).await?;
    Ok(Json(user.into()))
}

async fn update_profile(
    State(state): State<UserState>,
    AuthUser(claims): AuthUser,
    Json(payload): Json<UpdateProfileRequest>,
) -> Result<Json<UserResponse>, ApiError> {
    let user = state
        .service
        .update_profile(
            claims.user_id(),
            ProfileUpdate {
                name: payload.name,
                phone: payload.phone,
                addresses: payload.addresses,
                preferences: payload.preferences,
            },
        )
        .await?;
    Ok(Json(user.into()))
}

async fn deactivate(
    State(state): State<UserState>,
    AuthUser(claims): AuthUser,
) -> Result<impl IntoResponse, ApiError> {
    state.service.deactivate(claims.user_id()).await?;
    Ok(Json(serde_json::json!({
        "message": "Account deactivated successfully"
    })))
}

async fn logout(AuthUser(_claims): AuthUser) -> impl IntoResponse {
    // Tokens are stateless; logout is an acknowledgment for clients.
    Json(serde_json::json!({
        "success": true,
        "message": "Logged out successfully"
    }))
}

async fn health() -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "UP",
        "service": "user-service",
        "timestamp": chrono::Utc::now().to_rfc3339()
    }))
}

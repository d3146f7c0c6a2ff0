/// Profile and colleague endpoints
///
/// # Endpoints
///
/// - `GET /v1/users/me` - Caller's profile
/// - `PUT /v1/users/me` - Update the caller's profile
/// - `GET /v1/users` - Colleagues: users sharing a client with the caller
///
/// The profile update follows replace semantics: every optional field the
/// request omits is written as NULL, so a PUT carries the whole profile.

use crate::{
    app::AppState,
    error::{validation_error, ApiError, ApiResult},
    render,
};
use axum::{extract::State, Extension, Json};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;
use worklog_shared::{
    auth::middleware::AuthContext,
    models::user::{User, UserProfileUpdate},
};

/// Profile response
#[derive(Debug, Serialize)]
pub struct ProfileResponse {
    pub id: Uuid,
    pub username: String,
    pub email: String,
    pub role: String,
    pub display_name: String,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub building_number: Option<String>,
    pub street_address: Option<String>,
    pub postcode: Option<String>,
    pub city: Option<String>,
    pub contact_number: Option<String>,
    pub last_login: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<User> for ProfileResponse {
    fn from(user: User) -> Self {
        Self {
            display_name: render::display_name(
                user.first_name.as_deref(),
                user.last_name.as_deref(),
                &user.username,
            ),
            last_login: render::last_login_display(user.last_login_at),
            id: user.id,
            username: user.username,
            email: user.email,
            role: user.role,
            first_name: user.first_name,
            last_name: user.last_name,
            building_number: user.building_number,
            street_address: user.street_address,
            postcode: user.postcode,
            city: user.city,
            contact_number: user.contact_number,
            created_at: user.created_at,
            updated_at: user.updated_at,
        }
    }
}

/// Update profile request
#[derive(Debug, Deserialize, Validate)]
pub struct UpdateProfileRequest {
    pub first_name: Option<String>,
    pub last_name: Option<String>,

    #[validate(email(message = "Invalid email format"))]
    pub email: String,

    pub building_number: Option<String>,
    pub street_address: Option<String>,
    pub postcode: Option<String>,
    pub city: Option<String>,
    pub contact_number: Option<String>,
}

/// A colleague row: another user assigned to one of the caller's clients
#[derive(Debug, Serialize)]
pub struct ColleagueResponse {
    pub id: Uuid,
    pub username: String,
    pub display_name: String,
    pub email: String,
    pub last_login: String,
}

/// Lists users who share at least one client with the caller
pub async fn colleagues(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
) -> ApiResult<Json<Vec<ColleagueResponse>>> {
    let users = User::colleagues_of(&state.db, auth.user_id).await?;

    let colleagues = users
        .into_iter()
        .map(|user| ColleagueResponse {
            id: user.id,
            display_name: render::display_name(
                user.first_name.as_deref(),
                user.last_name.as_deref(),
                &user.username,
            ),
            last_login: render::last_login_display(user.last_login_at),
            username: user.username,
            email: user.email,
        })
        .collect();

    Ok(Json(colleagues))
}

/// Returns the caller's profile
pub async fn me(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
) -> ApiResult<Json<ProfileResponse>> {
    let user = User::find_by_id(&state.db, auth.user_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("User not found".to_string()))?;

    Ok(Json(ProfileResponse::from(user)))
}

/// Updates the caller's profile
///
/// # Errors
///
/// - `422 Unprocessable Entity`: validation failed
/// - `409 Conflict`: email already in use
pub async fn update_me(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Json(req): Json<UpdateProfileRequest>,
) -> ApiResult<Json<ProfileResponse>> {
    req.validate().map_err(validation_error)?;

    let updated = User::update_profile(
        &state.db,
        auth.user_id,
        UserProfileUpdate {
            first_name: req.first_name,
            last_name: req.last_name,
            email: req.email,
            building_number: req.building_number,
            street_address: req.street_address,
            postcode: req.postcode,
            city: req.city,
            contact_number: req.contact_number,
        },
    )
    .await?;

    if !updated {
        return Err(ApiError::NotFound("User not found".to_string()));
    }

    let user = User::find_by_id(&state.db, auth.user_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("User not found".to_string()))?;

    Ok(Json(ProfileResponse::from(user)))
}

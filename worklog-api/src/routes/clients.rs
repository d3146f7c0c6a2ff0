/// Client endpoints: CRUD and membership management
///
/// # Endpoints
///
/// - `GET    /v1/clients` - Clients the caller is assigned to
/// - `POST   /v1/clients` - Create a client (creator is auto-assigned)
/// - `GET    /v1/clients/:id` - Detail with members and recent logs
/// - `PUT    /v1/clients/:id` - Update contact fields
/// - `DELETE /v1/clients/:id` - Delete (cascades to logs and memberships)
/// - `POST   /v1/clients/:id/members` - Assign a user
/// - `DELETE /v1/clients/:id/members/:user_id` - Unassign a user
///
/// Every per-client route requires the caller to be assigned to that
/// client; there is no cross-tenant visibility.

use crate::{
    app::AppState,
    error::{validation_error, ApiError, ApiResult},
    render,
};
use axum::{
    extract::{Path, State},
    http::StatusCode,
    Extension, Json,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;
use worklog_shared::{
    auth::middleware::AuthContext,
    models::{
        client::{Client, CreateClient, UpdateClient},
        client_user::ClientUser,
        log::Log,
        user::User,
    },
};

/// Create client request
#[derive(Debug, Deserialize, Validate)]
pub struct CreateClientRequest {
    #[validate(length(min = 1, max = 191, message = "Company must be 1-191 characters"))]
    pub company: String,

    pub first_name: Option<String>,
    pub last_name: Option<String>,

    #[validate(email(message = "Invalid email format"))]
    pub email: Option<String>,

    pub contact_number: Option<String>,
    pub building_number: Option<String>,
    pub street_address: Option<String>,
    pub postcode: Option<String>,
    pub city: Option<String>,
}

/// Update client request
///
/// Only the supplied fields are changed.
#[derive(Debug, Deserialize, Validate)]
pub struct UpdateClientRequest {
    #[validate(length(min = 1, max = 191, message = "Company must be 1-191 characters"))]
    pub company: Option<String>,

    pub first_name: Option<String>,
    pub last_name: Option<String>,

    #[validate(email(message = "Invalid email format"))]
    pub email: Option<String>,

    pub contact_number: Option<String>,
    pub building_number: Option<String>,
    pub street_address: Option<String>,
    pub postcode: Option<String>,
    pub city: Option<String>,
}

/// Add member request
#[derive(Debug, Deserialize)]
pub struct AddMemberRequest {
    /// User to assign to the client
    pub user_id: Uuid,
}

/// Client response
#[derive(Debug, Serialize)]
pub struct ClientResponse {
    pub id: Uuid,
    pub company: String,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub email: Option<String>,
    pub contact_number: Option<String>,
    pub building_number: Option<String>,
    pub street_address: Option<String>,
    pub postcode: Option<String>,
    pub city: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<Client> for ClientResponse {
    fn from(client: Client) -> Self {
        Self {
            id: client.id,
            company: client.company,
            first_name: client.first_name,
            last_name: client.last_name,
            email: client.email,
            contact_number: client.contact_number,
            building_number: client.building_number,
            street_address: client.street_address,
            postcode: client.postcode,
            city: client.city,
            created_at: client.created_at,
            updated_at: client.updated_at,
        }
    }
}

/// A member row in the client detail response
#[derive(Debug, Serialize)]
pub struct MemberResponse {
    pub user_id: Uuid,
    pub username: String,
    pub display_name: String,
    pub assigned_at: DateTime<Utc>,
}

/// Client detail: the client, its members and its recent logs
#[derive(Debug, Serialize)]
pub struct ClientDetailResponse {
    #[serde(flatten)]
    pub client: ClientResponse,
    pub members: Vec<MemberResponse>,
    pub log_slugs: Vec<String>,
}

/// Requires that the caller is assigned to the client
async fn require_membership(
    state: &AppState,
    client_id: Uuid,
    user_id: Uuid,
) -> Result<(), ApiError> {
    let assigned = ClientUser::is_assigned(&state.db, client_id, user_id).await?;

    if !assigned {
        return Err(ApiError::Forbidden(
            "Not assigned to this client".to_string(),
        ));
    }

    Ok(())
}

/// Lists the clients the caller is assigned to
pub async fn list_clients(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
) -> ApiResult<Json<Vec<ClientResponse>>> {
    let clients = Client::list_for_user(&state.db, auth.user_id).await?;

    Ok(Json(clients.into_iter().map(ClientResponse::from).collect()))
}

/// Creates a client and assigns the creator to it
///
/// Without the auto-assignment the creator could not see the client they
/// just created.
pub async fn create_client(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Json(req): Json<CreateClientRequest>,
) -> ApiResult<(StatusCode, Json<ClientResponse>)> {
    req.validate().map_err(validation_error)?;

    let client = Client::create(
        &state.db,
        CreateClient {
            company: req.company,
            first_name: req.first_name,
            last_name: req.last_name,
            email: req.email,
            contact_number: req.contact_number,
            building_number: req.building_number,
            street_address: req.street_address,
            postcode: req.postcode,
            city: req.city,
        },
    )
    .await?;

    ClientUser::assign(&state.db, client.id, auth.user_id).await?;

    Ok((StatusCode::CREATED, Json(ClientResponse::from(client))))
}

/// Fetches a client with its members and log slugs
pub async fn get_client(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<ClientDetailResponse>> {
    let client = Client::find_by_id(&state.db, id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Client not found".to_string()))?;

    require_membership(&state, client.id, auth.user_id).await?;

    let mut members = Vec::new();
    for membership in ClientUser::list_for_client(&state.db, client.id).await? {
        if let Some(user) = User::find_by_id(&state.db, membership.user_id).await? {
            members.push(MemberResponse {
                user_id: user.id,
                display_name: render::display_name(
                    user.first_name.as_deref(),
                    user.last_name.as_deref(),
                    &user.username,
                ),
                username: user.username,
                assigned_at: membership.created_at,
            });
        }
    }

    let log_slugs = Log::list_by_client(&state.db, client.id)
        .await?
        .into_iter()
        .map(|summary| summary.slug)
        .collect();

    Ok(Json(ClientDetailResponse {
        client: ClientResponse::from(client),
        members,
        log_slugs,
    }))
}

/// Updates a client's contact fields
pub async fn update_client(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(id): Path<Uuid>,
    Json(req): Json<UpdateClientRequest>,
) -> ApiResult<Json<ClientResponse>> {
    req.validate().map_err(validation_error)?;

    require_membership(&state, id, auth.user_id).await?;

    let client = Client::update(
        &state.db,
        id,
        UpdateClient {
            company: req.company,
            first_name: req.first_name,
            last_name: req.last_name,
            email: req.email,
            contact_number: req.contact_number,
            building_number: req.building_number,
            street_address: req.street_address,
            postcode: req.postcode,
            city: req.city,
        },
    )
    .await?
    .ok_or_else(|| ApiError::NotFound("Client not found".to_string()))?;

    Ok(Json(ClientResponse::from(client)))
}

/// Deletes a client, cascading to its logs and memberships
pub async fn delete_client(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(id): Path<Uuid>,
) -> ApiResult<StatusCode> {
    require_membership(&state, id, auth.user_id).await?;

    let deleted = Client::delete(&state.db, id).await?;
    if !deleted {
        return Err(ApiError::NotFound("Client not found".to_string()));
    }

    Ok(StatusCode::NO_CONTENT)
}

/// Assigns a user to a client
///
/// # Errors
///
/// - `404 Not Found`: client or user doesn't exist
/// - `409 Conflict`: user is already assigned
pub async fn add_member(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(id): Path<Uuid>,
    Json(req): Json<AddMemberRequest>,
) -> ApiResult<StatusCode> {
    require_membership(&state, id, auth.user_id).await?;

    User::find_by_id(&state.db, req.user_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("User not found".to_string()))?;

    ClientUser::assign(&state.db, id, req.user_id).await?;

    Ok(StatusCode::CREATED)
}

/// Removes a user's assignment to a client
pub async fn remove_member(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path((id, user_id)): Path<(Uuid, Uuid)>,
) -> ApiResult<StatusCode> {
    require_membership(&state, id, auth.user_id).await?;

    let removed = ClientUser::unassign(&state.db, id, user_id).await?;
    if !removed {
        return Err(ApiError::NotFound("Membership not found".to_string()));
    }

    Ok(StatusCode::NO_CONTENT)
}

/**
 * User Handlers
 *
 * - `GET /user?email=` or `GET /user?id=` - look a user up
 * - `POST /user` - create a user explicitly (login also creates users)
 */

use std::sync::Arc;

use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::Json,
};
use serde::Deserialize;

use crate::backend::api::access::parse_id;
use crate::backend::error::{BackendError, BackendResult};
use crate::backend::store::{Store, UserStore};
use crate::shared::user::validated_email;
use crate::shared::User;

#[derive(Debug, Default, Deserialize)]
pub struct UserQuery {
    pub email: Option<String>,
    pub id: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct CreateUserRequest {
    pub name: String,
    pub email: String,
}

/// Get a user by email or id
///
/// A non-empty `id` wins over `email`; an empty parameter counts as absent.
///
/// # Errors
///
/// * `400 Bad Request` - Neither parameter given, or `id` not an integer
/// * `404 Not Found` - No such user
pub async fn get_user(
    State(store): State<Arc<dyn Store>>,
    Query(query): Query<UserQuery>,
) -> BackendResult<Json<User>> {
    let id = query.id.as_deref().filter(|id| !id.is_empty());
    let email = query.email.as_deref().filter(|email| !email.is_empty());
    let user = match (id, email) {
        (Some(id), _) => store.get_user_by_id(parse_id("id", Some(id))?).await?,
        (None, Some(email)) => store.get_user_by_email(&validated_email(email)?).await?,
        (None, None) => {
            return Err(BackendError::bad_request(
                "email or id query parameter required",
            ))
        }
    };

    user.map(Json)
        .ok_or_else(|| BackendError::not_found("user not found"))
}

/// Create a user
///
/// # Errors
///
/// * `400 Bad Request` - Empty name or malformed email
/// * `409 Conflict` - The email is already registered
pub async fn create_user(
    State(store): State<Arc<dyn Store>>,
    Json(request): Json<CreateUserRequest>,
) -> BackendResult<(StatusCode, Json<User>)> {
    let email = validated_email(&request.email)?;
    let name = request.name.trim();
    if name.is_empty() {
        return Err(BackendError::bad_request("name cannot be empty"));
    }

    let user = store.create_user(name, &email).await?;
    tracing::info!("[Server] Created user {} ({})", user.id, user.email);
    Ok((StatusCode::CREATED, Json(user)))
}

use axum::{
    extract::{Path, Query, State},
    routing::get,
    Json, Router,
};
use tracing::{instrument, warn};
use uuid::Uuid;

use super::{
    dto::{ContactInput, ContactUpdate, Pagination, SearchQuery},
    repo_types::Contact,
    services,
};
use crate::{
    api::{ApiError, MessageResponse},
    auth::extractors::AuthUser,
    state::AppState,
};

pub fn contact_routes() -> Router<AppState> {
    Router::new()
        .route("/contacts", get(list_contacts).post(create_contact))
        .route("/contacts/", get(list_contacts).post(create_contact))
        .route("/contacts/search", get(search_contacts))
        .route("/contacts/search/", get(search_contacts))
        .route("/contacts/birthdays", get(upcoming_birthdays))
        .route("/contacts/birthdays/", get(upcoming_birthdays))
        .route(
            "/contacts/:id",
            get(get_contact).put(update_contact).delete(delete_contact),
        )
}

#[instrument(skip(state, body))]
pub async fn create_contact(
    State(state): State<AppState>,
    AuthUser(email): AuthUser,
    Json(body): Json<ContactInput>,
) -> Result<Json<Contact>, ApiError> {
    body.validate().map_err(|msg| {
        warn!(error = %msg, "invalid contact");
        ApiError::UnprocessableEntity(msg)
    })?;
    let contact = services::create(&state, &email, &body).await?;
    Ok(Json(contact))
}

#[instrument(skip(state))]
pub async fn list_contacts(
    State(state): State<AppState>,
    AuthUser(email): AuthUser,
    Query(p): Query<Pagination>,
) -> Result<Json<Vec<Contact>>, ApiError> {
    let (skip, limit) = p.clamped();
    let contacts = services::list(&state, &email, skip, limit).await?;
    Ok(Json(contacts))
}

#[instrument(skip(state))]
pub async fn get_contact(
    State(state): State<AppState>,
    AuthUser(email): AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Json<Contact>, ApiError> {
    let contact = services::get(&state, &email, id).await?;
    Ok(Json(contact))
}

#[instrument(skip(state, body))]
pub async fn update_contact(
    State(state): State<AppState>,
    AuthUser(email): AuthUser,
    Path(id): Path<Uuid>,
    Json(body): Json<ContactUpdate>,
) -> Result<Json<Contact>, ApiError> {
    body.validate().map_err(|msg| {
        warn!(error = %msg, "invalid contact update");
        ApiError::UnprocessableEntity(msg)
    })?;
    let contact = services::update(&state, &email, id, &body).await?;
    Ok(Json(contact))
}

#[instrument(skip(state))]
pub async fn delete_contact(
    State(state): State<AppState>,
    AuthUser(email): AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Json<MessageResponse>, ApiError> {
    services::delete(&state, &email, id).await?;
    Ok(MessageResponse::new("Contact deleted successfully"))
}

#[instrument(skip(state))]
pub async fn search_contacts(
    State(state): State<AppState>,
    AuthUser(email): AuthUser,
    Query(q): Query<SearchQuery>,
) -> Result<Json<Vec<Contact>>, ApiError> {
    let contacts = services::search(&state, &email, &q.query).await?;
    Ok(Json(contacts))
}

#[instrument(skip(state))]
pub async fn upcoming_birthdays(
    State(state): State<AppState>,
    AuthUser(email): AuthUser,
) -> Result<Json<Vec<Contact>>, ApiError> {
    let contacts = services::upcoming_birthdays(&state, &email, services::today_utc()).await?;
    Ok(Json(contacts))
}

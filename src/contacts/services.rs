use time::{Date, OffsetDateTime};
use tracing::{info, warn};
use uuid::Uuid;

use super::{
    birthdays,
    dto::{ContactInput, ContactUpdate},
    errors::ContactError,
    repo_types::Contact,
};
use crate::state::AppState;

pub async fn create(
    state: &AppState,
    owner_email: &str,
    input: &ContactInput,
) -> Result<Contact, ContactError> {
    let contact = state
        .contacts
        .create(owner_email, input)
        .await?
        .ok_or_else(|| {
            warn!(owner = %owner_email, "contact owner does not exist");
            ContactError::OwnerNotFound
        })?;
    info!(contact_id = %contact.id, "contact created");
    Ok(contact)
}

pub async fn list(
    state: &AppState,
    owner_email: &str,
    skip: i64,
    limit: i64,
) -> Result<Vec<Contact>, ContactError> {
    Ok(state.contacts.list(owner_email, skip, limit).await?)
}

pub async fn get(state: &AppState, owner_email: &str, id: Uuid) -> Result<Contact, ContactError> {
    state
        .contacts
        .get(owner_email, id)
        .await?
        .ok_or(ContactError::NotFound)
}

pub async fn update(
    state: &AppState,
    owner_email: &str,
    id: Uuid,
    changes: &ContactUpdate,
) -> Result<Contact, ContactError> {
    let contact = state
        .contacts
        .update(owner_email, id, changes)
        .await?
        .ok_or(ContactError::NotFound)?;
    info!(contact_id = %contact.id, "contact updated");
    Ok(contact)
}

pub async fn delete(state: &AppState, owner_email: &str, id: Uuid) -> Result<(), ContactError> {
    if !state.contacts.delete(owner_email, id).await? {
        return Err(ContactError::NotFound);
    }
    info!(contact_id = %id, "contact deleted");
    Ok(())
}

pub async fn search(
    state: &AppState,
    owner_email: &str,
    query: &str,
) -> Result<Vec<Contact>, ContactError> {
    Ok(state.contacts.search(owner_email, query).await?)
}

pub async fn upcoming_birthdays(
    state: &AppState,
    owner_email: &str,
    today: Date,
) -> Result<Vec<Contact>, ContactError> {
    let all = state.contacts.list_all(owner_email).await?;
    Ok(birthdays::upcoming(all, today))
}

pub fn today_utc() -> Date {
    OffsetDateTime::now_utc().date()
}

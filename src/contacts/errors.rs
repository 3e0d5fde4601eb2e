use thiserror::Error;

use crate::db::RepoError;

#[derive(Debug, Error)]
pub enum ContactError {
    /// Missing and owned-by-someone-else are deliberately the same error.
    #[error("Contact not found")]
    NotFound,
    #[error("User not found")]
    OwnerNotFound,
    #[error(transparent)]
    Repo(#[from] RepoError),
}

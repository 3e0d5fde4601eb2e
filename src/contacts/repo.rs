use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use super::{
    dto::{ContactInput, ContactUpdate},
    repo_types::Contact,
};
use crate::db::RepoError;

/// Contact storage. Every method is scoped to the owner's email; there is no
/// way to reach a contact by id alone.
#[async_trait]
pub trait ContactRepository: Send + Sync {
    /// `None` when the owner does not exist.
    async fn create(
        &self,
        owner_email: &str,
        input: &ContactInput,
    ) -> Result<Option<Contact>, RepoError>;

    /// Oldest first.
    async fn list(
        &self,
        owner_email: &str,
        skip: i64,
        limit: i64,
    ) -> Result<Vec<Contact>, RepoError>;

    async fn list_all(&self, owner_email: &str) -> Result<Vec<Contact>, RepoError>;

    async fn get(&self, owner_email: &str, id: Uuid) -> Result<Option<Contact>, RepoError>;

    async fn update(
        &self,
        owner_email: &str,
        id: Uuid,
        changes: &ContactUpdate,
    ) -> Result<Option<Contact>, RepoError>;

    /// `false` when nothing matched.
    async fn delete(&self, owner_email: &str, id: Uuid) -> Result<bool, RepoError>;

    /// Case-insensitive substring match on first name, last name or email.
    async fn search(&self, owner_email: &str, query: &str) -> Result<Vec<Contact>, RepoError>;
}

const CONTACT_COLUMNS: &str = "contacts.id, contacts.user_id, contacts.first_name, \
    contacts.last_name, contacts.email, contacts.phone, contacts.birthday, \
    contacts.additional_info";

/// Escapes LIKE wildcards so the query matches literally.
pub fn like_pattern(query: &str) -> String {
    let mut escaped = String::with_capacity(query.len() + 2);
    escaped.push('%');
    for ch in query.chars() {
        if matches!(ch, '\\' | '%' | '_') {
            escaped.push('\\');
        }
        escaped.push(ch);
    }
    escaped.push('%');
    escaped
}

#[derive(Clone)]
pub struct PgContactRepository {
    db: PgPool,
}

impl PgContactRepository {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }
}

#[async_trait]
impl ContactRepository for PgContactRepository {
    async fn create(
        &self,
        owner_email: &str,
        input: &ContactInput,
    ) -> Result<Option<Contact>, RepoError> {
        let sql = format!(
            r#"
            INSERT INTO contacts (id, user_id, first_name, last_name, email, phone, birthday, additional_info)
            SELECT $1, users.id, $3, $4, $5, $6, $7, $8
              FROM users
             WHERE users.email = $2
            RETURNING {CONTACT_COLUMNS}
            "#
        );
        let contact = sqlx::query_as::<_, Contact>(&sql)
            .bind(Uuid::new_v4())
            .bind(owner_email)
            .bind(&input.first_name)
            .bind(&input.last_name)
            .bind(&input.email)
            .bind(&input.phone)
            .bind(input.birthday)
            .bind(&input.additional_info)
            .fetch_optional(&self.db)
            .await?;
        Ok(contact)
    }

    async fn list(
        &self,
        owner_email: &str,
        skip: i64,
        limit: i64,
    ) -> Result<Vec<Contact>, RepoError> {
        let sql = format!(
            r#"
            SELECT {CONTACT_COLUMNS}
              FROM contacts
              JOIN users ON users.id = contacts.user_id
             WHERE users.email = $1
             ORDER BY contacts.created_at, contacts.id
             LIMIT $2 OFFSET $3
            "#
        );
        let rows = sqlx::query_as::<_, Contact>(&sql)
            .bind(owner_email)
            .bind(limit)
            .bind(skip)
            .fetch_all(&self.db)
            .await?;
        Ok(rows)
    }

    async fn list_all(&self, owner_email: &str) -> Result<Vec<Contact>, RepoError> {
        let sql = format!(
            r#"
            SELECT {CONTACT_COLUMNS}
              FROM contacts
              JOIN users ON users.id = contacts.user_id
             WHERE users.email = $1
             ORDER BY contacts.created_at, contacts.id
            "#
        );
        let rows = sqlx::query_as::<_, Contact>(&sql)
            .bind(owner_email)
            .fetch_all(&self.db)
            .await?;
        Ok(rows)
    }

    async fn get(&self, owner_email: &str, id: Uuid) -> Result<Option<Contact>, RepoError> {
        let sql = format!(
            r#"
            SELECT {CONTACT_COLUMNS}
              FROM contacts
              JOIN users ON users.id = contacts.user_id
             WHERE contacts.id = $1 AND users.email = $2
            "#
        );
        let row = sqlx::query_as::<_, Contact>(&sql)
            .bind(id)
            .bind(owner_email)
            .fetch_optional(&self.db)
            .await?;
        Ok(row)
    }

    async fn update(
        &self,
        owner_email: &str,
        id: Uuid,
        changes: &ContactUpdate,
    ) -> Result<Option<Contact>, RepoError> {
        // COALESCE keeps the stored value for every field absent from the update.
        let sql = format!(
            r#"
            UPDATE contacts
               SET first_name      = COALESCE($3, contacts.first_name),
                   last_name       = COALESCE($4, contacts.last_name),
                   email           = COALESCE($5, contacts.email),
                   phone           = COALESCE($6, contacts.phone),
                   birthday        = COALESCE($7, contacts.birthday),
                   additional_info = CASE WHEN $8 THEN $9 ELSE contacts.additional_info END
              FROM users
             WHERE contacts.id = $1
               AND contacts.user_id = users.id
               AND users.email = $2
            RETURNING {CONTACT_COLUMNS}
            "#
        );
        let row = sqlx::query_as::<_, Contact>(&sql)
            .bind(id)
            .bind(owner_email)
            .bind(&changes.first_name)
            .bind(&changes.last_name)
            .bind(&changes.email)
            .bind(&changes.phone)
            .bind(changes.birthday)
            .bind(changes.additional_info.is_some())
            .bind(changes.additional_info.clone().flatten())
            .fetch_optional(&self.db)
            .await?;
        Ok(row)
    }

    async fn delete(&self, owner_email: &str, id: Uuid) -> Result<bool, RepoError> {
        let res = sqlx::query(
            r#"
            DELETE FROM contacts
             USING users
             WHERE contacts.id = $1
               AND contacts.user_id = users.id
               AND users.email = $2
            "#,
        )
        .bind(id)
        .bind(owner_email)
        .execute(&self.db)
        .await?;
        Ok(res.rows_affected() > 0)
    }

    async fn search(&self, owner_email: &str, query: &str) -> Result<Vec<Contact>, RepoError> {
        let sql = format!(
            r#"
            SELECT {CONTACT_COLUMNS}
              FROM contacts
              JOIN users ON users.id = contacts.user_id
             WHERE users.email = $1
               AND (contacts.first_name ILIKE $2 ESCAPE '\'
                    OR contacts.last_name ILIKE $2 ESCAPE '\'
                    OR contacts.email ILIKE $2 ESCAPE '\')
             ORDER BY contacts.created_at, contacts.id
            "#
        );
        let rows = sqlx::query_as::<_, Contact>(&sql)
            .bind(owner_email)
            .bind(like_pattern(query))
            .fetch_all(&self.db)
            .await?;
        Ok(rows)
    }
}

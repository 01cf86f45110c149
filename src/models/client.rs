use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A client of the provider's business
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Client {
    pub id: String,
    pub user_id: String,
    pub first_name: String,
    pub last_name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub notes: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

// Manual FromRow: the sqlx `Any` driver refuses the checked
// `Option<String>` decode of NULL columns, so the nullable fields are read
// with `try_get_unchecked`.
impl<'r> sqlx::FromRow<'r, sqlx::any::AnyRow> for Client {
    fn from_row(row: &'r sqlx::any::AnyRow) -> Result<Self, sqlx::Error> {
        use sqlx::Row;
        Ok(Self {
            id: row.try_get("id")?,
            user_id: row.try_get("user_id")?,
            first_name: row.try_get("first_name")?,
            last_name: row.try_get_unchecked("last_name")?,
            email: row.try_get_unchecked("email")?,
            phone: row.try_get_unchecked("phone")?,
            notes: row.try_get_unchecked("notes")?,
            created_at: row.try_get("created_at")?,
            updated_at: row.try_get("updated_at")?,
        })
    }
}

impl Client {
    pub fn new(
        user_id: String,
        first_name: String,
        last_name: Option<String>,
        email: Option<String>,
        phone: Option<String>,
        notes: Option<String>,
    ) -> Self {
        let now = chrono::Utc::now().to_rfc3339();
        Self {
            id: Uuid::new_v4().to_string(),
            user_id,
            first_name,
            last_name,
            email,
            phone,
            notes,
            created_at: now.clone(),
            updated_at: now,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct CreateClientRequest {
    pub first_name: String,
    pub last_name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub notes: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateClientRequest {
    pub first_name: Option<String>,
    pub last_name: Option<Option<String>>,
    pub email: Option<Option<String>>,
    pub phone: Option<Option<String>>,
    pub notes: Option<Option<String>>,
}

#[derive(Debug, Serialize)]
pub struct ClientListResponse {
    pub clients: Vec<Client>,
    pub count: i64,
}

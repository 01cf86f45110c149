use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A bookable service in the provider's catalogue. Supplies the default
/// duration and price for appointments that reference it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServiceOffering {
    pub id: String,
    pub user_id: String,
    pub title: String,
    pub description: Option<String>,
    pub duration_minutes: i64,
    pub price: f64,
    pub active: bool,
    pub created_at: String,
    pub updated_at: String,
}

// Manual FromRow: the sqlx `Any` driver stores booleans as SQLite INTEGER
// and refuses to decode them straight into `bool`, so `active` is read as
// an integer and normalized here.
impl<'r> sqlx::FromRow<'r, sqlx::any::AnyRow> for ServiceOffering {
    fn from_row(row: &'r sqlx::any::AnyRow) -> Result<Self, sqlx::Error> {
        use sqlx::Row;
        Ok(Self {
            id: row.try_get("id")?,
            user_id: row.try_get("user_id")?,
            title: row.try_get("title")?,
            // `try_get_unchecked`: the `Any` driver refuses the checked
            // `Option<String>` decode of a NULL column.
            description: row.try_get_unchecked("description")?,
            duration_minutes: row.try_get("duration_minutes")?,
            price: row.try_get("price")?,
            active: row.try_get::<i64, _>("active")? != 0,
            created_at: row.try_get("created_at")?,
            updated_at: row.try_get("updated_at")?,
        })
    }
}

impl ServiceOffering {
    pub fn new(
        user_id: String,
        title: String,
        description: Option<String>,
        duration_minutes: i64,
        price: f64,
    ) -> Self {
        let now = chrono::Utc::now().to_rfc3339();
        Self {
            id: Uuid::new_v4().to_string(),
            user_id,
            title,
            description,
            duration_minutes,
            price,
            active: true,
            created_at: now.clone(),
            updated_at: now,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct CreateServiceRequest {
    pub title: String,
    pub description: Option<String>,
    pub duration_minutes: i64,
    pub price: f64,
}

#[derive(Debug, Deserialize)]
pub struct UpdateServiceRequest {
    pub title: Option<String>,
    pub description: Option<Option<String>>,
    pub duration_minutes: Option<i64>,
    pub price: Option<f64>,
    pub active: Option<bool>,
}

#[derive(Debug, Serialize)]
pub struct ServiceListResponse {
    pub services: Vec<ServiceOffering>,
    pub count: i64,
}

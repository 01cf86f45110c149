use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A provider account. Every schedule, appointment, client and service
/// offering in the system is owned by exactly one provider.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: String,
    pub email: String,
    pub display_name: String,
    /// IANA timezone the provider's working hours are expressed in
    pub timezone: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub created_at: String,
    pub updated_at: String,
}

impl User {
    pub fn new(email: String, display_name: String, timezone: String, password_hash: String) -> Self {
        let now = chrono::Utc::now().to_rfc3339();
        Self {
            id: Uuid::new_v4().to_string(),
            email,
            display_name,
            timezone,
            password_hash,
            created_at: now.clone(),
            updated_at: now,
        }
    }
}

/// Provider details returned by the API (never includes the password hash)
#[derive(Debug, Serialize)]
pub struct ProviderResponse {
    pub id: String,
    pub email: String,
    pub display_name: String,
    pub timezone: String,
    pub created_at: String,
}

impl From<&User> for ProviderResponse {
    fn from(user: &User) -> Self {
        Self {
            id: user.id.clone(),
            email: user.email.clone(),
            display_name: user.display_name.clone(),
            timezone: user.timezone.clone(),
            created_at: user.created_at.clone(),
        }
    }
}

use crate::api::middleware::error::ApiResult;
use crate::database::Database;
use crate::models::Client;

impl Database {
    pub async fn create_client(&self, client: &Client) -> ApiResult<()> {
        sqlx::query(
            "INSERT INTO clients (id, user_id, first_name, last_name, email, phone, notes, created_at, updated_at)
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(&client.id)
        .bind(&client.user_id)
        .bind(&client.first_name)
        .bind(&client.last_name)
        .bind(&client.email)
        .bind(&client.phone)
        .bind(&client.notes)
        .bind(&client.created_at)
        .bind(&client.updated_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    pub async fn get_client(&self, user_id: &str, id: &str) -> ApiResult<Option<Client>> {
        let client = sqlx::query_as::<_, Client>(
            "SELECT id, user_id, first_name, last_name, email, phone, notes, created_at, updated_at
             FROM clients
             WHERE user_id = ? AND id = ?",
        )
        .bind(user_id)
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(client)
    }

    pub async fn list_clients(&self, user_id: &str) -> ApiResult<Vec<Client>> {
        let clients = sqlx::query_as::<_, Client>(
            "SELECT id, user_id, first_name, last_name, email, phone, notes, created_at, updated_at
             FROM clients
             WHERE user_id = ?
             ORDER BY first_name ASC, created_at ASC",
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(clients)
    }

    pub async fn update_client(&self, client: &Client) -> ApiResult<()> {
        sqlx::query(
            "UPDATE clients SET first_name = ?, last_name = ?, email = ?, phone = ?, notes = ?, updated_at = ?
             WHERE user_id = ? AND id = ?",
        )
        .bind(&client.first_name)
        .bind(&client.last_name)
        .bind(&client.email)
        .bind(&client.phone)
        .bind(&client.notes)
        .bind(&client.updated_at)
        .bind(&client.user_id)
        .bind(&client.id)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    pub async fn delete_client(&self, user_id: &str, id: &str) -> ApiResult<()> {
        sqlx::query("DELETE FROM clients WHERE user_id = ? AND id = ?")
            .bind(user_id)
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(())
    }
}

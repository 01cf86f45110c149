use crate::api::middleware::error::ApiResult;
use crate::database::Database;
use crate::models::ServiceOffering;

impl Database {
    pub async fn create_service_offering(&self, service: &ServiceOffering) -> ApiResult<()> {
        sqlx::query(
            "INSERT INTO service_offerings (id, user_id, title, description, duration_minutes, price, active, created_at, updated_at)
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(&service.id)
        .bind(&service.user_id)
        .bind(&service.title)
        .bind(&service.description)
        .bind(service.duration_minutes)
        .bind(service.price)
        .bind(service.active)
        .bind(&service.created_at)
        .bind(&service.updated_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    pub async fn get_service_offering(
        &self,
        user_id: &str,
        id: &str,
    ) -> ApiResult<Option<ServiceOffering>> {
        let service = sqlx::query_as::<_, ServiceOffering>(
            "SELECT id, user_id, title, description, duration_minutes, price, active, created_at, updated_at
             FROM service_offerings
             WHERE user_id = ? AND id = ?",
        )
        .bind(user_id)
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(service)
    }

    pub async fn list_service_offerings(&self, user_id: &str) -> ApiResult<Vec<ServiceOffering>> {
        let services = sqlx::query_as::<_, ServiceOffering>(
            "SELECT id, user_id, title, description, duration_minutes, price, active, created_at, updated_at
             FROM service_offerings
             WHERE user_id = ?
             ORDER BY title ASC",
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(services)
    }

    pub async fn update_service_offering(&self, service: &ServiceOffering) -> ApiResult<()> {
        sqlx::query(
            "UPDATE service_offerings SET title = ?, description = ?, duration_minutes = ?, price = ?, active = ?, updated_at = ?
             WHERE user_id = ? AND id = ?",
        )
        .bind(&service.title)
        .bind(&service.description)
        .bind(service.duration_minutes)
        .bind(service.price)
        .bind(service.active)
        .bind(&service.updated_at)
        .bind(&service.user_id)
        .bind(&service.id)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    pub async fn delete_service_offering(&self, user_id: &str, id: &str) -> ApiResult<()> {
        sqlx::query("DELETE FROM service_offerings WHERE user_id = ? AND id = ?")
            .bind(user_id)
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(())
    }
}

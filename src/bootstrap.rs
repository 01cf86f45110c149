use std::sync::Arc;

use crate::api::middleware::auth::AppState;
use crate::api::middleware::error::ApiResult;
use crate::config::Config;
use crate::database::Database;
use crate::events::EventBus;
use crate::models::{User, WeeklySchedule};
use crate::services::auth;
use crate::services::{AvailabilityService, BookingLedger, BookingService, SlotService};

/// Seed the owner account and a default Monday-Friday 09:00-17:00
/// schedule on first startup. Later startups are no-ops.
pub async fn initialize_owner(db: &Database, config: &Config) -> ApiResult<()> {
    let email = auth::validate_and_normalize_email(&config.owner_email)?;

    if db.get_user_by_email(&email).await?.is_some() {
        tracing::info!("Owner account already exists");
        return Ok(());
    }

    auth::validate_password_complexity(&config.owner_password)?;
    let password_hash = auth::hash_password(&config.owner_password)?;

    let owner = User::new(
        email.clone(),
        "Owner".to_string(),
        config.default_timezone.clone(),
        password_hash,
    );
    db.create_user(&owner).await?;

    for weekday in 0..7i64 {
        let working = weekday < 5;
        let day = WeeklySchedule::new(
            owner.id.clone(),
            weekday,
            working,
            "09:00".to_string(),
            "17:00".to_string(),
            None,
            None,
        );
        db.replace_day_schedule(&day).await?;
    }

    tracing::info!(email = %email, "Owner account created with default schedule");
    Ok(())
}

/// Wire the repositories, engine services and event bus into the shared
/// application state.
pub fn build_app_state(db: Database, config: &Config) -> AppState {
    let db = Arc::new(db);
    let event_bus = EventBus::default();

    let availability_service = AvailabilityService::new(db.clone());
    let ledger = BookingLedger::new(db.clone());
    let slot_service = SlotService::new(availability_service.clone(), ledger.clone());
    let booking_service = BookingService::new(
        db.clone(),
        availability_service.clone(),
        ledger,
        event_bus.clone(),
    );

    AppState {
        db,
        session_duration_hours: config.session_duration_hours,
        event_bus,
        availability_service,
        slot_service,
        booking_service,
    }
}

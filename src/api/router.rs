use axum::{
    routing::{delete, get, post, put},
    Router,
};
use tower_http::{cors::CorsLayer, limit::RequestBodyLimitLayer, trace::TraceLayer};

use crate::api;
use crate::api::middleware::{require_auth, AppState};

pub fn build_router(state: AppState) -> Router {
    // Everything except login and the health probe sits behind the
    // bearer-session middleware
    let protected = Router::new()
        .route("/api/auth/logout", post(api::auth::logout))
        .route("/api/auth/me", get(api::auth::me))
        // Availability
        .route("/api/availability", get(api::availability::get_availability))
        // Appointments
        .route(
            "/api/appointments",
            get(api::appointments::list_appointments)
                .post(api::appointments::create_appointment),
        )
        .route(
            "/api/appointments/recurring",
            post(api::appointments::create_recurring_appointments),
        )
        .route(
            "/api/appointments/:id",
            get(api::appointments::get_appointment)
                .put(api::appointments::reschedule_appointment)
                .delete(api::appointments::delete_appointment),
        )
        .route(
            "/api/appointments/:id/status",
            put(api::appointments::update_appointment_status),
        )
        // Weekly working hours
        .route(
            "/api/schedule",
            get(api::schedule::get_weekly_schedule).put(api::schedule::replace_weekly_schedule),
        )
        .route(
            "/api/schedule/:weekday",
            put(api::schedule::replace_day_schedule),
        )
        // Full-day exceptions
        .route(
            "/api/schedule/days-off",
            get(api::schedule::list_non_working_days).post(api::schedule::create_non_working_day),
        )
        .route(
            "/api/schedule/days-off/:id",
            delete(api::schedule::delete_non_working_day),
        )
        // Service catalogue
        .route(
            "/api/services",
            get(api::service_offerings::list_services).post(api::service_offerings::create_service),
        )
        .route(
            "/api/services/:id",
            get(api::service_offerings::get_service)
                .put(api::service_offerings::update_service)
                .delete(api::service_offerings::delete_service),
        )
        // Client directory
        .route(
            "/api/clients",
            get(api::clients::list_clients).post(api::clients::create_client),
        )
        .route(
            "/api/clients/:id",
            get(api::clients::get_client)
                .put(api::clients::update_client)
                .delete(api::clients::delete_client),
        )
        .layer(axum::middleware::from_fn_with_state(
            state.clone(),
            require_auth,
        ));

    Router::new()
        .route("/", get(root_handler))
        .route("/health", get(health_handler))
        .route("/api/auth/login", post(api::auth::login))
        .merge(protected)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .layer(RequestBodyLimitLayer::new(1024 * 1024))
        .with_state(state)
}

async fn root_handler() -> &'static str {
    "Oxibook Appointment Scheduling"
}

async fn health_handler() -> &'static str {
    "OK"
}

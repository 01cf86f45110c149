use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::services::calendar::{self, TimeInterval};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AppointmentStatus {
    Confirmed,
    InProcess,
    Cancelled,
}

impl AppointmentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            AppointmentStatus::Confirmed => "confirmed",
            AppointmentStatus::InProcess => "in_process",
            AppointmentStatus::Cancelled => "cancelled",
        }
    }

    /// Whether the appointment occupies its time range for conflict
    /// purposes. Only cancelled appointments release their slot.
    pub fn is_busy(&self) -> bool {
        !matches!(self, AppointmentStatus::Cancelled)
    }

    /// Confirmed and in-process swap freely and either may cancel;
    /// cancelled is terminal
    pub fn can_transition_to(&self, _target: AppointmentStatus) -> bool {
        !matches!(self, AppointmentStatus::Cancelled)
    }
}

impl std::fmt::Display for AppointmentStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for AppointmentStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "confirmed" => Ok(AppointmentStatus::Confirmed),
            "in_process" => Ok(AppointmentStatus::InProcess),
            "cancelled" => Ok(AppointmentStatus::Cancelled),
            _ => Err(format!("Invalid appointment status: {}", s)),
        }
    }
}

/// A booked appointment. Datetimes are stored as RFC 3339 UTC strings in
/// a fixed second-precision shape so string order matches time order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Appointment {
    pub id: String,
    pub user_id: String,
    pub client_id: Option<String>,
    pub service_id: Option<String>,
    pub start_datetime: String,
    pub end_datetime: String,
    pub status: AppointmentStatus,
    pub price_charged: f64,
    pub created_at: String,
    pub updated_at: String,
}

impl Appointment {
    pub fn new(
        user_id: String,
        client_id: Option<String>,
        service_id: Option<String>,
        interval: &TimeInterval,
        price_charged: f64,
    ) -> Self {
        let now = chrono::Utc::now().to_rfc3339();
        Self {
            id: Uuid::new_v4().to_string(),
            user_id,
            client_id,
            service_id,
            start_datetime: calendar::to_storage(&interval.start),
            end_datetime: calendar::to_storage(&interval.end),
            status: AppointmentStatus::Confirmed,
            price_charged,
            created_at: now.clone(),
            updated_at: now,
        }
    }

    /// The occupied time range, parsed back from storage form
    pub fn interval(&self) -> Result<TimeInterval, crate::domain::errors::SchedulingError> {
        let start = calendar::parse_datetime(&self.start_datetime)?;
        let end = calendar::parse_datetime(&self.end_datetime)?;
        TimeInterval::new(start, end)
    }
}

#[derive(Debug, Deserialize)]
pub struct CreateAppointmentRequest {
    pub client_id: Option<String>,
    pub service_id: Option<String>,
    pub start: String, // ISO 8601, UTC
    /// Defaults to start plus the service offering's duration
    pub end: Option<String>,
    /// Defaults to the service offering's price (0.0 without a service)
    pub price: Option<f64>,
}

#[derive(Debug, Deserialize)]
pub struct RescheduleAppointmentRequest {
    pub start: String, // ISO 8601, UTC
    pub end: String,   // ISO 8601, UTC
}

#[derive(Debug, Deserialize)]
pub struct UpdateAppointmentStatusRequest {
    pub status: AppointmentStatus,
}

#[derive(Debug, Deserialize)]
pub struct RecurringAppointmentRequest {
    pub client_id: Option<String>,
    pub service_id: Option<String>,
    pub start: String, // first occurrence, ISO 8601 UTC
    pub end: String,
    /// Weekdays the series repeats on, 0 = Monday .. 6 = Sunday
    pub weekdays: Vec<u8>,
    pub until: String, // "YYYY-MM-DD", inclusive
    pub price: Option<f64>,
}

#[derive(Debug, Serialize)]
pub struct AppointmentListResponse {
    pub appointments: Vec<Appointment>,
    pub count: i64,
}

#[derive(Debug, Serialize)]
pub struct RecurringSeriesResponse {
    pub appointments: Vec<Appointment>,
    pub count: i64,
}

use chrono::{NaiveDate, NaiveTime};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::OnceLock;
use uuid::Uuid;

/// Working hours for one day of the week, owned by a provider.
/// Weekdays are numbered 0 = Monday through 6 = Sunday.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WeeklySchedule {
    pub id: String,
    pub user_id: String,
    pub weekday: i64,
    pub is_working_day: bool,
    pub start_time: String, // "HH:MM"
    pub end_time: String,   // "HH:MM"
    pub break_start: Option<String>,
    pub break_end: Option<String>,
    pub updated_at: String,
}

// Manual FromRow: the sqlx `Any` driver stores booleans as SQLite INTEGER
// and refuses to decode them straight into `bool`, so the flag is read as
// an integer and normalized here.
impl<'r> sqlx::FromRow<'r, sqlx::any::AnyRow> for WeeklySchedule {
    fn from_row(row: &'r sqlx::any::AnyRow) -> Result<Self, sqlx::Error> {
        use sqlx::Row;
        Ok(Self {
            id: row.try_get("id")?,
            user_id: row.try_get("user_id")?,
            weekday: row.try_get("weekday")?,
            is_working_day: row.try_get::<i64, _>("is_working_day")? != 0,
            start_time: row.try_get("start_time")?,
            end_time: row.try_get("end_time")?,
            break_start: opt_text(row, "break_start")?,
            break_end: opt_text(row, "break_end")?,
            updated_at: row.try_get("updated_at")?,
        })
    }
}

// The sqlx `Any` driver (0.7) neither type-checks nor null-short-circuits
// `Option<String>` against a NULL column, so read the raw value and test
// for NULL explicitly before decoding the text.
fn opt_text(row: &sqlx::any::AnyRow, col: &str) -> Result<Option<String>, sqlx::Error> {
    use sqlx::{Row, ValueRef};
    let raw = row.try_get_raw(col)?;
    if raw.is_null() {
        Ok(None)
    } else {
        Ok(Some(row.try_get(col)?))
    }
}

impl WeeklySchedule {
    pub fn new(
        user_id: String,
        weekday: i64,
        is_working_day: bool,
        start_time: String,
        end_time: String,
        break_start: Option<String>,
        break_end: Option<String>,
    ) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            user_id,
            weekday,
            is_working_day,
            start_time,
            end_time,
            break_start,
            break_end,
            updated_at: chrono::Utc::now().to_rfc3339(),
        }
    }
}

/// Full-day exception overriding the weekly schedule for one calendar date
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct NonWorkingDay {
    pub id: String,
    pub user_id: String,
    pub date: String, // "YYYY-MM-DD"
    pub description: String,
    pub created_at: String,
}

impl NonWorkingDay {
    pub fn new(user_id: String, date: String, description: String) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            user_id,
            date,
            description,
            created_at: chrono::Utc::now().to_rfc3339(),
        }
    }
}

/// DTO replacing a single day of the weekly schedule (full replace, no
/// partial merge of the time fields)
#[derive(Debug, Deserialize)]
pub struct UpsertDayScheduleRequest {
    pub is_working_day: bool,
    pub start_time: String,
    pub end_time: String,
    pub break_start: Option<String>,
    pub break_end: Option<String>,
}

impl UpsertDayScheduleRequest {
    /// Validate time-of-day formats and ordering invariants:
    /// start < end, and when a break is given, start <= break_start <
    /// break_end <= end. Break bounds must be given together.
    pub fn validate(&self) -> Result<(), String> {
        if !self.is_working_day {
            return Ok(());
        }

        let start = parse_time_of_day(&self.start_time)?;
        let end = parse_time_of_day(&self.end_time)?;
        if start >= end {
            return Err(format!(
                "start_time {} must be before end_time {}",
                self.start_time, self.end_time
            ));
        }

        match (&self.break_start, &self.break_end) {
            (None, None) => Ok(()),
            (Some(bs), Some(be)) => {
                let break_start = parse_time_of_day(bs)?;
                let break_end = parse_time_of_day(be)?;
                if break_start >= break_end {
                    return Err(format!("break_start {} must be before break_end {}", bs, be));
                }
                if break_start < start || break_end > end {
                    return Err("break window must lie within the working hours".to_string());
                }
                Ok(())
            }
            _ => Err("break_start and break_end must be provided together".to_string()),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct CreateNonWorkingDayRequest {
    pub date: String, // "YYYY-MM-DD"
    pub description: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct WeeklyScheduleResponse {
    pub days: Vec<WeeklySchedule>,
}

#[derive(Debug, Serialize)]
pub struct NonWorkingDayListResponse {
    pub days: Vec<NonWorkingDay>,
    pub count: i64,
}

/// A bookable slot as returned by the availability endpoint
#[derive(Debug, Serialize)]
pub struct SlotResponse {
    pub start: String, // ISO 8601, UTC
    pub end: String,   // ISO 8601, UTC
}

#[derive(Debug, Serialize)]
pub struct AvailabilityResponse {
    pub slots: Vec<SlotResponse>,
    pub count: i64,
}

/// Parse a "HH:MM" time-of-day string (24-hour clock)
pub fn parse_time_of_day(value: &str) -> Result<NaiveTime, String> {
    static TIME_REGEX: OnceLock<Regex> = OnceLock::new();
    let re = TIME_REGEX
        .get_or_init(|| Regex::new(r"^([01]\d|2[0-3]):([0-5]\d)$").expect("Invalid time regex"));

    if !re.is_match(value) {
        return Err(format!("Invalid time of day: {}. Expected HH:MM", value));
    }

    NaiveTime::parse_from_str(value, "%H:%M").map_err(|e| format!("Invalid time {}: {}", value, e))
}

/// Parse a "YYYY-MM-DD" calendar date string
pub fn parse_date(value: &str) -> Result<NaiveDate, String> {
    static DATE_REGEX: OnceLock<Regex> = OnceLock::new();
    let re = DATE_REGEX
        .get_or_init(|| Regex::new(r"^\d{4}-\d{2}-\d{2}$").expect("Invalid date regex"));

    if !re.is_match(value) {
        return Err(format!("Invalid date: {}. Expected YYYY-MM-DD", value));
    }

    NaiveDate::parse_from_str(value, "%Y-%m-%d").map_err(|e| format!("Invalid date {}: {}", value, e))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_time_of_day() {
        assert!(parse_time_of_day("09:00").is_ok());
        assert!(parse_time_of_day("23:59").is_ok());
        assert!(parse_time_of_day("24:00").is_err());
        assert!(parse_time_of_day("9:00").is_err());
        assert!(parse_time_of_day("09:60").is_err());
    }

    #[test]
    fn test_day_schedule_validation() {
        let day = UpsertDayScheduleRequest {
            is_working_day: true,
            start_time: "09:00".to_string(),
            end_time: "17:00".to_string(),
            break_start: Some("13:00".to_string()),
            break_end: Some("14:00".to_string()),
        };
        assert!(day.validate().is_ok());
    }

    #[test]
    fn test_break_outside_working_hours_rejected() {
        let day = UpsertDayScheduleRequest {
            is_working_day: true,
            start_time: "09:00".to_string(),
            end_time: "17:00".to_string(),
            break_start: Some("08:00".to_string()),
            break_end: Some("09:30".to_string()),
        };
        assert!(day.validate().is_err());
    }

    #[test]
    fn test_half_open_break_rejected() {
        let day = UpsertDayScheduleRequest {
            is_working_day: true,
            start_time: "09:00".to_string(),
            end_time: "17:00".to_string(),
            break_start: Some("13:00".to_string()),
            break_end: None,
        };
        assert!(day.validate().is_err());
    }

    #[test]
    fn test_non_working_day_skips_time_checks() {
        let day = UpsertDayScheduleRequest {
            is_working_day: false,
            start_time: String::new(),
            end_time: String::new(),
            break_start: None,
            break_end: None,
        };
        assert!(day.validate().is_ok());
    }
}

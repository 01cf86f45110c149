pub mod middleware;
pub mod router;

pub mod appointments;
pub mod auth;
pub mod availability;
pub mod clients;
pub mod schedule;
pub mod service_offerings;

pub use middleware::*;

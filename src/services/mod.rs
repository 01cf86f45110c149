pub mod auth;
pub mod availability_service;
pub mod booking_service;
pub mod calendar;
pub mod ledger;
pub mod recurrence;
pub mod slot_service;

pub use availability_service::*;
pub use booking_service::*;
pub use ledger::*;
pub use recurrence::*;
pub use slot_service::*;

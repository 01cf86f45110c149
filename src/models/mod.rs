pub mod appointment;
pub mod client;
pub mod schedule;
pub mod service_offering;
pub mod session;
pub mod user;

pub use appointment::*;
pub use client::*;
pub use schedule::*;
pub use service_offering::*;
pub use session::*;
pub use user::*;

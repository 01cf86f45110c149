pub mod appointment_repository;
pub mod schedule_repository;

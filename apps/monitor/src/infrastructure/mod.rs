pub mod database;
pub mod monitoring;
pub mod providers;

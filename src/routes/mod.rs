pub mod auth;
pub mod chat;
pub mod cycles;
pub mod insights;
pub mod interactions;
pub mod partners;
pub mod reminders;
pub mod users;

pub mod dashboard;
pub mod followups;
pub mod hospitals;
pub mod instruments;
pub mod quotes;
pub mod settings;
pub mod users;

pub mod clients;
pub mod persistence;
pub mod store;
pub mod submission;

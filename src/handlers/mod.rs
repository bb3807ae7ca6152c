pub mod addresses;
pub mod booking;
pub mod health;

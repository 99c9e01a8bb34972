pub mod account;
pub mod events;
pub mod health;

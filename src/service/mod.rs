pub mod auth;
pub mod crypto;
pub mod event;
pub mod log;
pub mod mail;
pub mod user;

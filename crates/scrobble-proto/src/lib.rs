pub mod client;
pub mod config;
pub mod platform;
pub mod protocol;

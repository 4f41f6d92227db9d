pub mod config;
pub mod constants;
pub mod conversation;
pub mod executor;
pub mod keys;
pub mod message;
pub mod provider;
pub mod providers;

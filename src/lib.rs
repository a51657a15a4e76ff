pub mod app;
pub mod cli;
pub mod client;
pub mod config;
pub mod error;
pub mod format;
pub mod observability;
pub mod server;

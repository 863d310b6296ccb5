pub mod api;
pub mod auth;
pub mod commands;
pub mod config;
pub mod dashboard;
pub mod error;
pub mod logging;
pub mod models;
pub mod session;
pub mod tui;

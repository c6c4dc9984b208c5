pub mod admin;
pub mod api;
pub mod blueprint;
pub mod config;
pub mod instrumentation;
pub mod island;
pub mod store;

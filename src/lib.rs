pub mod calendar;
pub mod config;
pub mod domain;
pub mod http;
pub mod id;
pub mod log_filter;
pub mod state;
pub mod version;

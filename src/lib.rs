pub mod app;
pub mod calendar;
pub mod catalog;
pub mod config;
pub mod document;
pub mod fetch;
pub mod logger;
pub mod render;
pub mod schedule;

pub use app::{build_router, build_router_with_source};

//! Ugly URL: turns clean URLs into long, cluttered ones that still redirect
//! to the original destination.

pub mod app;
pub mod config;
pub mod errors;
pub mod handlers;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;
pub mod types;
pub mod utils;
pub mod validations;

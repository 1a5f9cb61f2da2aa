// src/lib.rs
pub mod api;
pub mod banner;
pub mod config;
pub mod errors;
pub mod models;
pub mod query;
pub mod transport;
pub mod views;

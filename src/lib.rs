pub mod api;
pub mod clients;
pub mod config;
pub mod error;
pub mod gateway;
pub mod models;

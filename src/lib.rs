pub mod cache;
pub mod client;
pub mod config;
pub mod dto;
pub mod models;
pub mod services;
pub mod state;
pub mod utils;

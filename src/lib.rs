pub mod client;
pub mod config;
pub mod constants;
pub mod controller;
pub mod decoder;
pub mod display;
pub mod error;
pub mod filter;
pub mod models;
pub mod preferences;
pub mod state;

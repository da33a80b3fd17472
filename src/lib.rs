pub mod app;
pub mod config;
pub mod db;
pub mod error;
pub mod models;
pub mod ranking;
pub mod services;

pub mod api;
pub mod backups;
pub mod config;
pub mod error;
pub mod panel;
pub mod schedule;
pub mod service;
pub mod typing;

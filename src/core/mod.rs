//! Configuration, settings and shared data types

pub mod config;
pub mod models;
pub mod resolver;
pub mod settings;

pub mod app;
pub mod auth;
pub mod config;
pub mod dao;
pub mod handlers;
pub mod model;
pub mod schema;

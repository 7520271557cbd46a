pub mod api;
pub mod config;
pub mod controller;
pub mod models;
pub mod view;

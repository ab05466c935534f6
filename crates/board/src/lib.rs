pub mod api;
pub mod app;
pub mod board;
pub mod config;
pub mod form;
pub mod state;
pub mod ui;

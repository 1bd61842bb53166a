pub mod app;
pub mod config;
pub mod error;
pub mod event;
pub mod input;
pub mod logging;
pub mod registry;
pub mod surface;
pub mod tour;
pub mod ui;

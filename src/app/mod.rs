mod console;
mod core;
mod demo;
mod event_bus;
mod event_loop;
mod input_ops;
pub(crate) mod terminal_session;
mod view_ops;

#[cfg(test)]
mod tests;

pub use console::{ConsoleAction, ConsoleElement, ConsoleScreen, Section};
pub use core::{App, TourSource};

mod chrome;
mod console;
mod layout;
mod overlay;

pub use chrome::{StatusLine, draw_status};
pub use console::draw_console;
pub use layout::{CELL_SIZE_UNITS, UiLayout, bounds_to_cells, cells_to_bounds, split_layout};
pub use overlay::{draw_loading_overlay, draw_tour_overlay};

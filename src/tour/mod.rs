mod controller;
pub mod geometry;
mod overlay;
pub mod resolver;
mod state;
mod step;

#[cfg(test)]
mod tests;

pub use controller::TourController;
pub use geometry::{AnchorOrigins, Bounds, HighlightBox, HighlightGeometry, Origin, ViewportSize};
pub use overlay::OverlayRenderer;
pub use resolver::resolve;
pub use state::{OverlayConfig, TourPhase, TourRunState, TourView};
pub use step::{Position, Proceed, Step, StepHook, load_steps, parse_steps};

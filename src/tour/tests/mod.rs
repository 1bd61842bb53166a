mod hooks;
mod registry_driver;

use std::sync::Arc;

use crate::config::TourConfig;
use crate::event::TourEvent;
use crate::surface::MemorySurface;
use crate::tour::{Bounds, TourController, ViewportSize};

fn surface_with(ids: &[&str]) -> Arc<MemorySurface> {
    let surface = Arc::new(MemorySurface::new(ViewportSize::new(1280.0, 720.0)));
    for (row, id) in ids.iter().enumerate() {
        surface.insert_element(*id, id.to_uppercase(), row_bounds(row));
    }
    surface
}

fn row_bounds(row: usize) -> Bounds {
    Bounds::new(40.0 + row as f64 * 60.0, 100.0, 240.0, 40.0)
}

fn controller(surface: &Arc<MemorySurface>) -> TourController<MemorySurface> {
    TourController::new(Arc::clone(surface), TourConfig::default())
}

fn shown(events: &[TourEvent]) -> Vec<usize> {
    events
        .iter()
        .filter_map(|event| match event {
            TourEvent::StepShown { step } => Some(*step),
            _ => None,
        })
        .collect()
}

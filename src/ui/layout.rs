use ratatui::layout::{Constraint, Direction, Layout, Rect};

use crate::tour::Bounds;

/// Surface units per terminal cell (columns, rows). The tour engine works in
/// these units so the highlight inset and padding keep their usual values.
pub const CELL_SIZE_UNITS: (f64, f64) = (10.0, 20.0);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UiLayout {
    pub console: Rect,
    pub status: Rect,
}

pub fn split_layout(area: Rect) -> UiLayout {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(1), Constraint::Length(1)])
        .split(area);

    UiLayout {
        console: chunks[0],
        status: chunks[1],
    }
}

pub(crate) fn centered_rect(area: Rect, width: u16, height: u16) -> Rect {
    let width = width.max(1).min(area.width);
    let height = height.max(1).min(area.height);
    let x = area.x + (area.width.saturating_sub(width)) / 2;
    let y = area.y + (area.height.saturating_sub(height)) / 2;
    Rect::new(x, y, width, height)
}

/// Surface bounds of a cell rectangle given relative to the console origin.
pub fn cells_to_bounds(cells: Rect) -> Bounds {
    let (cell_w, cell_h) = CELL_SIZE_UNITS;
    Bounds::new(
        f64::from(cells.y) * cell_h,
        f64::from(cells.x) * cell_w,
        f64::from(cells.width) * cell_w,
        f64::from(cells.height) * cell_h,
    )
}

/// Smallest cell rectangle covering `bounds`, clipped to `area`.
pub fn bounds_to_cells(bounds: Bounds, area: Rect) -> Option<Rect> {
    if !(bounds.top.is_finite()
        && bounds.left.is_finite()
        && bounds.width.is_finite()
        && bounds.height.is_finite())
    {
        return None;
    }
    let (cell_w, cell_h) = CELL_SIZE_UNITS;
    let clamp_col = |value: f64| value.clamp(0.0, f64::from(area.width)) as u16;
    let clamp_row = |value: f64| value.clamp(0.0, f64::from(area.height)) as u16;

    let left = clamp_col((bounds.left / cell_w).floor());
    let right = clamp_col((bounds.right() / cell_w).ceil());
    let top = clamp_row((bounds.top / cell_h).floor());
    let bottom = clamp_row((bounds.bottom() / cell_h).ceil());
    if right <= left || bottom <= top {
        return None;
    }
    Some(Rect::new(
        area.x + left,
        area.y + top,
        right - left,
        bottom - top,
    ))
}

//! Highlight and popover geometry relative to an on-screen target.
//!
//! All coordinates are viewport-relative and measured in host units (pixels
//! for a browser-like host, cells for the terminal demo).

use crate::config::TourConfig;

use super::step::Position;

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Bounds {
    pub top: f64,
    pub left: f64,
    pub width: f64,
    pub height: f64,
}

impl Bounds {
    pub const fn new(top: f64, left: f64, width: f64, height: f64) -> Self {
        Self {
            top,
            left,
            width,
            height,
        }
    }

    pub fn bottom(&self) -> f64 {
        self.top + self.height
    }

    pub fn right(&self) -> f64 {
        self.left + self.width
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ViewportSize {
    pub width: f64,
    pub height: f64,
}

impl ViewportSize {
    pub const fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }
}

/// Absolute placement of the highlight snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct HighlightBox {
    pub top: f64,
    pub left: f64,
    pub width: f64,
    pub height: f64,
    /// Set when the target runs past the viewport bottom; the snapshot's
    /// content must not grow beyond the target's own height.
    pub content_max_height: Option<f64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Horizontal {
    Left,
    Center,
    Right,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Vertical {
    Top,
    Center,
    Bottom,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Origin {
    pub horizontal: Horizontal,
    pub vertical: Vertical,
}

impl Origin {
    pub const fn new(horizontal: Horizontal, vertical: Vertical) -> Self {
        Self {
            horizontal,
            vertical,
        }
    }

    /// Mirror across the center on both axes.
    pub fn opposite(self) -> Self {
        let horizontal = match self.horizontal {
            Horizontal::Left => Horizontal::Right,
            Horizontal::Center => Horizontal::Center,
            Horizontal::Right => Horizontal::Left,
        };
        let vertical = match self.vertical {
            Vertical::Top => Vertical::Bottom,
            Vertical::Center => Vertical::Center,
            Vertical::Bottom => Vertical::Top,
        };
        Self {
            horizontal,
            vertical,
        }
    }
}

/// Where the popover attaches on the target (`anchor`) and which of its own
/// edges it grows from (`transform`).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AnchorOrigins {
    pub anchor: Origin,
    pub transform: Origin,
}

pub const DEFAULT_ANCHOR: Origin = Origin::new(Horizontal::Right, Vertical::Center);

pub fn anchor_origins(position: Option<Position>) -> AnchorOrigins {
    let anchor = match position {
        Some(Position::Right) => Origin::new(Horizontal::Right, Vertical::Center),
        Some(Position::Left) => Origin::new(Horizontal::Left, Vertical::Center),
        Some(Position::Top) => Origin::new(Horizontal::Center, Vertical::Top),
        Some(Position::Bottom) => Origin::new(Horizontal::Center, Vertical::Bottom),
        None => DEFAULT_ANCHOR,
    };
    AnchorOrigins {
        anchor,
        transform: anchor.opposite(),
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HighlightGeometry {
    pub inset: f64,
    pub padding: f64,
}

impl Default for HighlightGeometry {
    fn default() -> Self {
        Self {
            inset: 5.0,
            padding: 10.0,
        }
    }
}

impl From<&TourConfig> for HighlightGeometry {
    fn from(config: &TourConfig) -> Self {
        Self {
            inset: config.highlight_inset,
            padding: config.highlight_padding,
        }
    }
}

impl HighlightGeometry {
    pub fn compute(&self, rect: Bounds, viewport: ViewportSize) -> HighlightBox {
        let overflows_bottom = viewport.height - (rect.height + rect.top) < 0.0;
        HighlightBox {
            top: rect.top - self.inset,
            left: rect.left - self.inset,
            width: rect.width + self.padding,
            height: rect.height + self.padding,
            content_max_height: overflows_bottom.then_some(rect.height),
        }
    }
}

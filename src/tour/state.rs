use crate::surface::ElementRef;

use super::geometry::{AnchorOrigins, Bounds, HighlightBox};
use super::step::{Position, Step};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TourPhase {
    #[default]
    Idle,
    /// Waiting on a hook's `proceed` or on the target of `step`.
    Loading { step: usize },
    Active { step: usize },
}

#[derive(Debug, Clone, PartialEq)]
pub struct OverlayConfig {
    pub target: Option<ElementRef>,
    pub position: Option<Position>,
    pub title: String,
    pub desc: String,
    pub target_bounds: Bounds,
    pub highlight: HighlightBox,
    pub origins: AnchorOrigins,
}

/// Render-side copy of the run state, free of step hooks.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct TourView {
    pub phase: TourPhase,
    pub current_step_index: usize,
    pub step_count: usize,
    pub overlay: Option<OverlayConfig>,
    pub prev_disabled: bool,
    pub next_disabled: bool,
    pub loading: bool,
    pub visible: bool,
}

impl TourView {
    pub fn is_active(&self) -> bool {
        self.phase != TourPhase::Idle
    }

    pub fn progress_label(&self) -> Option<String> {
        self.is_active()
            .then(|| format!("{} of {}", self.current_step_index, self.step_count))
    }
}

#[derive(Debug, Clone, Default)]
pub struct TourRunState {
    pub(crate) steps: Vec<Step>,
    pub(crate) current_step_index: usize,
    pub(crate) overlay_config: Option<OverlayConfig>,
    pub(crate) prev_disabled: bool,
    pub(crate) next_disabled: bool,
    pub(crate) loading: bool,
    pub(crate) visible: bool,
    pub(crate) phase: TourPhase,
}

impl TourRunState {
    pub fn phase(&self) -> TourPhase {
        self.phase
    }

    pub fn current_step_index(&self) -> usize {
        self.current_step_index
    }

    pub fn step_count(&self) -> usize {
        self.steps.len()
    }

    pub fn step(&self, index: usize) -> Option<&Step> {
        index.checked_sub(1).and_then(|slot| self.steps.get(slot))
    }

    pub fn overlay_config(&self) -> Option<&OverlayConfig> {
        self.overlay_config.as_ref()
    }

    pub fn prev_disabled(&self) -> bool {
        self.prev_disabled
    }

    pub fn next_disabled(&self) -> bool {
        self.next_disabled
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn is_visible(&self) -> bool {
        self.visible
    }

    pub(crate) fn begin(&mut self, steps: Vec<Step>, at_step: usize) {
        self.steps = steps;
        self.overlay_config = None;
        self.set_index(at_step);
    }

    pub(crate) fn set_index(&mut self, index: usize) {
        let count = self.steps.len();
        self.current_step_index = index.clamp(1, count.max(1));
        self.prev_disabled = self.current_step_index == 1;
        self.next_disabled = self.current_step_index == count;
    }

    pub(crate) fn mark_loading(&mut self) {
        self.phase = TourPhase::Loading {
            step: self.current_step_index,
        };
        self.overlay_config = None;
        self.loading = true;
        self.visible = false;
    }

    pub(crate) fn mark_active(&mut self, overlay: OverlayConfig) {
        self.phase = TourPhase::Active {
            step: self.current_step_index,
        };
        self.overlay_config = Some(overlay);
        self.loading = false;
        self.visible = true;
    }

    pub(crate) fn reset(&mut self) {
        *self = Self::default();
    }

    pub fn view(&self) -> TourView {
        TourView {
            phase: self.phase,
            current_step_index: self.current_step_index,
            step_count: self.steps.len(),
            overlay: self.overlay_config.clone(),
            prev_disabled: self.prev_disabled,
            next_disabled: self.next_disabled,
            loading: self.loading,
            visible: self.visible,
        }
    }
}

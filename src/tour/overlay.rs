use crate::surface::{ElementRef, LayerId, LayerKind, NodeId, Surface};

use super::geometry::HighlightBox;

/// Owns the dimming layer, the step container and at most one highlight
/// snapshot inside it.
#[derive(Debug, Default)]
pub struct OverlayRenderer {
    dimmer: Option<LayerId>,
    container: Option<LayerId>,
    highlight: Option<NodeId>,
}

impl OverlayRenderer {
    pub fn is_mounted(&self) -> bool {
        self.dimmer.is_some() || self.container.is_some()
    }

    pub fn highlight(&self) -> Option<NodeId> {
        self.highlight
    }

    /// Attaches whichever layers are missing and locks page scrolling.
    /// Returns `false` when everything was already mounted.
    pub fn mount<S: Surface + ?Sized>(&mut self, surface: &S) -> bool {
        let mut attached = false;
        if self.dimmer.is_none() {
            self.dimmer = Some(surface.attach_layer(LayerKind::Dimmer));
            attached = true;
        }
        if self.container.is_none() {
            self.container = Some(surface.attach_layer(LayerKind::StepContainer));
            attached = true;
        }
        if attached {
            surface.set_scroll_lock(true);
        }
        attached
    }

    pub fn unmount<S: Surface + ?Sized>(&mut self, surface: &S) -> bool {
        if !self.is_mounted() {
            return false;
        }
        self.clear_highlight(surface);
        if let Some(dimmer) = self.dimmer.take() {
            surface.detach_layer(dimmer);
        }
        if let Some(container) = self.container.take() {
            surface.detach_layer(container);
        }
        surface.set_scroll_lock(false);
        true
    }

    /// Replaces the current highlight with a snapshot of `target` placed at
    /// `placement`. Returns `false` if there is no container or the target
    /// cannot be snapshotted.
    pub fn show_highlight<S: Surface + ?Sized>(
        &mut self,
        surface: &S,
        target: ElementRef,
        placement: HighlightBox,
    ) -> bool {
        self.clear_highlight(surface);
        let Some(container) = self.container else {
            return false;
        };
        let Some(snapshot) = surface.snapshot(target) else {
            return false;
        };
        self.highlight = surface.append_snapshot(container, snapshot, placement);
        self.highlight.is_some()
    }

    pub fn clear_highlight<S: Surface + ?Sized>(&mut self, surface: &S) -> bool {
        let Some(node) = self.highlight.take() else {
            return false;
        };
        let Some(container) = self.container else {
            return false;
        };
        // the node may already be gone with an earlier cleanup
        surface.contains_node(container, node) && surface.remove_node(container, node)
    }
}

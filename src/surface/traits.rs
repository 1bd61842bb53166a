use tokio::sync::watch;

use crate::tour::geometry::{Bounds, HighlightBox, ViewportSize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ElementRef(pub u64);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct LayerId(pub u64);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub u64);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LayerKind {
    Dimmer,
    StepContainer,
}

/// Inert, visually identical copy of a target element.
#[derive(Debug, Clone, PartialEq)]
pub struct Snapshot {
    pub source: ElementRef,
    pub label: String,
    pub bounds: Bounds,
}

/// Dropping the subscription disconnects it.
#[derive(Debug)]
pub struct ChangeSubscription {
    rx: watch::Receiver<u64>,
}

impl ChangeSubscription {
    pub fn new(rx: watch::Receiver<u64>) -> Self {
        Self { rx }
    }

    /// Waits for the next structural change. Returns `false` once the host
    /// side is gone and no further change can arrive.
    pub async fn changed(&mut self) -> bool {
        self.rx.changed().await.is_ok()
    }
}

/// Host platform seen by the tour engine.
pub trait Surface: Send + Sync {
    fn query(&self, id: &str) -> Option<ElementRef>;
    fn subscribe_changes(&self) -> ChangeSubscription;
    /// Viewport-relative bounding box of a live element.
    fn bounds(&self, element: ElementRef) -> Option<Bounds>;
    fn viewport(&self) -> ViewportSize;
    fn scroll_to_top(&self);
    fn scroll_into_view(&self, element: ElementRef);
    fn snapshot(&self, element: ElementRef) -> Option<Snapshot>;

    fn attach_layer(&self, kind: LayerKind) -> LayerId;
    fn detach_layer(&self, layer: LayerId) -> bool;
    fn append_snapshot(
        &self,
        layer: LayerId,
        snapshot: Snapshot,
        placement: HighlightBox,
    ) -> Option<NodeId>;
    fn contains_node(&self, layer: LayerId, node: NodeId) -> bool;
    fn remove_node(&self, layer: LayerId, node: NodeId) -> bool;
    fn set_scroll_lock(&self, locked: bool);
}

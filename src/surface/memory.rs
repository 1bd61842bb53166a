use std::collections::{BTreeMap, HashMap};
use std::sync::{Mutex, MutexGuard, PoisonError};

use tokio::sync::watch;

use crate::tour::geometry::{Bounds, HighlightBox, ViewportSize};

use super::traits::{
    ChangeSubscription, ElementRef, LayerId, LayerKind, NodeId, Snapshot, Surface,
};

#[derive(Debug, Clone, PartialEq)]
pub struct ElementView {
    pub handle: ElementRef,
    pub id: String,
    pub label: String,
    /// Viewport-relative bounds.
    pub bounds: Bounds,
}

#[derive(Debug, Clone, PartialEq)]
pub struct HighlightView {
    pub node: NodeId,
    pub snapshot: Snapshot,
    pub placement: HighlightBox,
}

#[derive(Debug, Clone)]
struct ElementNode {
    id: String,
    label: String,
    /// Document coordinates, before scrolling.
    bounds: Bounds,
}

#[derive(Debug)]
struct Layer {
    kind: LayerKind,
    children: Vec<HighlightView>,
}

#[derive(Debug)]
struct Tree {
    elements: BTreeMap<ElementRef, ElementNode>,
    by_id: HashMap<String, ElementRef>,
    layers: BTreeMap<LayerId, Layer>,
    next_handle: u64,
    viewport: ViewportSize,
    scroll_offset: f64,
    scroll_locked: bool,
}

impl Tree {
    fn allocate(&mut self) -> u64 {
        let handle = self.next_handle;
        self.next_handle = self.next_handle.saturating_add(1);
        handle
    }

    fn to_viewport(&self, bounds: Bounds) -> Bounds {
        Bounds {
            top: bounds.top - self.scroll_offset,
            ..bounds
        }
    }
}

/// In-memory interface tree: a `Surface` that hosts can fill with element
/// rectangles and that tests can mutate directly.
#[derive(Debug)]
pub struct MemorySurface {
    tree: Mutex<Tree>,
    changes: watch::Sender<u64>,
}

impl MemorySurface {
    pub fn new(viewport: ViewportSize) -> Self {
        let (changes, _) = watch::channel(0);
        Self {
            tree: Mutex::new(Tree {
                elements: BTreeMap::new(),
                by_id: HashMap::new(),
                layers: BTreeMap::new(),
                next_handle: 1,
                viewport,
                scroll_offset: 0.0,
                scroll_locked: false,
            }),
            changes,
        }
    }

    fn tree(&self) -> MutexGuard<'_, Tree> {
        self.tree.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn notify_structure_changed(&self) {
        self.changes
            .send_modify(|revision| *revision = revision.wrapping_add(1));
    }

    pub fn insert_element(
        &self,
        id: impl Into<String>,
        label: impl Into<String>,
        bounds: Bounds,
    ) -> ElementRef {
        let id = id.into();
        let handle = {
            let mut tree = self.tree();
            if let Some(previous) = tree.by_id.remove(&id) {
                tree.elements.remove(&previous);
            }
            let handle = ElementRef(tree.allocate());
            tree.elements.insert(
                handle,
                ElementNode {
                    id: id.clone(),
                    label: label.into(),
                    bounds,
                },
            );
            tree.by_id.insert(id, handle);
            handle
        };
        self.notify_structure_changed();
        handle
    }

    pub fn remove_element(&self, id: &str) -> bool {
        let removed = {
            let mut tree = self.tree();
            match tree.by_id.remove(id) {
                Some(handle) => tree.elements.remove(&handle).is_some(),
                None => false,
            }
        };
        if removed {
            self.notify_structure_changed();
        }
        removed
    }

    /// Moves an element without changing the tree structure.
    pub fn move_element(&self, id: &str, bounds: Bounds) -> bool {
        let mut tree = self.tree();
        let Some(handle) = tree.by_id.get(id).copied() else {
            return false;
        };
        match tree.elements.get_mut(&handle) {
            Some(node) => {
                node.bounds = bounds;
                true
            }
            None => false,
        }
    }

    /// Removes every element, keeping overlay layers intact.
    pub fn clear_elements(&self) {
        {
            let mut tree = self.tree();
            tree.elements.clear();
            tree.by_id.clear();
        }
        self.notify_structure_changed();
    }

    pub fn set_viewport(&self, viewport: ViewportSize) {
        self.tree().viewport = viewport;
    }

    pub fn elements(&self) -> Vec<ElementView> {
        let tree = self.tree();
        tree.elements
            .iter()
            .map(|(handle, node)| ElementView {
                handle: *handle,
                id: node.id.clone(),
                label: node.label.clone(),
                bounds: tree.to_viewport(node.bounds),
            })
            .collect()
    }

    pub fn highlights(&self) -> Vec<HighlightView> {
        self.tree()
            .layers
            .values()
            .filter(|layer| layer.kind == LayerKind::StepContainer)
            .flat_map(|layer| layer.children.iter().cloned())
            .collect()
    }

    pub fn highlight_count(&self) -> usize {
        self.tree()
            .layers
            .values()
            .map(|layer| layer.children.len())
            .sum()
    }

    pub fn layer_count(&self, kind: LayerKind) -> usize {
        self.tree()
            .layers
            .values()
            .filter(|layer| layer.kind == kind)
            .count()
    }

    pub fn is_scroll_locked(&self) -> bool {
        self.tree().scroll_locked
    }

    pub fn scroll_offset(&self) -> f64 {
        self.tree().scroll_offset
    }

    pub fn set_scroll_offset(&self, offset: f64) {
        self.tree().scroll_offset = offset.max(0.0);
    }

    pub fn observer_count(&self) -> usize {
        self.changes.receiver_count()
    }
}

impl Surface for MemorySurface {
    fn query(&self, id: &str) -> Option<ElementRef> {
        self.tree().by_id.get(id).copied()
    }

    fn subscribe_changes(&self) -> ChangeSubscription {
        ChangeSubscription::new(self.changes.subscribe())
    }

    fn bounds(&self, element: ElementRef) -> Option<Bounds> {
        let tree = self.tree();
        tree.elements
            .get(&element)
            .map(|node| tree.to_viewport(node.bounds))
    }

    fn viewport(&self) -> ViewportSize {
        self.tree().viewport
    }

    fn scroll_to_top(&self) {
        self.tree().scroll_offset = 0.0;
    }

    fn scroll_into_view(&self, element: ElementRef) {
        let mut tree = self.tree();
        let Some(bounds) = tree.elements.get(&element).map(|node| node.bounds) else {
            return;
        };
        let visible_top = tree.scroll_offset;
        let visible_bottom = visible_top + tree.viewport.height;
        if bounds.top < visible_top || bounds.bottom() > visible_bottom {
            tree.scroll_offset = bounds.top.max(0.0);
        }
    }

    fn snapshot(&self, element: ElementRef) -> Option<Snapshot> {
        let tree = self.tree();
        tree.elements.get(&element).map(|node| Snapshot {
            source: element,
            label: node.label.clone(),
            bounds: tree.to_viewport(node.bounds),
        })
    }

    fn attach_layer(&self, kind: LayerKind) -> LayerId {
        let mut tree = self.tree();
        let layer = LayerId(tree.allocate());
        tree.layers.insert(
            layer,
            Layer {
                kind,
                children: Vec::new(),
            },
        );
        layer
    }

    fn detach_layer(&self, layer: LayerId) -> bool {
        self.tree().layers.remove(&layer).is_some()
    }

    fn append_snapshot(
        &self,
        layer: LayerId,
        mut snapshot: Snapshot,
        placement: HighlightBox,
    ) -> Option<NodeId> {
        let mut tree = self.tree();
        if !tree.layers.contains_key(&layer) {
            return None;
        }
        if let Some(max_height) = placement.content_max_height {
            snapshot.bounds.height = snapshot.bounds.height.min(max_height.max(0.0));
        }
        let node = NodeId(tree.allocate());
        tree.layers.get_mut(&layer)?.children.push(HighlightView {
            node,
            snapshot,
            placement,
        });
        Some(node)
    }

    fn contains_node(&self, layer: LayerId, node: NodeId) -> bool {
        self.tree()
            .layers
            .get(&layer)
            .is_some_and(|layer| layer.children.iter().any(|child| child.node == node))
    }

    fn remove_node(&self, layer: LayerId, node: NodeId) -> bool {
        let mut tree = self.tree();
        let Some(layer) = tree.layers.get_mut(&layer) else {
            return false;
        };
        let before = layer.children.len();
        layer.children.retain(|child| child.node != node);
        layer.children.len() != before
    }

    fn set_scroll_lock(&self, locked: bool) {
        self.tree().scroll_locked = locked;
    }
}

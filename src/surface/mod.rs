mod memory;
mod traits;

pub use memory::{ElementView, HighlightView, MemorySurface};
pub use traits::{ChangeSubscription, ElementRef, LayerId, LayerKind, NodeId, Snapshot, Surface};

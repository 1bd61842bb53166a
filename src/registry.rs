//! Step Registry signalling.
//!
//! The registry owns the step definitions and emits discrete signals
//! ("start requested", "step changed"). Each signal stays pending until the
//! controller acknowledges it, so a signal is consumed exactly once.

use std::collections::BTreeSet;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use crate::event::ExitReason;
use crate::tour::Step;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SignalId(pub u64);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RegistrySignal {
    StartRequested { at_step: usize },
    StepChanged { index: usize },
}

#[derive(Debug, Clone)]
pub struct Envelope {
    pub id: SignalId,
    pub signal: RegistrySignal,
    /// Step list as of emission; only carried by start requests.
    pub steps: Option<Vec<Step>>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TourExit {
    pub reason: ExitReason,
    pub last_step: Option<usize>,
}

#[derive(Debug, Default)]
struct Pending {
    unacknowledged: BTreeSet<SignalId>,
}

fn pending(shared: &Mutex<Pending>) -> MutexGuard<'_, Pending> {
    shared.lock().unwrap_or_else(PoisonError::into_inner)
}

pub struct StepRegistry {
    steps: Vec<Step>,
    next_signal: u64,
    shared: Arc<Mutex<Pending>>,
    signal_tx: flume::Sender<Envelope>,
    exit_rx: flume::Receiver<TourExit>,
}

pub struct RegistryLink {
    shared: Arc<Mutex<Pending>>,
    signal_rx: flume::Receiver<Envelope>,
    exit_tx: flume::Sender<TourExit>,
}

pub fn channel(steps: Vec<Step>) -> (StepRegistry, RegistryLink) {
    let (signal_tx, signal_rx) = flume::unbounded();
    let (exit_tx, exit_rx) = flume::unbounded();
    let shared = Arc::new(Mutex::new(Pending::default()));
    (
        StepRegistry {
            steps,
            next_signal: 1,
            shared: Arc::clone(&shared),
            signal_tx,
            exit_rx,
        },
        RegistryLink {
            shared,
            signal_rx,
            exit_tx,
        },
    )
}

impl StepRegistry {
    pub fn steps(&self) -> &[Step] {
        &self.steps
    }

    /// Replaces the definitions. A running tour keeps its own snapshot.
    pub fn set_steps(&mut self, steps: Vec<Step>) {
        self.steps = steps;
    }

    pub fn request_start(&mut self, at_step: Option<usize>) -> SignalId {
        let at_step = at_step.unwrap_or(1);
        let steps = self.steps.clone();
        self.emit(RegistrySignal::StartRequested { at_step }, Some(steps))
    }

    pub fn request_step(&mut self, index: usize) -> SignalId {
        self.emit(RegistrySignal::StepChanged { index }, None)
    }

    pub fn is_pending(&self, id: SignalId) -> bool {
        pending(&self.shared).unacknowledged.contains(&id)
    }

    pub fn pending_count(&self) -> usize {
        pending(&self.shared).unacknowledged.len()
    }

    pub fn try_recv_exit(&self) -> Option<TourExit> {
        self.exit_rx.try_recv().ok()
    }

    pub async fn recv_exit(&self) -> Option<TourExit> {
        self.exit_rx.recv_async().await.ok()
    }

    fn emit(&mut self, signal: RegistrySignal, steps: Option<Vec<Step>>) -> SignalId {
        let id = SignalId(self.next_signal);
        self.next_signal = self.next_signal.saturating_add(1);
        pending(&self.shared).unacknowledged.insert(id);
        if self.signal_tx.send(Envelope { id, signal, steps }).is_err() {
            // nobody will ever consume it
            pending(&self.shared).unacknowledged.remove(&id);
            tracing::debug!(?signal, "registry link is gone; signal dropped");
        }
        id
    }
}

impl RegistryLink {
    pub async fn recv(&self) -> Option<Envelope> {
        self.signal_rx.recv_async().await.ok()
    }

    pub fn try_recv(&self) -> Option<Envelope> {
        self.signal_rx.try_recv().ok()
    }

    /// Marks a signal consumed. Returns `false` if it was not pending.
    pub fn acknowledge(&self, id: SignalId) -> bool {
        pending(&self.shared).unacknowledged.remove(&id)
    }

    pub fn notify_exit(&self, exit: TourExit) {
        let _ = self.exit_tx.send(exit);
    }
}

#[cfg(test)]
mod tests {
    use super::{RegistrySignal, TourExit, channel};
    use crate::event::ExitReason;
    use crate::tour::Step;

    #[test]
    fn signals_stay_pending_until_acknowledged_once() {
        let (mut registry, link) = channel(vec![Step::new("x", "X", "")]);
        let start = registry.request_start(None);
        assert!(registry.is_pending(start));

        let envelope = link.try_recv().expect("start should be delivered");
        assert_eq!(envelope.id, start);
        assert_eq!(envelope.signal, RegistrySignal::StartRequested { at_step: 1 });
        assert_eq!(envelope.steps.as_ref().map(Vec::len), Some(1));

        assert!(link.acknowledge(start));
        assert!(!link.acknowledge(start));
        assert!(!registry.is_pending(start));
        assert!(link.try_recv().is_none());
    }

    #[test]
    fn start_carries_steps_as_of_emission() {
        let (mut registry, link) = channel(vec![Step::new("a", "A", "")]);
        registry.request_start(Some(1));
        registry.set_steps(vec![Step::new("b", "B", ""), Step::new("c", "C", "")]);

        let envelope = link.try_recv().expect("start should be delivered");
        let steps = envelope.steps.expect("start carries steps");
        assert_eq!(steps.len(), 1);
        assert_eq!(steps[0].id, "a");
    }

    #[test]
    fn signals_without_a_link_do_not_stay_pending() {
        let (mut registry, link) = channel(Vec::new());
        drop(link);
        let id = registry.request_step(2);
        assert!(!registry.is_pending(id));
        assert_eq!(registry.pending_count(), 0);
    }

    #[test]
    fn exits_flow_back_to_the_registry() {
        let (registry, link) = channel(Vec::new());
        link.notify_exit(TourExit {
            reason: ExitReason::Dismissed,
            last_step: Some(2),
        });
        assert_eq!(
            registry.try_recv_exit(),
            Some(TourExit {
                reason: ExitReason::Dismissed,
                last_step: Some(2),
            })
        );
    }
}

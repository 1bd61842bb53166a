use std::sync::Arc;

use tokio::sync::mpsc::{UnboundedReceiver, UnboundedSender, unbounded_channel};
use tokio::sync::watch;

use crate::config::TourConfig;
use crate::event::{ExitReason, TourEvent};
use crate::registry::{Envelope, RegistryLink, RegistrySignal, TourExit};
use crate::surface::Surface;

use super::geometry::{HighlightGeometry, anchor_origins};
use super::overlay::OverlayRenderer;
use super::resolver::{Activation, ActivationOutcome, ActivationRequest, InFlight, activate};
use super::state::{OverlayConfig, TourPhase, TourRunState, TourView};
use super::step::{Proceed, ProceedSignal, Step};

enum Wake {
    Activation(Activation),
    Proceed(Option<ProceedSignal>),
    Registry(Option<Envelope>),
}

/// Navigation Controller: the only owner of the run state and the overlay.
///
/// Exactly one activation (resolve, settle, measure) is in flight at a time;
/// every transition cancels the previous one before touching the overlay.
pub struct TourController<S: Surface + 'static> {
    surface: Arc<S>,
    config: TourConfig,
    geometry: HighlightGeometry,
    overlay: OverlayRenderer,
    in_flight: InFlight,
    state: TourRunState,
    epoch: u64,
    awaiting_proceed: Option<u64>,
    proceed_tx: UnboundedSender<ProceedSignal>,
    proceed_rx: UnboundedReceiver<ProceedSignal>,
    events: Vec<TourEvent>,
    view_tx: watch::Sender<TourView>,
}

impl<S: Surface + 'static> TourController<S> {
    pub fn new(surface: Arc<S>, config: TourConfig) -> Self {
        let (proceed_tx, proceed_rx) = unbounded_channel();
        let (view_tx, _) = watch::channel(TourView::default());
        Self {
            surface,
            geometry: HighlightGeometry::from(&config),
            config,
            overlay: OverlayRenderer::default(),
            in_flight: InFlight::default(),
            state: TourRunState::default(),
            epoch: 0,
            awaiting_proceed: None,
            proceed_tx,
            proceed_rx,
            events: Vec::new(),
            view_tx,
        }
    }

    pub fn state(&self) -> &TourRunState {
        &self.state
    }

    pub fn phase(&self) -> TourPhase {
        self.state.phase
    }

    pub fn is_resolving(&self) -> bool {
        self.in_flight.is_pending()
    }

    pub fn is_awaiting_proceed(&self) -> bool {
        self.awaiting_proceed.is_some()
    }

    pub fn progress(&self) -> Option<String> {
        self.state.view().progress_label()
    }

    pub fn overlay(&self) -> &OverlayRenderer {
        &self.overlay
    }

    pub fn subscribe_view(&self) -> watch::Receiver<TourView> {
        self.view_tx.subscribe()
    }

    pub fn drain_events(&mut self) -> Vec<TourEvent> {
        std::mem::take(&mut self.events)
    }

    pub fn start(&mut self, steps: Vec<Step>, at_step: usize) {
        if self.state.phase != TourPhase::Idle {
            tracing::debug!(phase = ?self.state.phase, "tour already running; start ignored");
            return;
        }
        if steps.is_empty() {
            tracing::warn!("tour start requested with no steps");
            return;
        }

        self.cancel_pending();
        self.surface.scroll_to_top();
        self.overlay.mount(self.surface.as_ref());
        let count = steps.len();
        self.state.begin(steps, at_step);
        let step = self.state.current_step_index;
        tracing::info!(step, count, "tour started");
        self.events.push(TourEvent::Started { step, count });
        self.activate_current();
    }

    pub fn next(&mut self) {
        if self.state.phase == TourPhase::Idle {
            return;
        }
        if self.state.next_disabled {
            self.exit_with(ExitReason::Finished);
            return;
        }
        self.goto_step(self.state.current_step_index + 1);
    }

    pub fn prev(&mut self) {
        if self.state.phase == TourPhase::Idle || self.state.prev_disabled {
            return;
        }
        self.goto_step(self.state.current_step_index - 1);
    }

    /// Moves to the 1-based `target`. Calls made while another step is
    /// loading supersede it.
    pub fn goto_step(&mut self, target: usize) {
        if self.state.phase == TourPhase::Idle {
            return;
        }
        let current = self.state.current_step_index;
        if target == current || target == 0 {
            return;
        }
        let count = self.state.steps.len();
        if target > count {
            self.exit_with(ExitReason::Finished);
            return;
        }

        self.cancel_pending();
        self.overlay.clear_highlight(self.surface.as_ref());

        let forward = target > current;
        let leaving_prev_step = self.state.step(current).and_then(|step| step.prev_step);
        let (hook, pause) = match self.state.step(target) {
            Some(step) if forward => (step.on_next.clone(), step.pause_tour_till_update),
            Some(step) => (step.on_prev.clone(), step.pause_tour_till_update),
            None => (None, false),
        };

        self.state.set_index(target);
        if !forward
            && let Some(landing) = leaving_prev_step
        {
            if (1..=count).contains(&landing) {
                self.state.set_index(landing);
            } else {
                tracing::debug!(landing, count, "prev_step out of range; ignored");
            }
        }
        self.state.mark_loading();
        tracing::debug!(
            from = current,
            to = self.state.current_step_index,
            forward,
            "step transition"
        );

        if let Some(hook) = hook {
            let proceed = pause.then(|| Proceed::new(self.epoch, self.proceed_tx.clone()));
            if let Err(err) = hook.call(proceed) {
                tracing::warn!(step = target, %err, "step hook failed; ending tour");
                self.exit_with(ExitReason::HookFailed);
                return;
            }
            if pause {
                self.awaiting_proceed = Some(self.epoch);
                self.events.push(TourEvent::AwaitingProceed {
                    step: self.state.current_step_index,
                });
                self.publish();
                return;
            }
        }

        self.activate_current();
    }

    pub fn exit(&mut self) {
        self.exit_with(ExitReason::Dismissed);
    }

    /// Waits for the next internal wake-up (an activation settling or a
    /// paused hook resuming) and applies it.
    pub async fn pump(&mut self) {
        let wake = tokio::select! {
            biased;
            signal = self.proceed_rx.recv() => Wake::Proceed(signal),
            activation = self.in_flight.wait() => Wake::Activation(activation),
        };
        self.apply_wake(wake);
    }

    /// Drives in-flight work until nothing is resolving. Does not wait for a
    /// `proceed` that has not been sent yet.
    pub async fn settle(&mut self) {
        loop {
            if let Ok(signal) = self.proceed_rx.try_recv() {
                self.handle_proceed(signal);
                continue;
            }
            if !self.in_flight.is_pending() {
                return;
            }
            let activation = self.in_flight.wait().await;
            self.apply_activation(activation);
        }
    }

    /// Serves registry signals until the registry goes away.
    pub async fn run(mut self, link: RegistryLink) {
        loop {
            let wake = tokio::select! {
                biased;
                signal = self.proceed_rx.recv() => Wake::Proceed(signal),
                activation = self.in_flight.wait() => Wake::Activation(activation),
                envelope = link.recv() => Wake::Registry(envelope),
            };
            match wake {
                Wake::Registry(None) => break,
                Wake::Registry(Some(envelope)) => self.handle_envelope(envelope, &link),
                other => self.apply_wake(other),
            }
            for event in self.drain_events() {
                if let TourEvent::Exited { reason, last_step } = event {
                    link.notify_exit(TourExit { reason, last_step });
                }
            }
        }
        self.exit_with(ExitReason::Teardown);
    }

    pub fn handle_envelope(&mut self, envelope: Envelope, link: &RegistryLink) {
        match envelope.signal {
            RegistrySignal::StartRequested { at_step } => {
                let steps = envelope.steps.unwrap_or_default();
                self.start(steps, at_step);
            }
            RegistrySignal::StepChanged { index } => self.goto_step(index),
        }
        link.acknowledge(envelope.id);
    }

    fn apply_wake(&mut self, wake: Wake) {
        match wake {
            Wake::Activation(activation) => self.apply_activation(activation),
            Wake::Proceed(Some(signal)) => self.handle_proceed(signal),
            Wake::Proceed(None) | Wake::Registry(_) => {}
        }
    }

    fn handle_proceed(&mut self, signal: ProceedSignal) {
        if self.awaiting_proceed != Some(signal.token) {
            tracing::debug!(token = signal.token, "stale proceed ignored");
            return;
        }
        self.awaiting_proceed = None;
        self.activate_current();
    }

    fn activate_current(&mut self) {
        let index = self.state.current_step_index;
        let Some(step) = self.state.step(index) else {
            return;
        };
        let request = ActivationRequest {
            generation: self.epoch,
            index,
            primary: step.id.clone(),
            alternate: step.alternate_id.clone(),
            scroll_to_view: step.scroll_to_view,
            timeout: self.config.resolve_timeout(),
            settle: self.config.scroll_settle(),
        };
        self.state.mark_loading();
        self.in_flight
            .replace(activate(Arc::clone(&self.surface), request));
        self.publish();
    }

    fn apply_activation(&mut self, activation: Activation) {
        if activation.generation != self.epoch
            || activation.index != self.state.current_step_index
        {
            tracing::debug!(index = activation.index, "stale activation dropped");
            return;
        }

        let measured = match activation.outcome {
            ActivationOutcome::Ready(measured) => measured,
            ActivationOutcome::Unreachable => {
                self.skip_unreachable(activation.index);
                return;
            }
        };

        let highlight = self.geometry.compute(measured.bounds, measured.viewport);
        if !self
            .overlay
            .show_highlight(self.surface.as_ref(), measured.target, highlight)
        {
            self.skip_unreachable(activation.index);
            return;
        }

        let Some(step) = self.state.step(activation.index) else {
            return;
        };
        let overlay = OverlayConfig {
            target: Some(measured.target),
            position: step.position,
            title: step.title.clone(),
            desc: step.desc.clone(),
            target_bounds: measured.bounds,
            highlight,
            origins: anchor_origins(step.position),
        };
        self.state.mark_active(overlay);
        tracing::debug!(step = activation.index, "step shown");
        self.events.push(TourEvent::StepShown {
            step: activation.index,
        });
        self.publish();
    }

    fn skip_unreachable(&mut self, index: usize) {
        let id = self
            .state
            .step(index)
            .map(|step| step.id.clone())
            .unwrap_or_default();
        tracing::warn!(step = index, id, "target not found; skipping step");
        self.events.push(TourEvent::StepSkipped { step: index });
        if index >= self.state.steps.len() {
            self.exit_with(ExitReason::Exhausted);
        } else {
            self.goto_step(index + 1);
        }
    }

    fn exit_with(&mut self, reason: ExitReason) {
        if self.state.phase == TourPhase::Idle && !self.overlay.is_mounted() {
            return;
        }
        let last_step = (self.state.current_step_index > 0).then_some(self.state.current_step_index);
        self.cancel_pending();
        self.overlay.clear_highlight(self.surface.as_ref());
        self.overlay.unmount(self.surface.as_ref());
        self.state.reset();
        tracing::info!(reason = reason.as_str(), ?last_step, "tour exited");
        self.events.push(TourEvent::Exited { reason, last_step });
        self.publish();
    }

    fn cancel_pending(&mut self) {
        self.epoch = self.epoch.wrapping_add(1);
        self.awaiting_proceed = None;
        if self.in_flight.cancel() {
            tracing::debug!("in-flight activation cancelled");
        }
    }

    fn publish(&self) {
        self.view_tx.send_replace(self.state.view());
    }
}

impl<S: Surface + 'static> Drop for TourController<S> {
    fn drop(&mut self) {
        self.exit_with(ExitReason::Teardown);
    }
}

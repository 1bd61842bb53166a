use std::sync::Arc;

use ratatui::layout::Rect;
use tokio::sync::mpsc::UnboundedSender;
use tokio::sync::watch;

use crate::config::Config;
use crate::event::{DomainEvent, TourEvent};
use crate::input::KeymapPreset;
use crate::registry::{self, RegistryLink, StepRegistry, TourExit};
use crate::surface::MemorySurface;
use crate::tour::{Step, TourController, TourPhase, TourView, ViewportSize};

use super::console::ConsoleScreen;
use super::demo::demo_tour;

/// Where the demo takes its steps from.
#[derive(Debug)]
pub enum TourSource {
    Builtin,
    Steps(Vec<Step>),
}

pub struct App {
    pub config: Config,
    pub(crate) console: ConsoleScreen,
    pub(crate) console_area: Rect,
    pub(crate) surface: Arc<MemorySurface>,
    pub(crate) tour: TourController<MemorySurface>,
    pub(crate) view: watch::Receiver<TourView>,
    pub(crate) registry: StepRegistry,
    pub(crate) link: RegistryLink,
    pub(crate) status: String,
    pub(crate) keymap: KeymapPreset,
    source: Option<TourSource>,
    autostart: Option<usize>,
}

impl App {
    pub fn new(config: Config, source: TourSource) -> Self {
        let surface = Arc::new(MemorySurface::new(ViewportSize::default()));
        let tour = TourController::new(Arc::clone(&surface), config.tour.clone());
        let view = tour.subscribe_view();
        let (registry, link) = registry::channel(Vec::new());
        let keymap = KeymapPreset::parse(&config.ui.keymap);

        Self {
            config,
            console: ConsoleScreen::default(),
            console_area: Rect::default(),
            surface,
            tour,
            view,
            registry,
            link,
            status: String::new(),
            keymap,
            source: Some(source),
            autostart: Some(1),
        }
    }

    /// Step the tour starts at once the loop is up; `None` waits for `t`.
    pub fn with_autostart(mut self, at_step: Option<usize>) -> Self {
        self.autostart = at_step;
        self
    }

    pub fn is_tour_running(&self) -> bool {
        self.tour.phase() != TourPhase::Idle
    }

    /// Hands the step definitions to the registry. Built-in steps need the
    /// loop sender for their hooks, so this runs once the loop exists.
    pub(crate) fn install_tour(&mut self, tx: &UnboundedSender<DomainEvent>) {
        let steps = match self.source.take() {
            Some(TourSource::Builtin) => demo_tour(tx),
            Some(TourSource::Steps(steps)) => steps,
            None => return,
        };
        tracing::info!(steps = steps.len(), "tour installed");
        self.registry.set_steps(steps);
    }

    pub(crate) fn take_autostart(&mut self) -> Option<usize> {
        self.autostart.take()
    }

    pub(crate) fn sync_console(&mut self, area: Rect) {
        self.console_area = area;
        self.console.sync(&self.surface, area.width, area.height);
    }

    /// Feeds queued registry signals to the controller.
    pub(crate) fn poll_registry(&mut self) -> bool {
        let mut handled = false;
        while let Some(envelope) = self.link.try_recv() {
            self.tour.handle_envelope(envelope, &self.link);
            handled = true;
        }
        handled
    }

    /// Drains controller events into the status line and reports exits back
    /// through the registry. Returns whether anything happened.
    pub(crate) fn flush_tour_events(&mut self) -> bool {
        let events = self.tour.drain_events();
        for event in &events {
            match *event {
                TourEvent::StepSkipped { step } => {
                    self.status = format!("step {step} skipped: target never appeared");
                }
                TourEvent::Started { .. } => self.status.clear(),
                TourEvent::Exited { reason, last_step } => {
                    self.link.notify_exit(TourExit { reason, last_step });
                }
                TourEvent::StepShown { .. } | TourEvent::AwaitingProceed { .. } => {}
            }
        }

        while let Some(exit) = self.registry.try_recv_exit() {
            self.status = match exit.last_step {
                Some(step) => format!("tour {} at step {step}", exit.reason.as_str()),
                None => format!("tour {}", exit.reason.as_str()),
            };
        }
        !events.is_empty()
    }
}

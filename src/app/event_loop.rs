use std::time::Duration;

use tokio::sync::mpsc::{UnboundedReceiver, UnboundedSender, unbounded_channel};
use tokio::time;

use crate::error::{AppError, AppResult};
use crate::event::DomainEvent;
use crate::registry::{Envelope, RegistryLink};
use crate::surface::MemorySurface;
use crate::tour::TourController;
use crate::ui::split_layout;

use super::core::App;
use super::event_bus::EventBusRuntime;
use super::input_ops::LoopControl;
use super::terminal_session::{TerminalSession, TerminalSurface};

struct LoopRuntime {
    session: TerminalSession,
    input_poll_timeout: Duration,
    needs_redraw: bool,
    // keeps the loop channel open for hooks and the input task
    _loop_event_tx: UnboundedSender<DomainEvent>,
    loop_event_rx: UnboundedReceiver<DomainEvent>,
    loop_event_runtime: EventBusRuntime,
}

enum WaitEvent {
    Event(DomainEvent),
    Registry(Envelope),
    TourWoke,
    Closed,
}

impl App {
    pub async fn run(&mut self) -> AppResult<()> {
        let mut runtime = self.initialize_loop_runtime()?;
        let result = self.run_loop(&mut runtime).await;

        runtime.loop_event_runtime.shutdown();
        self.tour.exit();
        self.flush_tour_events();
        runtime
            .session
            .restore()
            .map_err(|source| AppError::io_with_context(source, "failed to restore terminal"))?;
        result
    }

    fn initialize_loop_runtime(&mut self) -> AppResult<LoopRuntime> {
        let (loop_event_tx, loop_event_rx) = unbounded_channel();
        self.install_tour(&loop_event_tx);
        let session = TerminalSession::enter()?;
        let loop_event_runtime = EventBusRuntime::spawn(loop_event_tx.clone());

        Ok(LoopRuntime {
            session,
            input_poll_timeout: Duration::from_millis(self.config.ui.input_poll_timeout_ms),
            needs_redraw: true,
            _loop_event_tx: loop_event_tx,
            loop_event_rx,
            loop_event_runtime,
        })
    }

    async fn run_loop(&mut self, runtime: &mut LoopRuntime) -> AppResult<()> {
        loop {
            let area = runtime
                .session
                .area()
                .map_err(|source| AppError::io_with_context(source, "failed to query terminal size"))?;
            let layout = split_layout(area);
            if layout.console != self.console_area {
                self.sync_console(layout.console);
                runtime.needs_redraw = true;
            }
            if let Some(at_step) = self.take_autostart() {
                self.begin_tour(at_step);
            }
            if self.flush_tour_events() {
                runtime.needs_redraw = true;
            }
            if self.view.has_changed().unwrap_or(false) {
                runtime.needs_redraw = true;
            }

            if runtime.needs_redraw {
                runtime
                    .session
                    .draw(|frame| self.draw(frame))
                    .map_err(|source| AppError::io_with_context(source, "failed to draw frame"))?;
                runtime.needs_redraw = false;
            }

            let waited = wait_next_event(
                &mut runtime.loop_event_rx,
                &mut self.tour,
                &self.link,
                runtime.input_poll_timeout,
            )
            .await;
            match waited {
                WaitEvent::Event(DomainEvent::Wake) => {}
                WaitEvent::Event(event) => {
                    runtime.needs_redraw = true;
                    if self.handle_domain_event(event) == LoopControl::Break {
                        return Ok(());
                    }
                }
                WaitEvent::Registry(envelope) => {
                    self.tour.handle_envelope(envelope, &self.link);
                }
                WaitEvent::TourWoke => {}
                WaitEvent::Closed => return Ok(()),
            }
        }
    }
}

async fn wait_next_event(
    loop_event_rx: &mut UnboundedReceiver<DomainEvent>,
    tour: &mut TourController<MemorySurface>,
    link: &RegistryLink,
    wake_timeout: Duration,
) -> WaitEvent {
    tokio::select! {
        biased;
        maybe_loop = loop_event_rx.recv() => {
            match maybe_loop {
                Some(event) => WaitEvent::Event(event),
                None => WaitEvent::Closed,
            }
        },
        Some(envelope) = link.recv() => WaitEvent::Registry(envelope),
        _ = tour.pump() => WaitEvent::TourWoke,
        _ = time::sleep(wake_timeout) => WaitEvent::Event(DomainEvent::Wake),
    }
}

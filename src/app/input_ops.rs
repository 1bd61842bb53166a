use crossterm::event::{Event, KeyEventKind};

use crate::event::DomainEvent;
use crate::input::{TourCommand, map_key_to_command_with_preset};

use super::core::App;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum LoopControl {
    Continue,
    Break,
}

impl App {
    pub(crate) fn handle_domain_event(&mut self, event: DomainEvent) -> LoopControl {
        match event {
            DomainEvent::Input(Event::Key(key))
                if matches!(key.kind, KeyEventKind::Press | KeyEventKind::Repeat) =>
            {
                let running = self.is_tour_running();
                match map_key_to_command_with_preset(key, running, self.keymap) {
                    Some(command) => self.handle_command(command),
                    None => LoopControl::Continue,
                }
            }
            DomainEvent::Input(_) | DomainEvent::Wake => LoopControl::Continue,
            DomainEvent::InputError(message) => {
                tracing::warn!(%message, "terminal input error");
                self.status = format!("input error: {message}");
                LoopControl::Continue
            }
            DomainEvent::Console { actions, proceed } => {
                for action in actions {
                    self.console.apply(action);
                }
                self.sync_console(self.console_area);
                if let Some(proceed) = proceed {
                    proceed.resume();
                }
                LoopControl::Continue
            }
        }
    }

    pub(crate) fn handle_command(&mut self, command: TourCommand) -> LoopControl {
        tracing::debug!(?command, "command");
        match command {
            TourCommand::Quit => return LoopControl::Break,
            TourCommand::Next => self.tour.next(),
            TourCommand::Prev => self.tour.prev(),
            TourCommand::Exit => self.tour.exit(),
            TourCommand::Goto(step) => {
                self.registry.request_step(step);
                self.poll_registry();
            }
            TourCommand::Restart => {
                self.tour.exit();
                self.console.reset();
                self.sync_console(self.console_area);
                self.registry.request_start(None);
                self.poll_registry();
            }
        }
        LoopControl::Continue
    }

    pub(crate) fn begin_tour(&mut self, at_step: usize) {
        self.registry.request_start(Some(at_step));
        self.poll_registry();
    }
}

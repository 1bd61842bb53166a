use crossterm::event::Event;

use crate::app::ConsoleAction;
use crate::tour::Proceed;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitReason {
    Dismissed,
    Finished,
    /// Unreachable targets were skipped past the end of the list.
    Exhausted,
    /// A step hook returned an error.
    HookFailed,
    Teardown,
}

impl ExitReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Dismissed => "dismissed",
            Self::Finished => "finished",
            Self::Exhausted => "exhausted",
            Self::HookFailed => "hook-failed",
            Self::Teardown => "teardown",
        }
    }
}

/// Emitted by the controller; step numbers are 1-based.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TourEvent {
    Started {
        step: usize,
        count: usize,
    },
    StepShown {
        step: usize,
    },
    StepSkipped {
        step: usize,
    },
    AwaitingProceed {
        step: usize,
    },
    Exited {
        reason: ExitReason,
        last_step: Option<usize>,
    },
}

/// Everything the demo host's event loop reacts to.
#[derive(Debug)]
pub(crate) enum DomainEvent {
    Input(Event),
    InputError(String),
    /// Screen changes requested by a step hook; `proceed` resumes a paused
    /// transition once they are on screen.
    Console {
        actions: Vec<ConsoleAction>,
        proceed: Option<Proceed>,
    },
    Wake,
}

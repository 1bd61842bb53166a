use std::time::Duration;

use tokio::sync::mpsc::UnboundedSender;

use crate::error::{AppError, AppResult};
use crate::event::DomainEvent;
use crate::tour::{Position, Proceed, Step};

use super::console::{ConsoleAction, Section};

/// Time the mock console takes to "load" a dialog.
const DIALOG_LATENCY: Duration = Duration::from_millis(400);

/// Hook that asks the console for `actions` and forwards the proceed handle,
/// so paused steps resume only after the screen has changed.
fn console_hook(
    tx: &UnboundedSender<DomainEvent>,
    step: usize,
    actions: &'static [ConsoleAction],
    latency: Duration,
) -> impl Fn(Option<Proceed>) -> AppResult<()> + Send + Sync + 'static {
    let tx = tx.clone();
    move |proceed| {
        if tx.is_closed() {
            return Err(AppError::hook(step, "console event loop is gone"));
        }
        let tx = tx.clone();
        tokio::spawn(async move {
            if !latency.is_zero() {
                tokio::time::sleep(latency).await;
            }
            let _ = tx.send(DomainEvent::Console {
                actions: actions.to_vec(),
                proceed,
            });
        });
        Ok(())
    }
}

/// Built-in walkthrough of the admin console.
pub(crate) fn demo_tour(tx: &UnboundedSender<DomainEvent>) -> Vec<Step> {
    use ConsoleAction::{CloseReport, OpenReport, Show};

    vec![
        Step::new(
            "nav-users",
            "Users",
            "Every operator account is managed from this section.",
        )
        .position(Position::Right),
        Step::new(
            "users-table",
            "User directory",
            "Invite, suspend or promote operators. A fresh console shows an invite prompt here instead.",
        )
        .alternate_id("users-empty")
        .position(Position::Bottom)
        .on_prev(console_hook(tx, 2, &[Show(Section::Users)], Duration::ZERO)),
        Step::new(
            "create-application",
            "Applications",
            "Register each model-backed application before it may call the gateway.",
        )
        .position(Position::Top)
        .on_next(console_hook(tx, 3, &[Show(Section::Applications)], Duration::ZERO))
        .on_prev(console_hook(tx, 3, &[Show(Section::Applications)], Duration::ZERO)),
        Step::new(
            "guardrail-list",
            "Guardrails",
            "Policies here filter prompts and completions for every application.",
        )
        .position(Position::Bottom)
        .on_next(console_hook(tx, 4, &[Show(Section::Guardrails)], Duration::ZERO))
        .on_prev(console_hook(
            tx,
            4,
            &[CloseReport, Show(Section::Guardrails)],
            Duration::ZERO,
        )),
        Step::new(
            "report-dialog",
            "Usage report",
            "Reports open in a dialog. The tour waits until it is on screen.",
        )
        .position(Position::Right)
        .pause_till_update(true)
        .on_next(console_hook(
            tx,
            5,
            &[Show(Section::Reports), OpenReport],
            DIALOG_LATENCY,
        ))
        .on_prev(console_hook(
            tx,
            5,
            &[CloseReport, Show(Section::Guardrails)],
            Duration::ZERO,
        )),
        Step::new(
            "report-export",
            "Export",
            "Download the report as CSV. Going back returns to the guardrails.",
        )
        .position(Position::Bottom)
        .prev_step(4),
        Step::new(
            "audit-trail",
            "Audit trail",
            "Only compliance administrators see this panel.",
        )
        .on_next(console_hook(tx, 7, &[CloseReport], Duration::ZERO)),
        Step::new(
            "help-button",
            "Need a hand?",
            "Press t at any time to replay this tour.",
        )
        .position(Position::Right),
    ]
}

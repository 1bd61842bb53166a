use std::time::Duration;

use crossterm::event::{Event, KeyCode, KeyEvent, KeyModifiers};
use ratatui::layout::Rect;
use tokio::sync::mpsc::{UnboundedReceiver, unbounded_channel};

use crate::app::{App, Section, TourSource};
use crate::config::Config;
use crate::event::DomainEvent;
use crate::input::TourCommand;
use crate::surface::Surface;
use crate::tour::{Step, TourPhase};

use super::super::input_ops::LoopControl;

enum Woke {
    Event(DomainEvent),
    Tour,
}

fn demo_app() -> (App, UnboundedReceiver<DomainEvent>) {
    let (tx, rx) = unbounded_channel();
    let mut app = App::new(Config::default(), TourSource::Builtin);
    app.install_tour(&tx);
    app.sync_console(Rect::new(0, 0, 120, 39));
    (app, rx)
}

/// Runs the same wake-ups as the event loop until `phase` is reached.
async fn drive_until(app: &mut App, rx: &mut UnboundedReceiver<DomainEvent>, phase: TourPhase) {
    let reached = tokio::time::timeout(Duration::from_secs(120), async {
        while app.tour.phase() != phase {
            let woke = tokio::select! {
                biased;
                Some(event) = rx.recv() => Woke::Event(event),
                _ = app.tour.pump() => Woke::Tour,
            };
            if let Woke::Event(event) = woke {
                app.handle_domain_event(event);
            }
        }
    })
    .await;
    assert!(reached.is_ok(), "tour never reached {phase:?}, stuck in {:?}", app.tour.phase());
}

pub(super) async fn started_app() -> App {
    let (mut app, mut rx) = demo_app();
    app.handle_command(TourCommand::Restart);
    drive_until(&mut app, &mut rx, TourPhase::Active { step: 1 }).await;
    app
}

#[tokio::test(start_paused = true)]
async fn walkthrough_follows_console_hooks() {
    let (mut app, mut rx) = demo_app();

    app.handle_command(TourCommand::Restart);
    drive_until(&mut app, &mut rx, TourPhase::Active { step: 1 }).await;
    assert_eq!(
        app.tour.state().overlay_config().and_then(|overlay| overlay.target),
        app.surface.query("nav-users")
    );

    app.handle_command(TourCommand::Next);
    drive_until(&mut app, &mut rx, TourPhase::Active { step: 2 }).await;

    app.handle_command(TourCommand::Next);
    drive_until(&mut app, &mut rx, TourPhase::Active { step: 3 }).await;
    assert_eq!(app.console.section(), Section::Applications);

    app.handle_command(TourCommand::Next);
    drive_until(&mut app, &mut rx, TourPhase::Active { step: 4 }).await;
    assert_eq!(app.console.section(), Section::Guardrails);

    app.handle_command(TourCommand::Next);
    assert!(app.tour.is_awaiting_proceed());
    assert!(app.surface.query("report-dialog").is_none());
    drive_until(&mut app, &mut rx, TourPhase::Active { step: 5 }).await;
    assert!(app.console.is_report_open());
    assert_eq!(app.console.section(), Section::Reports);

    app.handle_command(TourCommand::Next);
    drive_until(&mut app, &mut rx, TourPhase::Active { step: 6 }).await;

    // step 6 declares step 4 as its way back, and the dialog closes on the way
    app.handle_command(TourCommand::Prev);
    drive_until(&mut app, &mut rx, TourPhase::Active { step: 4 }).await;
    assert!(!app.console.is_report_open());
    assert_eq!(app.console.section(), Section::Guardrails);
    assert_eq!(app.surface.highlight_count(), 1);
}

#[tokio::test(start_paused = true)]
async fn missing_targets_are_skipped_until_the_help_step() {
    let (mut app, mut rx) = demo_app();
    app.handle_command(TourCommand::Restart);
    drive_until(&mut app, &mut rx, TourPhase::Active { step: 1 }).await;

    // the report dialog is closed, so neither 6 nor 7 can resolve
    app.handle_command(TourCommand::Goto(6));
    let started = tokio::time::Instant::now();
    drive_until(&mut app, &mut rx, TourPhase::Active { step: 8 }).await;
    assert!(started.elapsed() >= Duration::from_secs(30));

    app.flush_tour_events();
    assert_eq!(app.status, "step 7 skipped: target never appeared");

    app.handle_command(TourCommand::Next);
    assert_eq!(app.tour.phase(), TourPhase::Idle);
    app.flush_tour_events();
    assert_eq!(app.status, "tour finished at step 8");
    assert!(!app.surface.is_scroll_locked());
}

#[tokio::test(start_paused = true)]
async fn keys_drive_the_tour_and_quit() {
    let (mut app, mut rx) = demo_app();
    let key = |code| DomainEvent::Input(Event::Key(KeyEvent::new(code, KeyModifiers::NONE)));

    assert_eq!(app.handle_domain_event(key(KeyCode::Char('t'))), LoopControl::Continue);
    drive_until(&mut app, &mut rx, TourPhase::Active { step: 1 }).await;

    app.handle_domain_event(key(KeyCode::Right));
    drive_until(&mut app, &mut rx, TourPhase::Active { step: 2 }).await;

    app.handle_domain_event(key(KeyCode::Esc));
    assert_eq!(app.tour.phase(), TourPhase::Idle);
    app.flush_tour_events();
    assert_eq!(app.status, "tour dismissed at step 2");

    assert_eq!(app.handle_domain_event(key(KeyCode::Char('q'))), LoopControl::Break);
}

#[tokio::test(start_paused = true)]
async fn digit_keys_jump_through_the_registry() {
    let (mut app, mut rx) = demo_app();
    let key = |code| DomainEvent::Input(Event::Key(KeyEvent::new(code, KeyModifiers::NONE)));

    app.handle_domain_event(key(KeyCode::Enter));
    drive_until(&mut app, &mut rx, TourPhase::Active { step: 1 }).await;

    assert_eq!(app.handle_domain_event(key(KeyCode::Char('3'))), LoopControl::Continue);
    assert_eq!(app.registry.pending_count(), 0);
    drive_until(&mut app, &mut rx, TourPhase::Active { step: 3 }).await;
    assert_eq!(app.console.section(), Section::Applications);
}

#[tokio::test(start_paused = true)]
async fn restart_resets_the_console_and_starts_over() {
    let (mut app, mut rx) = demo_app();
    app.handle_command(TourCommand::Restart);
    drive_until(&mut app, &mut rx, TourPhase::Active { step: 1 }).await;
    app.handle_command(TourCommand::Goto(3));
    drive_until(&mut app, &mut rx, TourPhase::Active { step: 3 }).await;
    assert_eq!(app.console.section(), Section::Applications);

    app.handle_command(TourCommand::Restart);
    assert_eq!(app.console.section(), Section::Users);
    drive_until(&mut app, &mut rx, TourPhase::Active { step: 1 }).await;
    assert_eq!(app.registry.pending_count(), 0);
}

#[tokio::test(start_paused = true)]
async fn file_tours_run_without_hooks() {
    let (tx, mut rx) = unbounded_channel();
    let steps = vec![
        Step::new("nav-reports", "Reports", "All exports live here."),
        Step::new("help-button", "Help", "Ask for help."),
    ];
    let mut app = App::new(Config::default(), TourSource::Steps(steps)).with_autostart(Some(2));
    app.install_tour(&tx);
    app.sync_console(Rect::new(0, 0, 120, 39));

    let at_step = app.take_autostart().expect("autostart requested");
    app.begin_tour(at_step);
    drive_until(&mut app, &mut rx, TourPhase::Active { step: 2 }).await;
    assert!(app.tour.state().next_disabled());
    assert!(app.take_autostart().is_none());
}

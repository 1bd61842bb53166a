use std::sync::{Arc, Mutex};
use std::time::Duration;

use super::{controller, row_bounds, shown, surface_with};
use crate::error::AppError;
use crate::event::{ExitReason, TourEvent};
use crate::surface::{LayerKind, Surface};
use crate::tour::{Proceed, Step, TourPhase};

type Stash = Arc<Mutex<Option<Proceed>>>;

fn stashing_step(id: &str, stash: &Stash) -> Step {
    let stash = Arc::clone(stash);
    Step::new(id, id.to_uppercase(), "")
        .pause_till_update(true)
        .on_next(move |proceed| {
            *stash.lock().unwrap() = proceed;
            Ok(())
        })
}

#[tokio::test(start_paused = true)]
async fn paused_step_waits_for_proceed() {
    let surface = surface_with(&["a", "b"]);
    let stash: Stash = Arc::default();
    let mut tour = controller(&surface);

    tour.start(vec![Step::new("a", "A", ""), stashing_step("b", &stash)], 1);
    tour.settle().await;
    tour.next();

    assert_eq!(tour.phase(), TourPhase::Loading { step: 2 });
    assert!(tour.is_awaiting_proceed());
    assert!(!tour.is_resolving());
    assert_eq!(surface.highlight_count(), 0);

    // nothing moves no matter how long the hook takes
    let idle = tokio::time::timeout(Duration::from_secs(120), tour.pump()).await;
    assert!(idle.is_err());
    assert_eq!(tour.phase(), TourPhase::Loading { step: 2 });

    let proceed = stash.lock().unwrap().take().expect("hook got a proceed token");
    proceed.resume();
    tour.settle().await;

    assert_eq!(tour.phase(), TourPhase::Active { step: 2 });
    assert!(!tour.is_awaiting_proceed());
    let events = tour.drain_events();
    assert!(events.contains(&TourEvent::AwaitingProceed { step: 2 }));
    assert_eq!(shown(&events), vec![1, 2]);
}

#[tokio::test(start_paused = true)]
async fn hook_can_open_the_target_then_proceed() {
    let surface = surface_with(&["open-report"]);
    let hook_surface = Arc::clone(&surface);
    let steps = vec![
        Step::new("open-report", "Reports", "Open a report"),
        Step::new("report-dialog", "Report", "The dialog")
            .pause_till_update(true)
            .on_next(move |proceed| {
                let surface = Arc::clone(&hook_surface);
                tokio::spawn(async move {
                    tokio::time::sleep(Duration::from_millis(300)).await;
                    surface.insert_element("report-dialog", "Report", row_bounds(3));
                    if let Some(proceed) = proceed {
                        proceed.resume();
                    }
                });
                Ok(())
            }),
    ];
    let mut tour = controller(&surface);

    tour.start(steps, 1);
    tour.settle().await;
    tour.next();
    assert!(surface.query("report-dialog").is_none());

    tour.pump().await;
    tour.settle().await;

    assert_eq!(tour.phase(), TourPhase::Active { step: 2 });
    assert_eq!(
        tour.state().overlay_config().and_then(|overlay| overlay.target),
        surface.query("report-dialog")
    );
}

#[tokio::test(start_paused = true)]
async fn proceed_from_a_superseded_transition_is_ignored() {
    let surface = surface_with(&["a", "b", "c"]);
    let stash: Stash = Arc::default();
    let mut tour = controller(&surface);

    tour.start(
        vec![
            Step::new("a", "A", ""),
            stashing_step("b", &stash),
            Step::new("c", "C", ""),
        ],
        1,
    );
    tour.settle().await;
    tour.goto_step(2);
    let stale = stash.lock().unwrap().take().expect("hook got a proceed token");

    tour.goto_step(3);
    tour.settle().await;
    assert_eq!(tour.phase(), TourPhase::Active { step: 3 });

    stale.resume();
    tour.settle().await;
    assert_eq!(tour.phase(), TourPhase::Active { step: 3 });
    assert_eq!(shown(&tour.drain_events()), vec![1, 3]);
}

#[tokio::test(start_paused = true)]
async fn fire_and_forget_hook_gets_no_proceed_token() {
    let surface = surface_with(&["a", "b"]);
    let received: Arc<Mutex<Vec<bool>>> = Arc::default();
    let sink = Arc::clone(&received);
    let steps = vec![
        Step::new("a", "A", ""),
        Step::new("b", "B", "").on_next(move |proceed| {
            sink.lock().unwrap().push(proceed.is_some());
            Ok(())
        }),
    ];
    let mut tour = controller(&surface);

    tour.start(steps, 1);
    tour.settle().await;
    tour.next();
    assert!(tour.is_resolving());
    tour.settle().await;

    assert_eq!(*received.lock().unwrap(), vec![false]);
    assert_eq!(tour.phase(), TourPhase::Active { step: 2 });
}

#[tokio::test(start_paused = true)]
async fn backward_moves_run_the_target_on_prev_hook() {
    let surface = surface_with(&["a", "b"]);
    let calls: Arc<Mutex<Vec<&'static str>>> = Arc::default();
    let on_next = Arc::clone(&calls);
    let on_prev = Arc::clone(&calls);
    let steps = vec![
        Step::new("a", "A", "").on_prev(move |_| {
            on_prev.lock().unwrap().push("prev:a");
            Ok(())
        }),
        Step::new("b", "B", "").on_next(move |_| {
            on_next.lock().unwrap().push("next:b");
            Ok(())
        }),
    ];
    let mut tour = controller(&surface);

    tour.start(steps, 1);
    tour.settle().await;
    tour.next();
    tour.settle().await;
    tour.prev();
    tour.settle().await;

    assert_eq!(*calls.lock().unwrap(), vec!["next:b", "prev:a"]);
    assert_eq!(tour.phase(), TourPhase::Active { step: 1 });
}

#[tokio::test(start_paused = true)]
async fn failing_hook_ends_the_tour() {
    let surface = surface_with(&["a", "b"]);
    let steps = vec![
        Step::new("a", "A", ""),
        Step::new("b", "B", "")
            .on_next(|_| Err(AppError::hook(2, "dialog did not open"))),
    ];
    let mut tour = controller(&surface);

    tour.start(steps, 1);
    tour.settle().await;
    tour.next();

    assert_eq!(tour.phase(), TourPhase::Idle);
    assert_eq!(surface.highlight_count(), 0);
    assert_eq!(surface.layer_count(LayerKind::Dimmer), 0);
    assert!(!surface.is_scroll_locked());
    assert_eq!(
        tour.drain_events().last(),
        Some(&TourEvent::Exited {
            reason: ExitReason::HookFailed,
            last_step: Some(2),
        })
    );
}

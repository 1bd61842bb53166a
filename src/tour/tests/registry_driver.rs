use super::{controller, surface_with};
use crate::event::ExitReason;
use crate::registry::{self, TourExit};
use crate::surface::LayerKind;
use crate::tour::{Step, TourPhase};

fn two_steps() -> Vec<Step> {
    vec![Step::new("a", "A", ""), Step::new("b", "B", "")]
}

#[tokio::test(start_paused = true)]
async fn registry_signals_drive_a_running_controller() {
    let surface = surface_with(&["a", "b"]);
    let tour = controller(&surface);
    let mut view = tour.subscribe_view();
    let (mut registry, link) = registry::channel(two_steps());
    let driver = tokio::spawn(tour.run(link));

    let start = registry.request_start(None);
    view.wait_for(|view| view.phase == TourPhase::Active { step: 1 })
        .await
        .expect("controller alive");
    assert!(!registry.is_pending(start));

    let step = registry.request_step(2);
    view.wait_for(|view| view.phase == TourPhase::Active { step: 2 })
        .await
        .expect("controller alive");
    assert!(!registry.is_pending(step));

    registry.request_step(3);
    let exit = registry.recv_exit().await;
    assert_eq!(
        exit,
        Some(TourExit {
            reason: ExitReason::Finished,
            last_step: Some(2),
        })
    );
    assert_eq!(surface.layer_count(LayerKind::Dimmer), 0);

    drop(registry);
    driver.await.expect("driver finishes cleanly");
}

#[tokio::test(start_paused = true)]
async fn dropping_the_registry_tears_the_tour_down() {
    let surface = surface_with(&["a"]);
    let tour = controller(&surface);
    let mut view = tour.subscribe_view();
    let (mut registry, link) = registry::channel(vec![
        Step::new("a", "A", ""),
        Step::new("never", "B", ""),
    ]);
    let driver = tokio::spawn(tour.run(link));

    registry.request_start(None);
    view.wait_for(|view| view.phase == TourPhase::Active { step: 1 })
        .await
        .expect("controller alive");
    registry.request_step(2);
    view.wait_for(|view| view.phase == TourPhase::Loading { step: 2 })
        .await
        .expect("controller alive");

    drop(registry);
    driver.await.expect("driver finishes cleanly");
    assert_eq!(surface.observer_count(), 0);
    assert_eq!(surface.layer_count(LayerKind::StepContainer), 0);
    assert!(!surface.is_scroll_locked());
}

#[tokio::test(start_paused = true)]
async fn start_request_uses_the_requested_step() {
    let surface = surface_with(&["a", "b"]);
    let tour = controller(&surface);
    let mut view = tour.subscribe_view();
    let (mut registry, link) = registry::channel(two_steps());
    let driver = tokio::spawn(tour.run(link));

    registry.request_start(Some(2));
    let shown = view
        .wait_for(|view| view.is_active())
        .await
        .expect("controller alive")
        .clone();
    assert_eq!(shown.current_step_index, 2);
    assert!(shown.next_disabled);
    assert!(!shown.prev_disabled);

    drop(registry);
    driver.await.expect("driver finishes cleanly");
}

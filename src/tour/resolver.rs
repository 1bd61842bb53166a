use std::sync::Arc;
use std::time::Duration;

use futures_util::future::BoxFuture;

use crate::surface::{ElementRef, Surface};

use super::geometry::{Bounds, ViewportSize};

fn lookup<S: Surface + ?Sized>(
    surface: &S,
    primary: &str,
    alternate: Option<&str>,
) -> Option<ElementRef> {
    surface
        .query(primary)
        .or_else(|| alternate.and_then(|id| surface.query(id)))
}

/// Finds the element for `primary`, falling back to `alternate`, waiting up to
/// `timeout` for either to appear. Settles with `None` on timeout.
///
/// The change subscription and the timer both live inside this future:
/// settling or dropping it disconnects them.
pub async fn resolve<S: Surface + ?Sized>(
    surface: &S,
    primary: &str,
    alternate: Option<&str>,
    timeout: Duration,
) -> Option<ElementRef> {
    if let Some(found) = lookup(surface, primary, alternate) {
        return Some(found);
    }

    let mut changes = surface.subscribe_changes();
    // an insertion may land between the first lookup and subscribing
    if let Some(found) = lookup(surface, primary, alternate) {
        return Some(found);
    }

    let observe = async {
        while changes.changed().await {
            if let Some(found) = lookup(surface, primary, alternate) {
                return Some(found);
            }
        }
        // host dropped its notifier; only the timer can settle now
        std::future::pending::<Option<ElementRef>>().await
    };

    match tokio::time::timeout(timeout, observe).await {
        Ok(found) => found,
        Err(_) => {
            tracing::debug!(primary, ?alternate, ?timeout, "target did not appear in time");
            None
        }
    }
}

#[derive(Debug, Clone)]
pub(crate) struct ActivationRequest {
    pub(crate) generation: u64,
    /// 1-based step index.
    pub(crate) index: usize,
    pub(crate) primary: String,
    pub(crate) alternate: Option<String>,
    pub(crate) scroll_to_view: bool,
    pub(crate) timeout: Duration,
    pub(crate) settle: Duration,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct Measured {
    pub(crate) target: ElementRef,
    pub(crate) bounds: Bounds,
    pub(crate) viewport: ViewportSize,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) enum ActivationOutcome {
    Ready(Measured),
    Unreachable,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct Activation {
    pub(crate) generation: u64,
    pub(crate) index: usize,
    pub(crate) outcome: ActivationOutcome,
}

pub(crate) fn activate<S>(surface: Arc<S>, request: ActivationRequest) -> BoxFuture<'static, Activation>
where
    S: Surface + 'static,
{
    Box::pin(async move {
        let found = resolve(
            surface.as_ref(),
            &request.primary,
            request.alternate.as_deref(),
            request.timeout,
        )
        .await;

        let outcome = match found {
            Some(target) => {
                if request.scroll_to_view {
                    surface.scroll_into_view(target);
                    tokio::time::sleep(request.settle).await;
                }
                match surface.bounds(target) {
                    Some(bounds) => ActivationOutcome::Ready(Measured {
                        target,
                        bounds,
                        viewport: surface.viewport(),
                    }),
                    None => ActivationOutcome::Unreachable,
                }
            }
            None => ActivationOutcome::Unreachable,
        };

        Activation {
            generation: request.generation,
            index: request.index,
            outcome,
        }
    })
}

#[derive(Default)]
pub(crate) struct InFlight {
    pending: Option<BoxFuture<'static, Activation>>,
}

impl InFlight {
    /// Installs a new activation, dropping (and thereby cancelling) any
    /// previous one. Returns whether something was cancelled.
    pub(crate) fn replace(&mut self, activation: BoxFuture<'static, Activation>) -> bool {
        self.pending.replace(activation).is_some()
    }

    pub(crate) fn cancel(&mut self) -> bool {
        self.pending.take().is_some()
    }

    pub(crate) fn is_pending(&self) -> bool {
        self.pending.is_some()
    }

    /// Completes the pending activation. Never resolves while the slot is
    /// empty. Dropping this future leaves the activation in place.
    pub(crate) async fn wait(&mut self) -> Activation {
        match self.pending.as_mut() {
            Some(pending) => {
                let activation = pending.await;
                self.pending = None;
                activation
            }
            None => std::future::pending().await,
        }
    }
}

use crossterm::event::{Event, EventStream, KeyEventKind};
use futures_util::StreamExt;
use tokio::sync::mpsc::UnboundedSender;
use tokio::task::JoinHandle;

use crate::event::DomainEvent;

/// Background tasks feeding the event loop.
pub(crate) struct EventBusRuntime {
    tasks: Vec<JoinHandle<()>>,
}

impl EventBusRuntime {
    pub(crate) fn spawn(tx: UnboundedSender<DomainEvent>) -> Self {
        Self {
            tasks: vec![spawn_input_task(tx)],
        }
    }

    pub(crate) fn shutdown(&mut self) {
        for task in self.tasks.drain(..) {
            task.abort();
        }
    }
}

impl Drop for EventBusRuntime {
    fn drop(&mut self) {
        self.shutdown();
    }
}

fn spawn_input_task(tx: UnboundedSender<DomainEvent>) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut input = EventStream::new();
        while let Some(event) = input.next().await {
            let event = match event {
                Ok(Event::Key(key)) if key.kind == KeyEventKind::Release => continue,
                Ok(event) => DomainEvent::Input(event),
                Err(err) => DomainEvent::InputError(err.to_string()),
            };
            if tx.send(event).is_err() {
                return;
            }
        }
        tracing::debug!("terminal input stream ended");
    })
}

//! Event pump - background thread that applies host events in order.

use crate::event::HostEvent;
use crossbeam_channel::{Receiver, Sender};
use devactions_observers::LifecycleCoordinator;
use std::sync::Arc;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum PumpError {
    #[error("event pump is stopped")]
    Stopped,
}

/// Serializes host events from any number of producer threads onto one
/// dispatch thread.
pub struct EventPump {
    events: Option<Sender<HostEvent>>,
    shutdown: Option<Sender<()>>,
    handle: Option<std::thread::JoinHandle<()>>,
}

impl EventPump {
    pub fn start(coordinator: Arc<LifecycleCoordinator>) -> Self {
        let (events_tx, events_rx) = crossbeam_channel::unbounded::<HostEvent>();
        let (shutdown_tx, shutdown_rx) = crossbeam_channel::bounded::<()>(0);

        let handle = std::thread::spawn(move || {
            tracing::info!("EventPump started");
            let applied = run(&coordinator, &events_rx, &shutdown_rx);
            tracing::info!(applied, "EventPump stopped");
        });

        Self {
            events: Some(events_tx),
            shutdown: Some(shutdown_tx),
            handle: Some(handle),
        }
    }

    /// Queue an event for the dispatch thread.
    pub fn send(&self, event: HostEvent) -> Result<(), PumpError> {
        let Some(events) = &self.events else {
            return Err(PumpError::Stopped);
        };
        events.send(event).map_err(|_| PumpError::Stopped)
    }

    /// A producer handle for another thread. Sends fail once the pump stops.
    pub fn sender(&self) -> Option<Sender<HostEvent>> {
        self.events.clone()
    }

    /// Apply everything already queued, then stop the thread.
    pub fn stop(&mut self) {
        self.events.take();
        self.shutdown.take();

        if let Some(handle) = self.handle.take() {
            if handle.join().is_err() {
                tracing::warn!("EventPump thread panicked");
            }
        }
    }

    pub fn is_running(&self) -> bool {
        self.handle.is_some()
    }
}

impl Drop for EventPump {
    fn drop(&mut self) {
        self.stop();
    }
}

fn run(
    coordinator: &LifecycleCoordinator,
    events: &Receiver<HostEvent>,
    shutdown: &Receiver<()>,
) -> u64 {
    let mut applied = 0u64;
    loop {
        crossbeam_channel::select! {
            recv(events) -> event => match event {
                Ok(event) => {
                    tracing::debug!(?event, "applying host event");
                    event.apply(coordinator);
                    applied += 1;
                }
                Err(_) => break,
            },
            recv(shutdown) -> _ => {
                for event in events.try_iter() {
                    event.apply(coordinator);
                    applied += 1;
                }
                break;
            }
        }
    }
    applied
}

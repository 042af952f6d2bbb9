//! Device actions service.
//!
//! Assembles the capability vote aggregator, the action sinks and every
//! gesture observer from an [`ActionsConfig`](devactions_observers::ActionsConfig)
//! and a set of host [`Collaborators`], and feeds host notifications into
//! them, either directly or through an [`EventPump`] thread.
//!
//! # Example
//!
//! ```
//! use devactions_observers::ActionsConfig;
//! use devactions_service::{ActionsService, HostEvent, InMemoryHost};
//!
//! let host = InMemoryHost::new(0);
//! let service = ActionsService::new(ActionsConfig::default(), host.collaborators(), true)?;
//!
//! service.dispatch(&HostEvent::ScreenOff);
//! assert!(service.aggregator().published().active);
//! # Ok::<(), devactions_observers::ConfigError>(())
//! ```

mod collaborators;
mod event;
mod pump;
mod service;

pub use collaborators::{Collaborators, InMemoryHost};
pub use event::HostEvent;
pub use pump::{EventPump, PumpError};
pub use service::ActionsService;

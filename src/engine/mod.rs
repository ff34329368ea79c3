// src/engine/mod.rs

//! Orchestration engine.
//!
//! - [`core`]: pure dirty-set computation.
//! - [`dispatcher`]: runs dirty rules for a coalesced batch.
//! - [`runtime`]: the orchestrator tying startup, delegates and watching
//!   together.

pub mod core;
pub mod dispatcher;
pub mod runtime;

pub use core::DirtySet;
pub use dispatcher::{run_rule, Dispatcher};
pub use runtime::{Orchestrator, SUBSCRIPTION_NAME};

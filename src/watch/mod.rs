// src/watch/mod.rs

//! File watching and change detection.
//!
//! This module is responsible for:
//! - Compiling per-rule include/exclude glob patterns.
//! - Turning filesystem notifications into relative path batches.
//! - Coalescing bursts of batches before they reach the dispatcher.
//!
//! It does not know which rules are dirty; that is the engine's job.

pub mod coalescer;
pub mod path_utils;
pub mod patterns;
pub mod source;

pub use coalescer::{coalesce, spawn_listener, ChangeBatch, ChangeCoalescer, QUEUE_CAPACITY};
pub use patterns::RuleMatcher;
pub use source::{ChangeSource, NotifySource, Subscription, WatchNotification};

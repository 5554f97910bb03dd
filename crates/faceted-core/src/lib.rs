//! Core systems for faceted.
//!
//! This crate provides the foundational plumbing of the faceted filtering
//! engine:
//!
//! - **Signal/Slot System**: Type-safe change notification
//! - **Timers**: Host-pumped one-shot timers and a single-slot debounce
//! - **Deferred Queue**: Next-tick task processing
//!
//! Everything here is domain-free; the filtering semantics live in the
//! `faceted` crate.
//!
//! # Signal/Slot Example
//!
//! ```
//! use faceted_core::Signal;
//!
//! let visibility_changed = Signal::<bool>::new();
//!
//! let conn_id = visibility_changed.connect(|visible| {
//!     println!("now visible: {visible}");
//! });
//!
//! visibility_changed.emit(true);
//! visibility_changed.disconnect(conn_id).unwrap();
//! ```
//!
//! # Debounce Example
//!
//! ```
//! use std::time::{Duration, Instant};
//! use faceted_core::{Debounce, TimerService};
//!
//! let mut timers = TimerService::new();
//! let mut debounce = Debounce::new(Duration::from_millis(250));
//!
//! let now = Instant::now();
//! debounce.arm(&mut timers, now);
//! let shot = debounce.arm(&mut timers, now); // cancels the first shot
//!
//! for id in timers.fire_due(now + Duration::from_millis(250)) {
//!     if debounce.acknowledge(id) {
//!         // exactly one fire for the burst of arms
//!     }
//! }
//! # assert!(!debounce.is_pending());
//! # let _ = shot;
//! ```

pub mod deferred;
mod error;
pub mod logging;
pub mod signal;
pub mod timer;

pub use deferred::{DeferredQueue, DeferredTaskId};
pub use error::{CoreError, Result, SignalError, TimerError};
pub use signal::{ConnectionGuard, ConnectionId, Signal};
pub use timer::{Debounce, TimerId, TimerService};

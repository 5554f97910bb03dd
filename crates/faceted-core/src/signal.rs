//! Signal/slot system for faceted.
//!
//! This module provides a type-safe signal/slot mechanism for notifying
//! observers of state changes. Signals are emitted by owning objects when
//! their state changes, and connected slots (callbacks) are invoked in
//! response.
//!
//! Invocation is always direct: the slot runs on the emitting thread, in
//! connection order. The filtering engine built on top of this crate is
//! single-threaded and event-driven, so there is no queued or cross-thread
//! dispatch here; `Signal` is still `Send + Sync` so it can live inside
//! shared state.
//!
//! # Example
//!
//! ```
//! use faceted_core::Signal;
//!
//! let count_changed = Signal::<usize>::new();
//!
//! let conn_id = count_changed.connect(|count| {
//!     println!("count is now {count}");
//! });
//!
//! count_changed.emit(3);
//! count_changed.disconnect(conn_id).unwrap();
//! ```

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use parking_lot::Mutex;
use slotmap::{SlotMap, new_key_type};

use crate::error::SignalError;

new_key_type! {
    /// A unique identifier for a signal-slot connection.
    ///
    /// Use this ID to disconnect a specific connection via
    /// [`Signal::disconnect`]. The ID remains valid until the connection is
    /// explicitly disconnected or the signal is dropped.
    pub struct ConnectionId;
}

/// Internal storage for a single connection.
struct Connection<Args> {
    /// The slot function to invoke.
    slot: Arc<dyn Fn(&Args) + Send + Sync>,
}

/// A type-safe signal that can have multiple connected slots.
///
/// When a signal is emitted, all connected slots are invoked with a
/// reference to the provided argument, in the order they were connected.
///
/// # Type Parameter
///
/// - `Args`: The argument type passed to connected slots. Use `()` for
///   signals with no arguments, or a tuple like `(String, bool)` for
///   multiple arguments.
pub struct Signal<Args> {
    /// All active connections.
    connections: Mutex<SlotMap<ConnectionId, Connection<Args>>>,
    /// Whether signal emission is temporarily blocked.
    blocked: AtomicBool,
}

impl<Args> Default for Signal<Args> {
    fn default() -> Self {
        Self::new()
    }
}

impl<Args> Signal<Args> {
    /// Create a new signal with no connections.
    pub fn new() -> Self {
        Self {
            connections: Mutex::new(SlotMap::with_key()),
            blocked: AtomicBool::new(false),
        }
    }

    /// Connect a slot (closure) to this signal.
    ///
    /// Returns a `ConnectionId` that can be used to disconnect the slot
    /// later.
    pub fn connect<F>(&self, slot: F) -> ConnectionId
    where
        F: Fn(&Args) + Send + Sync + 'static,
    {
        let id = self.connections.lock().insert(Connection {
            slot: Arc::new(slot),
        });
        tracing::trace!(target: "faceted_core::signal", ?id, "connected slot");
        id
    }

    /// Connect a slot and receive an RAII guard that disconnects on drop.
    pub fn connect_guarded<F>(&self, slot: F) -> ConnectionGuard<'_, Args>
    where
        F: Fn(&Args) + Send + Sync + 'static,
    {
        ConnectionGuard {
            signal: self,
            id: Some(self.connect(slot)),
        }
    }

    /// Disconnect a previously connected slot.
    ///
    /// Returns an error if the connection ID is unknown or already
    /// disconnected.
    pub fn disconnect(&self, id: ConnectionId) -> Result<(), SignalError> {
        if self.connections.lock().remove(id).is_some() {
            Ok(())
        } else {
            Err(SignalError::InvalidConnection)
        }
    }

    /// Emit the signal, invoking every connected slot with `args`.
    ///
    /// Emission while the signal is [blocked](Self::block) is a silent
    /// no-op. Slots connected or disconnected *during* emission take effect
    /// on the next emit.
    pub fn emit(&self, args: Args) {
        if self.blocked.load(Ordering::Acquire) {
            return;
        }

        // Snapshot the slots so emission does not hold the lock; a slot may
        // connect or disconnect on this same signal.
        let slots: Vec<Arc<dyn Fn(&Args) + Send + Sync>> = {
            let connections = self.connections.lock();
            connections.values().map(|c| Arc::clone(&c.slot)).collect()
        };

        for slot in slots {
            slot(&args);
        }
    }

    /// Temporarily block emission. Emits while blocked are dropped.
    pub fn block(&self) {
        self.blocked.store(true, Ordering::Release);
    }

    /// Re-enable emission after a [`block`](Self::block).
    pub fn unblock(&self) {
        self.blocked.store(false, Ordering::Release);
    }

    /// Whether emission is currently blocked.
    pub fn is_blocked(&self) -> bool {
        self.blocked.load(Ordering::Acquire)
    }

    /// The number of currently connected slots.
    pub fn connection_count(&self) -> usize {
        self.connections.lock().len()
    }
}

/// RAII guard for a signal connection.
///
/// Disconnects the underlying connection when dropped. Use
/// [`release`](Self::release) to keep the connection alive past the guard.
pub struct ConnectionGuard<'a, Args> {
    signal: &'a Signal<Args>,
    id: Option<ConnectionId>,
}

impl<Args> ConnectionGuard<'_, Args> {
    /// The connection ID held by this guard.
    pub fn id(&self) -> Option<ConnectionId> {
        self.id
    }

    /// Release the connection from the guard without disconnecting it.
    pub fn release(mut self) -> Option<ConnectionId> {
        self.id.take()
    }
}

impl<Args> Drop for ConnectionGuard<'_, Args> {
    fn drop(&mut self) {
        if let Some(id) = self.id.take() {
            let _ = self.signal.disconnect(id);
        }
    }
}

static_assertions::assert_impl_all!(Signal<String>: Send, Sync);

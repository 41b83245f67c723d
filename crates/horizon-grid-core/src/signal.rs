//! Signal/slot system for Horizon Grid.
//!
//! Signals are how the grid engines report changes to whoever renders them.
//! A data view emits a signal when rows change, and every connected slot
//! (callback) is invoked with a plain data payload describing the change.
//!
//! # Key Types
//!
//! - [`Signal<Args>`] - The signal type for emitting notifications
//! - [`ConnectionId`] - Unique identifier returned when connecting a slot
//! - [`ConnectionGuard`] - RAII guard that disconnects when dropped
//!
//! # Invocation Model
//!
//! All slots run synchronously on the emitting thread, in connection order.
//! The slot list is snapshotted before invocation, so a slot may connect or
//! disconnect other slots on the same signal without deadlocking; such
//! changes take effect from the next emission.
//!
//! # Example
//!
//! ```
//! use horizon_grid_core::Signal;
//!
//! let row_count_changed = Signal::<(usize, usize)>::new();
//!
//! let conn_id = row_count_changed.connect(|(previous, current)| {
//!     println!("rows: {previous} -> {current}");
//! });
//!
//! row_count_changed.emit((3, 2));
//! row_count_changed.disconnect(conn_id);
//! ```

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use parking_lot::Mutex;
use slotmap::{SlotMap, new_key_type};

use crate::error::SignalError;
use crate::logging::targets;

new_key_type! {
    /// A unique identifier for a signal-slot connection.
    ///
    /// Use this ID to disconnect a specific connection via [`Signal::disconnect`].
    /// The ID remains valid until the connection is explicitly disconnected or
    /// the signal is dropped.
    pub struct ConnectionId;
}

type Slot<Args> = Arc<dyn Fn(&Args) + Send + Sync>;

/// A type-safe signal that can have multiple connected slots.
///
/// # Type Parameter
///
/// - `Args`: The payload passed to connected slots. Use `()` for signals
///   with no payload, or a struct for anything richer.
///
/// # Thread Safety
///
/// `Signal<Args>` is `Send + Sync`; connections are guarded by a mutex, and
/// the lock is never held while a slot runs.
pub struct Signal<Args> {
    connections: Mutex<SlotMap<ConnectionId, Slot<Args>>>,
    blocked: AtomicBool,
}

static_assertions::assert_impl_all!(Signal<()>: Send, Sync);

impl<Args: 'static> Default for Signal<Args> {
    fn default() -> Self {
        Self::new()
    }
}

impl<Args: 'static> std::fmt::Debug for Signal<Args> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Signal")
            .field("connections", &self.connection_count())
            .field("blocked", &self.is_blocked())
            .finish()
    }
}

impl<Args: 'static> Signal<Args> {
    /// Create a new signal with no connections.
    pub fn new() -> Self {
        Self {
            connections: Mutex::new(SlotMap::with_key()),
            blocked: AtomicBool::new(false),
        }
    }

    /// Connect a slot (closure) to this signal.
    ///
    /// Returns a `ConnectionId` that can be used to disconnect the slot later.
    ///
    /// # Example
    ///
    /// ```
    /// use horizon_grid_core::Signal;
    ///
    /// let signal = Signal::<Vec<usize>>::new();
    /// let id = signal.connect(|rows| println!("changed: {rows:?}"));
    /// signal.emit(vec![1, 4]);
    /// ```
    pub fn connect<F>(&self, slot: F) -> ConnectionId
    where
        F: Fn(&Args) + Send + Sync + 'static,
    {
        self.connections.lock().insert(Arc::new(slot))
    }

    /// Connect a slot with automatic disconnection when the guard is dropped.
    pub fn connect_scoped<F>(&self, slot: F) -> ConnectionGuard<'_, Args>
    where
        F: Fn(&Args) + Send + Sync + 'static,
    {
        let id = self.connect(slot);
        ConnectionGuard { signal: self, id }
    }

    /// Disconnect a specific slot by its connection ID.
    ///
    /// Returns `true` if the connection was found and removed, `false` otherwise.
    pub fn disconnect(&self, id: ConnectionId) -> bool {
        self.connections.lock().remove(id).is_some()
    }

    /// Disconnect a slot, reporting an unknown ID as an error.
    pub fn try_disconnect(&self, id: ConnectionId) -> Result<(), SignalError> {
        if self.disconnect(id) {
            Ok(())
        } else {
            Err(SignalError::InvalidConnection)
        }
    }

    /// Disconnect all slots from this signal.
    pub fn disconnect_all(&self) {
        self.connections.lock().clear();
    }

    /// Get the number of connected slots.
    pub fn connection_count(&self) -> usize {
        self.connections.lock().len()
    }

    /// Block signal emission temporarily.
    ///
    /// While blocked, calls to `emit()` do nothing.
    pub fn set_blocked(&self, blocked: bool) {
        self.blocked.store(blocked, Ordering::SeqCst);
    }

    /// Check if signal emission is currently blocked.
    pub fn is_blocked(&self) -> bool {
        self.blocked.load(Ordering::SeqCst)
    }

    /// Emit the signal, invoking all connected slots in connection order.
    ///
    /// If the signal is blocked, this does nothing.
    #[tracing::instrument(skip_all, target = "horizon_grid_core::signal", level = "trace")]
    pub fn emit(&self, args: Args) {
        if self.is_blocked() {
            tracing::trace!(target: targets::SIGNAL, "signal blocked, skipping emit");
            return;
        }

        let slots: Vec<Slot<Args>> = self.connections.lock().values().cloned().collect();
        tracing::trace!(target: targets::SIGNAL, connection_count = slots.len(), "emitting signal");

        for slot in slots {
            slot(&args);
        }
    }
}

/// A connection guard that automatically disconnects when dropped.
///
/// Created via [`Signal::connect_scoped`]. The guard borrows the signal, so
/// the borrow checker guarantees the signal outlives it.
///
/// # Example
///
/// ```
/// use horizon_grid_core::Signal;
/// use std::sync::atomic::{AtomicI32, Ordering};
/// use std::sync::Arc;
///
/// let signal = Signal::<i32>::new();
/// let counter = Arc::new(AtomicI32::new(0));
/// {
///     let counter_clone = counter.clone();
///     let _guard = signal.connect_scoped(move |&n| {
///         counter_clone.fetch_add(n, Ordering::SeqCst);
///     });
///     signal.emit(42);
/// }
/// signal.emit(43);
/// assert_eq!(counter.load(Ordering::SeqCst), 42);
/// ```
pub struct ConnectionGuard<'a, Args: 'static> {
    signal: &'a Signal<Args>,
    id: ConnectionId,
}

impl<Args: 'static> ConnectionGuard<'_, Args> {
    /// The ID of the guarded connection.
    pub fn id(&self) -> ConnectionId {
        self.id
    }
}

impl<Args: 'static> Drop for ConnectionGuard<'_, Args> {
    fn drop(&mut self) {
        self.signal.disconnect(self.id);
    }
}

//! Signal/slot events
//!
//! An [`Event`] keeps its handlers in connection order and calls all of them
//! synchronously on [`Event::emit`]. Emission iterates a snapshot of the
//! handler list taken when `emit` starts, with the lock released, so handlers
//! may connect and disconnect handlers of the same event:
//!
//! - a handler disconnected during an emission is not called by that
//!   emission if it has not run yet;
//! - a handler connected during an emission is first called by the next one.
//!
//! [`DynamicEvent`] wraps an `Event<Vec<Value>>` with a [`Signature`] so that
//! it can be emitted by name through the object model.

use std::fmt;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;

use parking_lot::Mutex;
use tracing::warn;

use crate::error::RttiResult;
use crate::params::{ParamPack, Signature};
use crate::types::Value;

/// Unique identifier of an event handler
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub struct HandlerId(u64);

static NEXT_HANDLER_ID: AtomicU64 = AtomicU64::new(1);

impl HandlerId {
    fn next() -> Self {
        HandlerId(NEXT_HANDLER_ID.fetch_add(1, Ordering::Relaxed))
    }

    /// Numeric id value
    pub fn as_u64(self) -> u64 {
        self.0
    }
}

/// A callback that can be connected to events with argument type `A`
///
/// Clones share one identity: disconnecting a clone disconnects the
/// handler it was cloned from.
pub struct EventHandler<A> {
    id: HandlerId,
    callback: Arc<dyn Fn(&A) + Send + Sync>,
}

impl<A> EventHandler<A> {
    /// Wrap a callback
    pub fn new(callback: impl Fn(&A) + Send + Sync + 'static) -> Self {
        Self {
            id: HandlerId::next(),
            callback: Arc::new(callback),
        }
    }

    /// Identity of this handler
    pub fn id(&self) -> HandlerId {
        self.id
    }

    /// Invoke the callback directly
    pub fn call(&self, args: &A) {
        (self.callback)(args)
    }
}

impl<A> Clone for EventHandler<A> {
    fn clone(&self) -> Self {
        Self {
            id: self.id,
            callback: self.callback.clone(),
        }
    }
}

impl<A> fmt::Debug for EventHandler<A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventHandler").field("id", &self.id).finish()
    }
}

struct Connection<A> {
    handler: EventHandler<A>,
    connected: AtomicBool,
}

/// Ordered list of connected handlers
pub struct Event<A> {
    connections: Mutex<Vec<Arc<Connection<A>>>>,
}

impl<A> Event<A> {
    /// Create an event without handlers
    pub fn new() -> Self {
        Self {
            connections: Mutex::new(Vec::new()),
        }
    }

    /// Append a handler; connecting the same handler twice calls it twice
    pub fn connect(&self, handler: &EventHandler<A>) {
        self.connections.lock().push(Arc::new(Connection {
            handler: handler.clone(),
            connected: AtomicBool::new(true),
        }));
    }

    /// Wrap a closure into a handler and connect it
    pub fn connect_fn(&self, callback: impl Fn(&A) + Send + Sync + 'static) -> EventHandler<A> {
        let handler = EventHandler::new(callback);
        self.connect(&handler);
        handler
    }

    /// Remove the earliest connection of this handler
    ///
    /// Returns `false` if the handler was not connected.
    pub fn disconnect(&self, handler: &EventHandler<A>) -> bool {
        let mut connections = self.connections.lock();
        match connections.iter().position(|c| c.handler.id == handler.id) {
            Some(index) => {
                let conn = connections.remove(index);
                conn.connected.store(false, Ordering::Release);
                true
            }
            None => false,
        }
    }

    /// Remove every handler
    pub fn disconnect_all(&self) {
        let drained: Vec<_> = self.connections.lock().drain(..).collect();
        for conn in drained {
            conn.connected.store(false, Ordering::Release);
        }
    }

    /// Number of connections, duplicates included
    pub fn handler_count(&self) -> usize {
        self.connections.lock().len()
    }

    /// Whether the handler is connected at least once
    pub fn is_connected(&self, handler: &EventHandler<A>) -> bool {
        self.connections.lock().iter().any(|c| c.handler.id == handler.id)
    }

    /// Call every connected handler in connection order
    pub fn emit(&self, args: &A) {
        let snapshot: Vec<Arc<Connection<A>>> = self.connections.lock().clone();
        for conn in snapshot {
            if conn.connected.load(Ordering::Acquire) {
                conn.handler.call(args);
            }
        }
    }
}

impl<A> Default for Event<A> {
    fn default() -> Self {
        Self::new()
    }
}

impl<A> fmt::Debug for Event<A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Event")
            .field("handlers", &self.handler_count())
            .finish()
    }
}

/// An event with a runtime signature, emitted with dynamic values
pub struct DynamicEvent {
    signature: Signature,
    inner: Event<Vec<Value>>,
}

impl DynamicEvent {
    /// Create an event with the given signature
    pub fn new(signature: Signature) -> Self {
        Self {
            signature,
            inner: Event::new(),
        }
    }

    /// Create an event for the typed parameter pack `A`
    pub fn typed<A: ParamPack>() -> Self {
        Self::new(Signature::of::<(), A>())
    }

    /// Signature of the event (return type is always `void`)
    pub fn signature(&self) -> &Signature {
        &self.signature
    }

    /// Underlying untyped event
    pub fn event(&self) -> &Event<Vec<Value>> {
        &self.inner
    }

    /// Connect a handler receiving the checked argument list
    pub fn connect(&self, handler: &EventHandler<Vec<Value>>) {
        self.inner.connect(handler)
    }

    /// Connect a closure receiving the checked argument list
    pub fn connect_fn(
        &self,
        callback: impl Fn(&Vec<Value>) + Send + Sync + 'static,
    ) -> EventHandler<Vec<Value>> {
        self.inner.connect_fn(callback)
    }

    /// Connect a closure receiving the typed parameter pack `A`
    ///
    /// Emissions whose arguments do not convert into `A` skip this handler.
    pub fn connect_typed<A, F>(&self, callback: F) -> EventHandler<Vec<Value>>
    where
        A: ParamPack + 'static,
        F: Fn(A) + Send + Sync + 'static,
    {
        self.inner.connect_fn(move |args| match A::from_values(args) {
            Ok(pack) => callback(pack),
            Err(err) => warn!(error = %err, "typed event handler skipped"),
        })
    }

    /// Disconnect a handler
    pub fn disconnect(&self, handler: &EventHandler<Vec<Value>>) -> bool {
        self.inner.disconnect(handler)
    }

    /// Remove every handler
    pub fn disconnect_all(&self) {
        self.inner.disconnect_all()
    }

    /// Number of connections
    pub fn handler_count(&self) -> usize {
        self.inner.handler_count()
    }

    /// Check the arguments against the signature and emit
    pub fn emit(&self, args: &[Value]) -> RttiResult<()> {
        let args = self.signature.check_args(args, false)?;
        self.inner.emit(&args);
        Ok(())
    }

    /// Parse a parameter string through the signature and emit
    pub fn emit_str(&self, params: &str) -> RttiResult<()> {
        let args = self.signature.parse_args(params)?;
        self.inner.emit(&args);
        Ok(())
    }

    /// Emit a typed parameter pack
    pub fn emit_typed<A: ParamPack>(&self, args: A) -> RttiResult<()> {
        self.emit(&args.into_values())
    }
}

impl fmt::Debug for DynamicEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DynamicEvent")
            .field("signature", &self.signature.to_string())
            .field("handlers", &self.handler_count())
            .finish()
    }
}

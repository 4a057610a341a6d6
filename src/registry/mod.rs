//! Per-root bookkeeping of registered nodes and observer bindings.
//!
//! Nodes and observers live in slot arenas keyed by stable handles, so
//! registration and removal cost the same at any nesting depth and a stale
//! handle is detected instead of aliasing a newer entry.

mod core;

pub use self::core::{
    Delivery, DeliveryOutcome, FanOut, GridObserver, NodeHandle, ObserverBinding, ObserverHandle,
    RegisteredNode, SubscriptionRegistry,
};

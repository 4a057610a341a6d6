use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

/// Process-wide scoped identity of a layout root. Never reused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RootId(u64);

impl RootId {
    pub fn get(&self) -> u64 {
        self.0
    }

    /// Class name scoping every style generated for this root.
    pub fn class_name(&self) -> String {
        format!("cbg-{}", self.0)
    }
}

impl fmt::Display for RootId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Monotonic id source.
#[derive(Debug)]
pub struct IdCounter {
    next: AtomicU64,
}

/// Counter used by [`LayoutRoot::new`](super::LayoutRoot::new).
pub static ROOT_IDS: IdCounter = IdCounter::new();

impl IdCounter {
    pub const fn new() -> Self {
        Self {
            next: AtomicU64::new(1),
        }
    }

    pub fn next(&self) -> RootId {
        RootId(self.next.fetch_add(1, Ordering::Relaxed))
    }

    /// Id the next call to [`IdCounter::next`] will hand out.
    pub fn peek(&self) -> RootId {
        RootId(self.next.load(Ordering::Relaxed))
    }

    /// Restart numbering. Only meaningful for counters no live root came from.
    pub fn reset(&self) {
        self.next.store(1, Ordering::Relaxed);
    }
}

impl Default for IdCounter {
    fn default() -> Self {
        Self::new()
    }
}

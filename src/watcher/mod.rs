//! Viewport width plumbing for mounted roots.
//!
//! A [`ViewportWatcher`] holds the one resize listener a root registers with
//! its host and turns each width signal into at most one breakpoint
//! transition.

mod core;
mod source;

pub use self::core::{ListenerToken, ViewportHost, ViewportWatcher};
pub use self::source::{FallbackWidth, NoViewport, SharedWidth, WidthSource};

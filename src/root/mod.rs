//! Layout roots: the unit of configuration, registration and breakpoint state.

mod core;
mod id;

pub use self::core::{ChangeCallback, LayoutRoot, Transition};
pub use self::id::{IdCounter, ROOT_IDS, RootId};

//! Breakpoint tables and width resolution.
//!
//! A breakpoint is the number of columns available at a viewport tier. The
//! resolver picks the largest configured tier whose threshold the viewport
//! reaches, floors to the smallest tier below that, and treats a missing
//! viewport as an unbounded screen.

mod core;

pub use self::core::{Breakpoint, BreakpointTable, FlexPolicy, resolve};

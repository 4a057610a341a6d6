//! Declared grid trees and the geometry computed for them.
//!
//! Callers describe rows and columns with [`LayoutNode`]; a
//! [`LayoutRoot`](crate::root::LayoutRoot) registers the tree and asks the
//! [`GeometryCalculator`] for widths, offsets and pixel extents whenever the
//! active breakpoint changes.

mod core;
mod geometry;

pub use self::core::{LayoutNode, NodeId, NodeKind};
pub use self::geometry::{CellShare, Geometry, GeometryCalculator, ObservedGrid};

//! Column pitch arithmetic.
//!
//! A grid is described by the width of one cell and the gutter that follows
//! it. Every pixel figure the engine produces derives from these two numbers.

mod core;

pub use self::core::UnitModel;

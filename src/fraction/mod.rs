//! Exact column shares and their percentage rendering.

mod core;

pub use self::core::{Fraction, Percent};
pub(crate) use self::core::trim_number;

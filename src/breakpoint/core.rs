use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::error::{LayoutError, Result};
use crate::unit::UnitModel;

/// Total number of columns available at a viewport tier.
pub type Breakpoint = u32;

/// Strictly ascending, non-empty list of breakpoints.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<Breakpoint>", into = "Vec<Breakpoint>")]
pub struct BreakpointTable {
    values: Vec<Breakpoint>,
}

impl BreakpointTable {
    pub fn new(values: Vec<Breakpoint>) -> Result<Self> {
        if values.is_empty() {
            return Err(LayoutError::EmptyBreakpoints);
        }
        if values.contains(&0) {
            return Err(LayoutError::ZeroBreakpoint);
        }
        if let Some(pair) = values.windows(2).find(|pair| pair[0] >= pair[1]) {
            return Err(LayoutError::UnorderedBreakpoints {
                previous: pair[0],
                next: pair[1],
            });
        }
        Ok(Self { values })
    }

    pub fn smallest(&self) -> Breakpoint {
        self.values[0]
    }

    pub fn largest(&self) -> Breakpoint {
        self.values[self.values.len() - 1]
    }

    /// Smallest entry strictly greater than `breakpoint`.
    pub fn next_above(&self, breakpoint: Breakpoint) -> Option<Breakpoint> {
        let idx = self.values.partition_point(|value| *value <= breakpoint);
        self.values.get(idx).copied()
    }

    pub fn contains(&self, breakpoint: Breakpoint) -> bool {
        self.values.binary_search(&breakpoint).is_ok()
    }

    pub fn iter(&self) -> impl Iterator<Item = Breakpoint> + '_ {
        self.values.iter().copied()
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn as_slice(&self) -> &[Breakpoint] {
        &self.values
    }
}

impl TryFrom<Vec<Breakpoint>> for BreakpointTable {
    type Error = LayoutError;

    fn try_from(values: Vec<Breakpoint>) -> Result<Self> {
        Self::new(values)
    }
}

impl From<BreakpointTable> for Vec<Breakpoint> {
    fn from(table: BreakpointTable) -> Self {
        table.values
    }
}

/// Resolve a viewport width to a breakpoint.
///
/// Widths below the smallest threshold floor to the smallest breakpoint. With
/// no width, `fallback` is used when given, otherwise the largest breakpoint.
pub fn resolve(
    width: Option<f64>,
    table: &BreakpointTable,
    unit: &UnitModel,
    fallback: Option<Breakpoint>,
) -> Breakpoint {
    let Some(width) = width.filter(|w| w.is_finite()) else {
        return fallback.unwrap_or_else(|| table.largest());
    };

    table
        .iter()
        .take_while(|bp| width >= unit.threshold(*bp))
        .last()
        .unwrap_or_else(|| table.smallest())
}

/// Breakpoints at which a root lets extents grow toward the next tier.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FlexPolicy {
    Enabled(bool),
    At(BTreeSet<Breakpoint>),
}

impl Default for FlexPolicy {
    fn default() -> Self {
        Self::Enabled(false)
    }
}

impl FlexPolicy {
    pub fn never() -> Self {
        Self::Enabled(false)
    }

    pub fn always() -> Self {
        Self::Enabled(true)
    }

    pub fn at(breakpoints: impl IntoIterator<Item = Breakpoint>) -> Self {
        Self::At(breakpoints.into_iter().collect())
    }

    pub fn applies_at(&self, breakpoint: Breakpoint) -> bool {
        match self {
            Self::Enabled(enabled) => *enabled,
            Self::At(set) => set.contains(&breakpoint),
        }
    }

    /// Every explicit breakpoint must exist in `table`.
    pub fn validate(&self, table: &BreakpointTable) -> Result<()> {
        if let Self::At(set) = self {
            if let Some(unknown) = set.iter().find(|bp| !table.contains(**bp)) {
                return Err(LayoutError::UnknownFlexBreakpoint(*unknown));
            }
        }
        Ok(())
    }
}

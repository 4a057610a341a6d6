//! Root configuration surface.
//!
//! `GridConfig` is plain data so it can come from JSON; validation turns it
//! into the unit model, breakpoint table and flex policy a root runs on.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::breakpoint::{Breakpoint, BreakpointTable, FlexPolicy};
use crate::error::{LayoutError, Result};
use crate::unit::UnitModel;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GridConfig {
    /// Width of one cell in pixels.
    #[serde(alias = "cellWidth", alias = "columnWidth")]
    pub cell_width: f64,
    /// Gutter following each cell in pixels.
    #[serde(alias = "gutterWidth")]
    pub gutter_width: f64,
    /// Column counts, strictly ascending.
    pub breakpoints: Vec<Breakpoint>,
    /// `true`, `false` or the breakpoints at which extents may grow.
    pub flexible: FlexPolicy,
    /// Breakpoint to start at, and to use when no viewport is available.
    #[serde(alias = "initialBreakpoint", skip_serializing_if = "Option::is_none")]
    pub initial_breakpoint: Option<Breakpoint>,
}

impl Default for GridConfig {
    fn default() -> Self {
        Self {
            cell_width: 60.0,
            gutter_width: 20.0,
            breakpoints: vec![4, 8, 12, 16],
            flexible: FlexPolicy::default(),
            initial_breakpoint: None,
        }
    }
}

/// Validated pieces of a [`GridConfig`].
#[derive(Debug, Clone)]
pub(crate) struct Settings {
    pub unit: UnitModel,
    pub table: BreakpointTable,
    pub flexible: FlexPolicy,
    pub initial_breakpoint: Option<Breakpoint>,
}

impl GridConfig {
    pub fn from_json_str(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let text = fs::read_to_string(path)?;
        Self::from_json_str(&text)
    }

    pub fn with_cell_width(mut self, width: f64) -> Self {
        self.cell_width = width;
        self
    }

    pub fn with_gutter_width(mut self, width: f64) -> Self {
        self.gutter_width = width;
        self
    }

    pub fn with_breakpoints(mut self, breakpoints: impl IntoIterator<Item = Breakpoint>) -> Self {
        self.breakpoints = breakpoints.into_iter().collect();
        self
    }

    pub fn with_flexible(mut self, flexible: FlexPolicy) -> Self {
        self.flexible = flexible;
        self
    }

    pub fn with_initial_breakpoint(mut self, breakpoint: Breakpoint) -> Self {
        self.initial_breakpoint = Some(breakpoint);
        self
    }

    /// Check every field, failing on the first problem.
    pub fn validate(&self) -> Result<()> {
        self.settings().map(|_| ())
    }

    pub(crate) fn settings(&self) -> Result<Settings> {
        let unit = UnitModel::new(self.cell_width, self.gutter_width)?;
        let table = BreakpointTable::new(self.breakpoints.clone())?;
        self.flexible.validate(&table)?;
        if let Some(initial) = self.initial_breakpoint {
            if !table.contains(initial) {
                return Err(LayoutError::UnknownInitialBreakpoint(initial));
            }
        }
        Ok(Settings {
            unit,
            table,
            flexible: self.flexible.clone(),
            initial_breakpoint: self.initial_breakpoint,
        })
    }
}

use serde::Serialize;

use crate::breakpoint::{Breakpoint, BreakpointTable, FlexPolicy};
use crate::fraction::{Fraction, Percent};
use crate::unit::UnitModel;

/// Column fractions as seen from its container and from the root.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CellShare {
    /// Width relative to the direct container.
    pub width: Fraction,
    /// Offset relative to the direct container.
    pub offset: Fraction,
    /// Width relative to the root: `width` times every enclosing column's width.
    pub share: Fraction,
}

impl CellShare {
    pub fn root() -> Self {
        Self {
            width: Fraction::WHOLE,
            offset: Fraction::ZERO,
            share: Fraction::WHOLE,
        }
    }

    pub fn nested(width: Fraction, offset: Fraction, parent_share: Fraction) -> Self {
        Self {
            width,
            offset,
            share: width.of(parent_share),
        }
    }
}

/// Rendered size of a column at one breakpoint.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Geometry {
    pub breakpoint: Breakpoint,
    pub width: Percent,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub offset: Option<Percent>,
    /// Columns spanned at `breakpoint`; may be fractional.
    pub units: f64,
    pub min_pixel_width: f64,
    pub max_pixel_width: f64,
    pub flexible: bool,
}

/// Props handed to an observer.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ObservedGrid {
    pub breakpoint: Breakpoint,
    pub col_width: f64,
    pub col_min_pixel_width: f64,
    pub col_max_pixel_width: f64,
}

impl From<&Geometry> for ObservedGrid {
    fn from(geometry: &Geometry) -> Self {
        Self {
            breakpoint: geometry.breakpoint,
            col_width: geometry.units,
            col_min_pixel_width: geometry.min_pixel_width,
            col_max_pixel_width: geometry.max_pixel_width,
        }
    }
}

/// Pure geometry over one root's unit model, table and flex policy.
#[derive(Debug, Clone, Copy)]
pub struct GeometryCalculator<'a> {
    unit: &'a UnitModel,
    table: &'a BreakpointTable,
    flexible: &'a FlexPolicy,
}

impl<'a> GeometryCalculator<'a> {
    pub fn new(unit: &'a UnitModel, table: &'a BreakpointTable, flexible: &'a FlexPolicy) -> Self {
        Self {
            unit,
            table,
            flexible,
        }
    }

    /// Breakpoint whose size bounds growth at `breakpoint`, if any.
    ///
    /// Only when flex applies and a larger tier exists; the top tier never grows.
    pub fn headroom(&self, breakpoint: Breakpoint) -> Option<Breakpoint> {
        if !self.flexible.applies_at(breakpoint) {
            return None;
        }
        self.table.next_above(breakpoint)
    }

    pub fn compute(&self, cell: &CellShare, breakpoint: Breakpoint) -> Geometry {
        let units = cell.share.units_of(breakpoint);
        let min_pixel_width = self.unit.pixels(units);
        let headroom = self.headroom(breakpoint);
        let max_pixel_width = headroom
            .map(|next| self.unit.pixels(cell.share.units_of(next)))
            .unwrap_or(min_pixel_width);

        Geometry {
            breakpoint,
            width: cell.width.to_percent(),
            offset: (!cell.offset.is_zero()).then(|| cell.offset.to_percent()),
            units,
            min_pixel_width,
            max_pixel_width,
            flexible: headroom.is_some(),
        }
    }

    /// Maximum extent of a top-level row at `breakpoint`.
    ///
    /// Rows carry half a gutter of negative margin on each side, so the full
    /// span is the tier threshold rather than the cell-plus-inner-gutter sum.
    pub fn container_max_extent(&self, breakpoint: Breakpoint) -> f64 {
        let bound = self.headroom(breakpoint).unwrap_or(breakpoint);
        self.unit.threshold(bound)
    }
}

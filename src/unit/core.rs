use serde::{Deserialize, Serialize};

use crate::breakpoint::Breakpoint;
use crate::error::{LayoutError, Result};

/// Cell and gutter widths for one layout root.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawUnit")]
pub struct UnitModel {
    cell_width: f64,
    gutter_width: f64,
}

#[derive(Deserialize)]
struct RawUnit {
    cell_width: f64,
    gutter_width: f64,
}

impl TryFrom<RawUnit> for UnitModel {
    type Error = LayoutError;

    fn try_from(raw: RawUnit) -> Result<Self> {
        Self::new(raw.cell_width, raw.gutter_width)
    }
}

impl UnitModel {
    pub fn new(cell_width: f64, gutter_width: f64) -> Result<Self> {
        if !cell_width.is_finite() || cell_width <= 0.0 {
            return Err(LayoutError::InvalidCellWidth(cell_width));
        }
        if !gutter_width.is_finite() || gutter_width < 0.0 {
            return Err(LayoutError::InvalidGutterWidth(gutter_width));
        }
        Ok(Self {
            cell_width,
            gutter_width,
        })
    }

    pub fn cell_width(&self) -> f64 {
        self.cell_width
    }

    pub fn gutter_width(&self) -> f64 {
        self.gutter_width
    }

    /// Width of one column including its trailing gutter.
    pub fn pitch(&self) -> f64 {
        self.cell_width + self.gutter_width
    }

    /// Viewport width at which `breakpoint` columns start to fit.
    pub fn threshold(&self, breakpoint: Breakpoint) -> f64 {
        breakpoint as f64 * self.pitch()
    }

    /// Number of whole columns a viewport of `width` pixels can hold.
    pub fn columns_for(&self, width: f64) -> u32 {
        if !width.is_finite() || width <= 0.0 {
            return 0;
        }
        (width / self.pitch()).floor() as u32
    }

    /// Pixels spanned by `units` columns and the gutters between them.
    pub fn pixels(&self, units: f64) -> f64 {
        if units <= 0.0 {
            return 0.0;
        }
        units * self.cell_width + (units - 1.0).max(0.0) * self.gutter_width
    }

    /// Half a gutter: column padding and the matching negative row margin.
    pub fn half_gutter(&self) -> f64 {
        self.gutter_width / 2.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn unit() -> UnitModel {
        UnitModel::new(80.0, 20.0).unwrap()
    }

    #[test]
    fn thresholds_scale_with_pitch() {
        let unit = unit();
        assert_eq!(unit.pitch(), 100.0);
        assert_eq!(unit.threshold(5), 500.0);
        assert_eq!(unit.threshold(15), 1500.0);
        assert_eq!(unit.columns_for(1499.0), 14);
        assert_eq!(unit.columns_for(-3.0), 0);
    }

    #[test]
    fn pixels_count_internal_gutters_only() {
        let unit = unit();
        assert_eq!(unit.pixels(0.0), 0.0);
        assert_eq!(unit.pixels(1.0), 80.0);
        assert_eq!(unit.pixels(2.0), 180.0);
        assert_eq!(unit.pixels(3.0), 280.0);
        assert_eq!(unit.pixels(7.5), 730.0);
    }

    #[test]
    fn fractional_unit_below_one_has_no_gutter() {
        assert_eq!(unit().pixels(0.5), 40.0);
    }

    #[test]
    fn rejects_bad_widths() {
        assert!(matches!(
            UnitModel::new(0.0, 20.0),
            Err(LayoutError::InvalidCellWidth(_))
        ));
        assert!(matches!(
            UnitModel::new(80.0, -1.0),
            Err(LayoutError::InvalidGutterWidth(_))
        ));
        assert!(UnitModel::new(f64::NAN, 0.0).is_err());
    }

    #[test]
    fn deserialize_validates_widths() {
        let unit: UnitModel =
            serde_json::from_str(r#"{"cell_width":80.0,"gutter_width":20.0}"#).unwrap();
        assert_eq!(unit.pitch(), 100.0);
        for json in [
            r#"{"cell_width":0.0,"gutter_width":-5.0}"#,
            r#"{"cell_width":80.0,"gutter_width":-5.0}"#,
        ] {
            assert!(serde_json::from_str::<UnitModel>(json).is_err(), "{json}");
        }
    }
}

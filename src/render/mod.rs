//! Class names, inline styles and the scoped stylesheet for a root.

mod core;

pub use self::core::{
    COL_CLASS, CssRenderer, ROW_CLASS, RendererSettings, column_style, render_markup, row_style,
    stylesheet,
};

use std::fmt::Write as _;
use std::io::Write;

use blake3::Hash;

use crate::error::Result;
use crate::fraction::trim_number;
use crate::layout::{Geometry, NodeKind};
use crate::registry::NodeHandle;
use crate::root::LayoutRoot;

pub const ROW_CLASS: &str = "cb-row";
pub const COL_CLASS: &str = "cb-col";

/// Gutter rules scoped to the root's class.
///
/// Columns pad half a gutter on each side; rows pull back out by the same
/// amount so the outer columns line up with the container edge.
pub fn stylesheet(root: &LayoutRoot) -> String {
    let scope = root.class_name();
    let half = trim_number(root.unit().half_gutter());
    format!(
        ".{scope} .{ROW_CLASS}{{margin-left:-{half}px;margin-right:-{half}px}}\
         .{scope} .{COL_CLASS}{{padding-left:{half}px;padding-right:{half}px}}"
    )
}

pub fn column_style(geometry: &Geometry) -> String {
    let mut style = format!("width:{};", geometry.width);
    if let Some(offset) = geometry.offset {
        let _ = write!(style, "margin-left:{offset};");
    }
    style
}

pub fn row_style(max_extent: Option<f64>) -> String {
    max_extent
        .map(|px| format!("max-width:{}px;", trim_number(px)))
        .unwrap_or_default()
}

/// Static markup for everything mounted in `root`, in registration order.
pub fn render_markup(root: &LayoutRoot) -> String {
    let mut html = format!(
        "<div class=\"{}\"><style>{}</style>",
        root.class_name(),
        stylesheet(root)
    );
    for handle in root.registry().top_level() {
        render_node(root, *handle, &mut html);
    }
    html.push_str("</div>");
    html
}

fn render_node(root: &LayoutRoot, handle: NodeHandle, html: &mut String) {
    let Some(node) = root.registry().node(handle) else {
        return;
    };
    let (class, style) = match node.kind {
        NodeKind::Row => (ROW_CLASS, row_style(root.row_max_extent(handle))),
        NodeKind::Column => (
            COL_CLASS,
            node.geometry.as_ref().map(column_style).unwrap_or_default(),
        ),
    };
    let _ = write!(html, "<div class=\"{class}\"");
    if !style.is_empty() {
        let _ = write!(html, " style=\"{style}\"");
    }
    html.push('>');
    for child in node.children() {
        render_node(root, *child, html);
    }
    html.push_str("</div>");
}

/// Renderer runtime parameters.
#[derive(Debug, Clone)]
pub struct RendererSettings {
    /// Wrap emitted CSS in a `<style>` element.
    pub style_tag: bool,
}

impl Default for RendererSettings {
    fn default() -> Self {
        Self { style_tag: true }
    }
}

/// Writes a root's stylesheet, skipping output identical to the last write.
pub struct CssRenderer {
    settings: RendererSettings,
    last: Option<Hash>,
}

impl CssRenderer {
    pub fn new(settings: RendererSettings) -> Self {
        Self {
            settings,
            last: None,
        }
    }

    pub fn with_default() -> Self {
        Self::new(RendererSettings::default())
    }

    pub fn settings_mut(&mut self) -> &mut RendererSettings {
        &mut self.settings
    }

    /// Returns whether anything was written.
    pub fn render(&mut self, writer: &mut impl Write, root: &LayoutRoot) -> Result<bool> {
        let css = stylesheet(root);
        let digest = blake3::hash(css.as_bytes());
        if self.last == Some(digest) {
            return Ok(false);
        }

        if self.settings.style_tag {
            write!(writer, "<style>{css}</style>")?;
        } else {
            writer.write_all(css.as_bytes())?;
        }
        writer.flush()?;
        self.last = Some(digest);
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::GridConfig;
    use crate::layout::LayoutNode;

    fn root(gutter: f64) -> LayoutRoot {
        LayoutRoot::new(
            GridConfig::default()
                .with_cell_width(80.0)
                .with_gutter_width(gutter)
                .with_breakpoints([5, 10, 15]),
        )
        .unwrap()
    }

    #[test]
    fn stylesheet_uses_half_gutter() {
        let root = root(100.0);
        let css = stylesheet(&root);
        assert!(css.contains("padding-left:50px"));
        assert!(css.contains("padding-right:50px"));
        assert!(css.contains("margin-left:-50px"));
        assert!(css.contains("margin-right:-50px"));
        assert!(css.starts_with(&format!(".{} .cb-row", root.class_name())));
    }

    #[test]
    fn odd_gutter_keeps_fraction() {
        assert!(stylesheet(&root(15.0)).contains("padding-left:7.5px"));
    }

    #[test]
    fn renderer_skips_unchanged_css() {
        let root = root(20.0);
        let mut renderer = CssRenderer::with_default();
        let mut output = Vec::new();
        assert!(renderer.render(&mut output, &root).unwrap());
        assert!(!renderer.render(&mut output, &root).unwrap());
        let text = String::from_utf8(output).unwrap();
        assert_eq!(text.matches("<style>").count(), 1);

        renderer.settings_mut().style_tag = false;
        let other = self::root(30.0);
        let mut output = Vec::new();
        assert!(renderer.render(&mut output, &other).unwrap());
        assert!(!String::from_utf8(output).unwrap().contains("<style>"));
    }

    #[test]
    fn markup_nests_rows_and_columns() {
        let mut root = root(20.0);
        let tree = LayoutNode::row("row").with_children([
            LayoutNode::column("a")
                .width("2/3")
                .and_then(|c| c.offset("1/3"))
                .unwrap(),
        ]);
        root.mount(&tree, None).unwrap();
        let html = render_markup(&root);
        assert!(html.contains("<div class=\"cb-row\" style=\"max-width:1500px;\">"));
        assert!(html.contains(
            "<div class=\"cb-col\" style=\"width:66.6667%;margin-left:33.3333%;\"></div>"
        ));
        let handle = root.registry().lookup("row").unwrap();
        root.unmount(handle).unwrap();
    }
}

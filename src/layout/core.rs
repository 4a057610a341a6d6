use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::fraction::Fraction;

/// Caller-chosen identifier for a declared node. Unique within a root.
pub type NodeId = String;

/// Whether a node lays children out horizontally or occupies a share of its container.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NodeKind {
    Row,
    Column,
}

/// Declared row or column.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LayoutNode {
    pub id: NodeId,
    pub kind: NodeKind,
    #[serde(default)]
    pub width: Fraction,
    #[serde(default = "zero_offset")]
    pub offset: Fraction,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<LayoutNode>,
}

fn zero_offset() -> Fraction {
    Fraction::ZERO
}

impl LayoutNode {
    pub fn row(id: impl Into<NodeId>) -> Self {
        Self::new(id, NodeKind::Row)
    }

    pub fn column(id: impl Into<NodeId>) -> Self {
        Self::new(id, NodeKind::Column)
    }

    fn new(id: impl Into<NodeId>, kind: NodeKind) -> Self {
        Self {
            id: id.into(),
            kind,
            width: Fraction::WHOLE,
            offset: Fraction::ZERO,
            children: Vec::new(),
        }
    }

    /// Parse and set the width declaration (`"1/3"`).
    pub fn width(self, decl: &str) -> Result<Self> {
        Ok(self.with_width(Fraction::parse(Some(decl))?))
    }

    /// Parse and set the offset declaration (`"1/3"`).
    pub fn offset(self, decl: &str) -> Result<Self> {
        Ok(self.with_offset(Fraction::parse(Some(decl))?))
    }

    pub fn with_width(mut self, width: Fraction) -> Self {
        self.width = width;
        self
    }

    pub fn with_offset(mut self, offset: Fraction) -> Self {
        self.offset = offset;
        self
    }

    pub fn child(mut self, child: LayoutNode) -> Self {
        self.children.push(child);
        self
    }

    pub fn with_children(mut self, children: impl IntoIterator<Item = LayoutNode>) -> Self {
        self.children.extend(children);
        self
    }

    pub fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }

    /// Number of nodes in this subtree, including `self`.
    pub fn node_count(&self) -> usize {
        1 + self.children.iter().map(LayoutNode::node_count).sum::<usize>()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builders_default_to_full_width() {
        let node = LayoutNode::column("a");
        assert_eq!(node.width, Fraction::WHOLE);
        assert!(node.offset.is_zero());
        assert!(node.is_leaf());
    }

    #[test]
    fn builder_parses_declarations() {
        let node = LayoutNode::column("a")
            .width("2/3")
            .and_then(|n| n.offset("1/3"))
            .unwrap();
        assert_eq!(node.width, Fraction::new(2, 3).unwrap());
        assert_eq!(node.offset, Fraction::new(1, 3).unwrap());
        assert!(LayoutNode::column("b").width("wide").is_err());
    }

    #[test]
    fn deserializes_declared_tree() {
        let tree: LayoutNode = serde_json::from_str(
            r#"{
                "id": "main", "kind": "row",
                "children": [
                    { "id": "side", "kind": "column", "width": "1/3" },
                    { "id": "body", "kind": "column", "width": "2/3", "offset": "0/1" }
                ]
            }"#,
        )
        .unwrap();
        assert_eq!(tree.kind, NodeKind::Row);
        assert_eq!(tree.node_count(), 3);
        assert_eq!(tree.children[0].width, Fraction::new(1, 3).unwrap());
        assert!(tree.children[1].offset.is_zero());
    }
}

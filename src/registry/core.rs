use std::collections::HashMap;
use std::collections::hash_map::Entry;

use slotmap::{SlotMap, new_key_type};

use crate::breakpoint::Breakpoint;
use crate::error::{LayoutError, Result};
use crate::layout::{CellShare, Geometry, GeometryCalculator, LayoutNode, NodeId, NodeKind, ObservedGrid};

new_key_type! {
    /// Stable handle to a registered row or column.
    pub struct NodeHandle;
    /// Stable handle to an observer binding.
    pub struct ObserverHandle;
}

/// Result of handing props to an observer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Delivery {
    /// The observer took the update.
    Committed,
    /// Something outside the engine refused the refresh.
    Blocked,
}

/// Receives fresh props when its effective breakpoint changes.
pub trait GridObserver {
    fn deliver(&mut self, props: &ObservedGrid) -> Delivery;
}

impl<F> GridObserver for F
where
    F: FnMut(&ObservedGrid) -> Delivery,
{
    fn deliver(&mut self, props: &ObservedGrid) -> Delivery {
        self(props)
    }
}

/// What `deliver_if_changed` did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeliveryOutcome {
    Delivered,
    Unchanged,
    Blocked,
}

/// Tally of one fan-out pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FanOut {
    pub delivered: usize,
    pub blocked: usize,
    pub skipped: usize,
}

/// Observer bookkeeping visible to callers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ObserverBinding {
    /// Node the observer sits under; `None` means directly under the root.
    pub node: Option<NodeHandle>,
    /// Breakpoint of the last committed delivery.
    pub last_delivered: Option<Breakpoint>,
}

/// Registered row or column.
#[derive(Debug, Clone)]
pub struct RegisteredNode {
    pub id: NodeId,
    pub kind: NodeKind,
    pub parent: Option<NodeHandle>,
    pub cell: CellShare,
    /// True when some ancestor (or the node itself) is a column.
    pub within_column: bool,
    pub geometry: Option<Geometry>,
    children: Vec<NodeHandle>,
}

impl RegisteredNode {
    pub fn children(&self) -> &[NodeHandle] {
        &self.children
    }

    /// Rows outside every column carry the root's max extent.
    pub fn is_top_level_row(&self) -> bool {
        self.kind == NodeKind::Row && !self.within_column
    }
}

struct ObserverEntry {
    binding: ObserverBinding,
    observer: Box<dyn GridObserver>,
}

#[derive(Default)]
pub struct SubscriptionRegistry {
    nodes: SlotMap<NodeHandle, RegisteredNode>,
    ids: HashMap<NodeId, NodeHandle>,
    top_level: Vec<NodeHandle>,
    observers: SlotMap<ObserverHandle, ObserverEntry>,
}

impl SubscriptionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `node` (not its children) under `parent`.
    pub fn register(&mut self, node: &LayoutNode, parent: Option<NodeHandle>) -> Result<NodeHandle> {
        let (parent_share, parent_in_column) = match parent {
            Some(handle) => {
                let entry = self.nodes.get(handle).ok_or(LayoutError::UnknownParent)?;
                (
                    entry.cell.share,
                    entry.within_column || entry.kind == NodeKind::Column,
                )
            }
            None => (CellShare::root().share, false),
        };

        let vacant = match self.ids.entry(node.id.clone()) {
            Entry::Occupied(_) => return Err(LayoutError::DuplicateNode(node.id.clone())),
            Entry::Vacant(vacant) => vacant,
        };

        let cell = match node.kind {
            NodeKind::Column => CellShare::nested(node.width, node.offset, parent_share),
            NodeKind::Row => CellShare {
                share: parent_share,
                ..CellShare::root()
            },
        };

        let handle = self.nodes.insert(RegisteredNode {
            id: node.id.clone(),
            kind: node.kind,
            parent,
            cell,
            within_column: parent_in_column || node.kind == NodeKind::Column,
            geometry: None,
            children: Vec::new(),
        });
        vacant.insert(handle);

        match parent.and_then(|p| self.nodes.get_mut(p)) {
            Some(parent) => parent.children.push(handle),
            None => self.top_level.push(handle),
        }
        Ok(handle)
    }

    /// Remove one node. Children are left registered.
    pub fn deregister(&mut self, handle: NodeHandle) -> Result<RegisteredNode> {
        let node = self.nodes.remove(handle).ok_or(LayoutError::UnknownNode)?;
        self.ids.remove(&node.id);
        let siblings = match node.parent.and_then(|p| self.nodes.get_mut(p)) {
            Some(parent) => &mut parent.children,
            None => &mut self.top_level,
        };
        siblings.retain(|sibling| *sibling != handle);
        Ok(node)
    }

    pub fn node(&self, handle: NodeHandle) -> Option<&RegisteredNode> {
        self.nodes.get(handle)
    }

    pub fn lookup(&self, id: &str) -> Option<NodeHandle> {
        self.ids.get(id).copied()
    }

    /// Nodes registered without a parent, in registration order.
    pub fn top_level(&self) -> &[NodeHandle] {
        &self.top_level
    }

    /// Bind an observer under `node`. Its first delivery is always made by the caller.
    pub fn bind(
        &mut self,
        node: Option<NodeHandle>,
        observer: Box<dyn GridObserver>,
    ) -> Result<ObserverHandle> {
        if let Some(handle) = node {
            if !self.nodes.contains_key(handle) {
                return Err(LayoutError::UnknownNode);
            }
        }
        Ok(self.observers.insert(ObserverEntry {
            binding: ObserverBinding {
                node,
                last_delivered: None,
            },
            observer,
        }))
    }

    pub fn unbind(&mut self, handle: ObserverHandle) -> Result<ObserverBinding> {
        self.observers
            .remove(handle)
            .map(|entry| entry.binding)
            .ok_or(LayoutError::UnknownObserver)
    }

    pub fn binding(&self, handle: ObserverHandle) -> Option<ObserverBinding> {
        self.observers.get(handle).map(|entry| entry.binding)
    }

    /// Deliver `props` unless the observer already holds `props.breakpoint`.
    ///
    /// `last_delivered` only moves on a committed delivery.
    pub fn deliver_if_changed(
        &mut self,
        handle: ObserverHandle,
        props: &ObservedGrid,
    ) -> Result<DeliveryOutcome> {
        let entry = self
            .observers
            .get_mut(handle)
            .ok_or(LayoutError::UnknownObserver)?;
        Ok(deliver(entry, props))
    }

    /// Recompute geometry for one node.
    pub fn refresh(
        &mut self,
        handle: NodeHandle,
        calc: &GeometryCalculator<'_>,
        breakpoint: Breakpoint,
    ) -> Result<Geometry> {
        let node = self.nodes.get_mut(handle).ok_or(LayoutError::UnknownNode)?;
        let geometry = calc.compute(&node.cell, breakpoint);
        node.geometry = Some(geometry);
        Ok(geometry)
    }

    /// Drop every observer bound under one of `nodes`. Returns how many went.
    pub fn unbind_under(&mut self, nodes: &[NodeHandle]) -> usize {
        let before = self.observers.len();
        self.observers
            .retain(|_, entry| !entry.binding.node.is_some_and(|node| nodes.contains(&node)));
        before - self.observers.len()
    }

    /// Recompute geometry for every registered node at `breakpoint`.
    pub fn recompute(&mut self, calc: &GeometryCalculator<'_>, breakpoint: Breakpoint) {
        for node in self.nodes.values_mut() {
            node.geometry = Some(calc.compute(&node.cell, breakpoint));
        }
    }

    /// Offer every observer the props for `breakpoint`.
    ///
    /// Observers whose node has been deregistered are skipped.
    pub fn fan_out(&mut self, calc: &GeometryCalculator<'_>, breakpoint: Breakpoint) -> FanOut {
        let mut tally = FanOut::default();
        for entry in self.observers.values_mut() {
            let cell = match entry.binding.node {
                None => CellShare::root(),
                Some(handle) => match self.nodes.get(handle) {
                    Some(node) => node.cell,
                    None => {
                        tally.skipped += 1;
                        continue;
                    }
                },
            };
            let props = ObservedGrid::from(&calc.compute(&cell, breakpoint));
            match deliver(entry, &props) {
                DeliveryOutcome::Delivered => tally.delivered += 1,
                DeliveryOutcome::Blocked => tally.blocked += 1,
                DeliveryOutcome::Unchanged => tally.skipped += 1,
            }
        }
        tally
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn observer_count(&self) -> usize {
        self.observers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty() && self.observers.is_empty()
    }
}

fn deliver(entry: &mut ObserverEntry, props: &ObservedGrid) -> DeliveryOutcome {
    if entry.binding.last_delivered == Some(props.breakpoint) {
        return DeliveryOutcome::Unchanged;
    }
    match entry.observer.deliver(props) {
        Delivery::Committed => {
            entry.binding.last_delivered = Some(props.breakpoint);
            DeliveryOutcome::Delivered
        }
        Delivery::Blocked => DeliveryOutcome::Blocked,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::{Cell, RefCell};
    use std::rc::Rc;

    use crate::breakpoint::{BreakpointTable, FlexPolicy};
    use crate::unit::UnitModel;

    fn props(breakpoint: Breakpoint) -> ObservedGrid {
        ObservedGrid {
            breakpoint,
            col_width: breakpoint as f64,
            col_min_pixel_width: 0.0,
            col_max_pixel_width: 0.0,
        }
    }

    fn counting(count: Rc<Cell<usize>>) -> Box<dyn GridObserver> {
        Box::new(move |_: &ObservedGrid| {
            count.set(count.get() + 1);
            Delivery::Committed
        })
    }

    #[test]
    fn register_and_deregister_track_children() {
        let mut registry = SubscriptionRegistry::new();
        let row = registry.register(&LayoutNode::row("row"), None).unwrap();
        let col = registry
            .register(&LayoutNode::column("col"), Some(row))
            .unwrap();
        assert_eq!(registry.node(row).unwrap().children(), &[col]);
        assert_eq!(registry.top_level(), &[row]);

        registry.deregister(col).unwrap();
        assert!(registry.node(row).unwrap().children().is_empty());
        registry.deregister(row).unwrap();
        assert!(registry.is_empty());
        assert!(registry.top_level().is_empty());
    }

    #[test]
    fn duplicate_ids_are_rejected() {
        let mut registry = SubscriptionRegistry::new();
        registry.register(&LayoutNode::column("a"), None).unwrap();
        let err = registry.register(&LayoutNode::column("a"), None).unwrap_err();
        assert!(matches!(err, LayoutError::DuplicateNode(id) if id == "a"));
        assert_eq!(registry.node_count(), 1);
    }

    #[test]
    fn stale_handles_are_misuse() {
        let mut registry = SubscriptionRegistry::new();
        let handle = registry.register(&LayoutNode::column("a"), None).unwrap();
        registry.deregister(handle).unwrap();
        assert!(matches!(
            registry.deregister(handle),
            Err(LayoutError::UnknownNode)
        ));
        assert!(matches!(
            registry.register(&LayoutNode::column("b"), Some(handle)),
            Err(LayoutError::UnknownParent)
        ));
        let observer = registry
            .bind(None, counting(Rc::new(Cell::new(0))))
            .unwrap();
        registry.unbind(observer).unwrap();
        assert!(matches!(
            registry.unbind(observer),
            Err(LayoutError::UnknownObserver)
        ));
    }

    #[test]
    fn shares_multiply_through_columns_not_rows() {
        let mut registry = SubscriptionRegistry::new();
        let row = registry.register(&LayoutNode::row("row"), None).unwrap();
        let outer = registry
            .register(&LayoutNode::column("outer").width("4/5").unwrap(), Some(row))
            .unwrap();
        let inner_row = registry
            .register(&LayoutNode::row("inner-row"), Some(outer))
            .unwrap();
        let inner = registry
            .register(
                &LayoutNode::column("inner").width("1/2").unwrap(),
                Some(inner_row),
            )
            .unwrap();

        let inner = registry.node(inner).unwrap();
        assert_eq!(inner.cell.share.units_of(10), 4.0);
        assert!(registry.node(row).unwrap().is_top_level_row());
        assert!(!registry.node(inner_row).unwrap().is_top_level_row());
    }

    #[test]
    fn delivery_skips_repeated_breakpoint() {
        let mut registry = SubscriptionRegistry::new();
        let count = Rc::new(Cell::new(0));
        let handle = registry.bind(None, counting(count.clone())).unwrap();

        assert_eq!(
            registry.deliver_if_changed(handle, &props(10)).unwrap(),
            DeliveryOutcome::Delivered
        );
        assert_eq!(
            registry.deliver_if_changed(handle, &props(10)).unwrap(),
            DeliveryOutcome::Unchanged
        );
        assert_eq!(count.get(), 1);
        assert_eq!(registry.binding(handle).unwrap().last_delivered, Some(10));
    }

    #[test]
    fn blocked_delivery_does_not_advance() {
        let mut registry = SubscriptionRegistry::new();
        let blocking = Rc::new(Cell::new(false));
        let seen = Rc::new(RefCell::new(Vec::new()));
        let observer = {
            let (blocking, seen) = (blocking.clone(), seen.clone());
            Box::new(move |props: &ObservedGrid| {
                if blocking.get() {
                    return Delivery::Blocked;
                }
                seen.borrow_mut().push(props.breakpoint);
                Delivery::Committed
            })
        };
        let handle = registry.bind(None, observer).unwrap();
        registry.deliver_if_changed(handle, &props(5)).unwrap();

        blocking.set(true);
        assert_eq!(
            registry.deliver_if_changed(handle, &props(10)).unwrap(),
            DeliveryOutcome::Blocked
        );
        assert_eq!(registry.binding(handle).unwrap().last_delivered, Some(5));

        blocking.set(false);
        assert_eq!(
            registry.deliver_if_changed(handle, &props(5)).unwrap(),
            DeliveryOutcome::Unchanged
        );
        assert_eq!(*seen.borrow(), vec![5]);
    }

    #[test]
    fn unbind_under_removes_subtree_observers() {
        let mut registry = SubscriptionRegistry::new();
        let col = registry.register(&LayoutNode::column("c"), None).unwrap();
        registry.bind(Some(col), counting(Rc::new(Cell::new(0)))).unwrap();
        registry.bind(None, counting(Rc::new(Cell::new(0)))).unwrap();
        assert_eq!(registry.unbind_under(&[col]), 1);
        assert_eq!(registry.observer_count(), 1);
    }

    #[test]
    fn fan_out_uses_node_share() {
        let unit = UnitModel::new(80.0, 20.0).unwrap();
        let table = BreakpointTable::new(vec![5, 10, 15]).unwrap();
        let flex = FlexPolicy::always();
        let calc = GeometryCalculator::new(&unit, &table, &flex);

        let mut registry = SubscriptionRegistry::new();
        let col = registry
            .register(&LayoutNode::column("c").width("1/5").unwrap(), None)
            .unwrap();
        let received = Rc::new(RefCell::new(Vec::new()));
        let sink = received.clone();
        registry
            .bind(
                Some(col),
                Box::new(move |props: &ObservedGrid| {
                    sink.borrow_mut().push(*props);
                    Delivery::Committed
                }),
            )
            .unwrap();

        let tally = registry.fan_out(&calc, 10);
        assert_eq!(tally, FanOut { delivered: 1, blocked: 0, skipped: 0 });
        let tally = registry.fan_out(&calc, 10);
        assert_eq!(tally.skipped, 1);

        let props = received.borrow()[0];
        assert_eq!(props.col_width, 2.0);
        assert_eq!(props.col_min_pixel_width, 180.0);
        assert_eq!(props.col_max_pixel_width, 280.0);
    }
}

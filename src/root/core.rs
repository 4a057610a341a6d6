use std::sync::{Arc, Mutex};

use serde_json::json;

use crate::breakpoint::{Breakpoint, BreakpointTable, FlexPolicy, resolve};
use crate::config::GridConfig;
use crate::error::{LayoutError, Result};
use crate::layout::{CellShare, Geometry, GeometryCalculator, LayoutNode, ObservedGrid};
use crate::logging::{LogLevel, Logger, event_with_fields, json_kv};
use crate::metrics::LayoutMetrics;
use crate::registry::{
    DeliveryOutcome, FanOut, GridObserver, NodeHandle, ObserverHandle, SubscriptionRegistry,
};
use crate::unit::UnitModel;

use super::id::{IdCounter, ROOT_IDS, RootId};

/// Invoked with the new breakpoint once per transition.
pub type ChangeCallback = Box<dyn FnMut(Breakpoint)>;

const REGISTRY_TARGET: &str = "celblock::registry";

/// Outcome of moving a root to a breakpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    Unchanged(Breakpoint),
    Changed {
        from: Breakpoint,
        to: Breakpoint,
        fan_out: FanOut,
    },
}

impl Transition {
    pub fn is_changed(&self) -> bool {
        matches!(self, Transition::Changed { .. })
    }

    pub fn breakpoint(&self) -> Breakpoint {
        match self {
            Transition::Unchanged(bp) => *bp,
            Transition::Changed { to, .. } => *to,
        }
    }
}

/// Top of a grid scope.
///
/// Owns the unit model, breakpoint table and flex policy, the breakpoint the
/// scope currently renders at, and the registry of everything mounted inside.
pub struct LayoutRoot {
    id: RootId,
    unit: UnitModel,
    table: BreakpointTable,
    flexible: FlexPolicy,
    initial_breakpoint: Option<Breakpoint>,
    current: Breakpoint,
    registry: SubscriptionRegistry,
    on_change: Option<ChangeCallback>,
    logger: Option<Logger>,
    metrics: Option<Arc<Mutex<LayoutMetrics>>>,
    leak_reported: bool,
}

impl LayoutRoot {
    pub fn new(config: GridConfig) -> Result<Self> {
        Self::with_counter(config, &ROOT_IDS)
    }

    /// Build a root drawing its id from `counter`.
    pub fn with_counter(config: GridConfig, counter: &IdCounter) -> Result<Self> {
        let settings = config.settings()?;
        let current = resolve(
            None,
            &settings.table,
            &settings.unit,
            settings.initial_breakpoint,
        );
        Ok(Self {
            id: counter.next(),
            unit: settings.unit,
            table: settings.table,
            flexible: settings.flexible,
            initial_breakpoint: settings.initial_breakpoint,
            current,
            registry: SubscriptionRegistry::new(),
            on_change: None,
            logger: None,
            metrics: None,
            leak_reported: false,
        })
    }

    pub fn on_change<F>(mut self, callback: F) -> Self
    where
        F: FnMut(Breakpoint) + 'static,
    {
        self.on_change = Some(Box::new(callback));
        self
    }

    pub fn with_logger(mut self, logger: Logger) -> Self {
        self.logger = Some(logger);
        self
    }

    pub fn with_metrics(mut self, metrics: Arc<Mutex<LayoutMetrics>>) -> Self {
        self.metrics = Some(metrics);
        self
    }

    pub fn id(&self) -> RootId {
        self.id
    }

    pub fn class_name(&self) -> String {
        self.id.class_name()
    }

    pub fn unit(&self) -> &UnitModel {
        &self.unit
    }

    pub fn table(&self) -> &BreakpointTable {
        &self.table
    }

    pub fn flexible(&self) -> &FlexPolicy {
        &self.flexible
    }

    pub fn initial_breakpoint(&self) -> Option<Breakpoint> {
        self.initial_breakpoint
    }

    pub fn current_breakpoint(&self) -> Breakpoint {
        self.current
    }

    pub fn registry(&self) -> &SubscriptionRegistry {
        &self.registry
    }

    pub fn logger(&self) -> Option<&Logger> {
        self.logger.as_ref()
    }

    pub fn metrics_handle(&self) -> Option<Arc<Mutex<LayoutMetrics>>> {
        self.metrics.as_ref().map(Arc::clone)
    }

    pub fn calculator(&self) -> GeometryCalculator<'_> {
        GeometryCalculator::new(&self.unit, &self.table, &self.flexible)
    }

    /// Breakpoint for `width`, falling back to the initial breakpoint without a viewport.
    pub fn resolve(&self, width: Option<f64>) -> Breakpoint {
        resolve(width, &self.table, &self.unit, self.initial_breakpoint)
    }

    /// Register a single node under `parent`.
    pub fn register(&mut self, node: &LayoutNode, parent: Option<NodeHandle>) -> Result<NodeHandle> {
        let handle = self.registry.register(node, parent)?;
        let calc = GeometryCalculator::new(&self.unit, &self.table, &self.flexible);
        self.registry.refresh(handle, &calc, self.current)?;
        self.log(
            LogLevel::Trace,
            "node_registered",
            [json_kv("node", node.id.as_str())],
        );
        Ok(handle)
    }

    /// Remove a single node; its children stay registered.
    pub fn deregister(&mut self, handle: NodeHandle) -> Result<()> {
        let node = self.registry.deregister(handle)?;
        self.log(
            LogLevel::Trace,
            "node_deregistered",
            [json_kv("node", node.id)],
        );
        Ok(())
    }

    /// Register `node`, then run `mount`. If `mount` fails, the node and
    /// anything registered beneath it is removed again.
    pub fn mount_with<T, F>(
        &mut self,
        node: &LayoutNode,
        parent: Option<NodeHandle>,
        mount: F,
    ) -> Result<T>
    where
        F: FnOnce(&mut Self, NodeHandle) -> Result<T>,
    {
        let handle = self.register(node, parent)?;
        match mount(self, handle) {
            Ok(value) => Ok(value),
            Err(err) => {
                self.unmount(handle)?;
                self.log(
                    LogLevel::Debug,
                    "mount_rolled_back",
                    [
                        json_kv("node", node.id.as_str()),
                        json_kv("error", err.to_string()),
                    ],
                );
                Err(err)
            }
        }
    }

    /// Register a declared subtree. All or nothing.
    pub fn mount(&mut self, node: &LayoutNode, parent: Option<NodeHandle>) -> Result<NodeHandle> {
        self.mount_with(node, parent, |root, handle| {
            for child in &node.children {
                root.mount(child, Some(handle))?;
            }
            Ok(handle)
        })
    }

    /// Deregister `handle`, its descendants and observers bound beneath them.
    pub fn unmount(&mut self, handle: NodeHandle) -> Result<()> {
        let mut order = Vec::new();
        let mut pending = vec![handle];
        while let Some(next) = pending.pop() {
            let node = self.registry.node(next).ok_or(LayoutError::UnknownNode)?;
            pending.extend_from_slice(node.children());
            order.push(next);
        }
        let unbound = self.registry.unbind_under(&order);
        for handle in order.into_iter().rev() {
            self.registry.deregister(handle)?;
        }
        self.log(
            LogLevel::Trace,
            "subtree_unmounted",
            [json_kv("observers", unbound)],
        );
        Ok(())
    }

    /// Bind an observer under `node` (or the root itself) and make its baseline delivery.
    pub fn bind<O>(&mut self, node: Option<NodeHandle>, observer: O) -> Result<ObserverHandle>
    where
        O: GridObserver + 'static,
    {
        let props = self.observed(node)?;
        let handle = self.registry.bind(node, Box::new(observer))?;
        if self.registry.deliver_if_changed(handle, &props)? == DeliveryOutcome::Blocked {
            self.log(
                LogLevel::Debug,
                "baseline_blocked",
                [json_kv("breakpoint", props.breakpoint)],
            );
        }
        Ok(handle)
    }

    pub fn unbind(&mut self, handle: ObserverHandle) -> Result<()> {
        self.registry.unbind(handle).map(|_| ())
    }

    /// Cached geometry of a registered node at the current breakpoint.
    pub fn geometry(&self, handle: NodeHandle) -> Option<Geometry> {
        self.registry.node(handle).and_then(|node| node.geometry)
    }

    /// Props an observer under `node` would receive right now.
    pub fn observed(&self, node: Option<NodeHandle>) -> Result<ObservedGrid> {
        let cell = match node {
            Some(handle) => self.registry.node(handle).ok_or(LayoutError::UnknownNode)?.cell,
            None => CellShare::root(),
        };
        Ok(ObservedGrid::from(&self.calculator().compute(&cell, self.current)))
    }

    pub fn container_max_extent(&self) -> f64 {
        self.calculator().container_max_extent(self.current)
    }

    /// Max extent for a row, present only for rows outside every column.
    pub fn row_max_extent(&self, handle: NodeHandle) -> Option<f64> {
        self.registry
            .node(handle)
            .filter(|node| node.is_top_level_row())
            .map(|_| self.container_max_extent())
    }

    /// Move to `breakpoint`, recomputing and notifying only when it differs.
    pub(crate) fn apply_breakpoint(&mut self, breakpoint: Breakpoint) -> Transition {
        if breakpoint == self.current {
            return Transition::Unchanged(breakpoint);
        }

        let from = std::mem::replace(&mut self.current, breakpoint);
        let calc = GeometryCalculator::new(&self.unit, &self.table, &self.flexible);
        self.registry.recompute(&calc, breakpoint);
        let fan_out = self.registry.fan_out(&calc, breakpoint);

        if let Some(metrics) = self.metrics.as_ref() {
            if let Ok(mut guard) = metrics.lock() {
                guard.record_fan_out(fan_out.delivered, fan_out.blocked, fan_out.skipped);
            }
        }
        if fan_out.blocked > 0 {
            self.log(
                LogLevel::Debug,
                "deliveries_blocked",
                [
                    json_kv("breakpoint", breakpoint),
                    json_kv("blocked", fan_out.blocked),
                ],
            );
        }

        self.notify_change();
        Transition::Changed {
            from,
            to: breakpoint,
            fan_out,
        }
    }

    /// Set the starting breakpoint before anything observes the root.
    pub(crate) fn seed(&mut self, breakpoint: Breakpoint) {
        if self.registry.is_empty() {
            self.current = breakpoint;
        } else {
            self.apply_breakpoint_silently(breakpoint);
        }
    }

    fn apply_breakpoint_silently(&mut self, breakpoint: Breakpoint) {
        let callback = self.on_change.take();
        self.apply_breakpoint(breakpoint);
        self.on_change = callback;
    }

    pub(crate) fn notify_change(&mut self) {
        let current = self.current;
        if let Some(callback) = self.on_change.as_mut() {
            callback(current);
        }
    }

    /// Error if anything is still registered.
    pub fn ensure_released(&self) -> Result<()> {
        if self.registry.is_empty() {
            return Ok(());
        }
        Err(LayoutError::RegistryLeak {
            root: self.id.get(),
            nodes: self.registry.node_count(),
            observers: self.registry.observer_count(),
        })
    }

    /// Destroy the root, reporting a leak if children are still registered.
    pub fn teardown(mut self) -> Result<()> {
        let released = self.ensure_released();
        self.leak_reported = released.is_err();
        released
    }

    fn log<I>(&self, level: LogLevel, message: &str, fields: I)
    where
        I: IntoIterator<Item = (String, serde_json::Value)>,
    {
        if let Some(logger) = self.logger.as_ref().filter(|logger| logger.enabled(level)) {
            let mut event = event_with_fields(level, REGISTRY_TARGET, message, fields);
            event.fields.insert("root".to_string(), json!(self.id.get()));
            let _ = logger.log_event(event);
        }
    }
}

impl Drop for LayoutRoot {
    fn drop(&mut self) {
        if self.leak_reported {
            return;
        }
        if let Err(err) = self.ensure_released() {
            self.log(
                LogLevel::Error,
                "registry_leak",
                [json_kv("error", err.to_string())],
            );
        }
    }
}

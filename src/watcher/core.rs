use serde_json::Value;

use crate::breakpoint::Breakpoint;
use crate::error::{LayoutError, Result};
use crate::logging::{LogLevel, event_with_fields, json_kv};
use crate::root::{LayoutRoot, RootId, Transition};

use super::source::WidthSource;

const WATCHER_TARGET: &str = "celblock::watcher";

/// Handle for a resize listener registered with a host.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerToken(pub u64);

/// Environment that delivers resize signals.
///
/// The host calls [`ViewportWatcher::notify`] for each signal while the
/// listener is registered. Signals arrive one at a time.
pub trait ViewportHost {
    fn add_resize_listener(&mut self, root: RootId) -> ListenerToken;
    fn remove_resize_listener(&mut self, token: ListenerToken);
}

/// Owns a root's single resize listener and drives its breakpoint.
///
/// The listener is released by [`ViewportWatcher::detach`] or, failing
/// that, when the watcher is dropped.
pub struct ViewportWatcher<W, H>
where
    W: WidthSource,
    H: ViewportHost,
{
    root: LayoutRoot,
    source: W,
    host: H,
    listener: Option<ListenerToken>,
}

impl<W, H> ViewportWatcher<W, H>
where
    W: WidthSource,
    H: ViewportHost,
{
    /// Wrap `root`. Without an initial breakpoint the root starts at the
    /// breakpoint of the width visible right now.
    pub fn new(mut root: LayoutRoot, source: W, host: H) -> Self {
        if root.initial_breakpoint().is_none() {
            let breakpoint = root.resolve(source.read());
            root.seed(breakpoint);
        }
        Self {
            root,
            source,
            host,
            listener: None,
        }
    }

    pub fn root(&self) -> &LayoutRoot {
        &self.root
    }

    pub fn root_mut(&mut self) -> &mut LayoutRoot {
        &mut self.root
    }

    pub fn host(&self) -> &H {
        &self.host
    }

    pub fn source(&self) -> &W {
        &self.source
    }

    pub fn is_attached(&self) -> bool {
        self.listener.is_some()
    }

    /// Register the resize listener and settle on the live breakpoint.
    ///
    /// `on_change` fires exactly once here, whether or not the breakpoint moved.
    pub fn attach(&mut self) -> Result<Breakpoint> {
        if self.listener.is_some() {
            return Err(LayoutError::AlreadyAttached(self.root.id().get()));
        }
        let token = self.host.add_resize_listener(self.root.id());
        self.listener = Some(token);

        let breakpoint = self.root.resolve(self.source.read());
        let transition = self.transition_to(breakpoint);
        if !transition.is_changed() {
            self.root.notify_change();
        }
        self.log(
            LogLevel::Info,
            "listener_attached",
            [
                json_kv("listener", token.0),
                json_kv("breakpoint", breakpoint),
            ],
        );
        Ok(breakpoint)
    }

    /// Handle one width signal. Signals outside `attach`..`detach` are misuse.
    pub fn notify(&mut self) -> Result<Transition> {
        if self.listener.is_none() {
            return Err(LayoutError::NotAttached(self.root.id().get()));
        }
        let width = self.source.read();
        let breakpoint = self.root.resolve(width);
        let transition = self.transition_to(breakpoint);
        if !transition.is_changed() {
            self.log(
                LogLevel::Debug,
                "signal_suppressed",
                [
                    json_kv("width", width),
                    json_kv("breakpoint", breakpoint),
                ],
            );
        }
        Ok(transition)
    }

    /// Remove the listener and check the root was fully unmounted.
    ///
    /// The listener is released even when the leak check fails.
    pub fn detach(&mut self) -> Result<()> {
        let token = self
            .listener
            .take()
            .ok_or(LayoutError::NotAttached(self.root.id().get()))?;
        self.host.remove_resize_listener(token);
        self.log(
            LogLevel::Info,
            "listener_detached",
            [json_kv("listener", token.0)],
        );
        self.emit_metrics();
        self.root.ensure_released()
    }

    fn transition_to(&mut self, breakpoint: Breakpoint) -> Transition {
        let transition = self.root.apply_breakpoint(breakpoint);
        if let Some(metrics) = self.root.metrics_handle() {
            if let Ok(mut guard) = metrics.lock() {
                guard.record_signal(transition.is_changed());
            }
        }
        if let Transition::Changed { from, to, fan_out } = transition {
            self.log(
                LogLevel::Info,
                "breakpoint_changed",
                [
                    json_kv("from", from),
                    json_kv("to", to),
                    json_kv("delivered", fan_out.delivered),
                    json_kv("blocked", fan_out.blocked),
                ],
            );
        }
        transition
    }

    fn emit_metrics(&self) {
        let (Some(logger), Some(metrics)) = (self.root.logger(), self.root.metrics_handle())
        else {
            return;
        };
        if let Ok(guard) = metrics.lock() {
            let _ = logger.log_event(guard.snapshot().to_log_event("celblock::metrics"));
        }
    }

    fn log<I>(&self, level: LogLevel, message: &str, fields: I)
    where
        I: IntoIterator<Item = (String, Value)>,
    {
        if let Some(logger) = self.root.logger().filter(|logger| logger.enabled(level)) {
            let mut event = event_with_fields(level, WATCHER_TARGET, message, fields);
            event
                .fields
                .insert("root".to_string(), Value::from(self.root.id().get()));
            let _ = logger.log_event(event);
        }
    }
}

impl<W, H> Drop for ViewportWatcher<W, H>
where
    W: WidthSource,
    H: ViewportHost,
{
    fn drop(&mut self) {
        if let Some(token) = self.listener.take() {
            self.host.remove_resize_listener(token);
        }
    }
}

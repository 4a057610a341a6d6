//! Responsive fractional grid engine.
//!
//! A [`LayoutRoot`] carries a unit model (cell width plus gutter), an
//! ascending table of breakpoints and a flex policy. Rows and columns mounted
//! into it get percentage widths and pixel extents from the
//! [`GeometryCalculator`]; observers bound beneath them receive fresh
//! [`ObservedGrid`] props only when their breakpoint actually changes. A
//! [`ViewportWatcher`] owns the root's single resize listener and turns width
//! signals into at most one transition each.
//!
//! ```
//! use celblock::{GridConfig, LayoutNode, LayoutRoot};
//!
//! let config = GridConfig::default()
//!     .with_cell_width(80.0)
//!     .with_gutter_width(20.0)
//!     .with_breakpoints([5, 10, 15]);
//! let mut root = LayoutRoot::new(config)?;
//! let row = root.mount(
//!     &LayoutNode::row("main").child(LayoutNode::column("side").width("1/3")?),
//!     None,
//! )?;
//! let side = root.registry().lookup("side").unwrap();
//! assert_eq!(root.geometry(side).unwrap().width.to_string(), "33.3333%");
//! root.unmount(row)?;
//! root.teardown()?;
//! # Ok::<(), celblock::LayoutError>(())
//! ```

pub mod breakpoint;
pub mod config;
pub mod error;
pub mod fraction;
pub mod layout;
pub mod logging;
pub mod metrics;
pub mod registry;
pub mod render;
pub mod root;
pub mod unit;
pub mod watcher;

pub use breakpoint::{Breakpoint, BreakpointTable, FlexPolicy, resolve};
pub use config::GridConfig;
pub use error::{LayoutError, Result};
pub use fraction::{Fraction, Percent};
pub use layout::{CellShare, Geometry, GeometryCalculator, LayoutNode, NodeId, NodeKind, ObservedGrid};
pub use logging::{LogEvent, LogFields, LogLevel, LogSink, Logger, LoggingError, LoggingResult};
pub use metrics::{LayoutMetrics, MetricSnapshot};
pub use registry::{
    Delivery, DeliveryOutcome, FanOut, GridObserver, NodeHandle, ObserverBinding, ObserverHandle,
    RegisteredNode, SubscriptionRegistry,
};
pub use render::{CssRenderer, RendererSettings};
pub use root::{ChangeCallback, IdCounter, LayoutRoot, ROOT_IDS, RootId, Transition};
pub use unit::UnitModel;
pub use watcher::{
    FallbackWidth, ListenerToken, NoViewport, SharedWidth, ViewportHost, ViewportWatcher,
    WidthSource,
};

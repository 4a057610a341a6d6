use thiserror::Error;

use crate::breakpoint::Breakpoint;
use crate::layout::NodeId;

/// Unified result type for the celblock crate.
pub type Result<T> = std::result::Result<T, LayoutError>;

/// Errors surfaced by the grid engine.
///
/// Configuration problems are reported when a root or node is constructed;
/// registry and lifecycle misuse is reported at the call that misuses it.
#[derive(Debug, Error)]
pub enum LayoutError {
    #[error("breakpoint table is empty")]
    EmptyBreakpoints,
    #[error("breakpoints must be positive, got 0")]
    ZeroBreakpoint,
    #[error("breakpoints must be strictly ascending: {previous} followed by {next}")]
    UnorderedBreakpoints { previous: Breakpoint, next: Breakpoint },
    #[error("cell width must be a positive finite number, got {0}")]
    InvalidCellWidth(f64),
    #[error("gutter width must be a non-negative finite number, got {0}")]
    InvalidGutterWidth(f64),
    #[error("malformed fraction `{0}`, expected `<int>/<int>`")]
    MalformedFraction(String),
    #[error("fraction `{0}` has a zero denominator")]
    ZeroDenominator(String),
    #[error("flexible breakpoint {0} is not in the breakpoint table")]
    UnknownFlexBreakpoint(Breakpoint),
    #[error("initial breakpoint {0} is not in the breakpoint table")]
    UnknownInitialBreakpoint(Breakpoint),
    #[error("node `{0}` is already registered")]
    DuplicateNode(NodeId),
    #[error("node handle is not registered")]
    UnknownNode,
    #[error("parent handle is not registered")]
    UnknownParent,
    #[error("observer binding is not registered")]
    UnknownObserver,
    #[error("viewport listener already attached for root {0}")]
    AlreadyAttached(u64),
    #[error("viewport listener not attached for root {0}")]
    NotAttached(u64),
    #[error("root {root} torn down with {nodes} node(s) and {observers} observer(s) still registered")]
    RegistryLeak {
        root: u64,
        nodes: usize,
        observers: usize,
    },
    #[error("configuration error: {0}")]
    Config(#[from] serde_json::Error),
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

use std::cell::Cell;
use std::rc::Rc;

/// Reports the current viewport width, or `None` when there is no viewport.
pub trait WidthSource {
    fn read(&self) -> Option<f64>;
}

impl<F> WidthSource for F
where
    F: Fn() -> Option<f64>,
{
    fn read(&self) -> Option<f64> {
        self()
    }
}

/// Zero, negative and non-finite readings count as unavailable.
fn usable(width: Option<f64>) -> Option<f64> {
    width.filter(|w| w.is_finite() && *w > 0.0)
}

/// Headless environment with no viewport at all.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoViewport;

impl WidthSource for NoViewport {
    fn read(&self) -> Option<f64> {
        None
    }
}

/// Reads `primary`, consulting `secondary` when the primary reading is unusable.
#[derive(Debug, Clone)]
pub struct FallbackWidth<P, S> {
    primary: P,
    secondary: S,
}

impl<P, S> FallbackWidth<P, S> {
    pub fn new(primary: P, secondary: S) -> Self {
        Self { primary, secondary }
    }
}

impl<P, S> WidthSource for FallbackWidth<P, S>
where
    P: WidthSource,
    S: WidthSource,
{
    fn read(&self) -> Option<f64> {
        usable(self.primary.read()).or_else(|| usable(self.secondary.read()))
    }
}

/// Settable width shared between clones; drives scripted and test viewports.
#[derive(Debug, Clone, Default)]
pub struct SharedWidth {
    width: Rc<Cell<Option<f64>>>,
}

impl SharedWidth {
    pub fn new(width: Option<f64>) -> Self {
        Self {
            width: Rc::new(Cell::new(width)),
        }
    }

    pub fn set(&self, width: impl Into<Option<f64>>) {
        self.width.set(width.into());
    }

    pub fn get(&self) -> Option<f64> {
        self.width.get()
    }
}

impl WidthSource for SharedWidth {
    fn read(&self) -> Option<f64> {
        usable(self.width.get())
    }
}

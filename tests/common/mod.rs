#![allow(dead_code)]

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use celblock::{
    Delivery, GridConfig, GridObserver, ListenerToken, ObservedGrid, RootId, ViewportHost,
};

pub fn options() -> GridConfig {
    GridConfig::default()
        .with_cell_width(80.0)
        .with_gutter_width(20.0)
        .with_breakpoints([5, 10, 15])
}

/// Host that counts listener registrations; clones share counters.
#[derive(Clone, Default)]
pub struct RecordingHost {
    pub added: Rc<RefCell<Vec<RootId>>>,
    pub removed: Rc<RefCell<Vec<ListenerToken>>>,
}

impl ViewportHost for RecordingHost {
    fn add_resize_listener(&mut self, root: RootId) -> ListenerToken {
        self.added.borrow_mut().push(root);
        ListenerToken(self.added.borrow().len() as u64)
    }

    fn remove_resize_listener(&mut self, token: ListenerToken) {
        self.removed.borrow_mut().push(token);
    }
}

/// Observer keeping every committed delivery; can be told to refuse updates.
#[derive(Clone, Default)]
pub struct Recorder {
    received: Rc<RefCell<Vec<ObservedGrid>>>,
    blocked: Rc<Cell<bool>>,
}

impl Recorder {
    pub fn block(&self, blocked: bool) {
        self.blocked.set(blocked);
    }

    pub fn count(&self) -> usize {
        self.received.borrow().len()
    }

    pub fn last(&self) -> ObservedGrid {
        *self
            .received
            .borrow()
            .last()
            .expect("observer never received props")
    }

    pub fn breakpoints(&self) -> Vec<u32> {
        self.received.borrow().iter().map(|p| p.breakpoint).collect()
    }
}

impl GridObserver for Recorder {
    fn deliver(&mut self, props: &ObservedGrid) -> Delivery {
        if self.blocked.get() {
            return Delivery::Blocked;
        }
        self.received.borrow_mut().push(*props);
        Delivery::Committed
    }
}

pub fn props(breakpoint: u32, col_width: f64, min: f64, max: f64) -> ObservedGrid {
    ObservedGrid {
        breakpoint,
        col_width,
        col_min_pixel_width: min,
        col_max_pixel_width: max,
    }
}

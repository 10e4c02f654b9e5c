//! Mock hardware for host tests

use std::cell::{Cell, RefCell};
use std::rc::Rc;
use std::vec::Vec;

use tandem_hal::{Clock, OutputPin};

/// Shared record of every pin write, in order
#[derive(Clone, Default)]
pub struct PinLog {
    writes: Rc<RefCell<Vec<(u8, bool)>>>,
    next_id: Rc<Cell<u8>>,
}

impl PinLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create `count` pins with consecutive ids, all logging here
    pub fn pins(&self, count: usize) -> Vec<MockPin> {
        (0..count)
            .map(|_| {
                let id = self.next_id.get();
                self.next_id.set(id + 1);
                MockPin {
                    id,
                    high: false,
                    log: self.writes.clone(),
                }
            })
            .collect()
    }

    pub fn writes(&self) -> Vec<(u8, bool)> {
        self.writes.borrow().clone()
    }

    pub fn write_count(&self) -> usize {
        self.writes.borrow().len()
    }

    pub fn clear(&self) {
        self.writes.borrow_mut().clear();
    }
}

/// Mock GPIO pin
#[derive(Debug)]
pub struct MockPin {
    pub id: u8,
    high: bool,
    log: Rc<RefCell<Vec<(u8, bool)>>>,
}

impl OutputPin for MockPin {
    fn set_high(&mut self) {
        self.high = true;
        self.log.borrow_mut().push((self.id, true));
    }

    fn set_low(&mut self) {
        self.high = false;
        self.log.borrow_mut().push((self.id, false));
    }

    fn is_set_high(&self) -> bool {
        self.high
    }
}

/// Clock that advances by a fixed amount on every read
#[derive(Clone)]
pub struct MockClock {
    now: Rc<Cell<u64>>,
    step_ms: u64,
}

impl MockClock {
    pub fn new(start_ms: u64, step_ms: u64) -> Self {
        Self {
            now: Rc::new(Cell::new(start_ms)),
            step_ms,
        }
    }

    /// Clock that only moves when told to
    pub fn manual(start_ms: u64) -> Self {
        Self::new(start_ms, 0)
    }

    pub fn set(&self, ms: u64) {
        self.now.set(ms);
    }
}

impl Clock for MockClock {
    fn now_millis(&self) -> u64 {
        let now = self.now.get();
        self.now.set(now.wrapping_add(self.step_ms));
        now
    }
}

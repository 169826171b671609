use super::Schedule;
use crate::error::{EvoError, EvoResult};

/// Equal time for every occupied slot, handed out in slot order.
///
/// A slot counts as occupied while its last adjusted merit is positive.
/// With nothing occupied the scheduler keeps answering slot 0.
pub struct ConstScheduler {
    active: Vec<bool>,
    num_active: usize,
    cursor: usize,
}

impl ConstScheduler {
    pub fn new(num_slots: usize) -> EvoResult<Self> {
        if num_slots == 0 {
            return Err(EvoError::Config("constant scheduler needs at least one slot".into()));
        }
        Ok(Self {
            active: vec![false; num_slots],
            num_active: 0,
            cursor: num_slots - 1,
        })
    }

    pub fn num_active(&self) -> usize {
        self.num_active
    }
}

impl Schedule for ConstScheduler {
    fn adjust(&mut self, slot: usize, merit: f64, _deme: usize) -> EvoResult<()> {
        if slot >= self.active.len() {
            return Err(EvoError::Range {
                index: slot,
                size: self.active.len(),
            });
        }
        if !(merit >= 0.0) || !merit.is_finite() {
            return Err(EvoError::InvalidWeight(merit));
        }

        let now = merit > 0.0;
        match (self.active[slot], now) {
            (false, true) => self.num_active += 1,
            (true, false) => self.num_active -= 1,
            _ => {}
        }
        self.active[slot] = now;
        Ok(())
    }

    fn next_slot(&mut self) -> usize {
        if self.num_active == 0 {
            return 0;
        }
        let n = self.active.len();
        let mut slot = self.cursor;
        loop {
            slot = (slot + 1) % n;
            if self.active[slot] {
                self.cursor = slot;
                return slot;
            }
        }
    }

    fn num_slots(&self) -> usize {
        self.active.len()
    }

    fn deme_of(&self, _slot: usize) -> usize {
        0
    }
}

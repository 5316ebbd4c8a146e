//! Engine notifications
//!
//! Listeners are invoked synchronously from inside a step. They may change
//! fields of the stone they are handed but must not reach back into the
//! engine.

use std::cell::RefCell;
use std::rc::Rc;

use serde::{Deserialize, Serialize};

use super::stone::{Stone, StoneKey};

/// Listener for engine notifications; every method defaults to a no-op
pub trait EngineEvents {
    /// A stone left the launch line (wall-clock ms)
    fn stone_released(&mut self, _wall_clock_ms: f64) {}
    /// A stone came to rest in play, or was ruled out
    fn stone_stopped(&mut self, _stone: &mut Stone) {}
    /// The thrown stone crossed the near hog line
    fn hog_near_cross(&mut self) {}
    /// The thrown stone crossed the far hog line after the near one
    fn hog_split(&mut self, _duration_ms: f64) {}
}

/// Listener that ignores everything
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopEvents;

impl EngineEvents for NoopEvents {}

/// Recorded notification
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum EngineEvent {
    Released { wall_clock_ms: f64 },
    Stopped { stone: StoneKey, is_out: bool },
    HogNearCross,
    HogSplit { duration_ms: f64 },
}

/// Listener that keeps every notification; clones share the same log
#[derive(Debug, Clone, Default)]
pub struct EventLog {
    events: Rc<RefCell<Vec<EngineEvent>>>,
}

impl EventLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Copy of everything recorded so far
    pub fn events(&self) -> Vec<EngineEvent> {
        self.events.borrow().clone()
    }

    /// Take everything recorded so far, leaving the log empty
    pub fn drain(&self) -> Vec<EngineEvent> {
        std::mem::take(&mut *self.events.borrow_mut())
    }

    pub fn count(&self, matches: impl Fn(&EngineEvent) -> bool) -> usize {
        self.events.borrow().iter().filter(|e| matches(e)).count()
    }

    fn push(&self, event: EngineEvent) {
        self.events.borrow_mut().push(event);
    }
}

impl EngineEvents for EventLog {
    fn stone_released(&mut self, wall_clock_ms: f64) {
        self.push(EngineEvent::Released { wall_clock_ms });
    }

    fn stone_stopped(&mut self, stone: &mut Stone) {
        self.push(EngineEvent::Stopped {
            stone: stone.key(),
            is_out: stone.is_out,
        });
    }

    fn hog_near_cross(&mut self) {
        self.push(EngineEvent::HogNearCross);
    }

    fn hog_split(&mut self, duration_ms: f64) {
        self.push(EngineEvent::HogSplit { duration_ms });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clones_share_the_log() {
        let log = EventLog::new();
        let mut listener = log.clone();
        listener.hog_near_cross();
        listener.hog_split(1234.0);
        assert_eq!(
            log.events(),
            vec![
                EngineEvent::HogNearCross,
                EngineEvent::HogSplit { duration_ms: 1234.0 }
            ]
        );
        assert_eq!(log.drain().len(), 2);
        assert!(log.events().is_empty());
    }
}

//! Deterministic event scheduling against the shared simulation clock.
//!
//! The chain itself only sees [`EventScheduler`] — in production that is
//! the host runtime's event queue. [`EventQueue`] is the reference
//! implementation: events ordered by timestamp, ties broken by insertion
//! order, fully sequential dispatch. An event is never delivered before
//! its scheduled time, and scheduling into the past is a causality
//! violation that aborts the run.

use std::collections::BTreeMap;
use std::sync::{Mutex, MutexGuard, PoisonError};

use cellsim_core::SimTime;

use crate::error::ChainError;
use crate::event::{ChainEvent, ChainPayload};
use crate::manager::ChainManager;

/// Scheduling surface the chain modules depend on.
pub trait EventScheduler: Send + Sync {
    /// The current simulation time.
    fn now(&self) -> SimTime;

    /// Enqueue a future event. Forward-only: `event.time` must be at or
    /// after the current time.
    fn schedule(&self, event: ChainEvent) -> Result<(), ChainError>;
}

/// Queue key: time first, then insertion sequence for FIFO ties.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
struct EventKey {
    time: SimTime,
    sequence: u64,
}

struct QueueState {
    events: BTreeMap<EventKey, ChainEvent>,
    sequence: u64,
    now: SimTime,
}

/// Reference event queue: deterministic, in-order, sequential.
pub struct EventQueue {
    state: Mutex<QueueState>,
}

impl EventQueue {
    pub fn new() -> Self {
        EventQueue {
            state: Mutex::new(QueueState {
                events: BTreeMap::new(),
                sequence: 0,
                now: SimTime::ZERO,
            }),
        }
    }

    fn state(&self) -> MutexGuard<'_, QueueState> {
        // A poisoned lock only means another thread panicked mid-insert;
        // the queue state itself is still ordered.
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Remove and return the earliest event, advancing the clock to it.
    pub fn pop_next(&self) -> Option<ChainEvent> {
        let mut state = self.state();
        let key = *state.events.keys().next()?;
        let event = state.events.remove(&key)?;
        state.now = event.time;
        Some(event)
    }

    pub fn len(&self) -> usize {
        self.state().events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.state().events.is_empty()
    }
}

impl Default for EventQueue {
    fn default() -> Self {
        Self::new()
    }
}

impl EventScheduler for EventQueue {
    fn now(&self) -> SimTime {
        self.state().now
    }

    fn schedule(&self, event: ChainEvent) -> Result<(), ChainError> {
        let mut state = self.state();
        if event.time < state.now {
            return Err(ChainError::PastScheduling {
                module: event.target,
                scheduled: event.time,
                now: state.now,
            });
        }
        let key = EventKey {
            time: event.time,
            sequence: state.sequence,
        };
        state.sequence += 1;
        state.events.insert(key, event);
        Ok(())
    }
}

/// Counters from one run of the queue.
#[derive(Debug, Clone, Copy, Default)]
pub struct RunStats {
    pub events_dispatched: u64,
    pub transmissions: u64,
    pub completions: u64,
}

/// Drains the queue through the manager until no events remain.
///
/// This is the reference sequential dispatch loop: one event at a time,
/// each handler running to completion before the next is popped.
pub struct ChainRunner<'a> {
    queue: &'a EventQueue,
    manager: &'a ChainManager,
}

impl<'a> ChainRunner<'a> {
    pub fn new(queue: &'a EventQueue, manager: &'a ChainManager) -> Self {
        ChainRunner { queue, manager }
    }

    pub fn run(&self) -> anyhow::Result<RunStats> {
        let mut stats = RunStats::default();
        while let Some(event) = self.queue.pop_next() {
            match event.payload {
                ChainPayload::Transmission(_) => stats.transmissions += 1,
                ChainPayload::Completion(_) => stats.completions += 1,
            }
            tracing::trace!(module = %event.target, time = %event.time, "dispatching event");
            self.manager.dispatch(event)?;
            stats.events_dispatched += 1;
        }
        Ok(stats)
    }
}

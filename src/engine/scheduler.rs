//! Lock-free handoff of parameter changes from the control context to the
//! render context.
//!
//! The control side pushes [`ScheduledEvent`]s into a single-producer,
//! single-consumer ring buffer. Once per render call the render side empties
//! the ring. Events due before the end of the block go into an [`EventList`]
//! with their absolute sample times converted into block offsets. Events
//! further in the future move into a pending buffer owned by the render side,
//! kept in time order, so they never hold back the writes queued behind them.
//!
//! ```text
//!   control thread            render thread
//!   ──────────────            ─────────────
//!   schedule(At 9000) ─┐
//!   set_value(...)  ───┼─▶ ring ──▶ due now? ──yes──▶ EventList (offsets)
//!   schedule(At 300) ──┘               │                  ▲
//!                                      no                 │ once due
//!                                      ▼                  │
//!                                  pending (by time) ─────┘
//! ```

use std::collections::VecDeque;

use rtrb::{Consumer, PeekError, Producer, PushError, RingBuffer};

use crate::{
    engine::event::{EventList, EventTime, ParamEvent, ScheduledEvent},
    params::ParamId,
};

/// Create a connected scheduler/queue pair with room for `capacity` events
/// in flight and another `capacity` waiting for a future block.
pub fn channel(capacity: usize) -> (Scheduler, EventQueue) {
    let (tx, rx) = RingBuffer::<ScheduledEvent>::new(capacity);
    (
        Scheduler { tx },
        EventQueue {
            rx,
            pending: VecDeque::with_capacity(capacity),
            pending_capacity: capacity,
        },
    )
}

/// Control-context end of the queue.
pub struct Scheduler {
    tx: Producer<ScheduledEvent>,
}

impl Scheduler {
    /// Queue a change of `param` to `value`, ramped over `ramp_frames`,
    /// starting at `time`.
    ///
    /// Sample-timed events may be queued in any order. Events due at the same
    /// sample are applied in the order they were queued.
    pub fn schedule(
        &mut self,
        time: EventTime,
        ramp_frames: u32,
        param: ParamId,
        value: f32,
    ) -> Result<(), ScheduleError> {
        self.enqueue(ScheduledEvent {
            time,
            param,
            value,
            ramp_frames,
        })
    }

    pub fn enqueue(&mut self, event: ScheduledEvent) -> Result<(), ScheduleError> {
        if self.tx.is_abandoned() {
            return Err(ScheduleError::Abandoned);
        }
        self.tx.push(event).map_err(|PushError::Full(returned)| {
            ScheduleError::QueueFull(returned)
        })
    }

    /// Free slots left in the queue.
    pub fn slots(&self) -> usize {
        self.tx.slots()
    }
}

/// Outcome of draining one block's worth of events.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DrainReport {
    /// Events moved into the list
    pub drained: u32,
    /// Events whose time had already passed, applied at offset 0
    pub late: u32,
    /// The list or the pending buffer filled up; the rest stays queued
    pub overflowed: bool,
}

/// Render-context end of the queue.
pub struct EventQueue {
    rx: Consumer<ScheduledEvent>,
    /// Future events, ascending by time; equal times in arrival order
    pending: VecDeque<(u64, ScheduledEvent)>,
    pending_capacity: usize,
}

impl EventQueue {
    /// Move every event due in `[block_start, block_start + frame_count)` into
    /// `list`. Never blocks or allocates.
    ///
    /// An empty block takes nothing, so no event is lost to a zero-length
    /// render.
    pub fn drain_block(
        &mut self,
        block_start: u64,
        frame_count: u32,
        list: &mut EventList,
    ) -> DrainReport {
        let mut report = DrainReport::default();
        if frame_count == 0 {
            return report;
        }
        let block_end = block_start + u64::from(frame_count);

        // Everything pending was queued before anything still in the ring
        while let Some(&(time, event)) = self.pending.front() {
            if time >= block_end {
                break;
            }
            if list.is_full() {
                report.overflowed = true;
                return report;
            }
            self.pending.pop_front();
            Self::push_due(list, &mut report, block_start, time, event);
        }

        loop {
            let event = match self.rx.peek() {
                Ok(event) => *event,
                Err(PeekError::Empty) => break,
            };

            match event.time {
                EventTime::At(time) if time >= block_end => {
                    if self.pending.len() >= self.pending_capacity {
                        report.overflowed = true;
                        break;
                    }
                    let _ = self.rx.pop();
                    self.insert_pending(time, event);
                }
                time => {
                    if list.is_full() {
                        report.overflowed = true;
                        break;
                    }
                    let _ = self.rx.pop();
                    let time = match time {
                        EventTime::Immediate => block_start,
                        EventTime::At(time) => time,
                    };
                    Self::push_due(list, &mut report, block_start, time, event);
                }
            }
        }

        report
    }

    fn push_due(
        list: &mut EventList,
        report: &mut DrainReport,
        block_start: u64,
        time: u64,
        event: ScheduledEvent,
    ) {
        let offset = time.saturating_sub(block_start) as u32;
        // Cannot fail, fullness was checked by the caller
        let _ = list.push(ParamEvent::new(
            offset,
            event.param,
            event.value,
            event.ramp_frames,
        ));
        report.drained += 1;
        if time < block_start {
            report.late += 1;
        }
    }

    fn insert_pending(&mut self, time: u64, event: ScheduledEvent) {
        // Usually queued in time order, so scan from the back
        let mut index = self.pending.len();
        while index > 0 && self.pending[index - 1].0 > time {
            index -= 1;
        }
        self.pending.insert(index, (time, event));
    }

    /// Take the next event regardless of its time: pending events in time
    /// order, then whatever is still in the ring.
    ///
    /// Used when render resources are torn down and pending changes are
    /// applied directly.
    pub fn pop(&mut self) -> Option<ScheduledEvent> {
        match self.pending.pop_front() {
            Some((_, event)) => Some(event),
            None => self.rx.pop().ok(),
        }
    }

    /// Events waiting for a future block.
    pub fn pending_len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty() && self.rx.is_empty()
    }
}

/// Errors returned when a change cannot be queued.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ScheduleError {
    /// The queue has no free slot; the event is handed back
    QueueFull(ScheduledEvent),
    /// The render side has been dropped
    Abandoned,
}

impl std::fmt::Display for ScheduleError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ScheduleError::QueueFull(event) => {
                write!(
                    f,
                    "Parameter queue full: dropped change of {:?} to {}",
                    event.param, event.value
                )
            }
            ScheduleError::Abandoned => write!(f, "Parameter queue has no render side"),
        }
    }
}

impl std::error::Error for ScheduleError {}

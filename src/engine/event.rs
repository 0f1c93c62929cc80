//! Parameter-change events and the per-block event list.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::params::ParamId;

/// When a scheduled change should take effect, on the render clock.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventTime {
    /// At the start of the next rendered block
    Immediate,
    /// At an absolute sample time
    At(u64),
}

/// A parameter change as handed from the control context to the render
/// context.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScheduledEvent {
    pub time: EventTime,
    pub param: ParamId,
    pub value: f32,
    pub ramp_frames: u32,
}

/// A parameter change positioned inside the current render block.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ParamEvent {
    /// Frame offset from the start of the block, in `[0, frame_count)`
    pub sample_offset: u32,
    pub param: ParamId,
    pub value: f32,
    /// 0 means jump, anything else ramps over that many frames
    pub ramp_frames: u32,
}

impl ParamEvent {
    pub fn new(sample_offset: u32, param: ParamId, value: f32, ramp_frames: u32) -> Self {
        Self {
            sample_offset,
            param,
            value,
            ramp_frames,
        }
    }
}

/// Pre-allocated, offset-ordered list of the events for one block.
///
/// Capacity is fixed at construction so pushing from the render thread never
/// allocates. Insertion keeps events sorted by offset and stable, so events
/// at the same offset stay in arrival order.
pub struct EventList {
    events: Vec<ParamEvent>,
    capacity: usize,
}

impl EventList {
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            events: Vec::with_capacity(capacity),
            capacity,
        }
    }

    /// Clear without deallocating.
    #[inline]
    pub fn clear(&mut self) {
        self.events.clear();
    }

    /// Insert `event` after every event at the same or an earlier offset.
    ///
    /// Hands the event back when the list is full.
    #[inline]
    pub fn push(&mut self, event: ParamEvent) -> Result<(), ParamEvent> {
        if self.is_full() {
            return Err(event);
        }

        // Producers almost always deliver in order, so scan from the back
        let mut index = self.events.len();
        while index > 0 && self.events[index - 1].sample_offset > event.sample_offset {
            index -= 1;
        }
        self.events.insert(index, event);
        Ok(())
    }

    #[inline]
    pub fn as_slice(&self) -> &[ParamEvent] {
        &self.events
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.events.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    #[inline]
    pub fn is_full(&self) -> bool {
        self.events.len() >= self.capacity
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }
}

impl Default for EventList {
    fn default() -> Self {
        Self::with_capacity(256)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn offsets(list: &EventList) -> Vec<u32> {
        list.as_slice().iter().map(|e| e.sample_offset).collect()
    }

    #[test]
    fn test_push_keeps_offset_order() {
        let mut list = EventList::with_capacity(8);
        for offset in [10, 3, 7, 0, 7] {
            list.push(ParamEvent::new(offset, ParamId::Cutoff, 0.0, 0))
                .unwrap();
        }
        assert_eq!(offsets(&list), vec![0, 3, 7, 7, 10]);
    }

    #[test]
    fn test_push_is_stable_for_equal_offsets() {
        let mut list = EventList::with_capacity(4);
        list.push(ParamEvent::new(5, ParamId::Cutoff, 1.0, 0)).unwrap();
        list.push(ParamEvent::new(2, ParamId::Resonance, 9.0, 0)).unwrap();
        list.push(ParamEvent::new(5, ParamId::Cutoff, 2.0, 0)).unwrap();
        list.push(ParamEvent::new(5, ParamId::Cutoff, 3.0, 0)).unwrap();

        let values: Vec<f32> = list.as_slice().iter().map(|e| e.value).collect();
        assert_eq!(values, vec![9.0, 1.0, 2.0, 3.0]);
    }

    #[test]
    fn test_push_when_full_returns_event() {
        let mut list = EventList::with_capacity(1);
        list.push(ParamEvent::new(0, ParamId::Cutoff, 1.0, 0)).unwrap();

        let rejected = ParamEvent::new(1, ParamId::Resonance, 2.0, 0);
        assert_eq!(list.push(rejected), Err(rejected));
        assert_eq!(list.len(), 1);
        assert!(list.is_full());
    }

    #[test]
    fn test_clear_keeps_capacity() {
        let mut list = EventList::with_capacity(16);
        list.push(ParamEvent::new(0, ParamId::Cutoff, 1.0, 0)).unwrap();
        list.clear();
        assert!(list.is_empty());
        assert_eq!(list.capacity(), 16);
    }
}

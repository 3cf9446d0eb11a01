use crate::core::body::BodyId;
use crate::core::event::Event;
use std::collections::BTreeSet;

/// Time-ordered multiset of pending collision events.
///
/// A dumb ordered container: it never inspects body state and never fixes up
/// timestamps when a body moves. Validity of an entry is the simulation's
/// concern; staleness is handled by [`EventQueue::remove_involving`] at
/// resolution time, never by executing a stale event. Every stored event has
/// a distinct `(time, pair, seq)` key, so a `BTreeSet` behaves as a multiset
/// over times.
#[derive(Debug, Default)]
pub struct EventQueue {
    events: BTreeSet<Event>,
}

impl EventQueue {
    /// Empty queue.
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert an event, keyed by time.
    pub fn push(&mut self, ev: Event) {
        self.events.insert(ev);
    }

    /// Earliest pending event, if any.
    #[inline]
    pub fn peek_min(&self) -> Option<&Event> {
        self.events.first()
    }

    /// Remove and return the earliest pending event.
    #[inline]
    pub fn pop_min(&mut self) -> Option<Event> {
        self.events.pop_first()
    }

    /// Remove and return every event naming `id`, in time order. The
    /// relative order of the surviving events is untouched.
    pub fn remove_involving(&mut self, id: BodyId) -> Vec<Event> {
        let removed: Vec<Event> = self
            .events
            .iter()
            .filter(|ev| ev.pair().contains(id))
            .copied()
            .collect();
        for ev in &removed {
            self.events.remove(ev);
        }
        removed
    }

    /// Number of pending events.
    pub fn len(&self) -> usize {
        self.events.len()
    }

    /// Whether no events are pending.
    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// Drop all pending events.
    pub fn clear(&mut self) {
        self.events.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::event::Pair;
    use crate::error::Result;

    fn ev(time: f64, i: u32, j: Option<u32>, seq: u64) -> Result<Event> {
        let second = match j {
            Some(j) => BodyId::Ball(j),
            None => BodyId::Container,
        };
        Event::new(time, Pair::new(BodyId::Ball(i), second)?, seq)
    }

    #[test]
    fn pops_in_time_order() -> Result<()> {
        let mut q = EventQueue::new();
        q.push(ev(3.0, 0, Some(1), 0)?);
        q.push(ev(1.0, 1, None, 1)?);
        q.push(ev(2.0, 2, Some(3), 2)?);
        assert_eq!(q.len(), 3);
        assert_eq!(q.pop_min().map(|e| e.time()), Some(1.0));
        assert_eq!(q.pop_min().map(|e| e.time()), Some(2.0));
        assert_eq!(q.pop_min().map(|e| e.time()), Some(3.0));
        assert!(q.pop_min().is_none());
        Ok(())
    }

    #[test]
    fn peek_does_not_remove() -> Result<()> {
        let mut q = EventQueue::new();
        q.push(ev(1.5, 0, None, 0)?);
        assert_eq!(q.peek_min().map(|e| e.time()), Some(1.5));
        assert_eq!(q.len(), 1);
        Ok(())
    }

    #[test]
    fn equal_times_are_kept_as_a_multiset() -> Result<()> {
        let mut q = EventQueue::new();
        q.push(ev(1.0, 0, Some(1), 0)?);
        q.push(ev(1.0, 2, Some(3), 1)?);
        q.push(ev(1.0, 4, None, 2)?);
        assert_eq!(q.len(), 3);
        Ok(())
    }

    #[test]
    fn remove_involving_extracts_only_matching() -> Result<()> {
        let mut q = EventQueue::new();
        q.push(ev(1.0, 0, Some(1), 0)?);
        q.push(ev(2.0, 1, None, 1)?);
        q.push(ev(3.0, 2, Some(3), 2)?);
        let removed = q.remove_involving(BodyId::Ball(1));
        assert_eq!(removed.len(), 2);
        assert!(removed.iter().all(|e| e.pair().contains(BodyId::Ball(1))));
        assert_eq!(q.len(), 1);
        assert_eq!(q.peek_min().map(|e| e.time()), Some(3.0));
        Ok(())
    }

    #[test]
    fn remove_involving_container_hits_wall_events() -> Result<()> {
        let mut q = EventQueue::new();
        q.push(ev(1.0, 0, None, 0)?);
        q.push(ev(2.0, 0, Some(1), 1)?);
        let removed = q.remove_involving(BodyId::Container);
        assert_eq!(removed.len(), 1);
        assert_eq!(removed[0].time(), 1.0);
        assert_eq!(q.len(), 1);
        Ok(())
    }
}

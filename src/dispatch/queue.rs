//! # Bounded, deduplicating hall-call queue.
//!
//! [`HallCallQueue`] holds at most one live [`HallCall`] per (floor, direction).
//! Capacity bounds the number of distinct pairs, not journey volume: a
//! hundred journeys from floor 3 going up occupy one slot.
//!
//! ## Rules
//! - `get_or_create` merges into an existing call, else creates one if below
//!   capacity, else returns [`RequestError::QueueFull`]; nothing is overwritten.
//! - `pending_ordered_by_age` lists `Pending` calls oldest first (ties by id),
//!   which is the order the building retries them in.
//! - Completed calls are removed by the building in the same critical section
//!   that completed them.

use std::collections::{BTreeMap, HashMap};
use std::time::Instant;

use crate::error::RequestError;
use crate::types::{CallDirection, Floor, HallCallId};

use super::hall_call::{CallKey, HallCall};

/// Result of folding a journey into the queue.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Fold {
    pub id: HallCallId,
    /// `true` if a new call was created, `false` if merged into an existing one.
    pub created: bool,
    /// Copy of the call after the fold.
    pub call: HallCall,
}

/// Hall calls keyed by (floor, direction).
#[derive(Debug)]
pub struct HallCallQueue {
    capacity: usize,
    calls: BTreeMap<HallCallId, HallCall>,
    index: HashMap<CallKey, HallCallId>,
    next_id: u64,
}

impl HallCallQueue {
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity,
            calls: BTreeMap::new(),
            index: HashMap::new(),
            next_id: 1,
        }
    }

    /// Queue sized for a building: `2 × (floor_count − 2) + 2`.
    pub fn for_floors(floor_count: usize) -> Self {
        Self::new(2 * floor_count.saturating_sub(2) + 2)
    }

    #[inline]
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.calls.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.calls.is_empty()
    }

    /// Returns the call for (floor, direction), creating it if there is room,
    /// and folds `destination` into it.
    ///
    /// A `destination` on the wrong side of `floor` is rejected before anything changes.
    pub fn get_or_create(
        &mut self,
        floor: Floor,
        direction: CallDirection,
        destination: Floor,
        now: Instant,
    ) -> Result<Fold, RequestError> {
        if !direction.admits(floor, destination) {
            return Err(RequestError::Misdirected {
                floor,
                destination,
                direction,
            });
        }
        if let Some(&id) = self.index.get(&(floor, direction)) {
            if let Some(call) = self.calls.get_mut(&id) {
                call.add_destination(destination);
                return Ok(Fold {
                    id,
                    created: false,
                    call: call.clone(),
                });
            }
        }
        if self.calls.len() >= self.capacity {
            return Err(RequestError::QueueFull {
                capacity: self.capacity,
            });
        }

        let id = HallCallId(self.next_id);
        self.next_id += 1;
        let mut call = HallCall::new(id, floor, direction, now);
        call.add_destination(destination);
        self.index.insert(call.key(), id);
        self.calls.insert(id, call.clone());
        Ok(Fold {
            id,
            created: true,
            call,
        })
    }

    pub fn get(&self, id: HallCallId) -> Option<&HallCall> {
        self.calls.get(&id)
    }

    pub fn get_mut(&mut self, id: HallCallId) -> Option<&mut HallCall> {
        self.calls.get_mut(&id)
    }

    pub fn find(&self, floor: Floor, direction: CallDirection) -> Option<&HallCall> {
        self.index
            .get(&(floor, direction))
            .and_then(|id| self.calls.get(id))
    }

    /// Removes a call and frees its (floor, direction) slot.
    pub fn remove(&mut self, id: HallCallId) -> Option<HallCall> {
        let call = self.calls.remove(&id)?;
        if self.index.get(&call.key()) == Some(&id) {
            self.index.remove(&call.key());
        }
        Some(call)
    }

    /// Ids of `Pending` calls, oldest first.
    pub fn pending_ordered_by_age(&self) -> Vec<HallCallId> {
        let mut pending: Vec<&HallCall> = self.calls.values().filter(|c| c.is_pending()).collect();
        pending.sort_by_key(|c| (c.created_at(), c.id()));
        pending.into_iter().map(HallCall::id).collect()
    }

    /// All calls, oldest first.
    pub fn iter_by_age(&self) -> Vec<&HallCall> {
        let mut all: Vec<&HallCall> = self.calls.values().collect();
        all.sort_by_key(|c| (c.created_at(), c.id()));
        all
    }

    pub fn pending_count(&self) -> usize {
        self.calls.values().filter(|c| c.is_pending()).count()
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use crate::types::ElevatorId;

    #[test]
    fn same_floor_and_direction_merge() {
        let mut q = HallCallQueue::for_floors(10);
        let now = Instant::now();
        let a = q.get_or_create(3, CallDirection::Up, 8, now).expect("room");
        let b = q.get_or_create(3, CallDirection::Up, 9, now).expect("room");
        assert!(a.created);
        assert!(!b.created);
        assert_eq!(a.id, b.id);
        assert_eq!(q.len(), 1);
        assert_eq!(b.call.destinations().collect::<Vec<_>>(), vec![8, 9]);
        assert_eq!(q.get(a.id), Some(&b.call));
    }

    #[test]
    fn opposite_directions_are_distinct_calls() {
        let mut q = HallCallQueue::for_floors(10);
        let now = Instant::now();
        let up = q.get_or_create(3, CallDirection::Up, 8, now).expect("room");
        let down = q.get_or_create(3, CallDirection::Down, 0, now).expect("room");
        assert_ne!(up.id, down.id);
        assert_eq!(q.len(), 2);
    }

    #[test]
    fn full_queue_rejects_new_keys_but_still_merges() {
        assert_eq!(HallCallQueue::for_floors(3).capacity(), 4);

        let mut q = HallCallQueue::new(2);
        let now = Instant::now();
        q.get_or_create(0, CallDirection::Up, 2, now).expect("room");
        q.get_or_create(3, CallDirection::Down, 1, now).expect("room");

        let err = q.get_or_create(5, CallDirection::Up, 8, now);
        assert_eq!(err.map(|f| f.id), Err(RequestError::QueueFull { capacity: 2 }));
        assert_eq!(q.len(), 2);

        let merged = q.get_or_create(3, CallDirection::Down, 0, now).expect("merge");
        assert!(!merged.created);
    }

    #[test]
    fn destination_behind_the_call_is_rejected_untouched() {
        let mut q = HallCallQueue::for_floors(10);
        let now = Instant::now();
        assert_eq!(
            q.get_or_create(4, CallDirection::Up, 2, now).map(|f| f.id),
            Err(RequestError::Misdirected {
                floor: 4,
                destination: 2,
                direction: CallDirection::Up,
            })
        );
        assert!(q.is_empty());

        let up = q.get_or_create(4, CallDirection::Up, 7, now).expect("room");
        assert!(q.get_or_create(4, CallDirection::Up, 4, now).is_err());
        assert_eq!(
            q.get(up.id).map(|c| c.destinations().collect::<Vec<_>>()),
            Some(vec![7])
        );
    }

    #[test]
    fn removing_frees_the_slot() {
        let mut q = HallCallQueue::new(1);
        let now = Instant::now();
        let first = q.get_or_create(1, CallDirection::Up, 2, now).expect("room");
        assert!(q.get_or_create(4, CallDirection::Up, 5, now).is_err());
        assert!(q.remove(first.id).is_some());
        assert!(q.find(1, CallDirection::Up).is_none());
        assert!(q.get_or_create(4, CallDirection::Up, 5, now).is_ok());
    }

    #[test]
    fn pending_are_ordered_by_age_and_skip_assigned() {
        let mut q = HallCallQueue::for_floors(10);
        let t0 = Instant::now();
        let late = q
            .get_or_create(7, CallDirection::Down, 1, t0 + Duration::from_secs(2))
            .expect("room");
        let early = q.get_or_create(2, CallDirection::Up, 5, t0).expect("room");
        let middle = q
            .get_or_create(4, CallDirection::Up, 6, t0 + Duration::from_secs(1))
            .expect("room");

        assert_eq!(q.pending_ordered_by_age(), vec![early.id, middle.id, late.id]);

        q.get_mut(middle.id).expect("present").assign(ElevatorId(0));
        assert_eq!(q.pending_ordered_by_age(), vec![early.id, late.id]);
        assert_eq!(q.pending_count(), 2);
    }
}

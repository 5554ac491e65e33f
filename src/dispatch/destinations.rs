//! # Per-elevator destination set.
//!
//! [`DestinationSet`] stores the floors an elevator still intends to visit as
//! one slot per floor plus an explicit count. Emptiness is the count, never a
//! sentinel floor value: floor 0 is an ordinary destination.
//!
//! The set carries the elevator's **heading** and the **anchor** floor the
//! heading was last established at. With heading `Up`, floors below the anchor
//! are rejected; with `Down`, floors above it. With `Idle` anything in range is
//! accepted.
//!
//! ## Queries
//! ```text
//! next_destination(cur):
//!   Up   → smallest floor ≥ cur, else the maximum (wrap)
//!   Down → largest floor ≤ cur,  else the minimum (wrap)
//!   Idle → nearest to cur (ties → lower floor)
//!
//! furthest_destination():
//!   Up → max, Down → min, Idle → furthest from anchor
//! ```

use std::cmp::Reverse;

use crate::error::DestinationError;
use crate::types::{Direction, Floor};

/// Ordered set of pending floors with a heading.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DestinationSet {
    slots: Vec<bool>,
    len: usize,
    heading: Direction,
    anchor: Floor,
}

impl DestinationSet {
    /// An empty, idle set for a building with `floor_count` floors.
    pub fn new(floor_count: usize) -> Self {
        Self {
            slots: vec![false; floor_count],
            len: 0,
            heading: Direction::Idle,
            anchor: 0,
        }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.len
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    #[inline]
    pub fn heading(&self) -> Direction {
        self.heading
    }

    /// Establishes the heading used for validation and `next`/`furthest` queries.
    pub fn set_heading(&mut self, heading: Direction, anchor: Floor) {
        self.heading = heading;
        self.anchor = anchor;
    }

    /// Adds `floor`; returns `true` if it was not already present.
    pub fn add(&mut self, floor: Floor) -> Result<bool, DestinationError> {
        if floor >= self.slots.len() {
            return Err(DestinationError::OutOfRange {
                floor,
                floor_count: self.slots.len(),
            });
        }
        let behind = match self.heading {
            Direction::Up => floor < self.anchor,
            Direction::Down => floor > self.anchor,
            Direction::Idle => false,
        };
        if behind {
            return Err(DestinationError::WrongDirection {
                floor,
                anchor: self.anchor,
                heading: self.heading,
            });
        }
        if self.slots[floor] {
            return Ok(false);
        }
        self.slots[floor] = true;
        self.len += 1;
        Ok(true)
    }

    /// Removes `floor`; returns `true` if it was present.
    pub fn remove(&mut self, floor: Floor) -> bool {
        match self.slots.get_mut(floor) {
            Some(slot) if *slot => {
                *slot = false;
                self.len -= 1;
                true
            }
            _ => false,
        }
    }

    #[inline]
    pub fn contains(&self, floor: Floor) -> bool {
        self.slots.get(floor).copied().unwrap_or(false)
    }

    /// Stored floors, ascending.
    pub fn iter(&self) -> impl Iterator<Item = Floor> + '_ {
        self.slots
            .iter()
            .enumerate()
            .filter_map(|(floor, &set)| set.then_some(floor))
    }

    pub fn min(&self) -> Option<Floor> {
        self.iter().next()
    }

    pub fn max(&self) -> Option<Floor> {
        self.slots.iter().rposition(|&set| set)
    }

    /// True if any stored floor lies strictly beyond `current` in the heading.
    pub fn has_ahead(&self, current: Floor) -> bool {
        match self.heading {
            Direction::Up => self.max().is_some_and(|f| f > current),
            Direction::Down => self.min().is_some_and(|f| f < current),
            Direction::Idle => false,
        }
    }

    /// The floor to travel toward from `current`. See the module docs.
    pub fn next_destination(&self, current: Floor) -> Option<Floor> {
        if self.is_empty() {
            return None;
        }
        match self.heading {
            Direction::Up => self.iter().find(|&f| f >= current).or_else(|| self.max()),
            Direction::Down => self
                .iter()
                .filter(|&f| f <= current)
                .last()
                .or_else(|| self.min()),
            Direction::Idle => self.iter().min_by_key(|&f| f.abs_diff(current)),
        }
    }

    /// Where the current sweep ends. See the module docs.
    pub fn furthest_destination(&self) -> Option<Floor> {
        match self.heading {
            Direction::Up => self.max(),
            Direction::Down => self.min(),
            Direction::Idle => {
                let anchor = self.anchor;
                self.iter().min_by_key(|&f| Reverse(f.abs_diff(anchor)))
            }
        }
    }
}

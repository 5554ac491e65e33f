//! Passenger journeys.
//!
//! A [`Request`] records one source → destination journey for wait-time
//! accounting. Movement is driven by its hall call, never by the request.

use std::sync::Arc;
use std::time::{Duration, Instant};

use crate::types::{Floor, HallCallId, RequestId, RequestStatus};

/// One passenger journey.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Request {
    id: RequestId,
    source: Floor,
    destination: Floor,
    tag: Arc<str>,
    created_at: Instant,
    status: RequestStatus,
    hall_call: Option<HallCallId>,
    completed_at: Option<Instant>,
}

impl Request {
    pub fn new(
        id: RequestId,
        source: Floor,
        destination: Floor,
        tag: impl Into<Arc<str>>,
        created_at: Instant,
    ) -> Self {
        Self {
            id,
            source,
            destination,
            tag: tag.into(),
            created_at,
            status: RequestStatus::Created,
            hall_call: None,
            completed_at: None,
        }
    }

    #[inline]
    pub fn id(&self) -> RequestId {
        self.id
    }

    #[inline]
    pub fn source(&self) -> Floor {
        self.source
    }

    #[inline]
    pub fn destination(&self) -> Floor {
        self.destination
    }

    #[inline]
    pub fn tag(&self) -> &str {
        &self.tag
    }

    #[inline]
    pub fn created_at(&self) -> Instant {
        self.created_at
    }

    #[inline]
    pub fn status(&self) -> RequestStatus {
        self.status
    }

    #[inline]
    pub fn hall_call(&self) -> Option<HallCallId> {
        self.hall_call
    }

    /// Time from submission to pickup, once completed.
    pub fn wait_time(&self) -> Option<Duration> {
        self.completed_at
            .map(|done| done.saturating_duration_since(self.created_at))
    }

    /// `Created → AssignedToHallCall`.
    pub(crate) fn attach(&mut self, call: HallCallId) {
        self.hall_call = Some(call);
        self.status = RequestStatus::AssignedToHallCall;
    }

    /// `AssignedToHallCall → Completed`.
    pub(crate) fn complete(&mut self, at: Instant) {
        self.status = RequestStatus::Completed;
        self.completed_at = Some(at);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lifecycle_and_wait_time() {
        let t0 = Instant::now();
        let mut r = Request::new(RequestId(1), 5, 8, "lobby", t0);
        assert_eq!(r.status(), RequestStatus::Created);
        assert_eq!(r.wait_time(), None);

        r.attach(HallCallId(3));
        assert_eq!(r.status(), RequestStatus::AssignedToHallCall);
        assert_eq!(r.hall_call(), Some(HallCallId(3)));

        r.complete(t0 + Duration::from_secs(4));
        assert_eq!(r.status(), RequestStatus::Completed);
        assert_eq!(r.wait_time(), Some(Duration::from_secs(4)));
        assert_eq!(r.tag(), "lobby");
    }
}

//! # Metrics sink.
//!
//! The building reports counters, gauges and wait-time observations through a
//! [`MetricsSink`]. Calls happen inside the building's critical section, so
//! implementations must not block or lock anything the building might hold.
//!
//! [`InMemoryMetrics`] keeps everything in atomics and exposes a
//! [`MetricsSnapshot`]; [`NoopMetrics`] discards everything.

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use serde::Serialize;

/// Monotonic counters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Counter {
    RequestsTotal,
    RequestsAccepted,
    RequestsRejected,
    RateLimitHits,
    QueueFullRejections,
    StuckTransitions,
    CallsCompleted,
}

impl Counter {
    pub const ALL: [Counter; 7] = [
        Counter::RequestsTotal,
        Counter::RequestsAccepted,
        Counter::RequestsRejected,
        Counter::RateLimitHits,
        Counter::QueueFullRejections,
        Counter::StuckTransitions,
        Counter::CallsCompleted,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Counter::RequestsTotal => "requests_total",
            Counter::RequestsAccepted => "requests_accepted",
            Counter::RequestsRejected => "requests_rejected",
            Counter::RateLimitHits => "rate_limit_hits",
            Counter::QueueFullRejections => "queue_full_rejections",
            Counter::StuckTransitions => "stuck_transitions",
            Counter::CallsCompleted => "calls_completed",
        }
    }

    fn index(self) -> usize {
        self as usize
    }
}

/// Point-in-time gauges.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Gauge {
    PendingCalls,
    ActiveElevators,
}

impl Gauge {
    pub fn as_str(self) -> &'static str {
        match self {
            Gauge::PendingCalls => "pending_calls",
            Gauge::ActiveElevators => "active_elevators",
        }
    }
}

/// Receives metric updates from the building.
pub trait MetricsSink: Send + Sync + 'static {
    fn increment(&self, counter: Counter);

    fn set_gauge(&self, gauge: Gauge, value: u64);

    /// One completed request's wait time.
    fn observe_wait(&self, wait: Duration);
}

/// Discards every update.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopMetrics;

impl MetricsSink for NoopMetrics {
    fn increment(&self, _counter: Counter) {}
    fn set_gauge(&self, _gauge: Gauge, _value: u64) {}
    fn observe_wait(&self, _wait: Duration) {}
}

/// Lock-free in-process metrics.
#[derive(Debug, Default)]
pub struct InMemoryMetrics {
    counters: [AtomicU64; Counter::ALL.len()],
    pending_calls: AtomicU64,
    active_elevators: AtomicU64,
    wait_count: AtomicU64,
    wait_total_ms: AtomicU64,
    wait_max_ms: AtomicU64,
}

impl InMemoryMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn counter(&self, counter: Counter) -> u64 {
        self.counters[counter.index()].load(Ordering::Relaxed)
    }

    pub fn gauge(&self, gauge: Gauge) -> u64 {
        match gauge {
            Gauge::PendingCalls => self.pending_calls.load(Ordering::Relaxed),
            Gauge::ActiveElevators => self.active_elevators.load(Ordering::Relaxed),
        }
    }

    pub fn snapshot(&self) -> MetricsSnapshot {
        let wait_count = self.wait_count.load(Ordering::Relaxed);
        let wait_total_ms = self.wait_total_ms.load(Ordering::Relaxed);
        MetricsSnapshot {
            requests_total: self.counter(Counter::RequestsTotal),
            requests_accepted: self.counter(Counter::RequestsAccepted),
            requests_rejected: self.counter(Counter::RequestsRejected),
            rate_limit_hits: self.counter(Counter::RateLimitHits),
            queue_full_rejections: self.counter(Counter::QueueFullRejections),
            stuck_transitions: self.counter(Counter::StuckTransitions),
            calls_completed: self.counter(Counter::CallsCompleted),
            pending_calls: self.gauge(Gauge::PendingCalls),
            active_elevators: self.gauge(Gauge::ActiveElevators),
            waits_observed: wait_count,
            mean_wait_ms: wait_total_ms.checked_div(wait_count).unwrap_or(0),
            max_wait_ms: self.wait_max_ms.load(Ordering::Relaxed),
        }
    }
}

impl MetricsSink for InMemoryMetrics {
    fn increment(&self, counter: Counter) {
        self.counters[counter.index()].fetch_add(1, Ordering::Relaxed);
    }

    fn set_gauge(&self, gauge: Gauge, value: u64) {
        let slot = match gauge {
            Gauge::PendingCalls => &self.pending_calls,
            Gauge::ActiveElevators => &self.active_elevators,
        };
        slot.store(value, Ordering::Relaxed);
    }

    fn observe_wait(&self, wait: Duration) {
        let ms = wait.as_millis().min(u128::from(u64::MAX)) as u64;
        self.wait_count.fetch_add(1, Ordering::Relaxed);
        self.wait_total_ms.fetch_add(ms, Ordering::Relaxed);
        self.wait_max_ms.fetch_max(ms, Ordering::Relaxed);
    }
}

/// Copy of [`InMemoryMetrics`] at one instant.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct MetricsSnapshot {
    pub requests_total: u64,
    pub requests_accepted: u64,
    pub requests_rejected: u64,
    pub rate_limit_hits: u64,
    pub queue_full_rejections: u64,
    pub stuck_transitions: u64,
    pub calls_completed: u64,
    pub pending_calls: u64,
    pub active_elevators: u64,
    pub waits_observed: u64,
    pub mean_wait_ms: u64,
    pub max_wait_ms: u64,
}

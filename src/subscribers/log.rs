//! # Logging subscriber.
//!
//! [`LogWriter`] renders every [`Event`] as one `tracing` record at
//! [`Event::level`], so `RUST_LOG=liftsim=debug` shows movement and
//! `RUST_LOG=liftsim=warn` only rejections, releases and failures.
//!
//! ## Output format
//! ```text
//! [request-accepted] request=R4 call=C2 from=3 to=8 direction=up tag=generator
//! [hall-call-assigned] call=C2 elevator=E0 floor=3 direction=up tick=12
//! [moved] elevator=E0 floor=2 direction=up
//! [doors-opened] elevator=E0 floor=3
//! [doors-forced-closed] elevator=E1 floor=4 reason="loading for 31 ticks"
//! [request-rejected] from=0 to=0 tag=lobby reason="request_same_floor"
//! ```

use std::fmt::Write as _;

use async_trait::async_trait;
use tracing::Level;

use crate::events::{Event, EventKind};

use super::Subscribe;

/// Event renderer backed by `tracing`.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogWriter;

impl LogWriter {
    /// One human-readable line for `e`.
    pub fn render(e: &Event) -> String {
        let mut line = format!("[{}]", label(e.kind));
        let mut field = |name: &str, value: &dyn std::fmt::Display| {
            let _ = write!(line, " {name}={value}");
        };
        if let Some(v) = e.request {
            field("request", &v);
        }
        if let Some(v) = e.call {
            field("call", &v);
        }
        if let Some(v) = e.elevator {
            field("elevator", &v);
        }
        match e.kind {
            EventKind::RequestAccepted | EventKind::RequestRejected => {
                if let Some(v) = e.floor {
                    field("from", &v);
                }
                if let Some(v) = e.destination {
                    field("to", &v);
                }
            }
            _ => {
                if let Some(v) = e.floor {
                    field("floor", &v);
                }
            }
        }
        if let Some(v) = e.direction {
            field("direction", &v);
        }
        if let Some(v) = e.tick {
            field("tick", &v);
        }
        if let Some(v) = e.attempt {
            field("attempt", &v);
        }
        if let Some(v) = e.delay_ms {
            let name = if e.kind == EventKind::RequestCompleted { "wait_ms" } else { "delay_ms" };
            field(name, &v);
        }
        if let Some(v) = &e.source {
            let name = match e.kind {
                EventKind::RequestAccepted | EventKind::RequestRejected => "tag",
                _ => "driver",
            };
            field(name, v);
        }
        if let Some(v) = &e.reason {
            let _ = write!(line, " reason={:?}", v.as_ref());
        }
        line
    }
}

fn label(kind: EventKind) -> &'static str {
    match kind {
        EventKind::ShutdownRequested => "shutdown-requested",
        EventKind::AllStoppedWithin => "all-stopped-within-grace",
        EventKind::GraceExceeded => "grace-exceeded",
        EventKind::DriverStarted => "driver-started",
        EventKind::DriverStopped => "driver-stopped",
        EventKind::DriverFailed => "driver-failed",
        EventKind::BackoffScheduled => "backoff",
        EventKind::TickAdvanced => "tick",
        EventKind::RequestAccepted => "request-accepted",
        EventKind::RequestRejected => "request-rejected",
        EventKind::RequestCompleted => "request-completed",
        EventKind::HallCallCreated => "hall-call-created",
        EventKind::HallCallAssigned => "hall-call-assigned",
        EventKind::HallCallReleased => "hall-call-released",
        EventKind::HallCallCompleted => "hall-call-completed",
        EventKind::ElevatorMoved => "moved",
        EventKind::DoorsOpened => "doors-opened",
        EventKind::DoorsClosed => "doors-closed",
        EventKind::DoorsForcedClosed => "doors-forced-closed",
    }
}

#[async_trait]
impl Subscribe for LogWriter {
    async fn on_event(&self, e: &Event) {
        let line = Self::render(e);
        let level = e.level();
        if level == Level::ERROR {
            tracing::error!(seq = e.seq, "{line}");
        } else if level == Level::WARN {
            tracing::warn!(seq = e.seq, "{line}");
        } else if level == Level::INFO {
            tracing::info!(seq = e.seq, "{line}");
        } else if level == Level::DEBUG {
            tracing::debug!(seq = e.seq, "{line}");
        } else {
            tracing::trace!(seq = e.seq, "{line}");
        }
    }

    fn name(&self) -> &'static str {
        "log_writer"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{CallDirection, ElevatorId, HallCallId, RequestId};

    #[test]
    fn renders_journey_fields() {
        let ev = Event::new(EventKind::RequestAccepted)
            .with_request(RequestId(4))
            .with_call(HallCallId(2))
            .with_floor(3)
            .with_destination(8)
            .with_direction(CallDirection::Up)
            .with_source("generator");
        assert_eq!(
            LogWriter::render(&ev),
            "[request-accepted] request=R4 call=C2 from=3 to=8 direction=up tag=generator"
        );
    }

    #[test]
    fn renders_reason_quoted() {
        let ev = Event::new(EventKind::DoorsForcedClosed)
            .with_elevator(ElevatorId(1))
            .with_floor(4)
            .with_reason("loading for 31 ticks");
        assert_eq!(
            LogWriter::render(&ev),
            "[doors-forced-closed] elevator=E1 floor=4 reason=\"loading for 31 ticks\""
        );
    }

    #[tokio::test]
    async fn on_event_does_not_require_a_subscriber() {
        LogWriter.on_event(&Event::new(EventKind::TickAdvanced).with_tick(1)).await;
    }
}

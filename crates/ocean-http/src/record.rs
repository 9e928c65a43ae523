//! Trace records published by the tracer.

use std::fmt;

use chrono::{DateTime, Utc};

/// Correlates the request and response records of one round trip.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TraceId(pub u64);

impl fmt::Display for TraceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Which half of a round trip a record describes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    /// Outgoing request.
    Request,
    /// Returning response, or the transport error in its place.
    Response,
}

impl Direction {
    /// Arrow used when printing a record.
    #[must_use]
    pub const fn arrow(self) -> &'static str {
        match self {
            Self::Request => "->",
            Self::Response => "<-",
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Request => f.write_str("request"),
            Self::Response => f.write_str("response"),
        }
    }
}

/// One dumped request or response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TraceRecord {
    /// Round trip this record belongs to.
    pub id: TraceId,
    /// Request or response.
    pub direction: Direction,
    /// When the dump was taken.
    pub captured_at: DateTime<Utc>,
    /// Wire-format text.
    pub dump: String,
}

impl TraceRecord {
    /// Creates a record stamped with the current time.
    #[must_use]
    pub fn new(id: TraceId, direction: Direction, dump: String) -> Self {
        Self {
            id,
            direction,
            captured_at: Utc::now(),
            dump,
        }
    }

    /// Single-line rendering: arrow followed by the quoted, escaped dump.
    #[must_use]
    pub fn render(&self) -> String {
        format!("{} {:?}", self.direction.arrow(), self.dump)
    }
}

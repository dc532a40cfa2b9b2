//! Error types for the demo timeline engine.
//!
//! This module defines the error hierarchy for all failure cases during
//! index building, state reconstruction, and range extraction. Name
//! resolution failures are deliberately *not* errors: a sentinel string is
//! substituted so a single missing string-table entry never aborts a pass.

use thiserror::Error;

/// The main error type for timeline operations.
///
/// This enum covers the failure cases that abort a call:
/// - A corrupt or internally inconsistent message stream
/// - Seeking against an empty keyframe index
/// - Snapshot targets beyond the end of the recording
/// - Requests that cannot be satisfied as written (e.g. inverted windows)
///
/// A failed call never poisons its session; the session remains usable for
/// subsequent calls.
///
/// # Example
///
/// ```
/// use demo_timeline::error::{TimelineError, Result};
///
/// fn example_operation() -> Result<()> {
///     Err(TimelineError::Malformed {
///         reason: "combat log entry truncated".to_string(),
///     })
/// }
/// ```
#[derive(Error, Debug)]
pub enum TimelineError {
    /// The message stream is corrupt or unparseable beyond this point.
    ///
    /// Aborts the entire call: no partial results are returned.
    #[error("Malformed stream: {reason}")]
    Malformed {
        /// A description of what makes the stream malformed.
        reason: String,
    },

    /// The stream violated the tick-ordering contract.
    ///
    /// Message ticks must be non-decreasing; a regression means the decoder
    /// handed us an out-of-order stream and replay results would be wrong.
    #[error("Non-monotonic tick: {found} after {previous}")]
    NonMonotonicTick {
        /// The tick of the preceding message.
        previous: u32,
        /// The smaller tick found after it.
        found: u32,
    },

    /// A keyframe lookup was attempted against an index with no keyframes.
    ///
    /// This happens when the indexed stream contained no entity updates at
    /// all, or when the interval exceeded the stream length.
    #[error("No keyframes in index")]
    EmptyIndex,

    /// The requested tick lies beyond the end of the recording.
    #[error("Tick {target} is out of range: recording ends at tick {last}")]
    TickOutOfRange {
        /// The requested tick.
        target: u32,
        /// The last tick present in the stream.
        last: u32,
    },

    /// The request itself cannot be satisfied as written.
    #[error("Invalid request: {reason}")]
    InvalidRequest {
        /// A description of the problem with the request.
        reason: String,
    },
}

impl TimelineError {
    /// Creates a `Malformed` error from anything displayable.
    #[must_use]
    pub fn malformed(reason: impl Into<String>) -> Self {
        TimelineError::Malformed {
            reason: reason.into(),
        }
    }

    /// Creates an `InvalidRequest` error from anything displayable.
    #[must_use]
    pub fn invalid_request(reason: impl Into<String>) -> Self {
        TimelineError::InvalidRequest {
            reason: reason.into(),
        }
    }
}

/// A specialized Result type for timeline operations.
///
/// This is a convenience alias that uses `TimelineError` as the error type.
pub type Result<T> = std::result::Result<T, TimelineError>;

use thiserror::Error;

/// Conditions raised by the streaming core.
///
/// Every variant except `UnorderedRecording` is recoverable: the caller
/// logs it and carries on. An unordered bulk load is fatal to that load
/// call and the session does not start.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum StreamError {
    /// The incoming sample is older than the buffer tail; it was not
    /// inserted.
    #[error("out-of-order sample: t={t} arrived after t={last}")]
    OutOfOrderSample { t: f64, last: f64 },

    /// A bulk-loaded recording was not non-decreasing in `t`.
    #[error("recording is unordered at row {index}: t={t} follows t={prev}")]
    UnorderedRecording { index: usize, t: f64, prev: f64 },
}

impl StreamError {
    /// Whether the session may continue after reporting this condition.
    pub fn is_recoverable(&self) -> bool {
        !matches!(self, StreamError::UnorderedRecording { .. })
    }
}

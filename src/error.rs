//! Error taxonomy shared by the batch, deferred, and streaming transforms.

use thiserror::Error;

/// Errors reported by the transforms in this crate.
///
/// Batch and deferred transforms surface exactly one of these per failed
/// operation; partial output is never returned alongside an error. The
/// incremental [`Stream`](crate::stream::Stream) routes every variant through
/// its registered `on_error` handler instead of returning it.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum Error {
    /// The codec rejected the session parameters at creation time.
    #[error("failed to initialize codec session: {0}")]
    Init(String),

    /// The codec reported an internal state-machine violation. The session
    /// is torn down and must not be reused.
    #[error("codec stream error: {0}")]
    Stream(String),

    /// The compressed input is malformed or truncated (decompression only).
    #[error("invalid compressed data: {0}")]
    Data(String),

    /// Producing more output would exceed the configured `max_output` bound.
    #[error("output would exceed the configured limit of {limit} bytes")]
    OutputLimit {
        /// The configured `max_output` value that was hit.
        limit: usize,
    },

    /// The drain loop hit its safety ceiling without the codec reaching a
    /// terminal state. Indicates pathological input or a codec defect.
    #[error("codec did not terminate within {limit} step iterations")]
    IterationLimit {
        /// The iteration ceiling that was exceeded.
        limit: usize,
    },

    /// An operation was invoked on a stream outside its required lifecycle
    /// state (for example `write` after `end`).
    #[error("`{operation}` is not valid on a stream in the {state} state")]
    InvalidState {
        /// The operation that was attempted.
        operation: &'static str,
        /// The lifecycle state the stream was in.
        state: &'static str,
    },

    /// The codec backend does not support the requested parameter change.
    #[error("parameter change rejected: {0}")]
    Unsupported(String),

    /// A deferred transform's worker thread panicked before producing a
    /// result.
    #[error("deferred transform worker panicked")]
    WorkerPanicked,
}

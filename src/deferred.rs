//! # Overview
//!
//! Deferred batch transforms: the same algorithm as [`crate::batch`], run on
//! a background thread and resolved through a one-shot handle.
//!
//! # Design
//!
//! [`DeferredTransform::spawn`] copies the input at submission time, because
//! the caller's buffer is not guaranteed to outlive the background
//! execution. The worker owns its own codec session, shares no mutable state
//! with the caller, and writes its result exactly once; joining the handle is
//! the only synchronization point. There is no cancellation: a spawned
//! transform runs to completion or failure.

use std::thread::{self, JoinHandle};

use tracing::debug;

use crate::batch::transform;
use crate::error::Error;
use crate::options::{Mode, Options};

/// Handle to a batch transform running on a background thread.
///
/// Resolve it with [`wait`](Self::wait); dropping the handle detaches the
/// worker, which still runs to completion but discards its result.
#[derive(Debug)]
pub struct DeferredTransform {
    worker: JoinHandle<Result<Vec<u8>, Error>>,
}

impl DeferredTransform {
    /// Submits `input` for transformation under `mode` on a background
    /// thread, taking an owned copy of the input.
    #[must_use]
    pub fn spawn(mode: Mode, input: &[u8], options: &Options) -> Self {
        let owned = input.to_vec();
        let options = *options;
        debug!(?mode, input_len = owned.len(), "deferred transform submitted");
        let worker = thread::spawn(move || transform(mode, &owned, &options));
        Self { worker }
    }

    /// Returns `true` once the background transform has finished, without
    /// blocking.
    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.worker.is_finished()
    }

    /// Blocks until the transform completes and returns its outcome.
    pub fn wait(self) -> Result<Vec<u8>, Error> {
        self.worker.join().map_err(|_| Error::WorkerPanicked)?
    }
}

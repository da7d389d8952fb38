//! # Overview
//!
//! One-shot batch transforms: the whole input is available up front and the
//! whole output is returned as a single buffer.
//!
//! # Design
//!
//! [`transform`] drives a [`Codec`] to completion with the configured
//! terminating flush, appending freshly produced bytes to a growable output
//! buffer. The buffer grows by `chunk_size` whenever the codec exhausts the
//! attached window, never shrinks mid-run, and is returned at exactly its
//! produced length. A configured `max_output` bound aborts the transform
//! before the buffer would exceed it, and a fixed iteration ceiling
//! guarantees termination even under a misbehaving codec.
//!
//! # Errors
//!
//! A failed transform returns a single [`Error`]; no partial output is ever
//! surfaced. The codec session itself is released on every exit path by the
//! adapter's `Drop` implementation.

use tracing::{debug, trace, warn};

use crate::codec::{Codec, MAX_STEP_ITERATIONS, Step};
use crate::error::Error;
use crate::options::{Mode, Options};

/// Transforms `input` to completion under `mode`, returning the complete
/// output buffer.
pub fn transform(mode: Mode, input: &[u8], options: &Options) -> Result<Vec<u8>, Error> {
    let mut codec = Codec::new(mode, options)?;
    let chunk_size = options.chunk_size;
    let flush = options.finish_flush;
    debug!(
        ?mode,
        input_len = input.len(),
        chunk_size,
        "batch transform started"
    );

    let mut out = Vec::with_capacity(chunk_size);
    let mut consumed = 0usize;
    for iteration in 1..=MAX_STEP_ITERATIONS {
        if out.capacity() == out.len() {
            if let Some(limit) = options.max_output {
                if out.len() >= limit {
                    warn!(limit, produced = out.len(), "output limit reached");
                    return Err(Error::OutputLimit { limit });
                }
            }
            out.reserve(chunk_size);
        }

        let produced_before = out.len();
        let step = codec.step_vec(&input[consumed..], &mut out, flush)?;
        consumed = codec.total_in() as usize;
        trace!(
            iteration,
            consumed,
            produced = out.len(),
            ?step,
            "batch codec step"
        );

        if let Some(limit) = options.max_output {
            if out.len() > limit {
                warn!(limit, produced = out.len(), "output limit exceeded");
                return Err(Error::OutputLimit { limit });
            }
        }

        match step {
            Step::StreamEnd => {
                debug!(
                    input_len = input.len(),
                    output_len = out.len(),
                    "batch transform completed"
                );
                return Ok(out);
            }
            Step::Progress => {}
            Step::NeedMoreOutput => {
                // Output space remained but the codec could not move, so it
                // is starved of input rather than window-bound.
                if out.len() < out.capacity() && out.len() == produced_before {
                    return Err(codec.starved_error());
                }
            }
        }
    }

    warn!(limit = MAX_STEP_ITERATIONS, "iteration ceiling exceeded");
    Err(Error::IterationLimit {
        limit: MAX_STEP_ITERATIONS,
    })
}

/// Compresses `input` into a zlib-wrapped stream.
pub fn deflate(input: &[u8], options: &Options) -> Result<Vec<u8>, Error> {
    transform(Mode::Deflate, input, options)
}

/// Decompresses a zlib-wrapped stream.
pub fn inflate(input: &[u8], options: &Options) -> Result<Vec<u8>, Error> {
    transform(Mode::Inflate, input, options)
}

/// Compresses `input` into a raw, headerless DEFLATE stream.
pub fn deflate_raw(input: &[u8], options: &Options) -> Result<Vec<u8>, Error> {
    transform(Mode::DeflateRaw, input, options)
}

/// Decompresses a raw, headerless DEFLATE stream.
pub fn inflate_raw(input: &[u8], options: &Options) -> Result<Vec<u8>, Error> {
    transform(Mode::InflateRaw, input, options)
}

/// Compresses `input` into a gzip-wrapped stream.
pub fn gzip(input: &[u8], options: &Options) -> Result<Vec<u8>, Error> {
    transform(Mode::Gzip, input, options)
}

/// Decompresses a gzip-wrapped stream.
pub fn gunzip(input: &[u8], options: &Options) -> Result<Vec<u8>, Error> {
    transform(Mode::Gunzip, input, options)
}

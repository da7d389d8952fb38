//! # Overview
//!
//! Adapter around one stateful flate2 codec session. A [`Codec`] owns exactly
//! one `flate2::Compress` or `flate2::Decompress` value for its whole life;
//! construction initializes the session and `Drop` releases it, so every exit
//! path (success, error, panic unwind) tears the session down exactly once.
//!
//! # Design
//!
//! The adapter exposes the codec's bounded, call-until-exhausted primitive as
//! a [`step_vec`](Codec::step_vec)/[`step_window`](Codec::step_window) pair
//! returning a [`Step`] outcome. A `NeedMoreOutput` outcome is not a failure:
//! it tells the driver the attached output window was exhausted (or the codec
//! is starved of input) and the same call must be repeated with more room.
//! Genuine faults map onto [`Error::Stream`] for state-machine violations and
//! [`Error::Data`] for malformed compressed input.

use flate2::{Compress, Compression, Decompress, Status};
use tracing::trace;

use crate::error::Error;
use crate::options::{Direction, FlushMode, Format, Level, Mode, Options, Strategy};

/// Ceiling on drain-loop iterations, guaranteeing termination even under a
/// pathological or buggy codec.
pub(crate) const MAX_STEP_ITERATIONS: usize = 1000;

/// Outcome of a single codec step.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Step {
    /// The codec made progress; more input or flushing remains.
    Progress,
    /// The codec could not move: either the output window is exhausted or no
    /// further input is available. The driver decides which.
    NeedMoreOutput,
    /// The terminating flush completed; the session has produced its final
    /// byte.
    StreamEnd,
}

impl Step {
    fn from_status(status: Status) -> Self {
        match status {
            Status::Ok => Self::Progress,
            Status::BufError => Self::NeedMoreOutput,
            Status::StreamEnd => Self::StreamEnd,
        }
    }
}

enum Backend {
    Deflate(Compress),
    Inflate(Decompress),
}

/// A stateful wrapper around one external codec session, bound to one
/// direction and one header framing for its whole life.
pub struct Codec {
    backend: Backend,
    format: Format,
    window_bits: u8,
}

impl Codec {
    /// Initializes a codec session for `mode`.
    ///
    /// Fails with [`Error::Init`] when the options carry parameters the codec
    /// rejects (window-bits magnitude, chunk size, memory level).
    pub fn new(mode: Mode, options: &Options) -> Result<Self, Error> {
        options.validate()?;
        let (format, window_bits) = options.resolve_format(mode)?;
        let level = Compression::from(options.level);
        let backend = match mode.direction() {
            Direction::Compress => Backend::Deflate(new_deflate(format, level, window_bits)),
            Direction::Decompress => Backend::Inflate(new_inflate(format, window_bits)),
        };
        trace!(?mode, ?format, window_bits, "codec session initialized");
        Ok(Self {
            backend,
            format,
            window_bits,
        })
    }

    /// Returns which way bytes flow through this session.
    #[must_use]
    pub fn direction(&self) -> Direction {
        match self.backend {
            Backend::Deflate(_) => Direction::Compress,
            Backend::Inflate(_) => Direction::Decompress,
        }
    }

    /// Runs one codec step, appending output into `output`'s spare capacity.
    ///
    /// Consumed input is reflected in [`total_in`](Self::total_in); produced
    /// bytes extend `output.len()`.
    pub fn step_vec(
        &mut self,
        input: &[u8],
        output: &mut Vec<u8>,
        flush: FlushMode,
    ) -> Result<Step, Error> {
        let status = match &mut self.backend {
            Backend::Deflate(codec) => codec
                .compress_vec(input, output, flush.to_compress())
                .map_err(|err| Error::Stream(err.to_string()))?,
            Backend::Inflate(codec) => codec
                .decompress_vec(input, output, flush.to_decompress())
                .map_err(|err| Error::Data(err.to_string()))?,
        };
        Ok(Step::from_status(status))
    }

    /// Runs one codec step into a fixed output window, returning the number
    /// of bytes written alongside the outcome.
    pub fn step_window(
        &mut self,
        input: &[u8],
        window: &mut [u8],
        flush: FlushMode,
    ) -> Result<(usize, Step), Error> {
        let before = self.total_out();
        let status = match &mut self.backend {
            Backend::Deflate(codec) => codec
                .compress(input, window, flush.to_compress())
                .map_err(|err| Error::Stream(err.to_string()))?,
            Backend::Inflate(codec) => codec
                .decompress(input, window, flush.to_decompress())
                .map_err(|err| Error::Data(err.to_string()))?,
        };
        let produced = (self.total_out() - before) as usize;
        Ok((produced, Step::from_status(status)))
    }

    /// Changes compression effort without resetting history.
    ///
    /// Valid only for compress-direction sessions. The flate2 backend cannot
    /// switch deflate strategies mid-stream, so any strategy other than
    /// [`Strategy::Default`] is rejected with [`Error::Unsupported`].
    pub fn set_params(&mut self, level: Level, strategy: Strategy) -> Result<(), Error> {
        let Backend::Deflate(codec) = &mut self.backend else {
            return Err(Error::Unsupported(
                "set_params requires a compress-direction session".to_owned(),
            ));
        };
        if strategy != Strategy::Default {
            return Err(Error::Unsupported(format!(
                "the codec backend cannot switch to the {strategy:?} strategy mid-stream"
            )));
        }
        codec
            .set_level(Compression::from(level))
            .map_err(|err| Error::Stream(err.to_string()))
    }

    /// Reinitializes the session in place, keeping direction, framing, and
    /// parameters while discarding all buffered history and counters.
    pub fn reset(&mut self) {
        match &mut self.backend {
            Backend::Deflate(codec) => codec.reset(),
            Backend::Inflate(codec) => *codec = new_inflate(self.format, self.window_bits),
        }
        trace!(format = ?self.format, "codec session reset");
    }

    /// Cumulative bytes consumed by this session.
    #[must_use]
    pub fn total_in(&self) -> u64 {
        match &self.backend {
            Backend::Deflate(codec) => codec.total_in(),
            Backend::Inflate(codec) => codec.total_in(),
        }
    }

    /// Cumulative bytes produced by this session.
    #[must_use]
    pub fn total_out(&self) -> u64 {
        match &self.backend {
            Backend::Deflate(codec) => codec.total_out(),
            Backend::Inflate(codec) => codec.total_out(),
        }
    }

    /// Diagnostic counter: `total_in + total_out`.
    #[must_use]
    pub fn usage(&self) -> u64 {
        self.total_in() + self.total_out()
    }

    /// The error describing a codec that stopped without output space being
    /// the constraint: truncated input on the decompress side, a stalled
    /// state machine on the compress side.
    pub(crate) fn starved_error(&self) -> Error {
        match self.direction() {
            Direction::Decompress => {
                Error::Data("compressed input ended before the stream completed".to_owned())
            }
            Direction::Compress => {
                Error::Stream("deflate made no progress with output space available".to_owned())
            }
        }
    }
}

fn new_deflate(format: Format, level: Compression, window_bits: u8) -> Compress {
    match format {
        Format::Zlib => Compress::new_with_window_bits(level, true, window_bits),
        Format::Raw => Compress::new_with_window_bits(level, false, window_bits),
        Format::Gzip => Compress::new_gzip(level, window_bits),
    }
}

fn new_inflate(format: Format, window_bits: u8) -> Decompress {
    match format {
        Format::Zlib => Decompress::new_with_window_bits(true, window_bits),
        Format::Raw => Decompress::new_with_window_bits(false, window_bits),
        Format::Gzip => Decompress::new_gzip(window_bits),
    }
}

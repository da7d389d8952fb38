//! # Overview
//!
//! Long-lived, push-based incremental transforms. A [`Stream`] owns one codec
//! session, accepts input in arbitrary pieces through [`write`](Stream::write),
//! and delivers output chunks through a registered `on_data` callback as soon
//! as they are produced.
//!
//! # Design
//!
//! Output is drained through a fixed-size reusable window of `chunk_size`
//! bytes: each time the codec fills the window its contents are handed to
//! `on_data` and the window is reused, until the codec neither fills the
//! window nor holds unconsumed input. The same loop, driven with the
//! terminating flush, implements [`end`](Stream::end).
//!
//! # Invariants
//!
//! - Callbacks are single-slot: registering a handler replaces the previous
//!   one, and events are never buffered for handlers registered late.
//! - Callbacks run synchronously, inline within the `write`/`end`/`flush`
//!   call that produced the output, on the caller's thread.
//! - Every fault is routed through `on_error`; nothing in this module
//!   panics on codec failure. A fatal codec error drops the session
//!   immediately and leaves the stream in a terminal `Faulted` state where
//!   every further operation reports [`Error::InvalidState`].
//! - A `Stream` is not safe for concurrent use; callers serialize access per
//!   instance.

use tracing::{debug, error, trace};

use crate::codec::{Codec, MAX_STEP_ITERATIONS, Step};
use crate::error::Error;
use crate::options::{FlushMode, Level, Mode, Options, Strategy};

type DataCallback = Box<dyn FnMut(Vec<u8>)>;
type EndCallback = Box<dyn FnMut()>;
type ErrorCallback = Box<dyn FnMut(Error)>;

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
enum State {
    Active,
    Ended,
    Faulted,
}

impl State {
    const fn name(self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::Ended => "ended",
            Self::Faulted => "faulted",
        }
    }
}

/// A stateful, push-based transform session with callback delivery.
pub struct Stream {
    codec: Option<Codec>,
    state: State,
    window: Vec<u8>,
    write_flush: FlushMode,
    finish_flush: FlushMode,
    on_data: Option<DataCallback>,
    on_end: Option<EndCallback>,
    on_error: Option<ErrorCallback>,
}

impl Stream {
    /// Creates an active stream for `mode`.
    pub fn new(mode: Mode, options: &Options) -> Result<Self, Error> {
        let codec = Codec::new(mode, options)?;
        debug!(?mode, chunk_size = options.chunk_size, "stream created");
        Ok(Self {
            codec: Some(codec),
            state: State::Active,
            window: vec![0; options.chunk_size],
            write_flush: options.flush,
            finish_flush: options.finish_flush,
            on_data: None,
            on_end: None,
            on_error: None,
        })
    }

    /// Creates a zlib-wrapped compression stream.
    pub fn deflate(options: &Options) -> Result<Self, Error> {
        Self::new(Mode::Deflate, options)
    }

    /// Creates a zlib-wrapped decompression stream.
    pub fn inflate(options: &Options) -> Result<Self, Error> {
        Self::new(Mode::Inflate, options)
    }

    /// Creates a raw DEFLATE compression stream.
    pub fn deflate_raw(options: &Options) -> Result<Self, Error> {
        Self::new(Mode::DeflateRaw, options)
    }

    /// Creates a raw DEFLATE decompression stream.
    pub fn inflate_raw(options: &Options) -> Result<Self, Error> {
        Self::new(Mode::InflateRaw, options)
    }

    /// Creates a gzip-wrapped compression stream.
    pub fn gzip(options: &Options) -> Result<Self, Error> {
        Self::new(Mode::Gzip, options)
    }

    /// Creates a gzip-wrapped decompression stream.
    pub fn gunzip(options: &Options) -> Result<Self, Error> {
        Self::new(Mode::Gunzip, options)
    }

    /// Registers the handler receiving produced output chunks, replacing any
    /// previous handler.
    pub fn on_data(&mut self, callback: impl FnMut(Vec<u8>) + 'static) {
        self.on_data = Some(Box::new(callback));
    }

    /// Registers the handler fired once when [`end`](Self::end) completes,
    /// replacing any previous handler.
    pub fn on_end(&mut self, callback: impl FnMut() + 'static) {
        self.on_end = Some(Box::new(callback));
    }

    /// Registers the handler receiving stream errors, replacing any previous
    /// handler.
    pub fn on_error(&mut self, callback: impl FnMut(Error) + 'static) {
        self.on_error = Some(Box::new(callback));
    }

    /// Returns `true` while the stream accepts `write`/`flush`/`end` calls.
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.state == State::Active
    }

    /// Feeds `chunk` into the codec, delivering any producible output through
    /// `on_data`.
    ///
    /// An empty chunk is a no-op returning `true`. Returns `false`, reporting
    /// through `on_error`, when the stream is not active or the codec faults
    /// (which is fatal to this stream). If a decompression stream reaches the
    /// end of its compressed input mid-write, trailing input bytes are
    /// ignored.
    pub fn write(&mut self, chunk: &[u8]) -> bool {
        if !self.require_active("write") {
            return false;
        }
        if chunk.is_empty() {
            return true;
        }
        trace!(len = chunk.len(), "stream write");
        let flush = self.write_flush;
        match self.drain(chunk, flush, false) {
            Ok(_) => true,
            Err(err) => {
                self.fault(err);
                false
            }
        }
    }

    /// Finishes the stream: drives the codec with the terminating flush until
    /// it reports stream end, delivers any final output through `on_data`,
    /// releases the codec session, and fires `on_end` exactly once.
    pub fn end(&mut self) {
        if !self.require_active("end") {
            return;
        }
        debug!("stream end requested");
        let flush = self.finish_flush;
        match self.drain(&[], flush, true) {
            Ok(_) => {
                self.codec = None;
                self.state = State::Ended;
                if let Some(on_end) = self.on_end.as_mut() {
                    on_end();
                }
            }
            Err(err) => self.fault(err),
        }
    }

    /// Forces emission of all currently producible output without ending the
    /// session. `mode` defaults to [`FlushMode::Sync`].
    pub fn flush(&mut self, mode: Option<FlushMode>) {
        if !self.require_active("flush") {
            return;
        }
        let flush = mode.unwrap_or(FlushMode::Sync);
        trace!(?flush, "stream flush");
        if let Err(err) = self.drain(&[], flush, false) {
            self.fault(err);
        }
    }

    /// Changes compression effort mid-stream without resetting history.
    ///
    /// Valid only on compression streams; failures (including a non-default
    /// `strategy`, which the codec backend cannot switch to mid-stream) are
    /// reported through `on_error` and leave the stream usable.
    pub fn set_params(&mut self, level: Level, strategy: Strategy) {
        if !self.require_active("set_params") {
            return;
        }
        // The codec only accepts a parameter change once pending output has
        // been flushed.
        if let Err(err) = self.drain(&[], FlushMode::Sync, false) {
            self.fault(err);
            return;
        }
        let Some(codec) = self.codec.as_mut() else {
            return;
        };
        if let Err(err) = codec.set_params(level, strategy) {
            self.report(err);
        }
    }

    /// Reinitializes the codec state in place, keeping direction and
    /// parameters while discarding buffered history and counters.
    pub fn reset(&mut self) {
        if !self.require_active("reset") {
            return;
        }
        if let Some(codec) = self.codec.as_mut() {
            codec.reset();
        }
    }

    /// Tears down any existing session, from any state, and reinitializes the
    /// stream for `mode` with fresh options. Returns `false` and reports
    /// through `on_error` when the new session cannot be created.
    pub fn reinit(&mut self, mode: Mode, options: &Options) -> bool {
        self.codec = None;
        match Codec::new(mode, options) {
            Ok(codec) => {
                debug!(?mode, "stream reinitialized");
                self.codec = Some(codec);
                self.state = State::Active;
                self.window = vec![0; options.chunk_size];
                self.write_flush = options.flush;
                self.finish_flush = options.finish_flush;
                true
            }
            Err(err) => {
                self.state = State::Faulted;
                self.report(err);
                false
            }
        }
    }

    /// Cumulative `total_in + total_out` of the underlying session; 0 once
    /// the session has been released.
    #[must_use]
    pub fn usage(&self) -> u64 {
        self.codec.as_ref().map_or(0, Codec::usage)
    }

    /// Drain loop shared by `write`, `end`, and `flush`: step the codec into
    /// the reusable window, emit every filled window through `on_data`, and
    /// keep going while the codec fills the window or input remains. With
    /// `until_end` set, keep going until the codec reports stream end.
    ///
    /// Productive iterations are unbounded (draining a large expansion
    /// through a small window takes as many windows as it takes); only
    /// consecutive no-progress iterations count toward the safety ceiling.
    fn drain(&mut self, input: &[u8], flush: FlushMode, until_end: bool) -> Result<(), Error> {
        let Some(codec) = self.codec.as_mut() else {
            return Err(Error::InvalidState {
                operation: "drain",
                state: self.state.name(),
            });
        };
        let mut consumed = 0usize;
        let mut stalled = 0usize;
        loop {
            let before_in = codec.total_in();
            let (produced, step) = codec.step_window(&input[consumed..], &mut self.window, flush)?;
            let in_delta = (codec.total_in() - before_in) as usize;
            consumed += in_delta;

            if produced > 0 {
                if let Some(on_data) = self.on_data.as_mut() {
                    on_data(self.window[..produced].to_vec());
                }
            }

            if step == Step::StreamEnd {
                return Ok(());
            }

            if produced == 0 && in_delta == 0 {
                stalled += 1;
                if stalled >= MAX_STEP_ITERATIONS {
                    return Err(Error::IterationLimit {
                        limit: MAX_STEP_ITERATIONS,
                    });
                }
            } else {
                stalled = 0;
            }

            if produced == self.window.len() {
                // Window exhausted: re-drain before touching more input.
                continue;
            }
            if until_end {
                if step == Step::NeedMoreOutput && produced == 0 {
                    // Finishing, output space available, yet the codec cannot
                    // move: it is starved of input.
                    return Err(codec.starved_error());
                }
            } else if consumed == input.len() {
                // Input consumed and the window did not fill: no more
                // producible output for this call.
                return Ok(());
            }
        }
    }

    /// Checks the lifecycle state, reporting [`Error::InvalidState`] through
    /// `on_error` when `operation` is not permitted.
    fn require_active(&mut self, operation: &'static str) -> bool {
        if self.state == State::Active && self.codec.is_some() {
            return true;
        }
        let state = self.state.name();
        self.report(Error::InvalidState { operation, state });
        false
    }

    /// Fatal codec error: release the session, enter the terminal faulted
    /// state, and report the error.
    fn fault(&mut self, err: Error) {
        error!(%err, "stream faulted");
        self.codec = None;
        self.state = State::Faulted;
        self.report(err);
    }

    fn report(&mut self, err: Error) {
        if let Some(on_error) = self.on_error.as_mut() {
            on_error(err);
        } else {
            error!(%err, "stream error with no on_error handler registered");
        }
    }
}

impl std::fmt::Debug for Stream {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Stream")
            .field("state", &self.state.name())
            .field("window_len", &self.window.len())
            .field("usage", &self.usage())
            .finish_non_exhaustive()
    }
}

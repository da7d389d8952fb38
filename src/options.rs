//! Transform configuration: compression level, strategy, flush directives,
//! window-bits/header-format selection, and buffer sizing.
//!
//! All fields of [`Options`] carry the zlib-conventional defaults, so
//! `Options::default()` matches what the codec would pick on its own: level
//! "default", 32 KiB history window with a zlib header, 16 KiB chunk size,
//! and no output bound.

use core::fmt;
use core::num::NonZeroU8;

use flate2::{Compression, FlushCompress, FlushDecompress};

use crate::error::Error;

/// Default growth increment for output buffers and stream windows (16 KiB).
pub const DEFAULT_CHUNK_SIZE: usize = 16 * 1024;

/// Smallest accepted `chunk_size`; tinier windows force the drain loops into
/// pathological iteration counts for no benefit.
pub const MIN_CHUNK_SIZE: usize = 64;

const DEFAULT_WINDOW_BITS: i32 = 15;
const DEFAULT_MEM_LEVEL: u8 = 8;

/// Compression effort recognised by the deflate codec.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Level {
    /// Store only, no compression (zlib level 0).
    None,
    /// Favour speed over compression ratio (zlib level 1).
    Fast,
    /// Use zlib's default balance between speed and ratio (level 6).
    Default,
    /// Favour the best possible compression ratio (zlib level 9).
    Best,
    /// An explicit zlib compression level in the range `1..=9`.
    Precise(NonZeroU8),
}

impl Level {
    /// Creates a [`Level`] from an explicit numeric zlib level.
    ///
    /// Accepts `-1` (codec default), `0` (no compression), and `1..=9`;
    /// anything else is rejected with [`Error::Init`].
    pub fn from_numeric(level: i32) -> Result<Self, Error> {
        match level {
            -1 => Ok(Self::Default),
            0 => Ok(Self::None),
            1..=9 => {
                let precise = NonZeroU8::new(level as u8)
                    .ok_or_else(|| Error::Init(format!("invalid compression level {level}")))?;
                Ok(Self::Precise(precise))
            }
            _ => Err(Error::Init(format!(
                "compression level {level} is outside the supported range -1..=9"
            ))),
        }
    }
}

impl Default for Level {
    fn default() -> Self {
        Self::Default
    }
}

impl From<Level> for Compression {
    fn from(level: Level) -> Self {
        match level {
            Level::None => Compression::none(),
            Level::Fast => Compression::fast(),
            Level::Default => Compression::default(),
            Level::Best => Compression::best(),
            Level::Precise(value) => Compression::new(u32::from(value.get())),
        }
    }
}

/// Deflate strategy hints, mirroring zlib's `Z_*_STRATEGY` constants.
///
/// The flate2 backend always compresses with the default strategy; the other
/// variants are carried for configuration compatibility and are rejected by
/// [`set_params`](crate::stream::Stream::set_params) at the point where the
/// codec would have to honour them.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub enum Strategy {
    /// Balanced strategy suitable for general data.
    #[default]
    Default,
    /// Favour Huffman coding over string matching (filtered data).
    Filtered,
    /// Huffman coding only, no string matching.
    HuffmanOnly,
    /// Run-length encoding only.
    Rle,
    /// Fixed Huffman codes, no dynamic trees.
    Fixed,
}

/// Flush directives controlling how much the codec must emit before a step
/// call returns.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub enum FlushMode {
    /// Let the codec buffer freely (`Z_NO_FLUSH`). The streaming `write`
    /// default.
    #[default]
    None,
    /// Complete the current block without aligning it (`Z_PARTIAL_FLUSH`).
    Partial,
    /// Emit all pending output aligned to a byte boundary (`Z_SYNC_FLUSH`).
    Sync,
    /// Like sync, additionally resetting the compression history
    /// (`Z_FULL_FLUSH`).
    Full,
    /// No more input will ever arrive; emit everything and terminate the
    /// stream (`Z_FINISH`). The batch and stream-`end` default.
    Finish,
}

impl FlushMode {
    pub(crate) fn to_compress(self) -> FlushCompress {
        match self {
            Self::None => FlushCompress::None,
            Self::Partial => FlushCompress::Partial,
            Self::Sync => FlushCompress::Sync,
            Self::Full => FlushCompress::Full,
            Self::Finish => FlushCompress::Finish,
        }
    }

    // Inflate knows only none/sync/finish; the deflate-side block flushes
    // degrade to sync.
    pub(crate) fn to_decompress(self) -> FlushDecompress {
        match self {
            Self::None => FlushDecompress::None,
            Self::Partial | Self::Sync | Self::Full => FlushDecompress::Sync,
            Self::Finish => FlushDecompress::Finish,
        }
    }
}

/// Direction of a codec session.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Direction {
    /// Producing compressed output from plain input.
    Compress,
    /// Recovering plain output from compressed input.
    Decompress,
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Compress => f.write_str("compress"),
            Self::Decompress => f.write_str("decompress"),
        }
    }
}

/// Header framing written or expected around the DEFLATE payload.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub(crate) enum Format {
    /// zlib header and Adler-32 trailer (RFC 1950).
    Zlib,
    /// Headerless raw DEFLATE (RFC 1951).
    Raw,
    /// gzip header and CRC-32 trailer (RFC 1952).
    Gzip,
}

/// The closed set of transform modes exposed by this crate, replacing the
/// original zlib pattern of passing `deflate`/`inflate` function pointers
/// around.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Mode {
    /// Compress to a zlib-wrapped stream.
    Deflate,
    /// Decompress a zlib-wrapped stream.
    Inflate,
    /// Compress to a raw, headerless DEFLATE stream.
    DeflateRaw,
    /// Decompress a raw, headerless DEFLATE stream.
    InflateRaw,
    /// Compress to a gzip-wrapped stream.
    Gzip,
    /// Decompress a gzip-wrapped stream.
    Gunzip,
}

impl Mode {
    /// Returns which way bytes flow through a session of this mode.
    #[must_use]
    pub const fn direction(self) -> Direction {
        match self {
            Self::Deflate | Self::DeflateRaw | Self::Gzip => Direction::Compress,
            Self::Inflate | Self::InflateRaw | Self::Gunzip => Direction::Decompress,
        }
    }

    pub(crate) const fn default_format(self) -> Format {
        match self {
            Self::Deflate | Self::Inflate => Format::Zlib,
            Self::DeflateRaw | Self::InflateRaw => Format::Raw,
            Self::Gzip | Self::Gunzip => Format::Gzip,
        }
    }
}

/// Configuration consumed by every transform in this crate.
///
/// All fields are public and optional in spirit: `Options::default()` is a
/// complete, valid configuration, and callers override individual fields
/// with struct-update syntax:
///
/// ```
/// use zpipe::{Level, Options};
///
/// let opts = Options {
///     level: Level::Best,
///     chunk_size: 64 * 1024,
///     ..Options::default()
/// };
/// # let _ = opts;
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Options {
    /// Compression effort. Ignored by decompression sessions.
    pub level: Level,
    /// Deflate strategy hint. See [`Strategy`] for backend caveats.
    pub strategy: Strategy,
    /// Signed window-bits value selecting history size and header framing.
    ///
    /// The magnitude (`9..=15`) selects the history window; a negative value
    /// forces raw/headerless framing and a value with zlib's gzip flag
    /// (`magnitude + 16`) forces gzip framing, overriding whatever the
    /// [`Mode`] implies. Plain `9..=15` keeps the mode's framing.
    pub window_bits: i32,
    /// zlib memory level (`1..=9`). Validated and carried for configuration
    /// compatibility; the flate2 backend sizes its own state.
    pub mem_level: u8,
    /// Output-buffer growth increment for batch transforms and the reusable
    /// window size for streams. Minimum [`MIN_CHUNK_SIZE`].
    pub chunk_size: usize,
    /// Flush directive applied by streaming `write` calls.
    pub flush: FlushMode,
    /// Flush directive applied by batch transforms and stream `end`.
    pub finish_flush: FlushMode,
    /// Upper bound on total produced bytes. `None` means unbounded.
    pub max_output: Option<usize>,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            level: Level::Default,
            strategy: Strategy::Default,
            window_bits: DEFAULT_WINDOW_BITS,
            mem_level: DEFAULT_MEM_LEVEL,
            chunk_size: DEFAULT_CHUNK_SIZE,
            flush: FlushMode::None,
            finish_flush: FlushMode::Finish,
            max_output: None,
        }
    }
}

impl Options {
    /// Checks the fields the codec cannot validate for us.
    pub(crate) fn validate(&self) -> Result<(), Error> {
        if self.chunk_size < MIN_CHUNK_SIZE {
            return Err(Error::Init(format!(
                "chunk_size {} is below the minimum of {MIN_CHUNK_SIZE} bytes",
                self.chunk_size
            )));
        }
        if !(1..=9).contains(&self.mem_level) {
            return Err(Error::Init(format!(
                "mem_level {} is outside the supported range 1-9",
                self.mem_level
            )));
        }
        Ok(())
    }

    /// Resolves the signed `window_bits` field against the mode's default
    /// framing into a concrete format and window magnitude.
    pub(crate) fn resolve_format(&self, mode: Mode) -> Result<(Format, u8), Error> {
        let bits = self.window_bits;
        let (format, magnitude) = if bits < 0 {
            (Format::Raw, -bits)
        } else if bits >= 16 {
            (Format::Gzip, bits - 16)
        } else {
            (mode.default_format(), bits)
        };
        if !(9..=15).contains(&magnitude) {
            return Err(Error::Init(format!(
                "window_bits {bits} selects an unsupported window size (magnitude must be 9-15)"
            )));
        }
        Ok((format, magnitude as u8))
    }
}

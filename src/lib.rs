#![deny(unsafe_code)]
#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]

//! # Overview
//!
//! `zpipe` drives a block-oriented DEFLATE-family codec across arbitrarily
//! large inputs using bounded intermediate buffers, and delivers the result
//! under three contracts: a one-shot batch transform, a deferred batch
//! transform resolved on a background thread, and a long-lived incremental
//! stream that emits output chunks through callbacks.
//!
//! # Design
//!
//! The [`codec`] module wraps one stateful [`flate2`](https://docs.rs/flate2)
//! session per direction and framing (zlib, raw DEFLATE, or gzip, selected by
//! a window-bits value). The [`batch`], [`deferred`], and [`stream`] modules
//! layer the three caller contracts on top of the same call-until-exhausted
//! step primitive: batch grows an output buffer chunk by chunk, deferred runs
//! the identical algorithm on its own thread over an owned input copy, and
//! the stream drains a fixed reusable window through an `on_data` callback.
//!
//! # Invariants
//!
//! - A codec session is owned by exactly one adapter and released exactly
//!   once, on every exit path, by `Drop`.
//! - "Output window exhausted" is a resumption signal, never an error; real
//!   faults surface as [`Error::Stream`] or [`Error::Data`].
//! - Batch and deferred transforms never surface partial output alongside an
//!   error.
//! - Every drain loop is bounded by a fixed iteration ceiling so a
//!   misbehaving codec cannot spin forever.
//!
//! # Examples
//!
//! One-shot round trip:
//!
//! ```
//! use zpipe::{Options, deflate, inflate};
//!
//! # fn main() -> Result<(), zpipe::Error> {
//! let opts = Options::default();
//! let compressed = deflate(b"payload", &opts)?;
//! assert_eq!(inflate(&compressed, &opts)?, b"payload");
//! # Ok(())
//! # }
//! ```
//!
//! Incremental compression with callback delivery:
//!
//! ```
//! use std::{cell::RefCell, rc::Rc};
//! use zpipe::{Options, Stream};
//!
//! # fn main() -> Result<(), zpipe::Error> {
//! let mut stream = Stream::deflate(&Options::default())?;
//! let chunks = Rc::new(RefCell::new(Vec::new()));
//! let sink = Rc::clone(&chunks);
//! stream.on_data(move |chunk| sink.borrow_mut().extend_from_slice(&chunk));
//! stream.write(b"incremental ");
//! stream.write(b"payload");
//! stream.end();
//! assert!(!chunks.borrow().is_empty());
//! # Ok(())
//! # }
//! ```

pub mod batch;
pub mod codec;
pub mod deferred;
pub mod error;
pub mod options;
pub mod stream;

pub use batch::{deflate, deflate_raw, gunzip, gzip, inflate, inflate_raw, transform};
pub use deferred::DeferredTransform;
pub use error::Error;
pub use options::{Direction, FlushMode, Level, Mode, Options, Strategy};
pub use stream::Stream;

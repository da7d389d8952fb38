//! Failure-path coverage: output limits, malformed and truncated input,
//! framing mismatches, parameter validation, and fatal stream teardown.

use std::cell::RefCell;
use std::rc::Rc;

use zpipe::{Error, Mode, Options, Stream, deflate, gunzip, gzip, inflate};

// =============================================================================
// SECTION 1: Output limits
// =============================================================================

#[test]
fn compress_output_limit_is_enforced() {
    // Incompressible-ish input guarantees the compressed size exceeds a tiny
    // bound.
    let payload: Vec<u8> = (0..128 * 1024).map(|i| (i * 31 % 253) as u8).collect();
    let opts = Options {
        max_output: Some(100),
        ..Options::default()
    };
    assert!(matches!(
        deflate(&payload, &opts),
        Err(Error::OutputLimit { limit: 100 })
    ));
}

#[test]
fn decompress_output_limit_is_enforced() {
    let payload = vec![0u8; 512 * 1024];
    let compressed = deflate(&payload, &Options::default()).expect("deflate");
    let opts = Options {
        max_output: Some(64 * 1024),
        ..Options::default()
    };
    assert!(matches!(
        inflate(&compressed, &opts),
        Err(Error::OutputLimit { .. })
    ));
}

#[test]
fn generous_output_limit_does_not_interfere() {
    let payload = b"bounded but comfortable".repeat(100);
    let opts = Options {
        max_output: Some(1024 * 1024),
        ..Options::default()
    };
    let compressed = deflate(&payload, &opts).expect("deflate under limit");
    let restored = inflate(&compressed, &opts).expect("inflate under limit");
    assert_eq!(restored, payload);
}

// =============================================================================
// SECTION 2: Malformed input and framing mismatches
// =============================================================================

#[test]
fn garbage_input_is_a_data_error() {
    let garbage = b"this is definitely not a zlib stream";
    assert!(matches!(
        inflate(garbage, &Options::default()),
        Err(Error::Data(_))
    ));
}

#[test]
fn truncated_stream_is_a_data_error() {
    let opts = Options::default();
    let compressed = deflate(&b"truncation victim ".repeat(400), &opts).expect("deflate");
    let truncated = &compressed[..compressed.len() - 8];
    assert!(matches!(inflate(truncated, &opts), Err(Error::Data(_))));
}

#[test]
fn corrupted_byte_is_a_data_error() {
    let opts = Options::default();
    let mut compressed = deflate(&b"bit flip target ".repeat(400), &opts).expect("deflate");
    let middle = compressed.len() / 2;
    compressed[middle] ^= 0xff;
    assert!(inflate(&compressed, &opts).is_err());
}

#[test]
fn framing_mismatch_is_a_data_error() {
    let opts = Options::default();
    let zlib_stream = deflate(b"zlib framed", &opts).expect("deflate");
    assert!(matches!(gunzip(&zlib_stream, &opts), Err(Error::Data(_))));

    let gzip_stream = gzip(b"gzip framed", &opts).expect("gzip");
    assert!(matches!(inflate(&gzip_stream, &opts), Err(Error::Data(_))));
}

// =============================================================================
// SECTION 3: Parameter validation
// =============================================================================

#[test]
fn invalid_window_bits_fail_batch_and_stream_init() {
    let opts = Options {
        window_bits: 8,
        ..Options::default()
    };
    assert!(matches!(deflate(b"x", &opts), Err(Error::Init(_))));
    assert!(matches!(Stream::deflate(&opts), Err(Error::Init(_))));
}

#[test]
fn invalid_mem_level_fails_init() {
    let opts = Options {
        mem_level: 12,
        ..Options::default()
    };
    assert!(matches!(deflate(b"x", &opts), Err(Error::Init(_))));
}

#[test]
fn undersized_chunk_size_fails_init() {
    let opts = Options {
        chunk_size: 1,
        ..Options::default()
    };
    assert!(matches!(deflate(b"x", &opts), Err(Error::Init(_))));
}

// =============================================================================
// SECTION 4: Fatal stream teardown
// =============================================================================

#[test]
fn stream_fed_garbage_faults_and_stays_unusable() {
    let errors = Rc::new(RefCell::new(Vec::new()));
    let mut stream = Stream::new(Mode::Inflate, &Options::default()).expect("stream");
    let sink = Rc::clone(&errors);
    stream.on_error(move |err| sink.borrow_mut().push(err));

    assert!(!stream.write(b"garbage that can never inflate"));
    assert!(!stream.is_active());
    assert_eq!(stream.usage(), 0, "faulted stream released its session");
    assert!(matches!(errors.borrow()[0], Error::Data(_)));

    // Every later operation reports the lifecycle violation.
    assert!(!stream.write(b"more"));
    stream.end();
    assert!(matches!(errors.borrow()[1], Error::InvalidState { .. }));
    assert!(matches!(errors.borrow()[2], Error::InvalidState { .. }));
}

#[test]
fn ending_a_truncated_decompression_stream_faults() {
    let opts = Options::default();
    let compressed = deflate(&b"truncated stream ".repeat(200), &opts).expect("deflate");
    let errors = Rc::new(RefCell::new(Vec::new()));
    let ends = Rc::new(RefCell::new(0usize));

    let mut stream = Stream::new(Mode::Inflate, &opts).expect("stream");
    let sink = Rc::clone(&errors);
    stream.on_error(move |err| sink.borrow_mut().push(err));
    let end_count = Rc::clone(&ends);
    stream.on_end(move || *end_count.borrow_mut() += 1);

    assert!(stream.write(&compressed[..compressed.len() / 2]));
    stream.end();

    assert_eq!(*ends.borrow(), 0, "on_end must not fire for a faulted end");
    assert!(matches!(errors.borrow()[0], Error::Data(_)));
    assert!(!stream.is_active());
}

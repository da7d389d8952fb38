//! Deferred (background-thread) transform coverage: equivalence with the
//! synchronous path, independent concurrent sessions, and error propagation.

use std::time::Duration;

use zpipe::{DeferredTransform, Error, Level, Mode, Options, deflate, inflate};

#[test]
fn deferred_round_trip_matches_batch() {
    let opts = Options::default();
    let payload = b"deferred equivalence payload ".repeat(400);

    let compressed = DeferredTransform::spawn(Mode::Deflate, &payload, &opts)
        .wait()
        .expect("deferred deflate");
    assert_eq!(compressed, deflate(&payload, &opts).expect("batch deflate"));

    let restored = DeferredTransform::spawn(Mode::Inflate, &compressed, &opts)
        .wait()
        .expect("deferred inflate");
    assert_eq!(restored, payload);
}

#[test]
fn caller_buffer_can_be_dropped_after_submission() {
    let opts = Options::default();
    let deferred = {
        let payload = b"owned input copy".repeat(100);
        DeferredTransform::spawn(Mode::Deflate, &payload, &opts)
        // `payload` dropped here, before the worker necessarily ran.
    };
    let compressed = deferred.wait().expect("deferred deflate");
    let restored = inflate(&compressed, &opts).expect("inflate");
    assert_eq!(restored, b"owned input copy".repeat(100));
}

#[test]
fn concurrent_transforms_are_independent() {
    let opts = Options::default();
    let payloads: Vec<Vec<u8>> = (0u8..8)
        .map(|i| vec![i.wrapping_mul(37); 50_000 + usize::from(i) * 1000])
        .collect();

    let handles: Vec<DeferredTransform> = payloads
        .iter()
        .map(|payload| DeferredTransform::spawn(Mode::Deflate, payload, &opts))
        .collect();

    for (handle, payload) in handles.into_iter().zip(&payloads) {
        let compressed = handle.wait().expect("deferred deflate");
        let restored = inflate(&compressed, &opts).expect("inflate");
        assert_eq!(&restored, payload);
    }
}

#[test]
fn deferred_errors_resolve_like_synchronous_ones() {
    let opts = Options::default();

    let data_err = DeferredTransform::spawn(Mode::Inflate, b"not compressed", &opts).wait();
    assert!(matches!(data_err, Err(Error::Data(_))));

    let bad_opts = Options {
        window_bits: 8,
        ..Options::default()
    };
    let init_err = DeferredTransform::spawn(Mode::Deflate, b"payload", &bad_opts).wait();
    assert!(matches!(init_err, Err(Error::Init(_))));
}

#[test]
fn is_finished_settles_after_completion() {
    let opts = Options {
        level: Level::Best,
        ..Options::default()
    };
    let payload = vec![0xabu8; 256 * 1024];
    let handle = DeferredTransform::spawn(Mode::Deflate, &payload, &opts);

    // Poll without blocking until the worker settles; wait() afterwards must
    // return the already-computed result immediately.
    let mut waited = Duration::ZERO;
    while !handle.is_finished() && waited < Duration::from_secs(30) {
        std::thread::sleep(Duration::from_millis(5));
        waited += Duration::from_millis(5);
    }
    assert!(handle.is_finished());
    let compressed = handle.wait().expect("deferred deflate");
    assert!(!compressed.is_empty());
}

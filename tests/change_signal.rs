//! Cross-thread behaviour of the shared document handle.

use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use parchment::prelude::*;

#[test]
fn test_quiet_wait_returns_unchanged_version_after_timeout() {
    let handle = DocumentHandle::new(TextBuffer::from_text("steady"));
    let baseline = handle.version();
    let start = Instant::now();

    let version = handle.wait_for_change(baseline, Duration::from_millis(100));

    assert_eq!(version, baseline);
    assert!(start.elapsed() >= Duration::from_millis(100));
}

#[test]
fn test_concurrent_insert_ends_wait_early() {
    let handle = Arc::new(DocumentHandle::default());
    let baseline = handle.version();

    let writer = {
        let handle = Arc::clone(&handle);
        thread::spawn(move || {
            thread::sleep(Duration::from_millis(30));
            handle.insert("Hello", 0).unwrap();
        })
    };

    let start = Instant::now();
    let version = handle.wait_for_change(baseline, Duration::from_secs(5));
    assert_eq!(version, baseline + 1);
    assert!(start.elapsed() < Duration::from_secs(5));
    assert_eq!(handle.plain_text(), "Hello");
    writer.join().unwrap();
}

#[test]
fn test_waiting_poller_does_not_block_writers() {
    let handle = Arc::new(DocumentHandle::default());

    let poller = {
        let handle = Arc::clone(&handle);
        thread::spawn(move || handle.wait_for_change(100, Duration::from_millis(500)))
    };
    thread::sleep(Duration::from_millis(20));

    let start = Instant::now();
    for i in 0..10 {
        handle.insert("x", i).unwrap();
    }
    assert!(start.elapsed() < Duration::from_millis(400));
    assert_eq!(handle.version(), 10);
    assert_eq!(poller.join().unwrap(), 10);
}

#[test]
fn test_concurrent_writers_never_lose_updates() {
    let handle = Arc::new(DocumentHandle::default());
    let writers: Vec<_> = (0..4)
        .map(|_| {
            let handle = Arc::clone(&handle);
            thread::spawn(move || {
                for _ in 0..50 {
                    handle.insert("ab", 0).unwrap();
                    handle
                        .toggle_format(0, 1, Attribute::Italic)
                        .unwrap();
                }
            })
        })
        .collect();
    for writer in writers {
        writer.join().unwrap();
    }

    assert_eq!(handle.version(), 400);
    assert_eq!(handle.plain_text().len(), 400);
    assert!(handle.with_buffer(TextBuffer::is_consistent));
}

#[test]
fn test_every_wake_sees_matching_content() {
    let handle = Arc::new(DocumentHandle::default());
    let writer = {
        let handle = Arc::clone(&handle);
        thread::spawn(move || {
            for _ in 0..20 {
                handle.insert("z", 0).unwrap();
                thread::sleep(Duration::from_millis(2));
            }
        })
    };

    let mut seen = 0;
    while seen < 20 {
        let version = handle.wait_for_change(seen, Duration::from_secs(5));
        assert!(version > seen);
        let (now, len) = handle.with_buffer(|buf| (buf.version(), buf.len()));
        assert!(now >= version);
        assert_eq!(len as u64, now);
        seen = version;
    }
    writer.join().unwrap();
}

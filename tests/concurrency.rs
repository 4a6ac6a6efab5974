#![allow(clippy::unwrap_used, clippy::expect_used)]

mod common;

use std::sync::Arc;
use std::thread;

use common::SharedSink;
use jsonlog::{Key, Level, Logger, Value};

const THREADS: usize = 8;
const RECORDS_PER_THREAD: usize = 50;

#[test]
fn concurrent_emitters_never_interleave_lines() {
    let sink = SharedSink::new();
    let logger = Arc::new(Logger::new(Level::Info, sink.clone()).without_caller_info());

    let handles: Vec<_> = (0..THREADS)
        .map(|t| {
            let logger = Arc::clone(&logger);
            thread::spawn(move || {
                for i in 0..RECORDS_PER_THREAD {
                    logger.info(
                        "concurrent record",
                        &[
                            (Key::from("thread"), Value::from(t as u64)),
                            (Key::from("seq"), Value::from(i as u64)),
                            // Large enough to force several buffer flushes
                            // inside one record, the interleaving hot spot.
                            (Key::from("pad"), Value::from("p".repeat(3000).as_str())),
                        ],
                    );
                }
            })
        })
        .collect();

    for h in handles {
        h.join().unwrap();
    }

    assert_eq!(logger.dropped_records(), 0);

    let all = sink.contents();
    let lines: Vec<&str> = all.lines().collect();
    assert_eq!(lines.len(), THREADS * RECORDS_PER_THREAD);

    let mut seen = vec![vec![false; RECORDS_PER_THREAD]; THREADS];
    for line in lines {
        let parsed: serde_json::Value =
            serde_json::from_str(line).unwrap_or_else(|e| panic!("bad line ({e}): {line}"));
        assert_eq!(parsed["message"], "concurrent record");
        assert_eq!(parsed["pad"].as_str().unwrap().len(), 3000);
        let t = parsed["thread"].as_u64().unwrap() as usize;
        let i = parsed["seq"].as_u64().unwrap() as usize;
        assert!(!seen[t][i], "duplicate record t={t} i={i}");
        seen[t][i] = true;
    }
    assert!(seen.iter().all(|per_thread| per_thread.iter().all(|&b| b)));
}

#[test]
fn per_thread_order_is_preserved() {
    let sink = SharedSink::new();
    let logger = Arc::new(Logger::new(Level::Info, sink.clone()).without_caller_info());

    let handles: Vec<_> = (0..4usize)
        .map(|t| {
            let logger = Arc::clone(&logger);
            thread::spawn(move || {
                for i in 0..32u64 {
                    logger.info(
                        "seq",
                        &[
                            (Key::from("t"), Value::from(t as u64)),
                            (Key::from("i"), Value::from(i)),
                        ],
                    );
                }
            })
        })
        .collect();
    for h in handles {
        h.join().unwrap();
    }

    let all = sink.contents();
    let mut next = [0u64; 4];
    for line in all.lines() {
        let parsed: serde_json::Value = serde_json::from_str(line).unwrap();
        let t = parsed["t"].as_u64().unwrap() as usize;
        let i = parsed["i"].as_u64().unwrap();
        assert_eq!(i, next[t], "thread {t} records out of order");
        next[t] += 1;
    }
    assert!(next.iter().all(|&n| n == 32));
}

#[test]
fn deriving_while_logging_does_not_race_or_mutate_the_parent() {
    let sink = SharedSink::new();
    let parent = Arc::new(Logger::new(Level::Info, sink.clone()).without_caller_info());

    let derive_parent = Arc::clone(&parent);
    let deriver = thread::spawn(move || {
        for i in 0..100 {
            let child = derive_parent.derive("worker");
            child.info("from child", &[(Key::from("round"), Value::from(i))]);
        }
    });
    let log_parent = Arc::clone(&parent);
    let writer = thread::spawn(move || {
        for _ in 0..100 {
            log_parent.info("from parent", &[]);
        }
    });

    deriver.join().unwrap();
    writer.join().unwrap();

    assert_eq!(parent.name(), None, "derive must never mutate the parent");

    let all = sink.contents();
    assert_eq!(all.lines().count(), 200);
    for line in all.lines() {
        let parsed: serde_json::Value = serde_json::from_str(line).unwrap();
        if parsed["message"] == "from child" {
            assert_eq!(parsed["logger"], "worker");
        } else {
            assert!(parsed.get("logger").is_none());
        }
    }
}

use std::sync::Barrier;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use super::*;

#[test]
fn sequential_calls_each_run() {
    let flight = SingleFlight::<u32>::new();
    let runs = AtomicUsize::new(0);
    for i in 0..3 {
        let out = flight.run("k", || {
            runs.fetch_add(1, Ordering::SeqCst);
            i
        });
        assert_eq!(out, Some(i));
    }
    assert_eq!(runs.load(Ordering::SeqCst), 3);
    assert_eq!(flight.in_flight(), 0);
}

#[test]
fn concurrent_callers_share_one_run() {
    const K: usize = 8;
    let flight = Arc::new(SingleFlight::<Result<u32, String>>::new());
    let runs = Arc::new(AtomicUsize::new(0));
    let barrier = Arc::new(Barrier::new(K));

    let handles: Vec<_> = (0..K)
        .map(|_| {
            let flight = Arc::clone(&flight);
            let runs = Arc::clone(&runs);
            let barrier = Arc::clone(&barrier);
            std::thread::spawn(move || {
                barrier.wait();
                flight.run("same", || {
                    runs.fetch_add(1, Ordering::SeqCst);
                    std::thread::sleep(Duration::from_millis(300));
                    Err("boom".to_string())
                })
            })
        })
        .collect();

    let results: Vec<_> = handles.into_iter().map(|h| h.join().unwrap()).collect();
    assert_eq!(runs.load(Ordering::SeqCst), 1);
    assert!(results.iter().all(|r| r == &Some(Err("boom".to_string()))));
    assert_eq!(flight.in_flight(), 0);
}

#[test]
fn distinct_keys_do_not_block_each_other() {
    let flight = SingleFlight::<&'static str>::new();
    let a = flight.run("a", || flight.run("b", || "inner").unwrap());
    assert_eq!(a, Some("inner"));
}

#[test]
fn panicking_leader_releases_waiters() {
    let flight = Arc::new(SingleFlight::<u8>::new());
    let started = Arc::new(Barrier::new(2));

    let leader = {
        let flight = Arc::clone(&flight);
        let started = Arc::clone(&started);
        std::thread::spawn(move || {
            flight.run("k", || {
                started.wait();
                std::thread::sleep(Duration::from_millis(200));
                panic!("leader failed");
            })
        })
    };

    started.wait();
    let waited = flight.run("k", || 7);
    assert!(leader.join().is_err());
    assert_eq!(waited, None);
    assert_eq!(flight.in_flight(), 0);
}

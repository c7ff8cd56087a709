use std::sync::atomic::AtomicUsize;
use std::sync::atomic::Ordering::Relaxed;
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::{Duration, Instant};

use futures::Future;
use taskpool::{Builder, TaskPool};

fn pool(size: usize) -> TaskPool {
    let mut pool = TaskPool::new(size);
    pool.init().unwrap();
    pool
}

#[test]
fn submit_before_init_errors() {
    let pool = TaskPool::new(2);

    let err = pool.submit(|| 1).unwrap_err();
    assert!(err.is_not_started());
    assert!(!err.is_shutdown());
}

#[test]
fn submit_after_shut_errors() {
    let mut pool = pool(2);
    pool.shut();

    let err = pool.submit(|| 1).unwrap_err();
    assert!(err.is_shutdown());
}

#[test]
fn init_twice_errors() {
    let mut pool = pool(2);

    let err = pool.init().unwrap_err();
    assert!(err.is_already_started());

    pool.shut();
}

#[test]
fn init_after_shut_errors() {
    let mut pool = TaskPool::new(2);
    pool.shut();

    let err = pool.init().unwrap_err();
    assert!(err.is_shutdown());
}

#[test]
fn shut_is_idempotent() {
    let mut pool = pool(2);

    let handle = pool.submit(|| 7).unwrap();
    assert_eq!(handle.get().unwrap(), 7);

    pool.shut();
    pool.shut();
}

#[test]
fn drop_without_shut_joins_workers() {
    let count = Arc::new(AtomicUsize::new(0));

    {
        let pool = pool(4);

        for _ in 0..64 {
            let count = count.clone();
            pool.spawn(move || {
                count.fetch_add(1, Relaxed);
            })
            .unwrap();
        }
    }

    // Drop shuts the pool; anything that ran was counted, nothing hangs.
    assert!(count.load(Relaxed) <= 64);
}

#[test]
fn fifo_on_a_single_worker() {
    let mut pool = pool(1);

    let order = Arc::new(Mutex::new(Vec::new()));

    let handles: Vec<_> = (0..100)
        .map(|i| {
            let order = order.clone();
            pool.submit(move || {
                order.lock().unwrap().push(i);
            })
            .unwrap()
        })
        .collect();

    for handle in handles {
        handle.get().unwrap();
    }

    let order = order.lock().unwrap();
    assert_eq!(*order, (0..100).collect::<Vec<_>>());

    pool.shut();
}

#[test]
fn panicking_jobs_surface_on_get() {
    let mut pool = pool(2);

    let handles: Vec<_> = (0..10usize)
        .map(|i| {
            pool.submit(move || {
                if i % 3 == 0 {
                    panic!("job {} failed", i);
                }
                i
            })
            .unwrap()
        })
        .collect();

    for (i, handle) in handles.into_iter().enumerate() {
        if i % 3 == 0 {
            let err = handle.get().unwrap_err();
            assert!(err.is_panic());
        } else {
            assert_eq!(handle.get().unwrap(), i);
        }
    }

    // The workers survived every panic.
    let handle = pool.submit(|| "still alive").unwrap();
    assert_eq!(handle.get().unwrap(), "still alive");

    pool.shut();
}

#[test]
fn reentrant_submit_completes() {
    let mut pool = pool(2);

    let sender = pool.sender().clone();
    let outer = pool
        .submit(move || {
            let inner = sender.submit(|| 21).unwrap();
            inner.get().unwrap() * 2
        })
        .unwrap();

    assert_eq!(outer.get().unwrap(), 42);

    pool.shut();
}

#[test]
fn handle_composes_as_a_future() {
    let mut pool = pool(2);

    let doubled = pool.submit(|| 21).unwrap().map(|v| v * 2);
    assert_eq!(doubled.wait().unwrap(), 42);

    pool.shut();
}

#[test]
fn dropped_handle_does_not_block_the_pool() {
    let mut pool = pool(2);

    drop(pool.submit(|| vec![0u8; 1024]).unwrap());

    let handle = pool.submit(|| 5).unwrap();
    assert_eq!(handle.get().unwrap(), 5);

    pool.shut();
}

#[test]
fn worker_callbacks_fire_once_per_worker() {
    let started = Arc::new(AtomicUsize::new(0));
    let stopped = Arc::new(AtomicUsize::new(0));

    let mut pool = {
        let started = started.clone();
        let stopped = stopped.clone();

        Builder::new()
            .pool_size(3)
            .name_prefix("callbacks-")
            .after_start(move || {
                started.fetch_add(1, Relaxed);
            })
            .before_stop(move || {
                stopped.fetch_add(1, Relaxed);
            })
            .build()
    };

    pool.init().unwrap();

    let deadline = Instant::now() + Duration::from_secs(5);
    while started.load(Relaxed) < 3 && Instant::now() < deadline {
        thread::sleep(Duration::from_millis(1));
    }
    assert_eq!(started.load(Relaxed), 3);
    assert_eq!(stopped.load(Relaxed), 0);

    pool.shut();
    assert_eq!(stopped.load(Relaxed), 3);
}

#[test]
fn named_workers_carry_the_prefix() {
    let mut pool = Builder::new()
        .pool_size(1)
        .name_prefix("prefixed-")
        .build();
    pool.init().unwrap();

    let name = pool
        .submit(|| thread::current().name().map(str::to_string))
        .unwrap()
        .get()
        .unwrap();

    assert_eq!(name.as_deref(), Some("prefixed-0"));

    pool.shut();
}

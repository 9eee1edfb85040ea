use std::collections::HashSet;
use std::thread;

use thunkpool::{logging, Pool, TaskId};

const SUBMITTERS: usize = 8;
const TASKS_PER_SUBMITTER: usize = 50;

#[test]
fn concurrent_submitters_lose_no_tasks() {
    logging::init_test();
    let pool = Pool::with_threads(4).unwrap();

    // Each submitter records (id, expected output) pairs so results can be
    // checked against the task that produced them.
    let submitted: Vec<(TaskId, u64)> = thread::scope(|s| {
        let handles: Vec<_> = (0..SUBMITTERS)
            .map(|submitter| {
                let pool = &pool;
                s.spawn(move || {
                    (0..TASKS_PER_SUBMITTER)
                        .map(|k| {
                            let payload = (submitter * 1000 + k) as u64;
                            let id = pool.submit(move || payload, true);
                            (id, payload)
                        })
                        .collect::<Vec<_>>()
                })
            })
            .collect();
        handles
            .into_iter()
            .flat_map(|h| h.join().unwrap())
            .collect()
    });

    let unique: HashSet<TaskId> = submitted.iter().map(|(id, _)| *id).collect();
    assert_eq!(unique.len(), SUBMITTERS * TASKS_PER_SUBMITTER);
    assert!(!unique.contains(&TaskId::NONE));

    pool.join();

    for (id, expected) in submitted {
        let out = pool.wait(id).expect("every submitted result is retrievable");
        assert_eq!(*out.downcast::<u64>().unwrap(), expected);
    }
    assert_eq!(pool.metrics().pending_results, 0);
    pool.destroy();
}

#[test]
fn panicking_task_does_not_kill_its_worker() {
    logging::init_test();
    let pool = Pool::with_threads(1).unwrap();

    let doomed = pool.submit(|| -> u32 { panic!("task blew up") }, true);
    assert!(!doomed.is_none());

    // The single worker must survive the panic and keep draining.
    let ids: Vec<TaskId> = (1..=3u32).map(|i| pool.submit(move || i * 10, true)).collect();
    pool.join();

    for (i, id) in ids.iter().enumerate() {
        let out = pool.wait(*id).unwrap();
        assert_eq!(*out.downcast::<u32>().unwrap(), (i as u32 + 1) * 10);
    }

    // The panicked task published nothing; its wait resolves at destroy.
    pool.destroy();
    assert!(pool.wait(doomed).is_none());
}

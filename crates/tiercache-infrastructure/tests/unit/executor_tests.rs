//! Bounded executor tests

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;
use tiercache_domain::Error;
use tiercache_domain::ports::{BoxTask, TaskSubmitter};
use tiercache_infrastructure::config::ExecutorConfig;
use tiercache_infrastructure::{BoundedExecutor, ExecutorShutdownGuard};
use tokio::sync::Semaphore;

fn sizing(core: usize, max: usize, capacity: usize) -> ExecutorConfig {
    ExecutorConfig {
        core_workers: core,
        max_workers: max,
        queue_capacity: capacity,
        idle_timeout_secs: 1,
        shutdown_grace_secs: 1,
        thread_name: "test-executor".to_string(),
    }
}

/// Task that runs until `gate` hands out a permit
fn gated(gate: &Arc<Semaphore>, done: &Arc<AtomicUsize>) -> BoxTask {
    let gate = Arc::clone(gate);
    let done = Arc::clone(done);
    Box::pin(async move {
        if let Ok(permit) = gate.acquire().await {
            permit.forget();
        }
        done.fetch_add(1, Ordering::SeqCst);
    })
}

async fn wait_for(condition: impl Fn() -> bool) {
    for _ in 0..100 {
        if condition() {
            return;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
}

#[tokio::test]
async fn test_tasks_run() {
    let executor = BoundedExecutor::new(sizing(2, 2, 16)).unwrap();
    let done = Arc::new(AtomicUsize::new(0));

    for _ in 0..10 {
        let done = Arc::clone(&done);
        executor
            .submit(Box::pin(async move {
                done.fetch_add(1, Ordering::SeqCst);
            }))
            .unwrap();
    }

    wait_for(|| done.load(Ordering::SeqCst) == 10).await;
    assert_eq!(done.load(Ordering::SeqCst), 10);
    assert_eq!(executor.outstanding(), 0);
}

#[tokio::test]
async fn test_full_queue_rejects_without_blocking() {
    let executor = BoundedExecutor::new(sizing(1, 1, 2)).unwrap();
    let gate = Arc::new(Semaphore::new(0));
    let done = Arc::new(AtomicUsize::new(0));

    executor.submit(gated(&gate, &done)).unwrap();
    executor.submit(gated(&gate, &done)).unwrap();
    let err = executor.submit(gated(&gate, &done)).unwrap_err();

    assert!(err.is_queue_full());
    assert_eq!(executor.outstanding(), 2);
    assert_eq!(executor.capacity(), 2);

    gate.add_permits(2);
    wait_for(|| executor.outstanding() == 0).await;
    assert_eq!(done.load(Ordering::SeqCst), 2);

    // capacity is available again
    executor.submit(gated(&gate, &done)).unwrap();
    gate.add_permits(1);
    wait_for(|| done.load(Ordering::SeqCst) == 3).await;
    assert_eq!(done.load(Ordering::SeqCst), 3);
}

#[tokio::test(start_paused = true)]
async fn test_elastic_workers_grow_and_retire() {
    let executor = BoundedExecutor::new(sizing(1, 3, 10)).unwrap();
    let gate = Arc::new(Semaphore::new(0));
    let done = Arc::new(AtomicUsize::new(0));
    tokio::time::sleep(Duration::from_millis(10)).await;

    for _ in 0..4 {
        executor.submit(gated(&gate, &done)).unwrap();
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    assert_eq!(executor.worker_count(), 3);
    assert_eq!(executor.outstanding(), 4);

    gate.add_permits(4);
    tokio::time::sleep(Duration::from_millis(10)).await;
    assert_eq!(done.load(Ordering::SeqCst), 4);

    tokio::time::sleep(Duration::from_secs(2)).await;
    assert_eq!(executor.worker_count(), 1);
}

#[tokio::test]
async fn test_panicking_task_does_not_kill_worker() {
    let executor = BoundedExecutor::new(sizing(1, 1, 4)).unwrap();
    let done = Arc::new(AtomicUsize::new(0));

    executor
        .submit(Box::pin(async {
            panic!("boom");
        }))
        .unwrap();
    let counter = Arc::clone(&done);
    executor
        .submit(Box::pin(async move {
            counter.fetch_add(1, Ordering::SeqCst);
        }))
        .unwrap();

    wait_for(|| done.load(Ordering::SeqCst) == 1).await;
    assert_eq!(done.load(Ordering::SeqCst), 1);
    assert_eq!(executor.outstanding(), 0);
}

#[tokio::test]
async fn test_graceful_shutdown_waits_for_work() {
    let executor = BoundedExecutor::new(sizing(2, 2, 8)).unwrap();
    let done = Arc::new(AtomicUsize::new(0));

    for _ in 0..4 {
        let done = Arc::clone(&done);
        executor
            .submit(Box::pin(async move {
                tokio::time::sleep(Duration::from_millis(20)).await;
                done.fetch_add(1, Ordering::SeqCst);
            }))
            .unwrap();
    }

    let report = executor.shutdown(Duration::from_secs(5)).await;

    assert!(report.completed_gracefully);
    assert_eq!(report.cancelled, 0);
    assert_eq!(done.load(Ordering::SeqCst), 4);
    assert!(matches!(
        executor.submit(Box::pin(async {})),
        Err(Error::ExecutorShutdown)
    ));
}

#[tokio::test]
async fn test_shutdown_cancels_stuck_work_after_grace() {
    let executor = BoundedExecutor::new(sizing(1, 1, 8)).unwrap();

    executor
        .submit(Box::pin(std::future::pending::<()>()))
        .unwrap();
    executor
        .submit(Box::pin(std::future::pending::<()>()))
        .unwrap();

    let report = executor.shutdown(Duration::from_millis(50)).await;

    assert!(!report.completed_gracefully);
    assert_eq!(report.cancelled, 2);
    assert!(!executor.is_accepting());
}

#[tokio::test]
async fn test_guard_drain_and_drop() {
    let executor = Arc::new(BoundedExecutor::new(sizing(1, 1, 8)).unwrap());
    let guard = ExecutorShutdownGuard::new(Arc::clone(&executor), Duration::from_secs(1));
    let report = guard.drain().await;
    assert!(report.completed_gracefully);
    assert!(!executor.is_accepting());

    let executor = Arc::new(BoundedExecutor::new(sizing(1, 1, 8)).unwrap());
    executor
        .submit(Box::pin(std::future::pending::<()>()))
        .unwrap();
    drop(ExecutorShutdownGuard::new(
        Arc::clone(&executor),
        Duration::from_secs(1),
    ));
    assert!(!executor.is_accepting());
    assert!(executor.submit(Box::pin(async {})).is_err());

    // the aborted task gives its capacity back once the runtime drops it
    wait_for(|| executor.outstanding() == 0).await;
    assert_eq!(executor.outstanding(), 0);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_submissions_racing_shutdown_are_run_or_reported() {
    for _ in 0..50 {
        let executor = Arc::new(BoundedExecutor::new(sizing(2, 4, 64)).unwrap());
        let done = Arc::new(AtomicUsize::new(0));
        let accepted = Arc::new(AtomicUsize::new(0));

        let submitters: Vec<_> = (0..3)
            .map(|_| {
                let executor = Arc::clone(&executor);
                let done = Arc::clone(&done);
                let accepted = Arc::clone(&accepted);
                tokio::spawn(async move {
                    for _ in 0..50 {
                        let done = Arc::clone(&done);
                        let task: BoxTask = Box::pin(async move {
                            tokio::task::yield_now().await;
                            done.fetch_add(1, Ordering::SeqCst);
                        });
                        match executor.submit(task) {
                            Ok(()) => {
                                accepted.fetch_add(1, Ordering::SeqCst);
                            }
                            Err(e) if e.is_queue_full() => {}
                            Err(_) => break,
                        }
                        tokio::task::yield_now().await;
                    }
                })
            })
            .collect();

        tokio::task::yield_now().await;
        let report = executor.shutdown(Duration::ZERO).await;
        for submitter in submitters {
            submitter.await.unwrap();
        }

        assert!(!executor.is_accepting());
        assert_eq!(
            accepted.load(Ordering::SeqCst),
            done.load(Ordering::SeqCst) + report.cancelled
        );
    }
}

#[tokio::test]
async fn test_shutdown_rejects_with_executor_shutdown_not_queue_full() {
    let executor = BoundedExecutor::new(sizing(1, 1, 1)).unwrap();
    let gate = Arc::new(Semaphore::new(0));
    let done = Arc::new(AtomicUsize::new(0));
    executor.submit(gated(&gate, &done)).unwrap();

    gate.add_permits(1);
    let report = executor.shutdown(Duration::from_secs(1)).await;

    assert!(report.completed_gracefully);
    assert_eq!(done.load(Ordering::SeqCst), 1);
    assert!(matches!(
        executor.submit(gated(&gate, &done)),
        Err(Error::ExecutorShutdown)
    ));
}

#[tokio::test]
async fn test_invalid_sizing_is_rejected() {
    assert!(BoundedExecutor::new(sizing(0, 1, 8)).is_err());
    assert!(BoundedExecutor::new(sizing(4, 2, 8)).is_err());
    assert!(BoundedExecutor::new(sizing(1, 1, 0)).is_err());
}

#[test]
fn test_requires_runtime() {
    let err = BoundedExecutor::new(sizing(1, 1, 8)).unwrap_err();
    assert!(matches!(err, Error::Configuration { .. }));
}

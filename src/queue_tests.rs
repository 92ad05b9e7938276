//! Tests for the rate-limited request queue.
//!
//! All tests run on tokio's paused clock, so delays are exact and instant.

use super::*;
use futures::future::join_all;
use std::sync::Mutex as StdMutex;

type Log = Arc<StdMutex<Vec<(usize, Instant)>>>;

fn new_log() -> Log {
    Arc::new(StdMutex::new(Vec::new()))
}

async fn run_recorded(queue: &RequestQueue, log: &Log, id: usize) -> usize {
    let log = Arc::clone(log);
    queue
        .execute(move || async move {
            log.lock().unwrap().push((id, Instant::now()));
            id
        })
        .await
}

#[tokio::test(start_paused = true)]
async fn first_dispatch_is_immediate() {
    let queue = RequestQueue::new(Duration::from_millis(500));
    let start = Instant::now();

    let value = queue.execute(|| async { 42 }).await;

    assert_eq!(value, 42);
    assert_eq!(start.elapsed(), Duration::ZERO);
}

#[tokio::test(start_paused = true)]
async fn dispatches_are_spaced_by_min_delay_in_fifo_order() {
    let delay = Duration::from_millis(100);
    let queue = RequestQueue::new(delay);
    let log = new_log();

    let results = join_all((0..5).map(|id| run_recorded(&queue, &log, id))).await;
    assert_eq!(results, vec![0, 1, 2, 3, 4]);

    let entries = log.lock().unwrap();
    let order: Vec<usize> = entries.iter().map(|(id, _)| *id).collect();
    assert_eq!(order, vec![0, 1, 2, 3, 4]);

    for pair in entries.windows(2) {
        assert!(pair[1].1 - pair[0].1 >= delay);
    }
    // N-th task is dispatched no earlier than (N-1) * d after the first
    let span = entries[4].1 - entries[0].1;
    assert!(span >= delay * 4);
}

#[tokio::test(start_paused = true)]
async fn idle_gap_longer_than_delay_needs_no_wait() {
    let queue = RequestQueue::new(Duration::from_millis(100));
    queue.execute(|| async {}).await;

    sleep(Duration::from_millis(300)).await;
    let before = Instant::now();
    queue.execute(|| async {}).await;

    assert_eq!(before.elapsed(), Duration::ZERO);
}

#[tokio::test(start_paused = true)]
async fn tasks_run_one_at_a_time() {
    let queue = RequestQueue::unthrottled();
    let spans = Arc::new(StdMutex::new(Vec::new()));

    let calls = (0..3).map(|_| {
        let spans = Arc::clone(&spans);
        let queue = queue.clone();
        async move {
            queue
                .execute(move || async move {
                    let started = Instant::now();
                    sleep(Duration::from_millis(50)).await;
                    spans.lock().unwrap().push((started, Instant::now()));
                })
                .await
        }
    });
    join_all(calls).await;

    let spans = spans.lock().unwrap();
    assert_eq!(spans.len(), 3);
    for pair in spans.windows(2) {
        assert!(pair[1].0 >= pair[0].1, "task started before previous finished");
    }
}

#[tokio::test(start_paused = true)]
async fn failure_reaches_only_its_caller() {
    let queue = RequestQueue::new(Duration::from_millis(10));

    let first: std::result::Result<u32, String> =
        queue.execute(|| async { Err("boom".to_string()) }).await;
    let second: std::result::Result<u32, String> = queue.execute(|| async { Ok(7) }).await;

    assert_eq!(first, Err("boom".to_string()));
    assert_eq!(second, Ok(7));
}

#[tokio::test(start_paused = true)]
async fn separate_queues_do_not_throttle_each_other() {
    let scryfall = RequestQueue::new(Duration::from_secs(1));
    let pokemon = RequestQueue::new(Duration::from_secs(1));

    scryfall.execute(|| async {}).await;
    let before = Instant::now();
    pokemon.execute(|| async {}).await;

    assert_eq!(before.elapsed(), Duration::ZERO);
}

#[test]
fn clones_share_configuration() {
    let queue = RequestQueue::new(Duration::from_millis(75));
    let clone = queue.clone();
    assert_eq!(clone.min_delay(), Duration::from_millis(75));
    assert!(Arc::ptr_eq(&queue.last_dispatch, &clone.last_dispatch));
}

// Push worker tests under paused tokio time

mod common;

use common::{FailingSink, RecordingSink, parse_payload, seeded_simulator};
use msp_collector::worker::{self, TickOutcome, WorkerConfig, run_tick};
use std::time::Duration;
use tokio::sync::oneshot;

#[tokio::test(start_paused = true)]
async fn test_worker_pushes_once_per_interval_until_shutdown() {
    let sink = RecordingSink::default();
    let (shutdown_tx, shutdown_rx) = oneshot::channel();
    let handle = worker::spawn(
        seeded_simulator(1),
        sink.clone(),
        WorkerConfig {
            push_interval: Duration::from_secs(15),
        },
        shutdown_rx,
    );

    // ticks fire at 0s, 15s and 30s
    tokio::time::sleep(Duration::from_secs(31)).await;
    shutdown_tx.send(()).unwrap();
    let (simulator, stats) = handle.await.unwrap();

    assert_eq!(stats.ticks, 3);
    assert_eq!(stats.delivered, 3);
    assert_eq!(stats.failed, 0);
    assert_eq!(sink.count(), 3);
    assert_eq!(simulator.store().len(), 14);
}

#[tokio::test(start_paused = true)]
async fn test_each_push_carries_the_whole_fleet_with_one_timestamp() {
    let sink = RecordingSink::default();
    let (shutdown_tx, shutdown_rx) = oneshot::channel();
    let handle = worker::spawn(
        seeded_simulator(2),
        sink.clone(),
        WorkerConfig {
            push_interval: Duration::from_secs(15),
        },
        shutdown_rx,
    );
    tokio::time::sleep(Duration::from_secs(1)).await;
    shutdown_tx.send(()).unwrap();
    handle.await.unwrap();

    let bodies = sink.bodies.lock().unwrap().clone();
    assert_eq!(bodies.len(), 1);
    let lines = parse_payload(&bodies[0]);
    let first_ts = lines[0].timestamp_ms;
    assert!(first_ts.is_some());
    assert!(lines.iter().all(|l| l.timestamp_ms == first_ts));
    let servers: std::collections::HashSet<(String, String)> = lines
        .iter()
        .map(|l| {
            (
                l.label("customer_id").unwrap().to_string(),
                l.label("server_name").unwrap().to_string(),
            )
        })
        .collect();
    assert_eq!(servers.len(), 14);
}

#[tokio::test(start_paused = true)]
async fn test_failed_pushes_do_not_stop_the_loop() {
    let sink = FailingSink::default();
    let (shutdown_tx, shutdown_rx) = oneshot::channel();
    let handle = worker::spawn(
        seeded_simulator(3),
        sink.clone(),
        WorkerConfig {
            push_interval: Duration::from_secs(15),
        },
        shutdown_rx,
    );

    tokio::time::sleep(Duration::from_secs(31)).await;
    shutdown_tx.send(()).unwrap();
    let (_, stats) = handle.await.unwrap();

    assert_eq!(stats.ticks, 3);
    assert_eq!(stats.failed, 3);
    assert_eq!(stats.delivered, 0);
    assert_eq!(sink.attempts(), 3);
}

#[tokio::test(start_paused = true)]
async fn test_failed_push_still_advances_counters() {
    let mut failed = seeded_simulator(4);
    let mut reference = seeded_simulator(4);

    let outcome = run_tick(&mut failed, &FailingSink::default(), Some(1_000)).await;
    assert_eq!(outcome, TickOutcome::Failed);

    // paused clock: both simulators see the same elapsed time
    reference.tick(1_000);
    assert_eq!(failed.store(), reference.store());
}

#[tokio::test(start_paused = true)]
async fn test_delivered_outcome_reports_payload_size() {
    let mut sim = seeded_simulator(5);
    let sink = RecordingSink::default();
    let outcome = run_tick(&mut sim, &sink, Some(2_000)).await;
    let body_len = sink.bodies.lock().unwrap()[0].len();
    match outcome {
        TickOutcome::Delivered {
            status,
            lines,
            bytes,
        } => {
            assert_eq!(status, 204);
            assert_eq!(bytes, body_len);
            assert_eq!(lines, parse_payload(&sink.bodies.lock().unwrap()[0]).len());
        }
        TickOutcome::Failed => panic!("expected delivery"),
    }
}

#[tokio::test(start_paused = true)]
async fn test_shutdown_before_first_interval_elapses() {
    let sink = RecordingSink::default();
    let (shutdown_tx, shutdown_rx) = oneshot::channel();
    let handle = worker::spawn(
        seeded_simulator(6),
        sink.clone(),
        WorkerConfig {
            push_interval: Duration::from_secs(300),
        },
        shutdown_rx,
    );
    tokio::time::sleep(Duration::from_secs(10)).await;
    shutdown_tx.send(()).unwrap();
    let (_, stats) = handle.await.unwrap();
    assert_eq!(stats.ticks, 1);
}

#[tokio::test(start_paused = true)]
async fn test_tick_without_timestamp_sends_nothing() {
    let mut sim = seeded_simulator(7);
    let sink = RecordingSink::default();
    let outcome = run_tick(&mut sim, &sink, None).await;
    assert_eq!(outcome, TickOutcome::Failed);
    assert_eq!(sink.count(), 0);
    assert!(sim.store().is_empty());
}

#[test]
fn test_now_ms_is_after_epoch() {
    assert!(worker::now_ms().is_some_and(|ts| ts > 1_600_000_000_000));
}

//! Lifecycle and scheduling tests. Time is paused so timer behavior is exact.

use std::time::Duration;

use num_bigint::{BigInt, BigUint};

use super::*;
use crate::domain::{Order, Token};
use crate::venue::mock::MockVenue;

const A: &str = "0xaaaa";
const B: &str = "0xbbbb";

fn crossed_orders() -> Vec<Order> {
    vec![
        Order::new(1, A, 100u64, B, 50u64),
        Order::new(2, B, 30u64, A, 80u64),
    ]
}

fn funded(orders: Vec<Order>) -> MockVenue {
    MockVenue::new(orders)
        .with_balance(A, 1000)
        .with_balance(B, 1000)
        .with_cost(21000)
}

fn config(refresh: Duration) -> EngineConfig {
    EngineConfig {
        refresh,
        ..EngineConfig::default()
    }
}

fn engine(venue: &Arc<MockVenue>, refresh: Duration) -> Engine {
    Engine::new(config(refresh), venue.clone(), venue.clone()).unwrap()
}

#[test]
fn test_default_config() {
    let cfg = EngineConfig::default();
    assert_eq!(cfg.refresh, Duration::from_secs(60));
    assert_eq!(cfg.threshold, 30000);
    assert!(!cfg.dry_run);
}

#[test]
fn test_zero_refresh_is_rejected() {
    let venue = Arc::new(MockVenue::new(vec![]));
    let result = Engine::new(config(Duration::ZERO), venue.clone(), venue);
    assert!(matches!(result, Err(EngineError::Config(_))));
}

#[tokio::test(start_paused = true)]
async fn test_start_stop_transitions() {
    let venue = Arc::new(MockVenue::new(vec![]));
    let engine = engine(&venue, Duration::from_secs(1));

    assert_eq!(engine.state().await, EngineState::Stopped);
    assert!(!engine.is_running().await);

    engine.start().await.unwrap();
    assert_eq!(engine.state().await, EngineState::Running);
    assert!(engine.is_running().await);

    engine.stop().await.unwrap();
    assert_eq!(engine.state().await, EngineState::Stopped);
}

#[tokio::test(start_paused = true)]
async fn test_double_start_is_rejected() {
    let venue = Arc::new(MockVenue::new(vec![]));
    let engine = engine(&venue, Duration::from_secs(1));

    engine.start().await.unwrap();
    assert!(matches!(engine.start().await, Err(EngineError::AlreadyRunning)));

    engine.stop().await.unwrap();
}

#[tokio::test(start_paused = true)]
async fn test_restart_after_stop_is_rejected() {
    let venue = Arc::new(MockVenue::new(vec![]));
    let engine = engine(&venue, Duration::from_secs(1));

    engine.start().await.unwrap();
    engine.stop().await.unwrap();

    assert!(matches!(engine.start().await, Err(EngineError::Terminated)));
    assert_eq!(engine.state().await, EngineState::Stopped);
}

#[tokio::test(start_paused = true)]
async fn test_stop_without_start_is_noop() {
    let venue = Arc::new(MockVenue::new(vec![]));
    let engine = engine(&venue, Duration::from_secs(1));

    engine.stop().await.unwrap();
    assert_eq!(engine.state().await, EngineState::Stopped);
}

#[tokio::test(start_paused = true)]
async fn test_first_cycle_waits_one_interval() {
    let venue = Arc::new(funded(crossed_orders()));
    let engine = engine(&venue, Duration::from_secs(10));

    engine.start().await.unwrap();

    tokio::time::sleep(Duration::from_secs(9)).await;
    assert_eq!(venue.orders_calls(), 0);

    tokio::time::sleep(Duration::from_secs(2)).await;
    assert_eq!(venue.orders_calls(), 1);

    tokio::time::sleep(Duration::from_secs(10)).await;
    assert_eq!(venue.orders_calls(), 2);

    engine.stop().await.unwrap();
}

#[tokio::test(start_paused = true)]
async fn test_stop_waits_for_cycle_in_flight() {
    let venue = Arc::new(funded(crossed_orders()).with_orders_delays(&[Duration::from_secs(5)]));
    let engine = engine(&venue, Duration::from_secs(1));
    let started = Instant::now();

    engine.start().await.unwrap();

    // The first cycle begins at 1s and is stuck fetching orders until 6s.
    tokio::time::sleep(Duration::from_secs(2)).await;
    assert_eq!(venue.orders_calls(), 1);
    assert_eq!(engine.stats().await.cycles, 0);

    engine.stop().await.unwrap();

    assert!(started.elapsed() >= Duration::from_secs(6));
    let stats = engine.stats().await;
    assert_eq!(stats.cycles, 1);
    assert_eq!(stats.twins, 1);
    assert!(stats.last_report.is_some());
    assert_eq!(venue.wallet_calls(), 2);

    // No further cycle after stop returned.
    tokio::time::sleep(Duration::from_secs(10)).await;
    assert_eq!(venue.orders_calls(), 1);
}

#[tokio::test(start_paused = true)]
async fn test_concurrent_stop_waits_for_cycle_in_flight() {
    let venue = Arc::new(funded(crossed_orders()).with_orders_delays(&[Duration::from_secs(5)]));
    let engine = Arc::new(engine(&venue, Duration::from_secs(1)));
    let started = Instant::now();

    engine.start().await.unwrap();
    tokio::time::sleep(Duration::from_secs(2)).await;

    let first = tokio::spawn({
        let engine = Arc::clone(&engine);
        async move { engine.stop().await }
    });
    tokio::time::sleep(Duration::from_millis(100)).await;
    assert_eq!(engine.state().await, EngineState::Stopping);

    // The first stop is still waiting on the cycle that ends at 6s.
    engine.stop().await.unwrap();

    assert!(started.elapsed() >= Duration::from_secs(6));
    assert_eq!(engine.state().await, EngineState::Stopped);
    let stats = engine.stats().await;
    assert_eq!(stats.cycles, 1);
    assert!(stats.last_report.is_some());

    first.await.unwrap().unwrap();
}

#[tokio::test(start_paused = true)]
async fn test_overrunning_cycle_coalesces_missed_ticks() {
    // refresh 10s, first fetch takes 35s: ticks at 20, 30 and 40 are missed
    // while the cycle runs. One catch-up cycle runs at 45, then the schedule
    // resumes at 50.
    let venue = Arc::new(MockVenue::new(vec![]).with_orders_delays(&[Duration::from_secs(35)]));
    let engine = engine(&venue, Duration::from_secs(10));

    engine.start().await.unwrap();

    tokio::time::sleep(Duration::from_secs(44)).await;
    assert_eq!(venue.orders_calls(), 1);

    tokio::time::sleep(Duration::from_secs(2)).await;
    assert_eq!(venue.orders_calls(), 2);

    tokio::time::sleep(Duration::from_secs(6)).await;
    assert_eq!(venue.orders_calls(), 3);

    engine.stop().await.unwrap();
    assert_eq!(engine.stats().await.cycles, 3);
}

#[tokio::test(start_paused = true)]
async fn test_market_failure_keeps_engine_running() {
    let venue = Arc::new(MockVenue::new(vec![]).with_fail_orders());
    let engine = engine(&venue, Duration::from_secs(1));

    engine.start().await.unwrap();
    tokio::time::sleep(Duration::from_millis(3500)).await;

    assert!(engine.is_running().await);
    let stats = engine.stats().await;
    assert_eq!(stats.cycles, 3);
    assert_eq!(stats.failed_cycles, 3);
    assert!(stats.last_report.is_none());
    assert_eq!(venue.wallet_calls(), 0);

    engine.stop().await.unwrap();
}

#[tokio::test(start_paused = true)]
async fn test_cycle_aggregates_twins() {
    let venue = Arc::new(funded(crossed_orders()));
    let engine = engine(&venue, Duration::from_secs(1));

    engine.start().await.unwrap();
    tokio::time::sleep(Duration::from_millis(1500)).await;
    engine.stop().await.unwrap();

    let stats = engine.stats().await;
    assert_eq!(stats.cycles, 1);
    assert_eq!(stats.books, 1);
    assert_eq!(stats.abandoned_books, 0);
    assert!(stats.last_cycle_at.is_some());

    let report = stats.last_report.unwrap();
    assert_eq!(report.twins, 1);
    assert_eq!(report.cost, BigUint::from(21000u32));
    // 1000 B buys 2666 A, which the bid takes for 1333 B
    assert_eq!(report.changes[&Token::new(B)], BigInt::from(333));
    assert_eq!(report.changes[&Token::new(A)], BigInt::from(0));

    // One wallet query per token in the report.
    assert_eq!(venue.wallet_calls(), 2);
}

#[tokio::test(start_paused = true)]
async fn test_abandoned_books_are_counted() {
    let venue = Arc::new(funded(crossed_orders()).with_fail_balance());
    let engine = engine(&venue, Duration::from_secs(1));

    engine.start().await.unwrap();
    tokio::time::sleep(Duration::from_millis(1500)).await;
    engine.stop().await.unwrap();

    let stats = engine.stats().await;
    assert_eq!(stats.cycles, 1);
    assert_eq!(stats.failed_cycles, 0);
    assert_eq!(stats.abandoned_books, 1);
    assert_eq!(stats.twins, 0);
    assert!(venue.executions().is_empty());
}

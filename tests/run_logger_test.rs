//! Fan-out sink integration tests: one emission must reach the store,
//! the live subscriber queue, and the event bus.

mod common;

use std::sync::Arc;

use drover::domain::models::LogLevel;
use drover::domain::ports::BotRepository;
use drover::infrastructure::database::SqliteBotRepository;
use drover::services::{EngineEvent, EventBus, LiveRunSink, RunLogger};
use uuid::Uuid;

use common::{setup_test_db, teardown_test_db};

#[tokio::test]
async fn test_log_reaches_store_live_queue_and_bus() {
    let pool = setup_test_db().await;
    let store = Arc::new(SqliteBotRepository::new(pool.clone()));
    let events = EventBus::default();
    let mut bus_rx = events.subscribe();

    let logger = RunLogger::new(store.clone(), events);
    let bot_id = Uuid::new_v4();

    let sink = LiveRunSink::new(16);
    let mut live_rx = sink.subscribe();
    logger.register(bot_id, sink);

    logger
        .log(bot_id, 3, LogLevel::Info, "hello", Some("detail".to_string()))
        .await;

    // Durable store
    let stored = store.list_logs(bot_id, 10).await.unwrap();
    assert_eq!(stored.len(), 1);
    assert_eq!(stored[0].message, "hello");
    assert_eq!(stored[0].run_number, 3);
    assert_eq!(stored[0].detail.as_deref(), Some("detail"));

    // Live subscriber queue
    let live = live_rx.try_recv().unwrap();
    assert_eq!(live.message, "hello");

    // Event bus
    match bus_rx.try_recv().unwrap() {
        EngineEvent::LogEntryAdded(entry) => assert_eq!(entry.message, "hello"),
        other => panic!("unexpected event: {:?}", other),
    }

    teardown_test_db(pool).await;
}

#[tokio::test]
async fn test_unregistered_bot_still_persists() {
    let pool = setup_test_db().await;
    let store = Arc::new(SqliteBotRepository::new(pool.clone()));
    let logger = RunLogger::new(store.clone(), EventBus::default());
    let bot_id = Uuid::new_v4();

    // No live sink registered: the durable append still happens.
    logger.log(bot_id, 1, LogLevel::Warning, "orphan", None).await;

    let stored = store.list_logs(bot_id, 10).await.unwrap();
    assert_eq!(stored.len(), 1);
    assert_eq!(stored[0].level, LogLevel::Warning);

    teardown_test_db(pool).await;
}

#[tokio::test]
async fn test_entries_arrive_in_emission_order() {
    let pool = setup_test_db().await;
    let store = Arc::new(SqliteBotRepository::new(pool.clone()));
    let logger = RunLogger::new(store.clone(), EventBus::default());
    let bot_id = Uuid::new_v4();

    let sink = LiveRunSink::new(64);
    let mut live_rx = sink.subscribe();
    logger.register(bot_id, sink);

    for i in 0..10 {
        logger
            .log(bot_id, 1, LogLevel::Debug, format!("msg {}", i), None)
            .await;
    }

    for i in 0..10 {
        let entry = live_rx.try_recv().unwrap();
        assert_eq!(entry.message, format!("msg {}", i));
    }

    teardown_test_db(pool).await;
}

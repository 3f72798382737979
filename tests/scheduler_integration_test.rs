//! Scheduler integration tests: full cycles against the real SQLite
//! store with a scripted reasoning provider.

mod common;

use chrono::{Duration as ChronoDuration, Utc};
use drover::domain::models::{Bot, BotStatus, LogLevel, ScheduleKind, StepOverride};
use drover::domain::ports::BotRepository;

use common::{failing_session, make_scheduler, plan_text, session, text, wait_until};

/// Once bot, successful 2-step plan and synthesis: ends Completed with
/// no further runs and no retry guidance.
#[tokio::test]
async fn test_once_bot_completes_after_successful_cycle() {
    let sessions = vec![
        // Planning session
        session(vec![text(&plan_text(
            "check the feeds",
            &["collect items", "summarize them"],
        ))]),
        // Shared step session: one response per step
        session(vec![text("collected 12 items"), text("wrote the summary")]),
        // Synthesis session
        session(vec![text("All feeds reviewed and summarized.")]),
    ];
    let (scheduler, store, pool) = make_scheduler(sessions).await;

    let bot = Bot::new("feed-checker", "check the feeds").with_schedule(ScheduleKind::Once);
    let id = bot.id;
    store.insert(&bot).await.unwrap();

    scheduler.start(id).await.unwrap();

    let done = wait_until(
        || async {
            store
                .get(id)
                .await
                .unwrap()
                .map(|b| b.status == BotStatus::Completed)
                .unwrap_or(false)
        },
        5_000,
    )
    .await;
    assert!(done, "bot never completed");

    let bot = store.get(id).await.unwrap().unwrap();
    assert_eq!(bot.status, BotStatus::Completed);
    assert_eq!(bot.next_run_at, None);
    assert_eq!(bot.retry_guidance, None);
    assert_eq!(bot.last_error, None);
    assert_eq!(bot.run_count, 1);

    // The loop removes itself from the registry on termination.
    let gone = wait_until(|| async { !scheduler.is_running(id) }, 2_000).await;
    assert!(gone, "runtime handle was not removed");

    let logs = store.list_logs(id, 100).await.unwrap();
    let levels: Vec<LogLevel> = logs.iter().map(|e| e.level).collect();
    assert!(levels.contains(&LogLevel::RunStart));
    assert_eq!(
        levels.iter().filter(|l| **l == LogLevel::StepStart).count(),
        2
    );
    assert_eq!(
        levels
            .iter()
            .filter(|l| **l == LogLevel::StepComplete)
            .count(),
        2
    );
    assert!(logs
        .iter()
        .any(|e| e.message.contains("All feeds reviewed and summarized.")));

    common::teardown_test_db(pool).await;
}

/// Interval bot whose plan generation and direct execution only ever
/// return blank output: the cycle still finishes through the success
/// path, so the next run is one interval away and no error is recorded.
#[tokio::test]
async fn test_empty_responses_reschedule_via_success_path() {
    // No scripted sessions: every send streams nothing.
    let (scheduler, store, pool) = make_scheduler(Vec::new()).await;

    let bot = Bot::new("quiet", "do the rounds")
        .with_schedule(ScheduleKind::Interval { minutes: 5 });
    let id = bot.id;
    store.insert(&bot).await.unwrap();

    let before = Utc::now();
    scheduler.start(id).await.unwrap();

    let cycled = wait_until(
        || async {
            store
                .get(id)
                .await
                .unwrap()
                .map(|b| b.run_count == 1 && b.next_run_at.map(|at| at > Utc::now()).unwrap_or(false))
                .unwrap_or(false)
        },
        5_000,
    )
    .await;
    assert!(cycled, "cycle never finished");

    let bot = store.get(id).await.unwrap().unwrap();
    assert_eq!(bot.status, BotStatus::Running);
    // Success-path reschedule: one interval out, not a failure backoff.
    let next = bot.next_run_at.unwrap();
    assert!(next >= before + ChronoDuration::minutes(4));
    assert!(next <= Utc::now() + ChronoDuration::minutes(6));
    assert_eq!(bot.retry_guidance, None);
    assert_eq!(bot.last_error, None);

    // The empty-response exhaustion is visible in the logs as errors,
    // but does not mark the record failed.
    let logs = store.list_logs(id, 100).await.unwrap();
    assert!(logs.iter().any(|e| e.level == LogLevel::Error));

    scheduler.stop(id).await.unwrap();
    common::teardown_test_db(pool).await;
}

/// A thrown error mid-step-execution on a Continuous bot lands in the
/// failure handler: 30s backoff, last_error and retry guidance set.
#[tokio::test]
async fn test_step_execution_error_takes_failure_path() {
    let sessions = vec![
        session(vec![text(&plan_text("g", &["first step"]))]),
        // Opening the shared execution session blows up.
        failing_session("provider exploded"),
    ];
    let (scheduler, store, pool) = make_scheduler(sessions).await;

    let bot = Bot::new("flaky", "do things").with_schedule(ScheduleKind::Continuous);
    let id = bot.id;
    store.insert(&bot).await.unwrap();

    let before = Utc::now();
    scheduler.start(id).await.unwrap();

    let failed = wait_until(
        || async {
            store
                .get(id)
                .await
                .unwrap()
                .map(|b| b.last_error.is_some())
                .unwrap_or(false)
        },
        5_000,
    )
    .await;
    assert!(failed, "failure was never recorded");

    let bot = store.get(id).await.unwrap().unwrap();
    assert_eq!(bot.status, BotStatus::Running);
    assert!(bot.last_error.as_ref().unwrap().contains("provider exploded"));
    assert!(bot
        .retry_guidance
        .as_ref()
        .unwrap()
        .contains("provider exploded"));

    let next = bot.next_run_at.unwrap();
    assert!(next >= before + ChronoDuration::seconds(25));
    assert!(next <= Utc::now() + ChronoDuration::seconds(35));

    scheduler.stop(id).await.unwrap();
    common::teardown_test_db(pool).await;
}

/// Stopping a bot suspended in its inter-cycle sleep terminates the
/// loop without another cycle and leaves the record Stopped.
#[tokio::test]
async fn test_stop_during_sleep_terminates_loop() {
    let (scheduler, store, pool) = make_scheduler(Vec::new()).await;

    let bot = Bot::new("sleeper", "long waits")
        .with_schedule(ScheduleKind::Interval { minutes: 60 });
    let id = bot.id;
    store.insert(&bot).await.unwrap();

    scheduler.start(id).await.unwrap();

    // First cycle done, loop now sleeping until the next hour mark.
    let sleeping = wait_until(
        || async {
            store
                .get(id)
                .await
                .unwrap()
                .map(|b| b.run_count == 1)
                .unwrap_or(false)
        },
        5_000,
    )
    .await;
    assert!(sleeping, "first cycle never finished");
    assert!(scheduler.is_running(id));

    scheduler.stop(id).await.unwrap();

    assert!(!scheduler.is_running(id));
    let bot = store.get(id).await.unwrap().unwrap();
    assert_eq!(bot.status, BotStatus::Stopped);
    assert_eq!(bot.next_run_at, None);
    assert_eq!(bot.run_count, 1, "no extra cycle may run after stop");

    common::teardown_test_db(pool).await;
}

/// Starting a running bot is a warning no-op: exactly one runtime
/// handle exists afterwards.
#[tokio::test]
async fn test_start_is_idempotent() {
    let (scheduler, store, pool) = make_scheduler(Vec::new()).await;

    let bot = Bot::new("solo", "goal").with_schedule(ScheduleKind::Interval { minutes: 60 });
    let id = bot.id;
    store.insert(&bot).await.unwrap();

    scheduler.start(id).await.unwrap();
    scheduler.start(id).await.unwrap();

    assert_eq!(scheduler.running_ids(), vec![id]);

    scheduler.stop(id).await.unwrap();
    common::teardown_test_db(pool).await;
}

/// Stop on a non-running bot still clears the record fields.
#[tokio::test]
async fn test_stop_non_running_updates_record() {
    let (scheduler, store, pool) = make_scheduler(Vec::new()).await;

    let mut bot = Bot::new("idle", "goal");
    bot.pending_question = Some("what next?".to_string());
    bot.next_run_at = Some(Utc::now() + ChronoDuration::hours(1));
    let id = bot.id;
    store.insert(&bot).await.unwrap();

    scheduler.stop(id).await.unwrap();

    let bot = store.get(id).await.unwrap().unwrap();
    assert_eq!(bot.status, BotStatus::Stopped);
    assert_eq!(bot.pending_question, None);
    assert_eq!(bot.next_run_at, None);

    common::teardown_test_db(pool).await;
}

/// Input sent to a non-running bot is still logged, never lost.
#[tokio::test]
async fn test_send_input_non_running_still_logs() {
    let (scheduler, store, pool) = make_scheduler(Vec::new()).await;

    let bot = Bot::new("offline", "goal");
    let id = bot.id;
    store.insert(&bot).await.unwrap();

    scheduler.send_input(id, "focus on the eu region").await.unwrap();

    let logs = store.list_logs(id, 10).await.unwrap();
    assert_eq!(logs.len(), 1);
    assert_eq!(logs[0].level, LogLevel::UserResponse);
    assert_eq!(logs[0].message, "focus on the eu region");

    common::teardown_test_db(pool).await;
}

/// Queued input is drained into the cycle that follows.
#[tokio::test]
async fn test_queued_input_reaches_next_cycle() {
    let (scheduler, store, pool) = make_scheduler(Vec::new()).await;

    let bot = Bot::new("listener", "goal")
        .with_schedule(ScheduleKind::Interval { minutes: 60 });
    let id = bot.id;
    store.insert(&bot).await.unwrap();

    scheduler.start(id).await.unwrap();
    scheduler.send_input(id, "remember the deadline").await.unwrap();

    let cycled = wait_until(
        || async {
            store
                .get(id)
                .await
                .unwrap()
                .map(|b| b.run_count >= 1)
                .unwrap_or(false)
        },
        5_000,
    )
    .await;
    assert!(cycled);

    let logs = store.list_logs(id, 100).await.unwrap();
    assert!(logs
        .iter()
        .any(|e| e.level == LogLevel::UserResponse && e.message == "remember the deadline"));

    scheduler.stop(id).await.unwrap();
    common::teardown_test_db(pool).await;
}

/// Durable step overrides short-circuit plan generation entirely.
#[tokio::test]
async fn test_step_overrides_skip_generation() {
    // Only two sessions are scripted: the shared step session and the
    // synthesis session. A planning call would consume the first one
    // and derail the step responses, so passing proves no generation
    // call happened.
    let sessions = vec![
        session(vec![text("checked the queue"), text("drained the queue")]),
        session(vec![text("Queue is healthy.")]),
    ];
    let (scheduler, store, pool) = make_scheduler(sessions).await;

    let bot = Bot::new("override-bot", "tend the queue").with_schedule(ScheduleKind::Once);
    let id = bot.id;
    store.insert(&bot).await.unwrap();
    store
        .set_step_overrides(
            id,
            &[
                StepOverride {
                    step_number: 1,
                    description: "check the queue".to_string(),
                },
                StepOverride {
                    step_number: 2,
                    description: "drain the queue".to_string(),
                },
            ],
        )
        .await
        .unwrap();

    scheduler.start(id).await.unwrap();

    let done = wait_until(
        || async {
            store
                .get(id)
                .await
                .unwrap()
                .map(|b| b.status == BotStatus::Completed)
                .unwrap_or(false)
        },
        5_000,
    )
    .await;
    assert!(done, "bot never completed");

    let logs = store.list_logs(id, 100).await.unwrap();
    assert!(logs.iter().any(|e| e.message.contains("user-defined step")));
    assert!(logs.iter().any(|e| e.message.contains("Queue is healthy.")));

    common::teardown_test_db(pool).await;
}

/// Restarting all bots goes through a stop/start pair per id.
#[tokio::test]
async fn test_restart_all_keeps_bots_running() {
    let (scheduler, store, pool) = make_scheduler(Vec::new()).await;

    let bot = Bot::new("restartable", "goal")
        .with_schedule(ScheduleKind::Interval { minutes: 60 });
    let id = bot.id;
    store.insert(&bot).await.unwrap();

    scheduler.start(id).await.unwrap();
    let first_cycle = wait_until(
        || async {
            store
                .get(id)
                .await
                .unwrap()
                .map(|b| b.run_count == 1)
                .unwrap_or(false)
        },
        5_000,
    )
    .await;
    assert!(first_cycle);

    scheduler.restart_all().await.unwrap();
    assert!(scheduler.is_running(id));

    let bot = store.get(id).await.unwrap().unwrap();
    assert_eq!(bot.status, BotStatus::Running);

    scheduler.stop_all().await.unwrap();
    assert!(!scheduler.is_running(id));

    common::teardown_test_db(pool).await;
}

//! Scheduling policy.
//!
//! Pure functions that decide a bot's next status and run time. The
//! post-failure backoff is constant per schedule kind; consecutive
//! failures do not grow it.

use chrono::{DateTime, Duration, Utc};

use crate::domain::models::{Bot, BotStatus, ScheduleKind};

/// Set status and next run time after a successful cycle.
///
/// One-shot bots complete; everything else stays Running with a
/// kind-specific offset from `now`.
pub fn compute_next_run(bot: &mut Bot, now: DateTime<Utc>) {
    match bot.schedule {
        ScheduleKind::Once => {
            bot.status = BotStatus::Completed;
            bot.next_run_at = None;
        }
        ScheduleKind::Continuous => {
            bot.status = BotStatus::Running;
            bot.next_run_at = Some(now);
        }
        ScheduleKind::Interval { minutes } => {
            bot.status = BotStatus::Running;
            bot.next_run_at = Some(now + Duration::minutes(i64::from(minutes)));
        }
        ScheduleKind::Hourly => {
            bot.status = BotStatus::Running;
            bot.next_run_at = Some(now + Duration::hours(1));
        }
        ScheduleKind::Daily => {
            bot.status = BotStatus::Running;
            bot.next_run_at = Some(now + Duration::days(1));
        }
    }
}

/// Set status and next run time after a failed cycle.
///
/// Always re-arms the bot, even for one-shot schedules, so the failure
/// gets retried after a kind-specific backoff.
pub fn compute_retry_run(bot: &mut Bot, now: DateTime<Utc>) {
    bot.status = BotStatus::Running;
    let backoff = match bot.schedule {
        ScheduleKind::Continuous => Duration::seconds(30),
        ScheduleKind::Once => Duration::minutes(1),
        ScheduleKind::Interval { minutes } => Duration::minutes(i64::from(minutes)),
        ScheduleKind::Hourly => Duration::hours(1),
        ScheduleKind::Daily => Duration::days(1),
    };
    bot.next_run_at = Some(now + backoff);
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bot_with(schedule: ScheduleKind) -> Bot {
        Bot::new("policy-test", "goal").with_schedule(schedule)
    }

    #[test]
    fn test_next_run_once_completes() {
        let mut bot = bot_with(ScheduleKind::Once);
        compute_next_run(&mut bot, Utc::now());
        assert_eq!(bot.status, BotStatus::Completed);
        assert_eq!(bot.next_run_at, None);
    }

    #[test]
    fn test_next_run_continuous_is_immediate() {
        let now = Utc::now();
        let mut bot = bot_with(ScheduleKind::Continuous);
        compute_next_run(&mut bot, now);
        assert_eq!(bot.status, BotStatus::Running);
        assert_eq!(bot.next_run_at, Some(now));
    }

    #[test]
    fn test_next_run_interval() {
        let now = Utc::now();
        let mut bot = bot_with(ScheduleKind::Interval { minutes: 5 });
        compute_next_run(&mut bot, now);
        assert_eq!(bot.status, BotStatus::Running);
        assert_eq!(bot.next_run_at, Some(now + Duration::minutes(5)));
    }

    #[test]
    fn test_next_run_hourly_and_daily() {
        let now = Utc::now();

        let mut hourly = bot_with(ScheduleKind::Hourly);
        compute_next_run(&mut hourly, now);
        assert_eq!(hourly.next_run_at, Some(now + Duration::hours(1)));

        let mut daily = bot_with(ScheduleKind::Daily);
        compute_next_run(&mut daily, now);
        assert_eq!(daily.next_run_at, Some(now + Duration::days(1)));
    }

    #[test]
    fn test_retry_run_always_running() {
        let now = Utc::now();
        for schedule in [
            ScheduleKind::Once,
            ScheduleKind::Continuous,
            ScheduleKind::Interval { minutes: 7 },
            ScheduleKind::Hourly,
            ScheduleKind::Daily,
        ] {
            let mut bot = bot_with(schedule);
            bot.status = BotStatus::Completed;
            compute_retry_run(&mut bot, now);
            assert_eq!(bot.status, BotStatus::Running, "kind {:?}", schedule);
            assert!(bot.next_run_at.is_some());
        }
    }

    #[test]
    fn test_retry_run_backoffs() {
        let now = Utc::now();

        let mut continuous = bot_with(ScheduleKind::Continuous);
        compute_retry_run(&mut continuous, now);
        assert_eq!(continuous.next_run_at, Some(now + Duration::seconds(30)));

        let mut once = bot_with(ScheduleKind::Once);
        compute_retry_run(&mut once, now);
        assert_eq!(once.next_run_at, Some(now + Duration::minutes(1)));

        let mut interval = bot_with(ScheduleKind::Interval { minutes: 7 });
        compute_retry_run(&mut interval, now);
        assert_eq!(interval.next_run_at, Some(now + Duration::minutes(7)));

        let mut hourly = bot_with(ScheduleKind::Hourly);
        compute_retry_run(&mut hourly, now);
        assert_eq!(hourly.next_run_at, Some(now + Duration::hours(1)));

        let mut daily = bot_with(ScheduleKind::Daily);
        compute_retry_run(&mut daily, now);
        assert_eq!(daily.next_run_at, Some(now + Duration::days(1)));
    }

    #[test]
    fn test_retry_backoff_is_constant_across_failures() {
        let now = Utc::now();
        let mut bot = bot_with(ScheduleKind::Continuous);

        compute_retry_run(&mut bot, now);
        let first = bot.next_run_at;
        compute_retry_run(&mut bot, now);
        assert_eq!(bot.next_run_at, first);
    }
}

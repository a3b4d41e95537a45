//! Daily wall-clock scheduler driven by a fixed-interval poll.
//!
//! Each trigger keeps the next instant it is due. A poll runs every due job in
//! registration order and then moves its due instant to the next occurrence
//! strictly after the poll time, so a trigger fires at most once per local day
//! and a tick missed while the process was down is never replayed.

use anyhow::{Context, Result};
use chrono::{DateTime, Days, LocalResult, NaiveDate, NaiveTime, TimeDelta, TimeZone, Utc};
use chrono_tz::Tz;
use futures::FutureExt;
use futures::future::LocalBoxFuture;
use std::time::Duration;
use tokio::time::MissedTickBehavior;

type JobFn = Box<dyn FnMut() -> LocalBoxFuture<'static, ()>>;

/// A local time of day in a named time zone
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DailyTrigger {
    time: NaiveTime,
    tz: Tz,
}

impl DailyTrigger {
    /// Parse `HH:MM` and an IANA zone name such as `America/New_York`
    pub fn parse(time_of_day: &str, timezone: &str) -> Result<Self> {
        let time = NaiveTime::parse_from_str(time_of_day.trim(), "%H:%M")
            .with_context(|| format!("Invalid time of day '{}', expected HH:MM", time_of_day))?;
        let tz = timezone
            .trim()
            .parse::<Tz>()
            .map_err(|e| anyhow::anyhow!("Invalid time zone '{}': {}", timezone, e))?;
        Ok(Self { time, tz })
    }

    /// Next instant strictly after `now` at which this trigger is due
    pub fn next_after(&self, now: DateTime<Utc>) -> DateTime<Utc> {
        let today = now.with_timezone(&self.tz).date_naive();
        (0..3)
            .filter_map(|offset| today.checked_add_days(Days::new(offset)))
            .filter_map(|date| self.occurrence_on(date))
            .find(|candidate| *candidate > now)
            .unwrap_or(now + TimeDelta::days(1))
    }

    /// The instant this trigger falls on for a local calendar date.
    ///
    /// A time skipped by a DST jump fires one hour later; a repeated time fires
    /// at its first occurrence.
    fn occurrence_on(&self, date: NaiveDate) -> Option<DateTime<Utc>> {
        let local = date.and_time(self.time);
        let resolved = match self.tz.from_local_datetime(&local) {
            LocalResult::Single(dt) => Some(dt),
            LocalResult::Ambiguous(earliest, _) => Some(earliest),
            LocalResult::None => self
                .tz
                .from_local_datetime(&(local + TimeDelta::hours(1)))
                .earliest(),
        };
        resolved.map(|dt| dt.with_timezone(&Utc))
    }
}

struct ScheduledJob {
    name: String,
    trigger: DailyTrigger,
    next_run: DateTime<Utc>,
    callback: JobFn,
}

/// Single-threaded scheduler. Jobs run one at a time on the polling task.
pub struct Scheduler {
    jobs: Vec<ScheduledJob>,
    poll_interval: Duration,
    /// A due job older than this at poll time is skipped (e.g. after host suspend)
    missed_after: TimeDelta,
}

impl Scheduler {
    pub fn new(poll_interval: Duration) -> Self {
        let missed_after = TimeDelta::from_std(poll_interval * 2).unwrap_or(TimeDelta::MAX);
        Self {
            jobs: Vec::new(),
            poll_interval,
            missed_after,
        }
    }

    /// Register `callback` to run every day at `time_of_day` in `timezone`.
    ///
    /// Returns the first instant the job is due. The callback must handle its
    /// own errors.
    pub fn schedule_daily<F, Fut>(
        &mut self,
        name: &str,
        time_of_day: &str,
        timezone: &str,
        callback: F,
    ) -> Result<DateTime<Utc>>
    where
        F: FnMut() -> Fut + 'static,
        Fut: Future<Output = ()> + 'static,
    {
        self.schedule_daily_from(name, time_of_day, timezone, Utc::now(), callback)
    }

    /// As [`Scheduler::schedule_daily`], counting forward from `now`
    pub fn schedule_daily_from<F, Fut>(
        &mut self,
        name: &str,
        time_of_day: &str,
        timezone: &str,
        now: DateTime<Utc>,
        mut callback: F,
    ) -> Result<DateTime<Utc>>
    where
        F: FnMut() -> Fut + 'static,
        Fut: Future<Output = ()> + 'static,
    {
        let trigger = DailyTrigger::parse(time_of_day, timezone)?;
        let next_run = trigger.next_after(now);

        tracing::info!(
            "Scheduled '{}' daily at {} {} (next run {})",
            name,
            time_of_day,
            timezone,
            next_run.with_timezone(&trigger.tz).format("%Y-%m-%d %H:%M %Z")
        );

        self.jobs.push(ScheduledJob {
            name: name.to_string(),
            trigger,
            next_run,
            callback: Box::new(move || callback().boxed_local()),
        });
        Ok(next_run)
    }

    /// Earliest pending due instant across all jobs
    pub fn next_run(&self) -> Option<DateTime<Utc>> {
        self.jobs.iter().map(|job| job.next_run).min()
    }

    /// Run every job due at `now`, sequentially. Returns how many ran.
    pub async fn run_pending(&mut self, now: DateTime<Utc>) -> usize {
        let mut ran = 0;
        for job in &mut self.jobs {
            if now < job.next_run {
                continue;
            }

            if now - job.next_run > self.missed_after {
                tracing::warn!(
                    "Skipping '{}': due at {} but the scheduler only woke at {}",
                    job.name,
                    job.next_run,
                    now
                );
                job.next_run = job.trigger.next_after(now);
                continue;
            }

            tracing::info!(
                "Running '{}' at {}",
                job.name,
                now.with_timezone(&job.trigger.tz)
                    .format("%Y-%m-%d %H:%M:%S %Z")
            );
            (job.callback)().await;
            ran += 1;

            job.next_run = job.trigger.next_after(now);
        }
        ran
    }

    /// Poll forever until Ctrl-C or SIGTERM
    pub async fn run_forever(&mut self) -> Result<()> {
        let mut ticker = tokio::time::interval(self.poll_interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        let shutdown = shutdown_signal();
        tokio::pin!(shutdown);

        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    if self.run_pending(Utc::now()).await > 0
                        && let Some(next) = self.next_run()
                    {
                        tracing::info!("Next run at {}", next);
                    }
                }
                result = &mut shutdown => {
                    result?;
                    tracing::info!("Shutdown signal received, stopping scheduler");
                    return Ok(());
                }
            }
        }
    }
}

#[cfg(unix)]
async fn shutdown_signal() -> Result<()> {
    use tokio::signal::unix::{SignalKind, signal};

    let mut terminate =
        signal(SignalKind::terminate()).context("Failed to install SIGTERM handler")?;
    tokio::select! {
        result = tokio::signal::ctrl_c() => result.context("Failed to listen for Ctrl-C"),
        _ = terminate.recv() => Ok(()),
    }
}

#[cfg(not(unix))]
async fn shutdown_signal() -> Result<()> {
    tokio::signal::ctrl_c()
        .await
        .context("Failed to listen for Ctrl-C")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;
    use std::rc::Rc;

    fn ny(y: i32, m: u32, d: u32, h: u32, min: u32, s: u32) -> DateTime<Utc> {
        chrono_tz::America::New_York
            .with_ymd_and_hms(y, m, d, h, min, s)
            .single()
            .unwrap()
            .with_timezone(&Utc)
    }

    fn counting_scheduler(
        time: &str,
        start: DateTime<Utc>,
    ) -> (Scheduler, Rc<Cell<u32>>, DateTime<Utc>) {
        let count = Rc::new(Cell::new(0));
        let mut scheduler = Scheduler::new(Duration::from_secs(60));
        let counter = count.clone();
        let first = scheduler
            .schedule_daily_from("count", time, "America/New_York", start, move || {
                let counter = counter.clone();
                async move { counter.set(counter.get() + 1) }
            })
            .unwrap();
        (scheduler, count, first)
    }

    #[test]
    fn test_parse_rejects_bad_input() {
        assert!(DailyTrigger::parse("6am", "America/New_York").is_err());
        assert!(DailyTrigger::parse("25:00", "America/New_York").is_err());
        assert!(DailyTrigger::parse("06:00", "Mars/Olympus_Mons").is_err());
        assert!(DailyTrigger::parse("06:00", "America/New_York").is_ok());
    }

    #[test]
    fn test_next_after_same_day_and_next_day() {
        let trigger = DailyTrigger::parse("06:00", "America/New_York").unwrap();
        assert_eq!(
            trigger.next_after(ny(2026, 1, 15, 5, 0, 0)),
            ny(2026, 1, 15, 6, 0, 0)
        );
        // Exactly at the trigger time the next one is tomorrow
        assert_eq!(
            trigger.next_after(ny(2026, 1, 15, 6, 0, 0)),
            ny(2026, 1, 16, 6, 0, 0)
        );
        // 06:00 New York in winter is 11:00 UTC
        assert_eq!(
            trigger.next_after(ny(2026, 1, 15, 5, 0, 0)).to_rfc3339(),
            "2026-01-15T11:00:00+00:00"
        );
    }

    #[test]
    fn test_spring_forward_gap_fires_an_hour_later() {
        // 2026-03-08 02:30 does not exist in New York
        let trigger = DailyTrigger::parse("02:30", "America/New_York").unwrap();
        let next = trigger.next_after(ny(2026, 3, 8, 0, 0, 0));
        assert_eq!(next, ny(2026, 3, 8, 3, 30, 0));
    }

    #[test]
    fn test_fall_back_fires_once() {
        // 2026-11-01 01:30 happens twice in New York
        let trigger = DailyTrigger::parse("01:30", "America/New_York").unwrap();
        let first = trigger.next_after(ny(2026, 11, 1, 0, 0, 0));
        assert_eq!(first.to_rfc3339(), "2026-11-01T05:30:00+00:00");
        let second = trigger.next_after(first);
        assert_eq!(second, ny(2026, 11, 2, 1, 30, 0));
    }

    #[tokio::test]
    async fn test_once_per_day_under_jittered_polling() {
        let start = ny(2026, 3, 6, 5, 57, 30);
        let (mut scheduler, count, _) = counting_scheduler("06:00", start);

        // Poll for three days with intervals wandering between 45s and 75s
        let end = ny(2026, 3, 9, 5, 0, 0);
        let mut now = start;
        let mut step = 0i64;
        while now < end {
            scheduler.run_pending(now).await;
            now += TimeDelta::seconds(45 + (step * 7) % 31);
            step += 1;
        }

        // Mar 6, 7 and 8 (the DST change) each fire exactly once
        assert_eq!(count.get(), 3);
    }

    #[tokio::test]
    async fn test_repeated_polls_in_same_minute_fire_once() {
        let start = ny(2026, 6, 1, 5, 59, 0);
        let (mut scheduler, count, first) = counting_scheduler("06:00", start);

        assert_eq!(scheduler.run_pending(first).await, 1);
        assert_eq!(scheduler.run_pending(first + TimeDelta::seconds(20)).await, 0);
        assert_eq!(scheduler.run_pending(first + TimeDelta::seconds(59)).await, 0);
        assert_eq!(count.get(), 1);
        assert_eq!(scheduler.next_run(), Some(ny(2026, 6, 2, 6, 0, 0)));
    }

    #[tokio::test]
    async fn test_no_catch_up_when_started_late() {
        let start = ny(2026, 6, 1, 9, 15, 0);
        let (mut scheduler, count, first) = counting_scheduler("06:00", start);

        assert_eq!(first, ny(2026, 6, 2, 6, 0, 0));
        assert_eq!(scheduler.run_pending(start).await, 0);
        assert_eq!(scheduler.run_pending(ny(2026, 6, 1, 23, 59, 0)).await, 0);
        assert_eq!(count.get(), 0);
    }

    #[tokio::test]
    async fn test_stale_due_time_after_suspend_is_skipped() {
        let start = ny(2026, 6, 1, 5, 0, 0);
        let (mut scheduler, count, first) = counting_scheduler("06:00", start);
        assert_eq!(first, ny(2026, 6, 1, 6, 0, 0));

        // Host slept through 06:00 and the first poll lands at 10:00
        assert_eq!(scheduler.run_pending(ny(2026, 6, 1, 10, 0, 0)).await, 0);
        assert_eq!(count.get(), 0);
        assert_eq!(scheduler.next_run(), Some(ny(2026, 6, 2, 6, 0, 0)));

        // Next day runs normally
        assert_eq!(scheduler.run_pending(ny(2026, 6, 2, 6, 1, 10)).await, 1);
        assert_eq!(count.get(), 1);
    }

    #[tokio::test]
    async fn test_jobs_run_in_registration_order() {
        let order = Rc::new(std::cell::RefCell::new(Vec::new()));
        let start = ny(2026, 6, 1, 5, 0, 0);
        let mut scheduler = Scheduler::new(Duration::from_secs(60));
        for name in ["first", "second"] {
            let order = order.clone();
            scheduler
                .schedule_daily_from(name, "06:00", "America/New_York", start, move || {
                    let order = order.clone();
                    async move { order.borrow_mut().push(name) }
                })
                .unwrap();
        }

        assert_eq!(scheduler.run_pending(ny(2026, 6, 1, 6, 0, 30)).await, 2);
        assert_eq!(*order.borrow(), vec!["first", "second"]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_run_forever_polls_until_shutdown() {
        let mut scheduler = Scheduler::new(Duration::from_secs(60));
        // Nothing is due; the loop should keep ticking without returning
        let result = tokio::time::timeout(Duration::from_secs(600), scheduler.run_forever()).await;
        assert!(result.is_err());
    }
}

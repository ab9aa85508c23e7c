//! Timer-driven detection cycles.

use std::collections::BTreeMap;

use chrono::{DateTime, TimeDelta, Utc};
use tracing::info;

use crate::site::Site;

pub const DEFAULT_INTERVAL_SECS: i64 = 30;
/// One cycle a day at the slowest
pub const MAX_INTERVAL_SECS: i64 = 86_400;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MonitorState {
    Idle,
    Monitoring,
}

/// A recurring schedule. Dropping the handle cancels it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScheduledTask {
    pub id: u64,
    interval: TimeDelta,
    next_due: DateTime<Utc>,
}

impl ScheduledTask {
    fn new(id: u64, interval: TimeDelta, now: DateTime<Utc>) -> Self {
        Self {
            id,
            interval,
            next_due: now + interval,
        }
    }

    pub fn next_due(&self) -> DateTime<Utc> {
        self.next_due
    }

    /// True at most once per call. After a stall the schedule skips ahead
    /// instead of firing every missed tick.
    fn poll(&mut self, now: DateTime<Utc>) -> bool {
        if now < self.next_due {
            return false;
        }
        while self.next_due <= now {
            self.next_due += self.interval;
        }
        true
    }
}

pub struct MonitoringLoop {
    interval: TimeDelta,
    task: Option<ScheduledTask>,
    tasks_created: u64,
}

impl MonitoringLoop {
    /// `interval` is clamped to 1 s ..= `MAX_INTERVAL_SECS`
    pub fn new(interval: TimeDelta) -> Self {
        Self {
            interval: interval.clamp(TimeDelta::seconds(1), TimeDelta::seconds(MAX_INTERVAL_SECS)),
            task: None,
            tasks_created: 0,
        }
    }

    pub fn state(&self) -> MonitorState {
        if self.task.is_some() {
            MonitorState::Monitoring
        } else {
            MonitorState::Idle
        }
    }

    pub fn is_monitoring(&self) -> bool {
        self.task.is_some()
    }

    pub fn task(&self) -> Option<&ScheduledTask> {
        self.task.as_ref()
    }

    /// Returns true when the caller should run a cycle right away.
    /// Starting while already monitoring changes nothing.
    pub fn start(&mut self, now: DateTime<Utc>) -> bool {
        if self.task.is_some() {
            return false;
        }
        self.tasks_created += 1;
        self.task = Some(ScheduledTask::new(self.tasks_created, self.interval, now));
        info!(interval_secs = self.interval.num_seconds(), "monitoring started");
        true
    }

    /// Returns true if a schedule was cancelled
    pub fn stop(&mut self) -> bool {
        match self.task.take() {
            Some(task) => {
                info!(task = task.id, "monitoring stopped");
                true
            }
            None => false,
        }
    }

    /// Returns true when a scheduled cycle is due
    pub fn poll(&mut self, now: DateTime<Utc>) -> bool {
        self.task.as_mut().is_some_and(|task| task.poll(now))
    }
}

/// Every monitoring cycle's sites, keyed by cycle time. Never evicted.
#[derive(Default)]
pub struct DetectionHistory {
    entries: BTreeMap<DateTime<Utc>, Vec<Site>>,
}

impl DetectionHistory {
    pub fn record(&mut self, at: DateTime<Utc>, sites: Vec<Site>) {
        self.entries.insert(at, sites);
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn latest(&self) -> Option<(&DateTime<Utc>, &Vec<Site>)> {
        self.entries.iter().next_back()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&DateTime<Utc>, &Vec<Site>)> {
        self.entries.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::{Clock, ManualClock};

    fn monitor() -> MonitoringLoop {
        MonitoringLoop::new(TimeDelta::seconds(DEFAULT_INTERVAL_SECS))
    }

    #[test]
    fn test_start_runs_immediately_then_every_interval() {
        let clock = ManualClock::at_epoch();
        let mut m = monitor();
        assert!(m.start(clock.now()));
        assert_eq!(m.state(), MonitorState::Monitoring);
        assert!(!m.poll(clock.now()));

        clock.advance(TimeDelta::seconds(29));
        assert!(!m.poll(clock.now()));
        clock.advance(TimeDelta::seconds(1));
        assert!(m.poll(clock.now()));
        assert!(!m.poll(clock.now()));
        clock.advance(TimeDelta::seconds(30));
        assert!(m.poll(clock.now()));
    }

    #[test]
    fn test_start_is_idempotent() {
        let clock = ManualClock::at_epoch();
        let mut m = monitor();
        assert!(m.start(clock.now()));
        let first = m.task().cloned();

        clock.advance(TimeDelta::seconds(10));
        assert!(!m.start(clock.now()));
        assert_eq!(m.task().cloned(), first);

        clock.advance(TimeDelta::seconds(20));
        assert!(m.poll(clock.now()));
        assert!(!m.poll(clock.now()));
    }

    #[test]
    fn test_stop_when_idle_is_noop() {
        let mut m = monitor();
        assert!(!m.stop());
        assert!(!m.stop());
        assert_eq!(m.state(), MonitorState::Idle);
    }

    #[test]
    fn test_stop_cancels_schedule() {
        let clock = ManualClock::at_epoch();
        let mut m = monitor();
        m.start(clock.now());
        assert!(m.stop());
        clock.advance(TimeDelta::minutes(5));
        assert!(!m.poll(clock.now()));

        assert!(m.start(clock.now()));
        assert_eq!(m.task().map(|t| t.id), Some(2));
    }

    #[test]
    fn test_interval_is_clamped() {
        let clock = ManualClock::at_epoch();
        let mut m = MonitoringLoop::new(TimeDelta::MAX);
        assert!(m.start(clock.now()));
        let next = m.task().map(|t| t.next_due());
        assert_eq!(next, Some(clock.now() + TimeDelta::seconds(MAX_INTERVAL_SECS)));

        let mut m = MonitoringLoop::new(TimeDelta::zero());
        m.start(clock.now());
        clock.advance(TimeDelta::seconds(1));
        assert!(m.poll(clock.now()));
    }

    #[test]
    fn test_stall_does_not_burst() {
        let clock = ManualClock::at_epoch();
        let mut m = monitor();
        m.start(clock.now());
        clock.advance(TimeDelta::seconds(95));
        assert!(m.poll(clock.now()));
        assert!(!m.poll(clock.now()));
        let next = m.task().map(|t| t.next_due());
        assert_eq!(next, Some(clock.now() + TimeDelta::seconds(25)));
    }

    #[test]
    fn test_history_keeps_every_cycle() {
        let clock = ManualClock::at_epoch();
        let mut history = DetectionHistory::default();
        for _ in 0..3 {
            history.record(clock.now(), Vec::new());
            clock.advance(TimeDelta::seconds(30));
        }
        assert_eq!(history.len(), 3);
        let (latest, _) = history.latest().expect("entries");
        assert_eq!(*latest, clock.now() - TimeDelta::seconds(30));
    }
}

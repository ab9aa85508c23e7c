use chrono::{DateTime, TimeDelta, Utc};

use crate::stats::with_commas;

/// Total length of a count-up animation
pub const COUNT_UP_MS: i64 = 1500;
/// Number of discrete updates in a count-up
pub const COUNT_UP_STEPS: i64 = 60;

/// Linear count from `start` to `end`, advancing one step every
/// `COUNT_UP_MS / COUNT_UP_STEPS` milliseconds.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CountUp {
    start: i64,
    end: i64,
    started_at: DateTime<Utc>,
}

impl CountUp {
    pub fn new(start: i64, end: i64, started_at: DateTime<Utc>) -> Self {
        Self {
            start,
            end,
            started_at,
        }
    }

    /// Displayed value at `now`, and whether the animation has finished
    pub fn value_at(&self, now: DateTime<Utc>) -> (i64, bool) {
        let elapsed = (now - self.started_at).num_milliseconds().max(0);
        let step = elapsed / (COUNT_UP_MS / COUNT_UP_STEPS);
        if step >= COUNT_UP_STEPS {
            return (self.end, true);
        }
        let increment = (self.end - self.start) as f64 / COUNT_UP_STEPS as f64;
        let current = self.start as f64 + increment * step as f64;
        // Round half up
        ((current + 0.5).floor() as i64, false)
    }

    pub fn ends_at(&self) -> DateTime<Utc> {
        self.started_at + TimeDelta::milliseconds(COUNT_UP_MS)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Trend {
    Increasing,
    Decreasing,
}

impl Trend {
    pub fn from_rate(rate_change: f64) -> Self {
        if rate_change > 0.0 {
            Trend::Increasing
        } else {
            Trend::Decreasing
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Trend::Increasing => "▲ Increasing",
            Trend::Decreasing => "▼ Decreasing",
        }
    }
}

/// A numeric stat card: displayed value, its running animation, and trend
#[derive(Debug, Clone)]
pub struct AnimatedStat {
    pub label: &'static str,
    pub unit: &'static str,
    displayed: i64,
    animation: Option<CountUp>,
    trend: Option<Trend>,
}

impl AnimatedStat {
    pub fn new(label: &'static str, unit: &'static str) -> Self {
        Self {
            label,
            unit,
            displayed: 0,
            animation: None,
            trend: None,
        }
    }

    /// Start counting towards `target` from whatever is shown now.
    /// Any animation already running on this stat is dropped.
    pub fn set_target(&mut self, target: i64, now: DateTime<Utc>) {
        self.advance(now);
        self.animation = Some(CountUp::new(self.displayed, target, now));
    }

    pub fn advance(&mut self, now: DateTime<Utc>) {
        if let Some(animation) = self.animation {
            let (value, done) = animation.value_at(now);
            self.displayed = value;
            if done {
                self.animation = None;
            }
        }
    }

    /// Replace the trend indicator
    pub fn set_trend(&mut self, trend: Trend) {
        self.trend = Some(trend);
    }

    pub fn displayed(&self) -> i64 {
        self.displayed
    }

    pub fn trend(&self) -> Option<Trend> {
        self.trend
    }

    pub fn is_animating(&self) -> bool {
        self.animation.is_some()
    }

    pub fn text(&self) -> String {
        format!("{} {}", with_commas(self.displayed), self.unit)
    }
}

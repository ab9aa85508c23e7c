use chrono::{DateTime, Utc};

/// Wall-clock source for site dates, animation timing, and the monitor schedule
pub trait Clock {
    fn now(&self) -> DateTime<Utc>;
}

pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Virtual clock that only moves when told to. Clones share the same time.
#[cfg(test)]
#[derive(Clone)]
pub struct ManualClock {
    now: std::rc::Rc<std::cell::Cell<DateTime<Utc>>>,
}

#[cfg(test)]
impl ManualClock {
    pub fn new(start: DateTime<Utc>) -> Self {
        Self {
            now: std::rc::Rc::new(std::cell::Cell::new(start)),
        }
    }

    /// Fixed, arbitrary starting instant for tests
    pub fn at_epoch() -> Self {
        Self::new(
            DateTime::parse_from_rfc3339("2024-06-01T12:00:00Z")
                .map(|t| t.with_timezone(&Utc))
                .expect("valid timestamp"),
        )
    }

    pub fn advance(&self, by: chrono::TimeDelta) {
        self.now.set(self.now.get() + by);
    }
}

#[cfg(test)]
impl Clock for ManualClock {
    fn now(&self) -> DateTime<Utc> {
        self.now.get()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeDelta;

    #[test]
    fn test_manual_clock_shared_between_clones() {
        let clock = ManualClock::at_epoch();
        let other = clock.clone();
        let start = clock.now();
        other.advance(TimeDelta::seconds(30));
        assert_eq!(clock.now() - start, TimeDelta::seconds(30));
    }
}

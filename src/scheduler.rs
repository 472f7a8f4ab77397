//! Frame and interval timing on a virtual clock.
//!
//! The game loop owns the clock and hands `now` (time since loop start) to
//! every call, which keeps the scheduler deterministic under test. There are
//! two kinds of events: a one-shot frame callback that the frame handler
//! re-arms itself, and fixed-period intervals cancelled through their token.

use std::time::Duration;

/// Shortest interval period; shorter requests are rounded up to this.
pub const MIN_PERIOD: Duration = Duration::from_millis(1);

/// Handle for a running interval.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TimerToken(u64);

/// A due event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tick {
    Frame,
    Interval(TimerToken),
}

#[derive(Debug, Clone)]
struct Interval {
    token: TimerToken,
    period: Duration,
    next_due: Duration,
}

#[derive(Debug, Clone)]
pub struct Scheduler {
    frame_period: Duration,
    next_frame: Option<Duration>,
    intervals: Vec<Interval>,
    next_token: u64,
}

impl Scheduler {
    pub fn new(frame_period: Duration) -> Self {
        Self {
            frame_period,
            next_frame: None,
            intervals: Vec::new(),
            next_token: 0,
        }
    }

    pub fn frame_period(&self) -> Duration {
        self.frame_period
    }

    /// Arm the frame callback one period from `now`. No-op if already armed.
    pub fn request_frame(&mut self, now: Duration) {
        if self.next_frame.is_none() {
            self.next_frame = Some(now + self.frame_period);
        }
    }

    pub fn frame_armed(&self) -> bool {
        self.next_frame.is_some()
    }

    /// Periods below [`MIN_PERIOD`] are rounded up.
    pub fn start_interval(&mut self, now: Duration, period: Duration) -> TimerToken {
        let period = period.max(MIN_PERIOD);
        let token = TimerToken(self.next_token);
        self.next_token += 1;
        self.intervals.push(Interval {
            token,
            period,
            next_due: now + period,
        });
        token
    }

    /// Returns false if the token was already cancelled.
    pub fn cancel(&mut self, token: TimerToken) -> bool {
        let before = self.intervals.len();
        self.intervals.retain(|i| i.token != token);
        self.intervals.len() != before
    }

    pub fn is_active(&self, token: TimerToken) -> bool {
        self.intervals.iter().any(|i| i.token == token)
    }

    /// Earliest pending deadline, if anything is scheduled.
    pub fn next_due(&self) -> Option<Duration> {
        self.intervals
            .iter()
            .map(|i| i.next_due)
            .chain(self.next_frame)
            .min()
    }

    /// How long the loop may sleep before something is due.
    pub fn time_until_next(&self, now: Duration) -> Option<Duration> {
        self.next_due().map(|due| due.saturating_sub(now))
    }

    /// Collect every event due at or before `now`, in due-time order.
    ///
    /// The frame callback is disarmed when it fires. An interval that fell
    /// behind fires once and skips the periods it missed.
    pub fn poll(&mut self, now: Duration) -> Vec<Tick> {
        let mut due: Vec<(Duration, Tick)> = Vec::new();

        if let Some(at) = self.next_frame {
            if at <= now {
                due.push((at, Tick::Frame));
                self.next_frame = None;
            }
        }

        for interval in &mut self.intervals {
            if interval.next_due <= now {
                due.push((interval.next_due, Tick::Interval(interval.token)));
                let missed = (now - interval.next_due).as_nanos() / interval.period.as_nanos();
                let skip = (missed + 1) * interval.period.as_nanos();
                interval.next_due += Duration::from_nanos(skip as u64);
            }
        }

        // Stable, so ties keep frame-before-interval order.
        due.sort_by_key(|(at, _)| *at);
        due.into_iter().map(|(_, tick)| tick).collect()
    }
}

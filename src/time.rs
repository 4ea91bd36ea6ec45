use std::time::{Duration, Instant};

/// Monotonic session clock. Input timestamps and frame times are both `Duration`s since `start`,
/// so the throttle and the tweens measure against the same origin.
pub struct SessionClock {
    start: Instant,
    last_frame: Duration,
    frame_interval: Duration,
    frames: u64,
}

impl SessionClock {
    pub fn new(frame_interval: Duration) -> Self {
        Self::starting_at(Instant::now(), frame_interval)
    }

    pub fn starting_at(start: Instant, frame_interval: Duration) -> Self {
        Self { start, last_frame: Duration::ZERO, frame_interval, frames: 0 }
    }

    /// Session time right now; input events are stamped with this.
    pub fn now(&self) -> Duration {
        self.since_start(Instant::now())
    }

    fn since_start(&self, instant: Instant) -> Duration {
        instant.saturating_duration_since(self.start)
    }

    /// Marks a frame at `instant` and returns its session time.
    pub fn begin_frame_at(&mut self, instant: Instant) -> Duration {
        let now = self.since_start(instant).max(self.last_frame);
        self.last_frame = now;
        self.frames += 1;
        now
    }

    pub fn frames(&self) -> u64 {
        self.frames
    }

    /// Wall-clock deadline for the next frame after `from`.
    pub fn next_deadline(&self, from: Instant) -> Instant {
        from + self.frame_interval
    }
}

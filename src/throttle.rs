use crate::gesture::GestureIntent;
use std::time::Duration;

pub const DEFAULT_THROTTLE_WINDOW: Duration = Duration::from_millis(2000);

/// Admits at most one `Advance` intent per window. Every other intent passes untouched.
#[derive(Debug, Clone)]
pub struct ThrottleWindow {
    last_accepted_at: Option<Duration>,
    window: Duration,
}

impl ThrottleWindow {
    pub fn new(window: Duration) -> Self {
        Self { last_accepted_at: None, window }
    }

    pub fn last_accepted_at(&self) -> Option<Duration> {
        self.last_accepted_at
    }

    pub fn accept(&mut self, intent: &GestureIntent, now: Duration) -> bool {
        if !matches!(intent, GestureIntent::Advance { .. }) {
            return true;
        }
        let open = match self.last_accepted_at {
            None => true,
            Some(last) => now.saturating_sub(last) >= self.window,
        };
        if open {
            self.last_accepted_at = Some(now);
        }
        open
    }

    /// Time left until the next `Advance` would be admitted.
    pub fn remaining(&self, now: Duration) -> Duration {
        match self.last_accepted_at {
            None => Duration::ZERO,
            Some(last) => self.window.saturating_sub(now.saturating_sub(last)),
        }
    }
}

impl Default for ThrottleWindow {
    fn default() -> Self {
        Self::new(DEFAULT_THROTTLE_WINDOW)
    }
}

use std::time::{Duration, Instant};

/// Collapses a burst of events into a single call.
///
/// The clock is passed in by the caller: `trigger` records an event and
/// `poll` reports when the trailing call is due.
#[derive(Debug, Clone)]
pub struct Debouncer {
    wait: Duration,
    leading: bool,
    pending_since: Option<Instant>,
}

impl Debouncer {
    /// Fires once `wait` has elapsed after the last event of a burst.
    pub fn new(wait: Duration) -> Self {
        Self {
            wait,
            leading: false,
            pending_since: None,
        }
    }

    /// Fires on the first event of a burst and stays quiet until the burst ends.
    pub fn leading(wait: Duration) -> Self {
        Self {
            leading: true,
            ..Self::new(wait)
        }
    }

    pub fn wait(&self) -> Duration {
        self.wait
    }

    pub fn is_pending(&self) -> bool {
        self.pending_since.is_some()
    }

    /// Records an event. Returns `true` when the caller should act immediately.
    pub fn trigger(&mut self, now: Instant) -> bool {
        let idle = self.pending_since.is_none();
        self.pending_since = Some(now);
        self.leading && idle
    }

    /// Returns `true` exactly once per burst when the trailing call is due.
    pub fn poll(&mut self, now: Instant) -> bool {
        match self.pending_since {
            Some(last) if now.saturating_duration_since(last) >= self.wait => {
                self.pending_since = None;
                !self.leading
            }
            _ => false,
        }
    }
}

pub fn seconds_to_millis(seconds: f64) -> f64 {
    seconds * 1000.0
}

pub fn is_integer(value: f64) -> bool {
    value % 1.0 == 0.0
}

/// Rounds to two decimal places.
pub fn round_hundredths(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Moves the first element to the back.
pub fn rotate_left<T>(items: &mut [T]) {
    if !items.is_empty() {
        items.rotate_left(1);
    }
}

/// Returns the item after `current`, wrapping to the first one. An unknown
/// `current` yields the first item.
pub fn next_cyclic<'a, T: PartialEq>(items: &'a [T], current: &T) -> Option<&'a T> {
    if items.is_empty() {
        return None;
    }
    let index = items
        .iter()
        .position(|item| item == current)
        .map_or(0, |index| (index + 1) % items.len());
    items.get(index)
}

use std::time::Duration;
use tokio::time::Instant;

/// Trailing-edge debouncer driven by explicit clock readings.
///
/// `update` records the live value and restarts the quiet period; `poll`
/// promotes it to the settled value once the period has elapsed with no
/// further input. Intermediate values are never emitted.
#[derive(Debug, Clone)]
pub struct Debouncer<T> {
  delay: Duration,
  settled: T,
  pending: Option<(T, Instant)>,
}

impl<T: Clone + PartialEq> Debouncer<T> {
  pub fn new(initial: T, delay: Duration) -> Self {
    Self {
      delay,
      settled: initial,
      pending: None,
    }
  }

  /// Last settled value
  pub fn value(&self) -> &T {
    &self.settled
  }

  /// Whether a newer value is waiting out the quiet period
  pub fn is_pending(&self) -> bool {
    self.pending.is_some()
  }

  /// When the pending value will settle, if any
  pub fn deadline(&self) -> Option<Instant> {
    self.pending.as_ref().map(|(_, at)| *at)
  }

  /// Record a new live value.
  ///
  /// Returning to the settled value drops whatever was pending, since there
  /// is nothing left to catch up to.
  pub fn update(&mut self, value: T, now: Instant) {
    if value == self.settled {
      self.pending = None;
    } else {
      self.pending = Some((value, now + self.delay));
    }
  }

  /// Settle the pending value if its quiet period is over.
  /// Returns true when the settled value changed.
  pub fn poll(&mut self, now: Instant) -> bool {
    match self.pending.take() {
      Some((value, at)) if now >= at => {
        self.settled = value;
        true
      }
      other => {
        self.pending = other;
        false
      }
    }
  }

  /// Drop the pending value without emitting it
  pub fn cancel(&mut self) {
    self.pending = None;
  }
}

//! Proportional scroll synchronization between two panes.
//!
//! Whichever pane scrolls first becomes the driver. Scroll events from the
//! other pane are ignored until the driver has been idle for
//! [`SYNC_IDLE`], which breaks the feedback loop that would otherwise
//! occur when the programmatic scroll of the follower fires its own
//! scroll event.

use std::time::{Duration, Instant};

/// Idle time after which the guard releases the driving pane.
pub const SYNC_IDLE: Duration = Duration::from_millis(100);

/// The two synchronized panes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Pane {
    Editor,
    Preview,
}

impl Pane {
    pub const fn other(self) -> Self {
        match self {
            Self::Editor => Self::Preview,
            Self::Preview => Self::Editor,
        }
    }
}

/// Scroll geometry of a pane, in whatever unit the pane scrolls by.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ScrollMetrics {
    pub scroll_top: usize,
    pub scroll_height: usize,
    pub client_height: usize,
}

impl ScrollMetrics {
    /// Largest reachable `scroll_top`.
    pub const fn scroll_range(&self) -> usize {
        self.scroll_height.saturating_sub(self.client_height)
    }

    pub const fn has_overflow(&self) -> bool {
        self.scroll_height > self.client_height
    }

    /// Position as a fraction of the scrollable range, 0 when nothing
    /// overflows.
    #[allow(clippy::cast_precision_loss)]
    pub fn fraction(&self) -> f64 {
        let range = self.scroll_range();
        if range == 0 {
            return 0.0;
        }
        (self.scroll_top as f64 / range as f64).clamp(0.0, 1.0)
    }
}

/// A surface that can report and accept a scroll position.
pub trait Scrollable {
    fn scroll_metrics(&self) -> ScrollMetrics;
    fn set_scroll_top(&mut self, top: usize);
}

/// Owner-token guard plus the proportional mapping.
#[derive(Debug, Clone, Default)]
pub struct ScrollSync {
    driver: Option<Pane>,
    last_event: Option<Instant>,
}

impl ScrollSync {
    pub const fn new() -> Self {
        Self {
            driver: None,
            last_event: None,
        }
    }

    /// Pane currently holding the guard, if it has not yet expired.
    pub fn driver(&self, now: Instant) -> Option<Pane> {
        match (self.driver, self.last_event) {
            (Some(pane), Some(at)) if now.saturating_duration_since(at) < SYNC_IDLE => {
                Some(pane)
            }
            _ => None,
        }
    }

    /// Handle a scroll event from `source` and mirror it onto `target`.
    ///
    /// Returns `true` when the event was accepted (the source holds the
    /// guard). The target is only moved when it has overflow.
    pub fn on_scroll<S, T>(&mut self, source: Pane, from: &S, to: &mut T, now: Instant) -> bool
    where
        S: Scrollable + ?Sized,
        T: Scrollable + ?Sized,
    {
        if self.driver(now).is_some_and(|driver| driver != source) {
            return false;
        }
        self.driver = Some(source);
        self.last_event = Some(now);

        let fraction = from.scroll_metrics().fraction();
        let target = to.scroll_metrics();
        if target.has_overflow() {
            to.set_scroll_top(scaled_top(fraction, target.scroll_range()));
        }
        true
    }

    /// Drop the guard once the idle window has passed.
    pub fn expire(&mut self, now: Instant) {
        if self.driver(now).is_none() {
            self.driver = None;
            self.last_event = None;
        }
    }
}

#[allow(
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss,
    clippy::cast_precision_loss
)]
fn scaled_top(fraction: f64, range: usize) -> usize {
    ((fraction * range as f64).round() as usize).min(range)
}

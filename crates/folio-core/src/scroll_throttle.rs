#![forbid(unsafe_code)]

//! Frame-budget throttling for scroll notifications.
//!
//! Browsers can deliver several scroll events per frame. Reconciling on each
//! one forces redundant layout reads. [`ScrollThrottle`] lets the first event
//! of a frame window through immediately and holds later ones, keeping only
//! the most recent reading.
//!
//! # Design
//!
//! "Latest wins": a held reading is replaced by every newer one. The caller
//! polls once per animation frame; the held reading is released as soon as
//! the window since the last release has elapsed.
//!
//! # Invariants
//!
//! 1. At most one reading is released per window.
//! 2. The last reading of any burst is eventually released by [`poll`](ScrollThrottle::poll)
//!    (or immediately by [`flush`](ScrollThrottle::flush)); only intermediate
//!    readings are dropped.
//! 3. With no window configured every reading passes straight through.

use std::time::Duration;

use crate::geometry::ViewportMetrics;

/// Throttles scroll readings to one per frame window.
///
/// Not thread-safe; owned by the page on the UI thread.
#[derive(Debug, Clone, Default)]
pub struct ScrollThrottle {
    window: Option<Duration>,
    last_release: Option<Duration>,
    pending: Option<ViewportMetrics>,
}

impl ScrollThrottle {
    /// Create a throttle. `None` disables throttling.
    #[must_use]
    pub fn new(window: Option<Duration>) -> Self {
        Self {
            window: window.filter(|w| !w.is_zero()),
            last_release: None,
            pending: None,
        }
    }

    fn window_open(&self, now: Duration) -> bool {
        match (self.window, self.last_release) {
            (None, _) | (_, None) => true,
            (Some(window), Some(last)) => now.saturating_sub(last) >= window,
        }
    }

    /// Offer a new reading.
    ///
    /// Returns `Some(metrics)` if it should be reconciled now, `None` if it
    /// is being held.
    pub fn push(&mut self, now: Duration, metrics: ViewportMetrics) -> Option<ViewportMetrics> {
        if self.window_open(now) {
            self.last_release = Some(now);
            self.pending = None;
            Some(metrics)
        } else {
            self.pending = Some(metrics);
            None
        }
    }

    /// Release the held reading if its window has elapsed.
    pub fn poll(&mut self, now: Duration) -> Option<ViewportMetrics> {
        if self.pending.is_some() && self.window_open(now) {
            self.last_release = Some(now);
            self.pending.take()
        } else {
            None
        }
    }

    /// Release the held reading regardless of timing.
    pub fn flush(&mut self) -> Option<ViewportMetrics> {
        self.pending.take()
    }

    /// Whether a reading is being held.
    #[must_use]
    pub fn has_pending(&self) -> bool {
        self.pending.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const fn ms(v: u64) -> Duration {
        Duration::from_millis(v)
    }

    fn at(y: u32) -> ViewportMetrics {
        ViewportMetrics::new(y, 1280, 800)
    }

    #[test]
    fn first_event_passes_through() {
        let mut t = ScrollThrottle::new(Some(ms(16)));
        assert_eq!(t.push(ms(0), at(10)), Some(at(10)));
        assert!(!t.has_pending());
    }

    #[test]
    fn burst_keeps_latest_and_releases_it() {
        let mut t = ScrollThrottle::new(Some(ms(16)));
        assert!(t.push(ms(0), at(10)).is_some());
        assert!(t.push(ms(4), at(20)).is_none());
        assert!(t.push(ms(8), at(30)).is_none());
        assert!(t.push(ms(12), at(40)).is_none());
        assert_eq!(t.poll(ms(15)), None);
        assert_eq!(t.poll(ms(16)), Some(at(40)));
        assert_eq!(t.poll(ms(40)), None);
    }

    #[test]
    fn push_after_window_supersedes_held() {
        let mut t = ScrollThrottle::new(Some(ms(16)));
        t.push(ms(0), at(10));
        t.push(ms(5), at(20));
        assert_eq!(t.push(ms(20), at(30)), Some(at(30)));
        assert_eq!(t.flush(), None);
    }

    #[test]
    fn disabled_passes_everything() {
        let mut t = ScrollThrottle::new(None);
        for (i, y) in [1, 2, 3].into_iter().enumerate() {
            assert_eq!(t.push(ms(i as u64), at(y)), Some(at(y)));
        }
        let mut z = ScrollThrottle::new(Some(Duration::ZERO));
        z.push(ms(0), at(1));
        assert_eq!(z.push(ms(0), at(2)), Some(at(2)));
    }

    #[test]
    fn flush_releases_regardless_of_window() {
        let mut t = ScrollThrottle::new(Some(ms(16)));
        t.push(ms(0), at(10));
        t.push(ms(1), at(99));
        assert_eq!(t.flush(), Some(at(99)));
        assert!(!t.has_pending());
    }
}

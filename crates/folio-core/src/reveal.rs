#![forbid(unsafe_code)]

//! One-shot reveal-on-visibility.
//!
//! A [`RevealGroup`] watches a set of elements. The first time an element's
//! visible fraction reaches the group threshold it moves from
//! [`RevealState::Pending`] to [`RevealState::Revealed`] and is released: the
//! host stops observing it and no later intersection can touch it again.
//!
//! # Design
//!
//! Each watched element holds its payload (captured width, counter seed, or
//! `()`) as an `Option`. Revealing *takes* the payload, so a reveal is
//! literally consuming the single item the element can ever yield. Intersection
//! batches are reduced to a lazy stream of crossings with [`crossings`]; the
//! group only consumes crossings for elements that still hold a payload.
//!
//! # Invariants
//!
//! 1. An element is revealed at most once for the lifetime of the group.
//! 2. Re-observing a revealed element never returns it to pending.
//! 3. Within one batch, newly revealed elements are ranked by registration
//!    order (not notification order) and rank `i` is delayed by `i * stagger`.
//! 4. Empty batches and empty groups produce nothing.
//!
//! # Failure Modes
//!
//! - Entries for elements the group never observed are ignored.
//! - Duplicate entries for one element in a batch reveal it once.

use std::collections::HashMap;
use std::time::Duration;

use crate::config::RevealGroupConfig;
use crate::stagger::stagger_offset;
use crate::surface::ElementId;

/// Tolerance for hosts that report a ratio a hair below the threshold they
/// were asked to notify at.
pub const RATIO_EPSILON: f64 = 1e-3;

/// Notification steps per threshold in [`notification_thresholds`].
pub const THRESHOLD_STEPS: u32 = 20;

/// One intersection notification, as reported by the host.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct IntersectionEntry {
    pub target: ElementId,
    pub is_intersecting: bool,
    /// Visible fraction of the element's box in `[0, 1]`.
    pub ratio: f64,
    /// Visible height as a fraction of the viewport height, when the host
    /// knows both.
    pub root_coverage: Option<f64>,
}

impl IntersectionEntry {
    pub const fn new(target: ElementId, is_intersecting: bool, ratio: f64) -> Self {
        Self {
            target,
            is_intersecting,
            ratio,
            root_coverage: None,
        }
    }

    /// Attach the visible and viewport heights. A non-positive or
    /// non-finite viewport height leaves the coverage unknown.
    #[must_use]
    pub fn with_heights(mut self, visible_height: f64, root_height: f64) -> Self {
        self.root_coverage = (root_height.is_finite() && root_height > 0.0)
            .then(|| (visible_height.max(0.0) / root_height).min(1.0));
        self
    }

    /// Whether this entry reaches `threshold`.
    ///
    /// An element taller than the viewport can never show `threshold` of
    /// itself once `threshold` exceeds `viewport / element`; it crosses
    /// instead when it covers `threshold` of the viewport. For elements no
    /// taller than the viewport coverage never exceeds `ratio`, so the
    /// second test only ever admits tall elements.
    #[inline]
    #[must_use]
    pub fn crosses(&self, threshold: f64) -> bool {
        self.is_intersecting
            && (self.ratio + RATIO_EPSILON >= threshold
                || self
                    .root_coverage
                    .is_some_and(|c| c + RATIO_EPSILON >= threshold))
    }
}

/// Ratios the host should ask to be notified at for `threshold`.
///
/// Browsers only report when the visible ratio crosses a listed value, and a
/// tall element may never reach `threshold` itself. The ladder
/// `0, t/n, 2t/n, .., t` keeps notifications coming while such an element
/// scrolls in, so its viewport coverage is seen at most one step late.
#[must_use]
pub fn notification_thresholds(threshold: f64) -> Vec<f64> {
    let t = threshold.clamp(0.0, 1.0);
    if t == 0.0 {
        return vec![0.0];
    }
    (0..=THRESHOLD_STEPS)
        .map(|i| t * f64::from(i) / f64::from(THRESHOLD_STEPS))
        .collect()
}

/// Elements in `entries` whose visibility reached `threshold`, lazily.
pub fn crossings<'a>(
    entries: impl IntoIterator<Item = &'a IntersectionEntry> + 'a,
    threshold: f64,
) -> impl Iterator<Item = ElementId> + 'a {
    entries
        .into_iter()
        .filter(move |e| e.crosses(threshold))
        .map(|e| e.target)
}

/// Lifecycle of a watched element.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RevealState {
    Pending,
    Revealed,
}

/// Result of [`RevealGroup::observe`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Observed {
    /// Newly registered; the caller should apply the pending presentation
    /// and start observing.
    Primed,
    /// Already pending; nothing to do.
    AlreadyPending,
    /// Already revealed; must not be hidden again.
    AlreadyRevealed,
}

/// A reveal ready to be scheduled.
#[derive(Debug, Clone, PartialEq)]
pub struct Reveal<P> {
    pub element: ElementId,
    /// Stagger delay relative to the batch's detection time.
    pub delay: Duration,
    pub payload: P,
}

#[derive(Debug, Clone)]
struct Watch<P> {
    element: ElementId,
    /// `Some` while pending.
    token: Option<P>,
}

/// A set of elements sharing one visibility threshold and stagger.
#[derive(Debug, Clone)]
pub struct RevealGroup<P = ()> {
    config: RevealGroupConfig,
    watches: Vec<Watch<P>>,
    index: HashMap<ElementId, usize>,
}

impl<P> RevealGroup<P> {
    #[must_use]
    pub fn new(config: RevealGroupConfig) -> Self {
        Self {
            config,
            watches: Vec::new(),
            index: HashMap::new(),
        }
    }

    #[must_use]
    pub fn threshold(&self) -> f64 {
        self.config.threshold
    }

    /// Register `element` with its payload. Idempotent per element.
    pub fn observe(&mut self, element: ElementId, payload: P) -> Observed {
        if let Some(&i) = self.index.get(&element) {
            return match self.watches[i].token {
                Some(_) => Observed::AlreadyPending,
                None => Observed::AlreadyRevealed,
            };
        }
        self.index.insert(element, self.watches.len());
        self.watches.push(Watch {
            element,
            token: Some(payload),
        });
        Observed::Primed
    }

    /// Consume one batch of intersection notifications.
    ///
    /// Returns the reveals it triggered, in registration order, with their
    /// stagger delays. Every returned element is now revealed and should be
    /// unobserved by the host.
    pub fn on_batch(&mut self, entries: &[IntersectionEntry]) -> Vec<Reveal<P>> {
        let mut hits: Vec<usize> = crossings(entries, self.config.threshold)
            .filter_map(|el| self.index.get(&el).copied())
            .filter(|&i| self.watches[i].token.is_some())
            .collect();
        hits.sort_unstable();
        hits.dedup();

        let stagger = self.config.stagger();
        let mut reveals = Vec::with_capacity(hits.len());
        for i in hits {
            let watch = &mut self.watches[i];
            if let Some(payload) = watch.token.take() {
                reveals.push(Reveal {
                    element: watch.element,
                    delay: stagger_offset(reveals.len(), stagger),
                    payload,
                });
            }
        }
        reveals
    }

    /// Current state of `element`, or `None` if it was never observed.
    #[must_use]
    pub fn state(&self, element: ElementId) -> Option<RevealState> {
        self.index.get(&element).map(|&i| match self.watches[i].token {
            Some(_) => RevealState::Pending,
            None => RevealState::Revealed,
        })
    }

    /// Elements still waiting to be revealed, in registration order.
    pub fn pending(&self) -> impl Iterator<Item = ElementId> + '_ {
        self.watches
            .iter()
            .filter(|w| w.token.is_some())
            .map(|w| w.element)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.watches.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.watches.is_empty()
    }
}

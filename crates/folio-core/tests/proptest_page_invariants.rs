//! Property-based invariant tests for scroll state, reveal and counter.
//!
//! 1. Navbar and back-to-top flags follow their thresholds exactly.
//! 2. The active section is the last section whose top is within reach.
//! 3. At most one nav link carries the active class after any scroll path.
//! 4. Hero opacity stays within [0, 1].
//! 5. Stagger delays depend on registration order, not arrival order.
//! 6. Each element is revealed at most once across arbitrary batches.
//! 7. Counter values strictly increase and end on the target.
//! 8. The throttle never loses the final reading.

use std::time::Duration;

use folio_core::config::{RevealGroupConfig, ScrollConfig};
use folio_core::counter::CounterAnimation;
use folio_core::reveal::{IntersectionEntry, RevealGroup};
use folio_core::scroll_state::{NavLink, ScrollStateReconciler, ScrollTargets};
use folio_core::scroll_throttle::ScrollThrottle;
use folio_core::{ElementId, RecordingSurface, Section, ViewportMetrics};
use proptest::prelude::*;

// ── Helpers ─────────────────────────────────────────────────────────────

/// Sections at strictly increasing offsets, each with a matching nav link.
fn page_strategy() -> impl Strategy<Value = ScrollTargets> {
    prop::collection::vec(1i64..=2000, 0..8).prop_map(|gaps| {
        let mut offset = 0;
        let mut sections = Vec::new();
        let mut nav_links = Vec::new();
        for (i, gap) in gaps.into_iter().enumerate() {
            let id = format!("s{i}");
            nav_links.push(NavLink::new(ElementId(100 + i as u32), format!("#{id}")));
            sections.push(Section::new(id, offset, gap));
            offset += gap;
        }
        ScrollTargets {
            navbar: Some(ElementId(1)),
            back_to_top: Some(ElementId(2)),
            hero: Some(ElementId(3)),
            sections,
            nav_links,
        }
    })
}

fn metrics_strategy() -> impl Strategy<Value = ViewportMetrics> {
    (0u32..=20_000, 320u32..=2560).prop_map(|(y, w)| ViewportMetrics::new(y, w, 800))
}

// ═════════════════════════════════════════════════════════════════════════
// 1. Threshold flags
// ═════════════════════════════════════════════════════════════════════════

proptest! {
    #[test]
    fn flags_follow_thresholds(targets in page_strategy(), m in metrics_strategy()) {
        let cfg = ScrollConfig::default();
        let r = ScrollStateReconciler::new(cfg.clone(), targets);
        let state = r.compute(m);
        prop_assert_eq!(state.navbar_scrolled, m.scroll_y > cfg.navbar_threshold);
        prop_assert_eq!(state.back_to_top_visible, m.scroll_y > cfg.back_to_top_threshold);
        prop_assert_eq!(state.parallax.is_none(), m.width < cfg.mobile_breakpoint);
    }
}

// ═════════════════════════════════════════════════════════════════════════
// 2. Active section
// ═════════════════════════════════════════════════════════════════════════

proptest! {
    #[test]
    fn active_section_is_last_reachable(targets in page_strategy(), m in metrics_strategy()) {
        let cfg = ScrollConfig::default();
        let reach = i64::from(m.scroll_y) + i64::from(cfg.active_offset);
        let expected = targets
            .sections
            .iter()
            .rev()
            .find(|s| s.offset <= reach)
            .map(|s| s.id.clone());
        let r = ScrollStateReconciler::new(cfg, targets);
        prop_assert_eq!(r.compute(m).active_section, expected);
    }
}

// ═════════════════════════════════════════════════════════════════════════
// 3. Single active link
// ═════════════════════════════════════════════════════════════════════════

proptest! {
    #[test]
    fn at_most_one_active_link(
        targets in page_strategy(),
        path in prop::collection::vec(metrics_strategy(), 1..20),
    ) {
        let links: Vec<ElementId> = targets.nav_links.iter().map(|l| l.element).collect();
        let mut r = ScrollStateReconciler::new(ScrollConfig::default(), targets);
        let mut surface = RecordingSurface::new();
        for m in path {
            r.reconcile(m, &mut surface);
            let active = links.iter().filter(|&&l| surface.has_class(l, "active")).count();
            prop_assert!(active <= 1, "{active} links active");
            let expected = usize::from(r.applied().and_then(|s| s.active_link).is_some());
            prop_assert_eq!(active, expected);
        }
    }
}

// ═════════════════════════════════════════════════════════════════════════
// 4. Parallax bounds
// ═════════════════════════════════════════════════════════════════════════

proptest! {
    #[test]
    fn hero_opacity_bounded(y in any::<u32>(), damping in 0.0f64..=1.0, fade in 0.0f64..5000.0) {
        let p = folio_core::scroll_state::Parallax::at(y, damping, fade);
        prop_assert!((0.0..=1.0).contains(&p.opacity));
        prop_assert!(p.offset_px >= 0.0);
    }
}

// ═════════════════════════════════════════════════════════════════════════
// 5. Stagger by registration order
// ═════════════════════════════════════════════════════════════════════════

proptest! {
    #[test]
    fn stagger_ignores_arrival_order(
        order in (1usize..12).prop_flat_map(|n| Just((0..n).collect::<Vec<_>>()).prop_shuffle()),
    ) {
        let mut group = RevealGroup::new(RevealGroupConfig::new(0.1, 100));
        for i in 0..order.len() {
            group.observe(ElementId(i as u32), ());
        }
        let entries: Vec<_> = order
            .iter()
            .map(|&i| IntersectionEntry::new(ElementId(i as u32), true, 0.5))
            .collect();
        let reveals = group.on_batch(&entries);
        prop_assert_eq!(reveals.len(), order.len());
        for (rank, r) in reveals.iter().enumerate() {
            prop_assert_eq!(r.element, ElementId(rank as u32));
            prop_assert_eq!(r.delay, Duration::from_millis(100 * rank as u64));
        }
    }
}

// ═════════════════════════════════════════════════════════════════════════
// 6. One-shot reveal
// ═════════════════════════════════════════════════════════════════════════

proptest! {
    #[test]
    fn each_element_revealed_once(
        batches in prop::collection::vec(
            prop::collection::vec((0u32..8, any::<bool>(), 0.0f64..=1.0), 0..10),
            0..10,
        ),
    ) {
        let mut group = RevealGroup::new(RevealGroupConfig::new(0.5, 0));
        for i in 0..8 {
            group.observe(ElementId(i), ());
        }
        let mut seen = std::collections::HashSet::new();
        for batch in batches {
            let entries: Vec<_> = batch
                .into_iter()
                .map(|(id, hit, ratio)| IntersectionEntry::new(ElementId(id), hit, ratio))
                .collect();
            for r in group.on_batch(&entries) {
                prop_assert!(seen.insert(r.element), "{:?} revealed twice", r.element);
            }
        }
        prop_assert_eq!(group.pending().count() + seen.len(), 8);
    }
}

// ═════════════════════════════════════════════════════════════════════════
// 7. Counter monotonicity
// ═════════════════════════════════════════════════════════════════════════

proptest! {
    #[test]
    fn counter_strictly_increases_to_target(target in 0u32..100_000, steps in 0u32..200) {
        let mut c = CounterAnimation::new(target, steps, "+");
        let mut values = Vec::new();
        let mut finishes = 0;
        for _ in 0..(steps + 5) {
            let frame = c.advance();
            if let Some(text) = frame.text {
                let v: u64 = text.trim_end_matches('+').parse().unwrap();
                values.push(v);
            }
            finishes += usize::from(frame.finished);
        }
        prop_assert_eq!(finishes, 1);
        prop_assert!(values.windows(2).all(|w| w[0] < w[1]));
        prop_assert!(values.iter().all(|&v| v <= u64::from(target)));
        prop_assert_eq!(values.last().copied(), Some(u64::from(target)));
    }
}

// ═════════════════════════════════════════════════════════════════════════
// 8. Throttle keeps the final reading
// ═════════════════════════════════════════════════════════════════════════

proptest! {
    #[test]
    fn throttle_releases_last_reading(gaps in prop::collection::vec(0u64..40, 1..50)) {
        let mut throttle = ScrollThrottle::new(Some(Duration::from_millis(16)));
        let mut now = Duration::ZERO;
        let mut last_seen = None;
        let mut last_pushed = ViewportMetrics::default();
        for (i, gap) in gaps.into_iter().enumerate() {
            now += Duration::from_millis(gap);
            last_pushed = ViewportMetrics::new(i as u32, 1280, 800);
            if let Some(m) = throttle.push(now, last_pushed) {
                last_seen = Some(m);
            }
        }
        if let Some(m) = throttle.poll(now + Duration::from_millis(16)) {
            last_seen = Some(m);
        }
        prop_assert!(!throttle.has_pending());
        prop_assert_eq!(last_seen, Some(last_pushed));
    }
}

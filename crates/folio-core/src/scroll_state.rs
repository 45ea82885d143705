#![forbid(unsafe_code)]

//! Scroll-derived UI state.
//!
//! On every (throttled) scroll reading the [`ScrollStateReconciler`]
//! recomputes a small [`ScrollDerivedState`] and writes the difference to the
//! surface:
//!
//! - navbar `scrolled` class once `scroll_y > navbar_threshold`;
//! - `active` class on the nav link whose section was crossed last;
//! - back-to-top `show` class (and optionally inline `display`);
//! - hero parallax translation and fade on desktop-width viewports.
//!
//! # Invariants
//!
//! 1. [`compute`](ScrollStateReconciler::compute) is pure: the same metrics
//!    always produce the same state.
//! 2. At most one nav link is active.
//! 3. Parallax opacity is always within `[0, 1]`.
//! 4. A missing navbar, button or hero skips only its own sub-update.

use crate::config::ScrollConfig;
use crate::geometry::{Section, ViewportMetrics, css_number};
use crate::surface::{ElementId, Surface};

pub const CLASS_SCROLLED: &str = "scrolled";
pub const CLASS_ACTIVE: &str = "active";
pub const CLASS_SHOW: &str = "show";

/// A navigation link pointing at a section anchor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NavLink {
    pub element: ElementId,
    /// Raw `href`, e.g. `#about`.
    pub href: String,
}

impl NavLink {
    pub fn new(element: ElementId, href: impl Into<String>) -> Self {
        Self {
            element,
            href: href.into(),
        }
    }

    /// Section id this link points at, if it is an in-page anchor.
    #[must_use]
    pub fn target(&self) -> Option<&str> {
        self.href.strip_prefix('#').filter(|id| !id.is_empty())
    }
}

/// Elements and geometry the reconciler operates on.
#[derive(Debug, Clone, Default)]
pub struct ScrollTargets {
    pub navbar: Option<ElementId>,
    pub back_to_top: Option<ElementId>,
    pub hero: Option<ElementId>,
    /// Sections in document order.
    pub sections: Vec<Section>,
    /// Nav links in document order.
    pub nav_links: Vec<NavLink>,
}

/// Hero parallax values.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Parallax {
    pub offset_px: f64,
    pub opacity: f64,
}

impl Parallax {
    /// Parallax for `scroll_y` with the given damping and fade distance.
    #[must_use]
    pub fn at(scroll_y: u32, damping: f64, fade_distance: f64) -> Self {
        let y = f64::from(scroll_y);
        let opacity = if fade_distance > 0.0 {
            (1.0 - y / fade_distance).clamp(0.0, 1.0)
        } else {
            0.0
        };
        Self {
            offset_px: y * damping,
            opacity,
        }
    }
}

/// Ephemeral state recomputed on every scroll reading.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ScrollDerivedState {
    pub navbar_scrolled: bool,
    /// Id of the active section; `None` when no section qualifies.
    pub active_section: Option<String>,
    /// Index into the nav links of the single active link.
    pub active_link: Option<usize>,
    pub back_to_top_visible: bool,
    /// Inline `display` state; `None` when that toggle is disabled.
    pub back_to_top_displayed: Option<bool>,
    /// `None` on narrow viewports.
    pub parallax: Option<Parallax>,
}

/// Last section (in the given order) whose top is within `active_offset`
/// pixels of the viewport top.
///
/// This is a last-match-wins scan, not a search: it does not require the
/// sections to be sorted.
#[must_use]
pub fn active_section(sections: &[Section], scroll_y: u32, active_offset: u32) -> Option<&Section> {
    let y = i64::from(scroll_y);
    let offset = i64::from(active_offset);
    sections
        .iter()
        .filter(|s| y >= s.offset.saturating_sub(offset))
        .last()
}

/// Recomputes and applies [`ScrollDerivedState`].
#[derive(Debug, Clone)]
pub struct ScrollStateReconciler {
    config: ScrollConfig,
    targets: ScrollTargets,
    applied: Option<ScrollDerivedState>,
}

impl ScrollStateReconciler {
    #[must_use]
    pub fn new(config: ScrollConfig, targets: ScrollTargets) -> Self {
        Self {
            config,
            targets,
            applied: None,
        }
    }

    #[must_use]
    pub fn targets(&self) -> &ScrollTargets {
        &self.targets
    }

    /// State most recently written to the surface.
    #[must_use]
    pub fn applied(&self) -> Option<&ScrollDerivedState> {
        self.applied.as_ref()
    }

    /// Derive the state for `metrics` without touching the surface.
    #[must_use]
    pub fn compute(&self, metrics: ViewportMetrics) -> ScrollDerivedState {
        let cfg = &self.config;
        let y = metrics.scroll_y;

        let active = active_section(&self.targets.sections, y, cfg.active_offset);
        let active_link = active.and_then(|section| {
            self.targets
                .nav_links
                .iter()
                .position(|link| link.target() == Some(section.id.as_str()))
        });

        let parallax = (!metrics.is_narrow(cfg.mobile_breakpoint)).then(|| {
            Parallax::at(y, cfg.parallax_damping, cfg.parallax_fade_distance)
        });

        ScrollDerivedState {
            navbar_scrolled: y > cfg.navbar_threshold,
            active_section: active.map(|s| s.id.clone()),
            active_link,
            back_to_top_visible: y > cfg.back_to_top_threshold,
            back_to_top_displayed: cfg.back_to_top_display_threshold.map(|t| y > t),
            parallax,
        }
    }

    /// Compute and apply in one step.
    pub fn reconcile(&mut self, metrics: ViewportMetrics, surface: &mut dyn Surface) {
        let state = self.compute(metrics);
        self.apply(state, surface);
    }

    /// Write `state` to the surface, skipping parts unchanged since the last
    /// apply. The first apply writes everything.
    pub fn apply(&mut self, state: ScrollDerivedState, surface: &mut dyn Surface) {
        let prev = self.applied.as_ref();
        let first = prev.is_none();

        if let Some(navbar) = self.targets.navbar
            && (first || prev.map(|p| p.navbar_scrolled) != Some(state.navbar_scrolled))
        {
            surface.toggle_class(navbar, CLASS_SCROLLED, state.navbar_scrolled);
        }

        let prev_link = prev.and_then(|p| p.active_link);
        if first || prev_link != state.active_link {
            if prev.map(|p| &p.active_section) != Some(&state.active_section) {
                crate::trace!(section = ?state.active_section, "active section changed");
            }
            for (i, link) in self.targets.nav_links.iter().enumerate() {
                let was = prev_link == Some(i);
                let now = state.active_link == Some(i);
                if first || was != now {
                    surface.toggle_class(link.element, CLASS_ACTIVE, now);
                }
            }
        }

        if let Some(button) = self.targets.back_to_top {
            if first || prev.map(|p| p.back_to_top_visible) != Some(state.back_to_top_visible) {
                surface.toggle_class(button, CLASS_SHOW, state.back_to_top_visible);
            }
            if let Some(displayed) = state.back_to_top_displayed
                && (first || prev.and_then(|p| p.back_to_top_displayed) != Some(displayed))
            {
                surface.set_style(button, "display", if displayed { "block" } else { "none" });
            }
        }

        if let Some(hero) = self.targets.hero {
            match (prev.and_then(|p| p.parallax), state.parallax) {
                (before, Some(p)) if before != Some(p) => {
                    surface.set_style(
                        hero,
                        "transform",
                        &format!("translateY({}px)", css_number(p.offset_px)),
                    );
                    surface.set_style(hero, "opacity", &css_number(p.opacity));
                }
                (Some(_), None) => {
                    surface.set_style(hero, "transform", "");
                    surface.set_style(hero, "opacity", "");
                }
                _ => {}
            }
        }

        self.applied = Some(state);
    }

    /// Forget the applied state so the next apply writes everything.
    pub fn invalidate(&mut self) {
        self.applied = None;
    }
}

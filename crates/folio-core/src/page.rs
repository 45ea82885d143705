#![forbid(unsafe_code)]

//! The page-ready entry point.
//!
//! [`Page`] owns every component for one page load and exposes one method
//! per host event. The host injects a [`PageLayout`] (element handles and
//! geometry queried once at load) instead of the engine looking anything up,
//! so the whole page can run against a [`RecordingSurface`] in tests.
//!
//! # Host protocol
//!
//! 1. Build the layout, call [`Page::ready`] once the document has loaded.
//! 2. Observe [`Page::pending`] for each [`RevealGroupId`] at
//!    [`Page::observer_thresholds`], forwarding batches to
//!    [`Page::on_intersections`] (with visible and viewport heights where
//!    known) and unobserving the elements it returns.
//! 3. Forward scroll events to [`Page::on_scroll`] and call
//!    [`Page::on_frame`] on every animation frame.
//!
//! # Invariants
//!
//! 1. Calling [`Page::ready`] again never re-hides a revealed element, never
//!    re-primes a pending one and never starts a second counter or typing
//!    loop.
//! 2. The counter timer is cancelled exactly once, on its final step.
//!
//! [`RecordingSurface`]: crate::surface::RecordingSurface

use std::time::Duration;

use crate::config::PageConfig;
use crate::counter::{CounterAnimation, parse_seed};
use crate::effects::{
    CLASS_LOADED, CLASS_RIPPLE, ContactForm, ImageFallbacks, ImageKind, ImageTarget,
    RippleGeometry, anchor_scroll_top, hover_transform,
};
use crate::geometry::{ClientRect, Point, Section, ViewportMetrics};
use crate::reveal::{
    IntersectionEntry, Observed, RevealGroup, RevealState, notification_thresholds,
};
use crate::scroll_state::{
    CLASS_SHOW, NavLink, ScrollDerivedState, ScrollStateReconciler, ScrollTargets,
};
use crate::scroll_throttle::ScrollThrottle;
use crate::surface::{ElementId, Surface};
use crate::timer::{TimerId, TimerQueue};
use crate::typing::TypingEffect;

pub const CLASS_FADE_IN_UP: &str = "fade-in-up";

/// The reveal groups a page observes, one intersection observer each.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RevealGroupId {
    ProjectCards,
    SkillCards,
    Sections,
    ProgressBars,
    Counter,
}

impl RevealGroupId {
    pub const ALL: [Self; 5] = [
        Self::ProjectCards,
        Self::SkillCards,
        Self::Sections,
        Self::ProgressBars,
        Self::Counter,
    ];

    const fn is_card(self) -> bool {
        matches!(self, Self::ProjectCards | Self::SkillCards)
    }
}

/// A progress bar and the width authored for it in markup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProgressBarTarget {
    pub element: ElementId,
    pub authored_width: String,
}

/// The experience counter and its authored text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CounterTarget {
    pub element: ElementId,
    pub seed_text: String,
}

/// Everything the host found in the document at load time.
///
/// Absent elements are simply `None` or empty.
#[derive(Debug, Clone, Default)]
pub struct PageLayout {
    pub body: Option<ElementId>,
    pub navbar: Option<ElementId>,
    pub navbar_collapse: Option<ElementId>,
    pub back_to_top: Option<ElementId>,
    pub hero: Option<ElementId>,
    pub sections: Vec<Section>,
    /// Other in-page anchor targets (ids linked by `#id` hrefs that are not
    /// sections), with document offsets.
    pub anchor_targets: Vec<Section>,
    pub nav_links: Vec<NavLink>,
    pub project_cards: Vec<ElementId>,
    pub skill_cards: Vec<ElementId>,
    pub reveal_sections: Vec<ElementId>,
    pub progress_bars: Vec<ProgressBarTarget>,
    pub counter: Option<CounterTarget>,
    pub images: Vec<ImageTarget>,
    pub typing: Option<ElementId>,
    pub contact_form: Option<ContactForm>,
}

#[derive(Debug, Clone)]
enum Task {
    Reveal {
        group: RevealGroupId,
        element: ElementId,
    },
    RestoreWidth {
        element: ElementId,
        width: String,
    },
    CounterStep,
    RemoveRipple(ElementId),
    FadeInImage(ElementId),
    TypingStep,
    ClearFormStatus,
}

#[derive(Debug)]
struct RunningCounter {
    animation: CounterAnimation,
    timer: Option<TimerId>,
}

/// All interaction state for one page load.
#[derive(Debug)]
pub struct Page {
    config: PageConfig,
    layout: PageLayout,
    reconciler: ScrollStateReconciler,
    throttle: ScrollThrottle,
    project_cards: RevealGroup,
    skill_cards: RevealGroup,
    sections: RevealGroup,
    progress_bars: RevealGroup<String>,
    counter_group: RevealGroup<u32>,
    counter: Option<RunningCounter>,
    typing: Option<TypingEffect>,
    fallbacks: ImageFallbacks,
    form_timer: Option<TimerId>,
    timers: TimerQueue<Task>,
    metrics: ViewportMetrics,
}

impl Page {
    /// Build a page from configuration and the host's layout.
    #[must_use]
    pub fn new(config: PageConfig, layout: PageLayout) -> Self {
        let targets = ScrollTargets {
            navbar: layout.navbar,
            back_to_top: layout.back_to_top,
            hero: layout.hero,
            sections: layout.sections.clone(),
            nav_links: layout.nav_links.clone(),
        };
        let r = &config.reveal;
        Self {
            reconciler: ScrollStateReconciler::new(config.scroll.clone(), targets),
            throttle: ScrollThrottle::new(config.scroll.throttle()),
            project_cards: RevealGroup::new(r.project_cards),
            skill_cards: RevealGroup::new(r.skill_cards),
            sections: RevealGroup::new(r.sections),
            progress_bars: RevealGroup::new(r.progress_bars),
            counter_group: RevealGroup::new(r.counter),
            counter: None,
            typing: None,
            fallbacks: ImageFallbacks::default(),
            form_timer: None,
            timers: TimerQueue::new(),
            metrics: ViewportMetrics::default(),
            config,
            layout,
        }
    }

    #[must_use]
    pub fn config(&self) -> &PageConfig {
        &self.config
    }

    #[must_use]
    pub fn layout(&self) -> &PageLayout {
        &self.layout
    }

    /// Visibility threshold the host should observe `group` with.
    #[must_use]
    pub fn threshold(&self, group: RevealGroupId) -> f64 {
        match group {
            RevealGroupId::ProjectCards => self.project_cards.threshold(),
            RevealGroupId::SkillCards => self.skill_cards.threshold(),
            RevealGroupId::Sections => self.sections.threshold(),
            RevealGroupId::ProgressBars => self.progress_bars.threshold(),
            RevealGroupId::Counter => self.counter_group.threshold(),
        }
    }

    /// Ratios the host should request notifications at for `group`.
    #[must_use]
    pub fn observer_thresholds(&self, group: RevealGroupId) -> Vec<f64> {
        notification_thresholds(self.threshold(group))
    }

    /// Elements of `group` the host should be observing.
    #[must_use]
    pub fn pending(&self, group: RevealGroupId) -> Vec<ElementId> {
        match group {
            RevealGroupId::ProjectCards => self.project_cards.pending().collect(),
            RevealGroupId::SkillCards => self.skill_cards.pending().collect(),
            RevealGroupId::Sections => self.sections.pending().collect(),
            RevealGroupId::ProgressBars => self.progress_bars.pending().collect(),
            RevealGroupId::Counter => self.counter_group.pending().collect(),
        }
    }

    /// Reveal state of `element` within `group`.
    #[must_use]
    pub fn reveal_state(&self, group: RevealGroupId, element: ElementId) -> Option<RevealState> {
        match group {
            RevealGroupId::ProjectCards => self.project_cards.state(element),
            RevealGroupId::SkillCards => self.skill_cards.state(element),
            RevealGroupId::Sections => self.sections.state(element),
            RevealGroupId::ProgressBars => self.progress_bars.state(element),
            RevealGroupId::Counter => self.counter_group.state(element),
        }
    }

    /// Scroll-derived state last written to the surface.
    #[must_use]
    pub fn scroll_state(&self) -> Option<&ScrollDerivedState> {
        self.reconciler.applied()
    }

    /// Whether the counter's interval timer is still running.
    #[must_use]
    pub fn counter_running(&self) -> bool {
        self.counter
            .as_ref()
            .and_then(|c| c.timer)
            .is_some_and(|t| self.timers.is_scheduled(t))
    }

    /// Earliest time a deferred task is due, for hosts that sleep between
    /// frames.
    #[must_use]
    pub fn next_due(&self) -> Option<Duration> {
        self.timers.next_due()
    }

    // -----------------------------------------------------------------------
    // Host events
    // -----------------------------------------------------------------------

    /// The document has loaded. Safe to call more than once.
    pub fn ready(&mut self, now: Duration, metrics: ViewportMetrics, surface: &mut dyn Surface) {
        if let Some(body) = self.layout.body {
            surface.toggle_class(body, CLASS_LOADED, true);
        }
        for image in &self.layout.images {
            surface.set_attribute(image.element, "loading", "lazy");
        }

        for &card in &self.layout.project_cards {
            if self.project_cards.observe(card, ()) == Observed::Primed {
                prime_card(card, surface);
            }
        }
        for &card in &self.layout.skill_cards {
            if self.skill_cards.observe(card, ()) == Observed::Primed {
                prime_card(card, surface);
            }
        }
        for &section in &self.layout.reveal_sections {
            if self.sections.observe(section, ()) == Observed::Primed {
                surface.set_style(section, "opacity", "0");
            }
        }
        for bar in &self.layout.progress_bars {
            if self
                .progress_bars
                .observe(bar.element, bar.authored_width.clone())
                == Observed::Primed
            {
                surface.set_style(bar.element, "width", "0%");
            }
        }
        if let Some(counter) = &self.layout.counter {
            match parse_seed(&counter.seed_text) {
                Some(target) => {
                    self.counter_group.observe(counter.element, target);
                }
                None => {
                    crate::debug!(text = %counter.seed_text, "counter seed is not numeric; skipping");
                }
            }
        }

        if self.typing.is_none()
            && self.layout.typing.is_some()
            && let Some(effect) = TypingEffect::from_config(&self.config.typing)
        {
            self.typing = Some(effect);
            self.timers
                .schedule_after(now, Duration::ZERO, Task::TypingStep);
        }

        self.metrics = metrics;
        self.reconciler.invalidate();
        self.reconciler.reconcile(metrics, surface);
        self.run_due(now, surface);
    }

    /// A scroll (or resize) notification.
    pub fn on_scroll(&mut self, now: Duration, metrics: ViewportMetrics, surface: &mut dyn Surface) {
        self.metrics = metrics;
        if let Some(m) = self.throttle.push(now, metrics) {
            self.reconciler.reconcile(m, surface);
        }
    }

    /// An animation frame: release throttled scroll state and run due tasks.
    pub fn on_frame(&mut self, now: Duration, surface: &mut dyn Surface) {
        if let Some(m) = self.throttle.poll(now) {
            self.reconciler.reconcile(m, surface);
        }
        self.run_due(now, surface);
    }

    /// A batch of intersection notifications for `group`.
    ///
    /// Returns the elements that were revealed; the host must stop observing
    /// them.
    pub fn on_intersections(
        &mut self,
        now: Duration,
        group: RevealGroupId,
        entries: &[IntersectionEntry],
        surface: &mut dyn Surface,
    ) -> Vec<ElementId> {
        let mut released = Vec::new();
        match group {
            RevealGroupId::ProjectCards | RevealGroupId::SkillCards | RevealGroupId::Sections => {
                let reveals = match group {
                    RevealGroupId::ProjectCards => self.project_cards.on_batch(entries),
                    RevealGroupId::SkillCards => self.skill_cards.on_batch(entries),
                    _ => self.sections.on_batch(entries),
                };
                for r in reveals {
                    crate::debug!(element = r.element.get(), delay_ms = r.delay.as_millis() as u64, "reveal scheduled");
                    self.timers.schedule_after(
                        now,
                        r.delay,
                        Task::Reveal {
                            group,
                            element: r.element,
                        },
                    );
                    released.push(r.element);
                }
            }
            RevealGroupId::ProgressBars => {
                let delay = self.config.reveal.progress_delay();
                for r in self.progress_bars.on_batch(entries) {
                    self.timers.schedule_after(
                        now,
                        r.delay.saturating_add(delay),
                        Task::RestoreWidth {
                            element: r.element,
                            width: r.payload,
                        },
                    );
                    released.push(r.element);
                }
            }
            RevealGroupId::Counter => {
                for r in self.counter_group.on_batch(entries) {
                    self.start_counter(now, r.payload);
                    released.push(r.element);
                }
            }
        }
        self.run_due(now, surface);
        released
    }

    /// An in-page anchor was clicked. Returns `true` if the page handled the
    /// navigation (the host should prevent the default jump).
    pub fn on_anchor_click(&mut self, href: &str, surface: &mut dyn Surface) -> bool {
        let gap = self.config.effects.anchor_offset;
        let Some(top) = anchor_scroll_top(&self.reconciler.targets().sections, href, gap)
            .or_else(|| anchor_scroll_top(&self.layout.anchor_targets, href, gap))
        else {
            return false;
        };
        surface.scroll_to(top, true);
        if let Some(collapse) = self.layout.navbar_collapse {
            surface.toggle_class(collapse, CLASS_SHOW, false);
        }
        true
    }

    /// The back-to-top button was clicked.
    pub fn on_back_to_top(&mut self, surface: &mut dyn Surface) {
        surface.scroll_to(0, true);
    }

    /// A button was clicked at `click`; spawn a ripple inside it.
    pub fn on_button_click(
        &mut self,
        now: Duration,
        button: ElementId,
        rect: ClientRect,
        click: Point,
        surface: &mut dyn Surface,
    ) {
        let Some(ripple) = surface.spawn_child(button, CLASS_RIPPLE) else {
            return;
        };
        RippleGeometry::new(rect, click).apply(ripple, surface);
        self.timers.schedule_after(
            now,
            self.config.effects.ripple_lifetime(),
            Task::RemoveRipple(ripple),
        );
    }

    /// The pointer entered (`entering`) or left a card.
    pub fn on_card_hover(&mut self, card: ElementId, entering: bool, surface: &mut dyn Surface) {
        let known = self.project_cards.state(card).is_some() || self.skill_cards.state(card).is_some();
        if !known {
            return;
        }
        let narrow = self.metrics.is_narrow(self.config.scroll.mobile_breakpoint);
        if let Some(transform) =
            hover_transform(entering, narrow, self.config.effects.card_hover_lift_px)
        {
            surface.set_style(card, "transform", &transform);
        }
    }

    /// An image finished loading: fade it in on the next frame.
    pub fn on_image_load(&mut self, now: Duration, image: ElementId, surface: &mut dyn Surface) {
        if !self.layout.images.iter().any(|i| i.element == image) {
            return;
        }
        let secs = Duration::from_millis(self.config.effects.image_fade_ms).as_secs_f64();
        surface.set_style(image, "opacity", "0");
        surface.set_style(image, "transition", &format!("opacity {secs}s ease"));
        self.timers
            .schedule_after(now, Duration::ZERO, Task::FadeInImage(image));
    }

    /// An image failed to load: swap in its placeholder, once.
    pub fn on_image_error(&mut self, image: ElementId, surface: &mut dyn Surface) {
        let Some(target) = self.layout.images.iter().find(|i| i.element == image) else {
            return;
        };
        if !self.fallbacks.claim(image) {
            return;
        }
        let placeholder = match target.kind {
            ImageKind::Profile => &self.config.effects.profile_placeholder,
            ImageKind::Project => &self.config.effects.project_placeholder,
        };
        surface.set_attribute(image, "src", placeholder);
    }

    /// The contact form was submitted. Returns `true` if the page handled it
    /// (the host should prevent the default submission).
    pub fn on_form_submit(&mut self, now: Duration, surface: &mut dyn Surface) -> bool {
        let Some(form) = self.layout.contact_form else {
            return false;
        };
        form.submit(&self.config.effects.form_confirmation, surface);
        if let Some(previous) = self.form_timer.take() {
            self.timers.cancel(previous);
        }
        self.form_timer = Some(self.timers.schedule_after(
            now,
            self.config.effects.form_status_lifetime(),
            Task::ClearFormStatus,
        ));
        true
    }

    // -----------------------------------------------------------------------
    // Internals
    // -----------------------------------------------------------------------

    fn start_counter(&mut self, now: Duration, target: u32) {
        if self.counter.is_some() {
            return;
        }
        let cfg = &self.config.counter;
        let animation = CounterAnimation::new(target, cfg.steps, cfg.suffix.clone());
        let timer = self
            .timers
            .schedule_every(now, cfg.interval(), Task::CounterStep);
        self.counter = Some(RunningCounter {
            animation,
            timer: Some(timer),
        });
    }

    fn run_due(&mut self, now: Duration, surface: &mut dyn Surface) {
        for (_, task) in self.timers.drain_due(now) {
            self.run_task(now, task, surface);
        }
    }

    fn run_task(&mut self, now: Duration, task: Task, surface: &mut dyn Surface) {
        match task {
            Task::Reveal { group, element } => {
                if group.is_card() {
                    surface.set_style(element, "opacity", "1");
                    surface.set_style(element, "transform", "translateY(0)");
                } else {
                    surface.toggle_class(element, CLASS_FADE_IN_UP, true);
                    surface.set_style(element, "opacity", "1");
                }
            }
            Task::RestoreWidth { element, width } => {
                surface.set_style(element, "width", &width);
            }
            Task::CounterStep => {
                let (Some(running), Some(el)) = (self.counter.as_mut(), &self.layout.counter)
                else {
                    return;
                };
                let frame = running.animation.advance();
                if let Some(text) = frame.text {
                    surface.set_text(el.element, &text);
                }
                if frame.finished
                    && let Some(timer) = running.timer.take()
                {
                    self.timers.cancel(timer);
                    crate::debug!(value = running.animation.target(), "counter finished");
                }
            }
            Task::RemoveRipple(ripple) => surface.remove(ripple),
            Task::FadeInImage(image) => surface.set_style(image, "opacity", "1"),
            Task::TypingStep => {
                let (Some(effect), Some(el)) = (self.typing.as_mut(), self.layout.typing) else {
                    return;
                };
                let frame = effect.step();
                surface.set_text(el, &frame.text);
                self.timers.schedule_after(now, frame.next, Task::TypingStep);
            }
            Task::ClearFormStatus => {
                self.form_timer = None;
                if let Some(form) = self.layout.contact_form {
                    form.clear_status(surface);
                }
            }
        }
    }
}

fn prime_card(card: ElementId, surface: &mut dyn Surface) {
    surface.set_style(card, "opacity", "0");
    surface.set_style(card, "transform", "translateY(30px)");
    surface.set_style(card, "transition", "all .6s ease");
}

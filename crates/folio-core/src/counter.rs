#![forbid(unsafe_code)]

//! Experience counter: counts up from zero to a target read from the page.
//!
//! The counter is a reveal specialization. When its element first becomes
//! visible, the page starts a repeating timer; every firing calls
//! [`CounterAnimation::advance`]. Values are computed in integer arithmetic
//! from the step index, so slow or irregular timers can delay the animation
//! but never make it overshoot.
//!
//! # Invariants
//!
//! 1. Displayed values strictly increase; a step that would repeat the
//!    previous value writes nothing.
//! 2. No displayed value exceeds the target.
//! 3. The final step shows exactly `target` + suffix and reports
//!    [`CounterFrame::finished`] exactly once; later calls are inert.
//!
//! # Failure Modes
//!
//! - Seed text without leading digits: [`parse_seed`] returns `None` and the
//!   page never starts a timer for that element.

/// Parse the counter target from the element's authored text.
///
/// Accepts leading whitespace, then reads decimal digits up to the first
/// non-digit (`"5+"` → 5, `" 12 years"` → 12). Returns `None` when there are
/// no digits or the value does not fit in a `u32`.
#[must_use]
pub fn parse_seed(text: &str) -> Option<u32> {
    let trimmed = text.trim_start();
    let end = trimmed
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(trimmed.len());
    if end == 0 {
        return None;
    }
    trimmed[..end].parse().ok()
}

/// Output of one counter step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CounterFrame {
    /// New text to display, if the value changed.
    pub text: Option<String>,
    /// The animation just completed; the caller must stop its timer.
    pub finished: bool,
}

/// Step-driven count-up animation.
#[derive(Debug, Clone)]
pub struct CounterAnimation {
    target: u32,
    steps: u32,
    step: u32,
    shown: Option<u64>,
    suffix: String,
}

impl CounterAnimation {
    /// Count to `target` in `steps` increments. Zero steps is treated as one.
    #[must_use]
    pub fn new(target: u32, steps: u32, suffix: impl Into<String>) -> Self {
        Self {
            target,
            steps: steps.max(1),
            step: 0,
            shown: None,
            suffix: suffix.into(),
        }
    }

    #[must_use]
    pub fn target(&self) -> u32 {
        self.target
    }

    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.step >= self.steps
    }

    /// Value at step `k`: `floor(target * k / steps)`.
    fn value_at(&self, k: u32) -> u64 {
        u64::from(self.target) * u64::from(k) / u64::from(self.steps)
    }

    /// Advance one step.
    pub fn advance(&mut self) -> CounterFrame {
        if self.is_finished() {
            return CounterFrame {
                text: None,
                finished: false,
            };
        }
        self.step += 1;
        let value = self.value_at(self.step);
        let finished = self.is_finished();
        let text = (self.shown != Some(value)).then(|| {
            self.shown = Some(value);
            format!("{value}{}", self.suffix)
        });
        CounterFrame { text, finished }
    }
}

#![forbid(unsafe_code)]

//! Page configuration.
//!
//! Every threshold, duration and damping constant the page uses lives here.
//! Defaults match the most complete revision of the page script; hosts can
//! override any subset through JSON (missing fields keep their defaults).
//!
//! ```
//! use folio_core::config::PageConfig;
//!
//! let cfg = PageConfig::from_json(r#"{ "scroll": { "parallax_damping": 0.5 } }"#).unwrap();
//! assert_eq!(cfg.scroll.parallax_damping, 0.5);
//! assert_eq!(cfg.scroll.navbar_threshold, 50);
//! ```
//!
//! # Failure Modes
//!
//! - Malformed JSON: [`ConfigError::Parse`].
//! - A fraction outside `0.0..=1.0`, a non-positive fade distance, or zero
//!   counter steps: [`ConfigError::OutOfRange`].

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Configuration error type.
#[derive(Debug, Clone, PartialEq)]
pub enum ConfigError {
    /// The JSON document could not be parsed.
    Parse(String),
    /// A field holds a value outside its valid range.
    OutOfRange { field: &'static str, value: f64 },
}

impl core::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::Parse(msg) => write!(f, "invalid page config: {msg}"),
            Self::OutOfRange { field, value } => {
                write!(f, "page config field `{field}` out of range: {value}")
            }
        }
    }
}

impl std::error::Error for ConfigError {}

// ---------------------------------------------------------------------------
// Sections
// ---------------------------------------------------------------------------

/// Scroll-derived state thresholds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScrollConfig {
    /// Navbar gets `scrolled` when `scroll_y` is strictly above this.
    pub navbar_threshold: u32,
    /// A section becomes active once its top is within this many pixels.
    pub active_offset: u32,
    /// Back-to-top gets `show` when `scroll_y` is strictly above this.
    pub back_to_top_threshold: u32,
    /// Inline `display` toggle threshold for the back-to-top button.
    /// `None` leaves `display` untouched.
    pub back_to_top_display_threshold: Option<u32>,
    /// Viewports narrower than this skip parallax and hover lift.
    pub mobile_breakpoint: u32,
    /// Hero translation per scrolled pixel.
    pub parallax_damping: f64,
    /// Scroll distance over which the hero fades to transparent.
    pub parallax_fade_distance: f64,
    /// Minimum spacing between reconciliations. `None` reconciles every event.
    pub throttle_ms: Option<u64>,
}

impl Default for ScrollConfig {
    fn default() -> Self {
        Self {
            navbar_threshold: 50,
            active_offset: 200,
            back_to_top_threshold: 300,
            back_to_top_display_threshold: Some(100),
            mobile_breakpoint: 768,
            parallax_damping: 0.3,
            parallax_fade_distance: 600.0,
            throttle_ms: Some(16),
        }
    }
}

impl ScrollConfig {
    #[must_use]
    pub fn throttle(&self) -> Option<Duration> {
        self.throttle_ms.map(Duration::from_millis)
    }
}

/// Visibility threshold and stagger for one reveal group.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RevealGroupConfig {
    /// Fraction of the element that must be visible.
    pub threshold: f64,
    /// Delay between consecutive reveals within one batch.
    pub stagger_ms: u64,
}

impl RevealGroupConfig {
    pub const fn new(threshold: f64, stagger_ms: u64) -> Self {
        Self {
            threshold,
            stagger_ms,
        }
    }

    #[must_use]
    pub fn stagger(&self) -> Duration {
        Duration::from_millis(self.stagger_ms)
    }
}

/// Reveal-on-visibility groups.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RevealConfig {
    pub project_cards: RevealGroupConfig,
    pub skill_cards: RevealGroupConfig,
    pub sections: RevealGroupConfig,
    pub progress_bars: RevealGroupConfig,
    pub counter: RevealGroupConfig,
    /// Delay before a progress bar grows back to its authored width.
    pub progress_delay_ms: u64,
}

impl Default for RevealConfig {
    fn default() -> Self {
        Self {
            project_cards: RevealGroupConfig::new(0.1, 100),
            skill_cards: RevealGroupConfig::new(0.1, 100),
            sections: RevealGroupConfig::new(0.2, 100),
            progress_bars: RevealGroupConfig::new(0.5, 0),
            counter: RevealGroupConfig::new(0.5, 0),
            progress_delay_ms: 100,
        }
    }
}

impl RevealConfig {
    #[must_use]
    pub fn progress_delay(&self) -> Duration {
        Duration::from_millis(self.progress_delay_ms)
    }
}

/// Experience counter animation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CounterConfig {
    /// Total animation time.
    pub duration_ms: u64,
    /// Number of increments.
    pub steps: u32,
    /// Text appended to every displayed value.
    pub suffix: String,
}

impl Default for CounterConfig {
    fn default() -> Self {
        Self {
            duration_ms: 2000,
            steps: 50,
            suffix: "+".to_owned(),
        }
    }
}

impl CounterConfig {
    /// Interval between increments.
    #[must_use]
    pub fn interval(&self) -> Duration {
        Duration::from_millis(self.duration_ms) / self.steps.max(1)
    }
}

/// Peripheral effects.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EffectsConfig {
    /// Ripple lifetime.
    pub ripple_ms: u64,
    /// Gap left above a section when jumping to it from an anchor.
    pub anchor_offset: u32,
    /// Card lift on hover, in pixels.
    pub card_hover_lift_px: u32,
    /// Image fade-in duration.
    pub image_fade_ms: u64,
    /// Replacement for broken profile images.
    pub profile_placeholder: String,
    /// Replacement for broken project screenshots.
    pub project_placeholder: String,
    /// Text shown after the contact form is submitted.
    pub form_confirmation: String,
    /// How long the confirmation stays visible.
    pub form_status_ms: u64,
}

impl Default for EffectsConfig {
    fn default() -> Self {
        Self {
            ripple_ms: 600,
            anchor_offset: 80,
            card_hover_lift_px: 15,
            image_fade_ms: 500,
            profile_placeholder:
                "https://via.placeholder.com/300x300/4a90e2/ffffff?text=Your+Photo".to_owned(),
            project_placeholder: "https://via.placeholder.com/800x600/4a90e2/ffffff?text=Project"
                .to_owned(),
            form_confirmation: "Thank you for your message! I'll get back to you soon.".to_owned(),
            form_status_ms: 5000,
        }
    }
}

impl EffectsConfig {
    #[must_use]
    pub fn ripple_lifetime(&self) -> Duration {
        Duration::from_millis(self.ripple_ms)
    }

    #[must_use]
    pub fn form_status_lifetime(&self) -> Duration {
        Duration::from_millis(self.form_status_ms)
    }
}

/// Typewriter headline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TypingConfig {
    /// Phrases to cycle through. Empty disables the effect.
    pub phrases: Vec<String>,
    pub type_ms: u64,
    pub delete_ms: u64,
    /// Pause on a fully typed phrase.
    pub hold_ms: u64,
    /// Pause on an empty line before the next phrase.
    pub pause_ms: u64,
}

impl Default for TypingConfig {
    fn default() -> Self {
        Self {
            phrases: vec![
                "Web Developer".to_owned(),
                "Software Engineer".to_owned(),
                "Problem Solver".to_owned(),
            ],
            type_ms: 100,
            delete_ms: 50,
            hold_ms: 2000,
            pause_ms: 500,
        }
    }
}

// ---------------------------------------------------------------------------
// Root
// ---------------------------------------------------------------------------

/// Complete page configuration.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PageConfig {
    pub scroll: ScrollConfig,
    pub reveal: RevealConfig,
    pub counter: CounterConfig,
    pub effects: EffectsConfig,
    pub typing: TypingConfig,
}

impl PageConfig {
    /// Parse and validate a JSON document. Missing fields keep defaults.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let cfg: Self =
            serde_json::from_str(json).map_err(|e| ConfigError::Parse(e.to_string()))?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Check every ranged field.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let s = &self.scroll;
        fraction("scroll.parallax_damping", s.parallax_damping)?;
        if !(s.parallax_fade_distance.is_finite() && s.parallax_fade_distance > 0.0) {
            return Err(ConfigError::OutOfRange {
                field: "scroll.parallax_fade_distance",
                value: s.parallax_fade_distance,
            });
        }

        let r = &self.reveal;
        for (field, group) in [
            ("reveal.project_cards.threshold", r.project_cards),
            ("reveal.skill_cards.threshold", r.skill_cards),
            ("reveal.sections.threshold", r.sections),
            ("reveal.progress_bars.threshold", r.progress_bars),
            ("reveal.counter.threshold", r.counter),
        ] {
            fraction(field, group.threshold)?;
        }

        if self.counter.steps == 0 {
            return Err(ConfigError::OutOfRange {
                field: "counter.steps",
                value: 0.0,
            });
        }
        Ok(())
    }
}

fn fraction(field: &'static str, value: f64) -> Result<(), ConfigError> {
    if (0.0..=1.0).contains(&value) {
        Ok(())
    } else {
        Err(ConfigError::OutOfRange { field, value })
    }
}

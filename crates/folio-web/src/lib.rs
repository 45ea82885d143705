#![forbid(unsafe_code)]

//! WASM frontend for folio.
//!
//! The browser side of the page engine: it queries the document once, hands
//! `folio-core` a [`PageLayout`](folio_core::PageLayout), and forwards
//! scroll, frame, intersection, click, hover, image and form events. All
//! behaviour lives in the core; this crate only translates.
//!
//! Hosts load the module and call `mount()` from the window `load` event.
//! Configuration is optional JSON, passed to `mount` or read from the
//! `data-folio-config` attribute on `<body>`.

use folio_core::PageConfig;

pub mod handles;

#[cfg(target_arch = "wasm32")]
mod wasm;

#[cfg(target_arch = "wasm32")]
pub use wasm::mount;

/// Selectors the frontend queries at mount time.
pub mod selectors {
    pub const NAVBAR: &str = "#navbar";
    pub const NAVBAR_COLLAPSE: &str = ".navbar-collapse";
    pub const NAV_LINKS: &str = ".nav-link";
    pub const SECTIONS: &str = "section[id]";
    pub const BACK_TO_TOP: &str = "#backToTop";
    pub const HERO: &str = ".hero-section";
    pub const PROJECT_CARDS: &str = ".project-card";
    pub const SKILL_CARDS: &str = ".skill-card";
    pub const REVEAL_SECTIONS: &str = "section[id]:not(.hero-section)";
    pub const PROGRESS_BARS: &str = ".progress-bar";
    pub const COUNTER: &str = ".experience-badge h3";
    pub const PROJECT_IMAGES: &str = ".project-image img";
    pub const PROFILE_IMAGES: &str = "img[src*=\"images/\"]";
    pub const ANCHORS: &str = "a[href^=\"#\"]";
    pub const BUTTONS: &str = ".btn";
    pub const TYPING: &str = ".typing-text";
    pub const CONTACT_FORM: &str = "#contactForm";
    pub const FORM_STATUS: &str = "#formStatus";
}

/// Attribute on `<body>` that may carry the page configuration as JSON.
pub const CONFIG_ATTRIBUTE: &str = "data-folio-config";

/// Resolve the page configuration from optional JSON.
///
/// Missing or blank input yields the defaults. Invalid input is logged and
/// also yields the defaults.
#[must_use]
pub fn page_config(raw: Option<&str>) -> PageConfig {
    let Some(raw) = raw.map(str::trim).filter(|r| !r.is_empty()) else {
        return PageConfig::default();
    };
    match PageConfig::from_json(raw) {
        Ok(config) => config,
        Err(err) => {
            folio_core::warn!(error = %err, "rejecting page config; using defaults");
            PageConfig::default()
        }
    }
}

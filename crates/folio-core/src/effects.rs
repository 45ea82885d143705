#![forbid(unsafe_code)]

//! Small page effects that share the core's surface and timers.
//!
//! None of these feed the scroll or reveal state; they are the page's
//! cosmetic glue: click ripples, image fade-in with a placeholder fallback,
//! anchor jump targets, card hover lift and the local-only contact form.

use std::collections::HashSet;

use crate::geometry::{ClientRect, Point, Section, css_number};
use crate::surface::{ElementId, Surface};

pub const CLASS_RIPPLE: &str = "ripple";
pub const CLASS_LOADED: &str = "loaded";

// ---------------------------------------------------------------------------
// Ripple
// ---------------------------------------------------------------------------

/// Size and position of a click ripple, relative to its button.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RippleGeometry {
    pub size: f64,
    pub left: f64,
    pub top: f64,
}

impl RippleGeometry {
    /// A square ripple as large as the button's longest side, centred on
    /// the click point.
    #[must_use]
    pub fn new(button: ClientRect, click: Point) -> Self {
        let size = button.longest_side();
        Self {
            size,
            left: click.x - button.left - size / 2.0,
            top: click.y - button.top - size / 2.0,
        }
    }

    /// Write the geometry onto a freshly spawned ripple element.
    pub fn apply(&self, ripple: ElementId, surface: &mut dyn Surface) {
        let size = format!("{}px", css_number(self.size));
        surface.set_style(ripple, "width", &size);
        surface.set_style(ripple, "height", &size);
        surface.set_style(ripple, "left", &format!("{}px", css_number(self.left)));
        surface.set_style(ripple, "top", &format!("{}px", css_number(self.top)));
    }
}

// ---------------------------------------------------------------------------
// Images
// ---------------------------------------------------------------------------

/// Which placeholder a broken image falls back to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageKind {
    Profile,
    Project,
}

/// An image registered for lazy loading and fade-in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ImageTarget {
    pub element: ElementId,
    pub kind: ImageKind,
}

/// Tracks which images already fell back, so a broken placeholder cannot
/// loop.
#[derive(Debug, Clone, Default)]
pub struct ImageFallbacks {
    replaced: HashSet<ElementId>,
}

impl ImageFallbacks {
    /// Returns `true` the first time `image` fails, `false` afterwards.
    pub fn claim(&mut self, image: ElementId) -> bool {
        self.replaced.insert(image)
    }
}

// ---------------------------------------------------------------------------
// Anchors
// ---------------------------------------------------------------------------

/// Scroll position for an in-page anchor `href` (`#id`).
///
/// Leaves `gap` pixels above the section, clamped at the document top.
/// Returns `None` for non-anchor hrefs and unknown ids.
#[must_use]
pub fn anchor_scroll_top(sections: &[Section], href: &str, gap: u32) -> Option<u32> {
    let id = href.strip_prefix('#').filter(|id| !id.is_empty())?;
    let section = sections.iter().find(|s| s.id == id)?;
    let top = section.offset.saturating_sub(i64::from(gap)).max(0);
    Some(u32::try_from(top).unwrap_or(u32::MAX))
}

// ---------------------------------------------------------------------------
// Hover
// ---------------------------------------------------------------------------

/// Transform for a card being hovered (`entering`) or left.
///
/// Returns `None` when nothing should be written: entering on a narrow
/// viewport keeps the card still.
#[must_use]
pub fn hover_transform(entering: bool, narrow: bool, lift_px: u32) -> Option<String> {
    match (entering, narrow) {
        (true, true) => None,
        (true, false) => Some(format!("translateY(-{lift_px}px)")),
        (false, _) => Some("translateY(0)".to_owned()),
    }
}

// ---------------------------------------------------------------------------
// Contact form
// ---------------------------------------------------------------------------

/// The contact form and the element that shows its confirmation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ContactForm {
    pub form: ElementId,
    pub status: Option<ElementId>,
}

impl ContactForm {
    /// Handle a submission locally: confirm and reset. Nothing is sent.
    pub fn submit(&self, confirmation: &str, surface: &mut dyn Surface) {
        if let Some(status) = self.status {
            surface.set_text(status, confirmation);
            surface.toggle_class(status, "show", true);
        }
        surface.reset_form(self.form);
    }

    /// Hide the confirmation again.
    pub fn clear_status(&self, surface: &mut dyn Surface) {
        if let Some(status) = self.status {
            surface.set_text(status, "");
            surface.toggle_class(status, "show", false);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::surface::{Mutation, RecordingSurface};

    #[test]
    fn ripple_is_centred_on_click() {
        let g = RippleGeometry::new(
            ClientRect::new(100.0, 50.0, 120.0, 40.0),
            Point::new(130.0, 70.0),
        );
        assert_eq!(
            g,
            RippleGeometry {
                size: 120.0,
                left: -30.0,
                top: -40.0
            }
        );
        let mut s = RecordingSurface::new();
        g.apply(ElementId(5), &mut s);
        assert_eq!(s.last_style(ElementId(5), "width"), Some("120px"));
        assert_eq!(s.last_style(ElementId(5), "left"), Some("-30px"));
        assert_eq!(s.last_style(ElementId(5), "top"), Some("-40px"));
    }

    #[test]
    fn image_fallback_claimed_once() {
        let mut f = ImageFallbacks::default();
        assert!(f.claim(ElementId(1)));
        assert!(!f.claim(ElementId(1)));
        assert!(f.claim(ElementId(2)));
    }

    #[test]
    fn anchor_targets() {
        let sections = vec![Section::new("home", 0, 500), Section::new("about", 900, 500)];
        assert_eq!(anchor_scroll_top(&sections, "#about", 80), Some(820));
        assert_eq!(anchor_scroll_top(&sections, "#home", 80), Some(0));
        assert_eq!(anchor_scroll_top(&sections, "#missing", 80), None);
        assert_eq!(anchor_scroll_top(&sections, "#", 80), None);
        assert_eq!(anchor_scroll_top(&sections, "about", 80), None);
    }

    #[test]
    fn hover_lift_desktop_only() {
        assert_eq!(
            hover_transform(true, false, 15).as_deref(),
            Some("translateY(-15px)")
        );
        assert_eq!(hover_transform(true, true, 15), None);
        assert_eq!(
            hover_transform(false, true, 15).as_deref(),
            Some("translateY(0)")
        );
    }

    #[test]
    fn form_submit_confirms_and_resets() {
        let form = ContactForm {
            form: ElementId(1),
            status: Some(ElementId(2)),
        };
        let mut s = RecordingSurface::new();
        form.submit("thanks", &mut s);
        assert_eq!(s.texts(ElementId(2)), vec!["thanks".to_owned()]);
        assert!(s.mutations().contains(&Mutation::ResetForm { form: ElementId(1) }));
        form.clear_status(&mut s);
        assert!(!s.has_class(ElementId(2), "show"));
    }
}

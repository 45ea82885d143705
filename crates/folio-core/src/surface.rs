#![forbid(unsafe_code)]

//! The write boundary between the page engine and its host.
//!
//! The engine never touches the DOM. Every presentation change is expressed
//! as a call on a [`Surface`]; the web frontend maps those calls onto real
//! elements while tests use [`RecordingSurface`] to capture them as
//! [`Mutation`] values.
//!
//! # Failure Modes
//!
//! - Unknown [`ElementId`]: implementations skip the write silently. Absent
//!   optional UI pieces are expected, never an error.

/// Opaque handle for an element the host has registered with the engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ElementId(pub u32);

impl ElementId {
    /// Raw handle value.
    #[inline]
    #[must_use]
    pub const fn get(self) -> u32 {
        self.0
    }
}

/// Presentation writes issued by the engine.
pub trait Surface {
    /// Add (`on == true`) or remove a CSS class.
    fn toggle_class(&mut self, element: ElementId, class: &'static str, on: bool);

    /// Set an inline style property. An empty `value` clears the property.
    fn set_style(&mut self, element: ElementId, property: &'static str, value: &str);

    /// Replace the text content.
    fn set_text(&mut self, element: ElementId, text: &str);

    /// Set a DOM attribute.
    fn set_attribute(&mut self, element: ElementId, name: &'static str, value: &str);

    /// Append a new child element carrying `class` to `parent`.
    ///
    /// Returns `None` if the parent is unknown or the host cannot create it.
    fn spawn_child(&mut self, parent: ElementId, class: &'static str) -> Option<ElementId>;

    /// Detach an element from the document and forget its handle.
    fn remove(&mut self, element: ElementId);

    /// Reset a form's fields to their initial values.
    fn reset_form(&mut self, form: ElementId);

    /// Scroll the window to `top` pixels.
    fn scroll_to(&mut self, top: u32, smooth: bool);
}

/// A single recorded presentation write.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Mutation {
    ToggleClass {
        element: ElementId,
        class: &'static str,
        on: bool,
    },
    SetStyle {
        element: ElementId,
        property: &'static str,
        value: String,
    },
    SetText {
        element: ElementId,
        text: String,
    },
    SetAttribute {
        element: ElementId,
        name: &'static str,
        value: String,
    },
    SpawnChild {
        parent: ElementId,
        child: ElementId,
        class: &'static str,
    },
    Remove {
        element: ElementId,
    },
    ResetForm {
        form: ElementId,
    },
    ScrollTo {
        top: u32,
        smooth: bool,
    },
}

impl Mutation {
    /// The element this mutation targets, if any.
    #[must_use]
    pub fn element(&self) -> Option<ElementId> {
        match self {
            Self::ToggleClass { element, .. }
            | Self::SetStyle { element, .. }
            | Self::SetText { element, .. }
            | Self::SetAttribute { element, .. }
            | Self::Remove { element } => Some(*element),
            Self::SpawnChild { parent, .. } => Some(*parent),
            Self::ResetForm { form } => Some(*form),
            Self::ScrollTo { .. } => None,
        }
    }
}

/// In-memory [`Surface`] that records every write.
///
/// Spawned children receive handles counting up from `first_spawned_id`.
#[derive(Debug, Clone)]
pub struct RecordingSurface {
    mutations: Vec<Mutation>,
    next_spawned: u32,
}

impl Default for RecordingSurface {
    fn default() -> Self {
        Self::new()
    }
}

impl RecordingSurface {
    /// Handle assigned to the first spawned child.
    pub const FIRST_SPAWNED_ID: u32 = 10_000;

    #[must_use]
    pub fn new() -> Self {
        Self {
            mutations: Vec::new(),
            next_spawned: Self::FIRST_SPAWNED_ID,
        }
    }

    /// All mutations recorded so far, oldest first.
    #[must_use]
    pub fn mutations(&self) -> &[Mutation] {
        &self.mutations
    }

    /// Take the recorded mutations, leaving the log empty.
    pub fn take(&mut self) -> Vec<Mutation> {
        std::mem::take(&mut self.mutations)
    }

    /// Mutations that target `element`.
    pub fn for_element(&self, element: ElementId) -> impl Iterator<Item = &Mutation> + '_ {
        self.mutations
            .iter()
            .filter(move |m| m.element() == Some(element))
    }

    /// Latest value written to `property` on `element`, if any.
    #[must_use]
    pub fn last_style(&self, element: ElementId, property: &str) -> Option<&str> {
        self.mutations.iter().rev().find_map(|m| match m {
            Mutation::SetStyle {
                element: e,
                property: p,
                value,
            } if *e == element && *p == property => Some(value.as_str()),
            _ => None,
        })
    }

    /// Whether the latest toggle of `class` on `element` turned it on.
    #[must_use]
    pub fn has_class(&self, element: ElementId, class: &str) -> bool {
        self.mutations
            .iter()
            .rev()
            .find_map(|m| match m {
                Mutation::ToggleClass {
                    element: e,
                    class: c,
                    on,
                } if *e == element && *c == class => Some(*on),
                _ => None,
            })
            .unwrap_or(false)
    }

    /// Every text written to `element`, oldest first.
    #[must_use]
    pub fn texts(&self, element: ElementId) -> Vec<String> {
        self.mutations
            .iter()
            .filter_map(|m| match m {
                Mutation::SetText { element: e, text } if *e == element => Some(text.clone()),
                _ => None,
            })
            .collect()
    }
}

impl Surface for RecordingSurface {
    fn toggle_class(&mut self, element: ElementId, class: &'static str, on: bool) {
        self.mutations
            .push(Mutation::ToggleClass { element, class, on });
    }

    fn set_style(&mut self, element: ElementId, property: &'static str, value: &str) {
        self.mutations.push(Mutation::SetStyle {
            element,
            property,
            value: value.to_owned(),
        });
    }

    fn set_text(&mut self, element: ElementId, text: &str) {
        self.mutations.push(Mutation::SetText {
            element,
            text: text.to_owned(),
        });
    }

    fn set_attribute(&mut self, element: ElementId, name: &'static str, value: &str) {
        self.mutations.push(Mutation::SetAttribute {
            element,
            name,
            value: value.to_owned(),
        });
    }

    fn spawn_child(&mut self, parent: ElementId, class: &'static str) -> Option<ElementId> {
        let child = ElementId(self.next_spawned);
        self.next_spawned = self.next_spawned.saturating_add(1);
        self.mutations.push(Mutation::SpawnChild {
            parent,
            child,
            class,
        });
        Some(child)
    }

    fn remove(&mut self, element: ElementId) {
        self.mutations.push(Mutation::Remove { element });
    }

    fn reset_form(&mut self, form: ElementId) {
        self.mutations.push(Mutation::ResetForm { form });
    }

    fn scroll_to(&mut self, top: u32, smooth: bool) {
        self.mutations.push(Mutation::ScrollTo { top, smooth });
    }
}

#![forbid(unsafe_code)]

//! Browser host: DOM-backed [`Surface`] plus listener wiring.
//!
//! # Invariants
//!
//! 1. Every element the engine can address carries a `data-folio-id`
//!    attribute whose value is its [`ElementId`].
//! 2. Listeners are attached once per document. Mounting again re-runs
//!    [`Page::ready`] on the existing page, which is idempotent.
//!
//! # Failure Modes
//!
//! - A listener firing while another holds the page (re-entrant DOM events)
//!   is dropped rather than panicking on the `RefCell`.

use std::cell::RefCell;
use std::collections::HashSet;
use std::rc::Rc;
use std::time::Duration;

use folio_core::effects::{ContactForm, ImageKind, ImageTarget};
use folio_core::page::{CounterTarget, ProgressBarTarget};
use folio_core::reveal::IntersectionEntry;
use folio_core::scroll_state::NavLink;
use folio_core::{
    ClientRect, ElementId, Page, PageLayout, Point, RevealGroupId, Section, Surface,
    ViewportMetrics,
};
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use web_sys::{
    Document, Element, Event, EventTarget, HtmlElement, HtmlFormElement, IntersectionObserver,
    IntersectionObserverEntry, IntersectionObserverInit, MouseEvent, ScrollBehavior,
    ScrollToOptions, Window,
};
use web_time::Instant;

use crate::handles::HandleTable;
use crate::{CONFIG_ATTRIBUTE, page_config, selectors};

const ID_ATTRIBUTE: &str = "data-folio-id";

// ---------------------------------------------------------------------------
// DomSurface
// ---------------------------------------------------------------------------

/// [`Surface`] over live DOM elements.
struct DomSurface {
    window: Window,
    document: Document,
    elements: HandleTable<HtmlElement>,
}

impl DomSurface {
    fn new(window: Window, document: Document) -> Self {
        Self {
            window,
            document,
            elements: HandleTable::new(),
        }
    }

    /// Handle for `el`, registering it on first sight.
    fn register(&mut self, el: HtmlElement) -> ElementId {
        if let Some(id) = self.lookup(&el) {
            return id;
        }
        let id = self.elements.insert(el.clone());
        let _ = el.set_attribute(ID_ATTRIBUTE, &id.get().to_string());
        id
    }

    /// Handle of an already registered element.
    fn lookup(&self, el: &Element) -> Option<ElementId> {
        let id = ElementId(el.get_attribute(ID_ATTRIBUTE)?.parse().ok()?);
        let known = self.get(id)?;
        (AsRef::<Element>::as_ref(known) == el).then_some(id)
    }

    fn get(&self, id: ElementId) -> Option<&HtmlElement> {
        self.elements.get(id)
    }

    fn metrics(&self) -> ViewportMetrics {
        let w = &self.window;
        ViewportMetrics::from_host(
            w.scroll_y().unwrap_or(0.0),
            w.inner_width().ok().and_then(|v| v.as_f64()).unwrap_or(0.0),
            w.inner_height().ok().and_then(|v| v.as_f64()).unwrap_or(0.0),
        )
    }
}

impl Surface for DomSurface {
    fn toggle_class(&mut self, element: ElementId, class: &'static str, on: bool) {
        if let Some(el) = self.get(element) {
            let _ = el.class_list().toggle_with_force(class, on);
        }
    }

    fn set_style(&mut self, element: ElementId, property: &'static str, value: &str) {
        let Some(el) = self.get(element) else {
            return;
        };
        let style = el.style();
        if value.is_empty() {
            let _ = style.remove_property(property);
        } else {
            let _ = style.set_property(property, value);
        }
    }

    fn set_text(&mut self, element: ElementId, text: &str) {
        if let Some(el) = self.get(element) {
            el.set_text_content(Some(text));
        }
    }

    fn set_attribute(&mut self, element: ElementId, name: &'static str, value: &str) {
        if let Some(el) = self.get(element) {
            let _ = el.set_attribute(name, value);
        }
    }

    fn spawn_child(&mut self, parent: ElementId, class: &'static str) -> Option<ElementId> {
        let parent = self.get(parent)?.clone();
        let child: HtmlElement = self.document.create_element("span").ok()?.dyn_into().ok()?;
        child.set_class_name(class);
        parent.append_child(&child).ok()?;
        Some(self.register(child))
    }

    fn remove(&mut self, element: ElementId) {
        if let Some(el) = self.elements.remove(element) {
            el.remove();
        }
    }

    fn reset_form(&mut self, form: ElementId) {
        if let Some(form) = self.get(form).and_then(|el| el.dyn_ref::<HtmlFormElement>()) {
            form.reset();
        }
    }

    fn scroll_to(&mut self, top: u32, smooth: bool) {
        let options = ScrollToOptions::new();
        options.set_top(f64::from(top));
        options.set_behavior(if smooth {
            ScrollBehavior::Smooth
        } else {
            ScrollBehavior::Auto
        });
        self.window.scroll_to_with_scroll_to_options(&options);
    }
}

// ---------------------------------------------------------------------------
// Host
// ---------------------------------------------------------------------------

struct Host {
    page: Page,
    surface: DomSurface,
    epoch: Instant,
}

impl Host {
    fn now(&self) -> Duration {
        self.epoch.elapsed()
    }

    fn ready(&mut self) {
        let now = self.now();
        let metrics = self.surface.metrics();
        self.page.ready(now, metrics, &mut self.surface);
    }
}

type Shared = Rc<RefCell<Host>>;

thread_local! {
    static MOUNTED: RefCell<Option<Shared>> = const { RefCell::new(None) };
}

/// Run `f` with the host unless it is already borrowed.
fn with_host(host: &Shared, f: impl FnOnce(&mut Host)) {
    if let Ok(mut h) = host.try_borrow_mut() {
        f(&mut h);
    }
}

/// Query the document, wire listeners and run page-ready.
///
/// `config` is optional JSON; when absent the `data-folio-config` attribute
/// on `<body>` is used. Calling `mount` again re-runs page-ready only.
#[wasm_bindgen]
pub fn mount(config: Option<String>) -> Result<(), JsValue> {
    if let Some(host) = MOUNTED.with(|m| m.borrow().clone()) {
        with_host(&host, Host::ready);
        return Ok(());
    }

    let window = web_sys::window().ok_or_else(|| JsValue::from_str("no window"))?;
    let document = window
        .document()
        .ok_or_else(|| JsValue::from_str("no document"))?;
    let config = config.or_else(|| document.body()?.get_attribute(CONFIG_ATTRIBUTE));

    let mut surface = DomSurface::new(window.clone(), document.clone());
    let layout = query_layout(&document, &mut surface);
    let page = Page::new(page_config(config.as_deref()), layout);
    let host: Shared = Rc::new(RefCell::new(Host {
        page,
        surface,
        epoch: Instant::now(),
    }));

    with_host(&host, Host::ready);
    wire_scroll(&host, &window);
    wire_clicks(&host, &document);
    wire_cards(&host);
    wire_images(&host);
    wire_form(&host, &document);
    for group in RevealGroupId::ALL {
        observe_group(&host, group)?;
    }
    start_frames(&host, &window);

    MOUNTED.with(|m| *m.borrow_mut() = Some(host));
    Ok(())
}

// ---------------------------------------------------------------------------
// Layout
// ---------------------------------------------------------------------------

fn query_all(document: &Document, selector: &str) -> Vec<HtmlElement> {
    let Ok(list) = document.query_selector_all(selector) else {
        return Vec::new();
    };
    (0..list.length())
        .filter_map(|i| list.item(i))
        .filter_map(|node| node.dyn_into::<HtmlElement>().ok())
        .collect()
}

fn query_one(document: &Document, selector: &str) -> Option<HtmlElement> {
    document.query_selector(selector).ok()??.dyn_into().ok()
}

fn query_layout(document: &Document, surface: &mut DomSurface) -> PageLayout {
    let mut layout = PageLayout {
        body: document.body().map(|b| surface.register(b)),
        ..PageLayout::default()
    };
    let mut one = |selector: &str| query_one(document, selector).map(|el| surface.register(el));
    layout.navbar = one(selectors::NAVBAR);
    layout.navbar_collapse = one(selectors::NAVBAR_COLLAPSE);
    layout.back_to_top = one(selectors::BACK_TO_TOP);
    layout.hero = one(selectors::HERO);
    layout.typing = one(selectors::TYPING);

    layout.sections = query_all(document, selectors::SECTIONS)
        .iter()
        .map(|el| Section::new(el.id(), i64::from(el.offset_top()), i64::from(el.offset_height())))
        .collect();
    layout.anchor_targets = anchor_targets(document, &layout.sections);
    layout.nav_links = query_all(document, selectors::NAV_LINKS)
        .into_iter()
        .map(|el| {
            let href = el.get_attribute("href").unwrap_or_default();
            NavLink::new(surface.register(el), href)
        })
        .collect();

    let mut register_all = |selector: &str| -> Vec<ElementId> {
        query_all(document, selector)
            .into_iter()
            .map(|el| surface.register(el))
            .collect()
    };
    layout.project_cards = register_all(selectors::PROJECT_CARDS);
    layout.skill_cards = register_all(selectors::SKILL_CARDS);
    layout.reveal_sections = register_all(selectors::REVEAL_SECTIONS);

    layout.progress_bars = query_all(document, selectors::PROGRESS_BARS)
        .into_iter()
        .map(|el| {
            let authored_width = el.style().get_property_value("width").unwrap_or_default();
            ProgressBarTarget {
                element: surface.register(el),
                authored_width,
            }
        })
        .collect();

    layout.counter = query_one(document, selectors::COUNTER).map(|el| {
        let seed_text = el.text_content().unwrap_or_default();
        CounterTarget {
            element: surface.register(el),
            seed_text,
        }
    });

    // Project images take their own placeholder even when the profile
    // selector also matches them.
    let mut seen = HashSet::new();
    for (selector, kind) in [
        (selectors::PROJECT_IMAGES, ImageKind::Project),
        (selectors::PROFILE_IMAGES, ImageKind::Profile),
    ] {
        for el in query_all(document, selector) {
            let element = surface.register(el);
            if seen.insert(element) {
                layout.images.push(ImageTarget { element, kind });
            }
        }
    }

    layout.contact_form = query_one(document, selectors::CONTACT_FORM).map(|form| ContactForm {
        form: surface.register(form),
        status: query_one(document, selectors::FORM_STATUS).map(|el| surface.register(el)),
    });

    layout
}

/// Elements named by in-page links that are not already sections, with
/// their document offsets.
fn anchor_targets(document: &Document, sections: &[Section]) -> Vec<Section> {
    let scroll_y = web_sys::window()
        .and_then(|w| w.scroll_y().ok())
        .unwrap_or(0.0);
    let mut seen: HashSet<String> = sections.iter().map(|s| s.id.clone()).collect();
    let mut targets = Vec::new();
    for anchor in query_all(document, selectors::ANCHORS) {
        let Some(href) = anchor.get_attribute("href") else {
            continue;
        };
        let id = href.trim_start_matches('#');
        if id.is_empty() || !seen.insert(id.to_owned()) {
            continue;
        }
        if let Some(el) = document.get_element_by_id(id) {
            let rect = el.get_bounding_client_rect();
            targets.push(Section::new(
                id,
                (rect.top() + scroll_y).round() as i64,
                rect.height().round() as i64,
            ));
        }
    }
    targets
}

// ---------------------------------------------------------------------------
// Listeners
// ---------------------------------------------------------------------------

/// Attach `f` to `event` on `target` for the lifetime of the page.
fn listen(target: &EventTarget, event: &str, f: impl FnMut(Event) + 'static) {
    let closure = Closure::<dyn FnMut(Event)>::new(f);
    let _ = target.add_event_listener_with_callback(event, closure.as_ref().unchecked_ref());
    closure.forget();
}

/// Handle of the element the listener was attached to.
fn current_target(host: &Host, event: &Event) -> Option<ElementId> {
    let el = event.current_target()?.dyn_into::<Element>().ok()?;
    host.surface.lookup(&el)
}

fn wire_scroll(host: &Shared, window: &Window) {
    for name in ["scroll", "resize"] {
        let shared = Rc::clone(host);
        listen(window, name, move |_| {
            with_host(&shared, |h| {
                let now = h.now();
                let metrics = h.surface.metrics();
                h.page.on_scroll(now, metrics, &mut h.surface);
            });
        });
    }
}

fn wire_clicks(host: &Shared, document: &Document) {
    for anchor in query_all(document, selectors::ANCHORS) {
        let shared = Rc::clone(host);
        let href = anchor.get_attribute("href").unwrap_or_default();
        listen(&anchor, "click", move |event| {
            with_host(&shared, |h| {
                if h.page.on_anchor_click(&href, &mut h.surface) {
                    event.prevent_default();
                }
            });
        });
    }

    let back_to_top = host.borrow().page.layout().back_to_top;
    if let Some(el) = back_to_top.and_then(|id| host.borrow().surface.get(id).cloned()) {
        let shared = Rc::clone(host);
        listen(&el, "click", move |_| {
            with_host(&shared, |h| h.page.on_back_to_top(&mut h.surface));
        });
    }

    for button in query_all(document, selectors::BUTTONS) {
        let id = host.borrow_mut().surface.register(button.clone());
        let shared = Rc::clone(host);
        let target = button.clone();
        listen(&button, "click", move |event| {
            let Some(mouse) = event.dyn_ref::<MouseEvent>() else {
                return;
            };
            let r = target.get_bounding_client_rect();
            let rect = ClientRect::new(r.left(), r.top(), r.width(), r.height());
            let click = Point::new(f64::from(mouse.client_x()), f64::from(mouse.client_y()));
            with_host(&shared, |h| {
                let now = h.now();
                h.page.on_button_click(now, id, rect, click, &mut h.surface);
            });
        });
    }
}

fn wire_cards(host: &Shared) {
    let cards: Vec<HtmlElement> = {
        let h = host.borrow();
        let layout = h.page.layout();
        layout
            .project_cards
            .iter()
            .chain(&layout.skill_cards)
            .filter_map(|&id| h.surface.get(id).cloned())
            .collect()
    };
    for card in cards {
        for (name, entering) in [("mouseenter", true), ("mouseleave", false)] {
            let shared = Rc::clone(host);
            listen(&card, name, move |event| {
                with_host(&shared, |h| {
                    if let Some(id) = current_target(h, &event) {
                        h.page.on_card_hover(id, entering, &mut h.surface);
                    }
                });
            });
        }
    }
}

fn wire_images(host: &Shared) {
    let images: Vec<HtmlElement> = {
        let h = host.borrow();
        h.page
            .layout()
            .images
            .iter()
            .filter_map(|img| h.surface.get(img.element).cloned())
            .collect()
    };
    for img in images {
        let shared = Rc::clone(host);
        listen(&img, "load", move |event| {
            with_host(&shared, |h| {
                if let Some(id) = current_target(h, &event) {
                    let now = h.now();
                    h.page.on_image_load(now, id, &mut h.surface);
                }
            });
        });
        let shared = Rc::clone(host);
        listen(&img, "error", move |event| {
            with_host(&shared, |h| {
                if let Some(id) = current_target(h, &event) {
                    h.page.on_image_error(id, &mut h.surface);
                }
            });
        });
    }
}

fn wire_form(host: &Shared, document: &Document) {
    let Some(form) = query_one(document, selectors::CONTACT_FORM) else {
        return;
    };
    let shared = Rc::clone(host);
    listen(&form, "submit", move |event| {
        with_host(&shared, |h| {
            let now = h.now();
            if h.page.on_form_submit(now, &mut h.surface) {
                event.prevent_default();
            }
        });
    });
}

/// One intersection observer per reveal group, unobserving each element as
/// soon as the page reports it revealed.
fn observe_group(host: &Shared, group: RevealGroupId) -> Result<(), JsValue> {
    let (pending, thresholds) = {
        let h = host.borrow();
        let pending: Vec<HtmlElement> = h
            .page
            .pending(group)
            .into_iter()
            .filter_map(|id| h.surface.get(id).cloned())
            .collect();
        (pending, h.page.observer_thresholds(group))
    };
    if pending.is_empty() {
        return Ok(());
    }

    let shared = Rc::clone(host);
    let callback = Closure::<dyn FnMut(js_sys::Array, IntersectionObserver)>::new(
        move |entries: js_sys::Array, observer: IntersectionObserver| {
            with_host(&shared, |h| {
                let batch: Vec<IntersectionEntry> = entries
                    .iter()
                    .filter_map(|v| v.dyn_into::<IntersectionObserverEntry>().ok())
                    .filter_map(|e| {
                        let id = h.surface.lookup(&e.target())?;
                        let entry =
                            IntersectionEntry::new(id, e.is_intersecting(), e.intersection_ratio());
                        Some(match e.root_bounds() {
                            Some(root) => {
                                entry.with_heights(e.intersection_rect().height(), root.height())
                            }
                            None => entry,
                        })
                    })
                    .collect();
                let now = h.now();
                for id in h.page.on_intersections(now, group, &batch, &mut h.surface) {
                    if let Some(el) = h.surface.get(id) {
                        observer.unobserve(el);
                    }
                }
            });
        },
    );

    let options = IntersectionObserverInit::new();
    let ladder: js_sys::Array = thresholds.into_iter().map(JsValue::from_f64).collect();
    options.set_threshold(&ladder);
    let observer = IntersectionObserver::new_with_options(callback.as_ref().unchecked_ref(), &options)?;
    for el in &pending {
        observer.observe(el);
    }
    callback.forget();
    Ok(())
}

/// Drive [`Page::on_frame`] from `requestAnimationFrame` for the page's
/// lifetime.
fn start_frames(host: &Shared, window: &Window) {
    let slot: Rc<RefCell<Option<Closure<dyn FnMut(f64)>>>> = Rc::new(RefCell::new(None));
    let next = Rc::clone(&slot);
    let shared = Rc::clone(host);
    *slot.borrow_mut() = Some(Closure::new(move |_timestamp: f64| {
        with_host(&shared, |h| {
            let now = h.now();
            h.page.on_frame(now, &mut h.surface);
        });
        if let (Some(window), Some(cb)) = (web_sys::window(), next.borrow().as_ref()) {
            let _ = window.request_animation_frame(cb.as_ref().unchecked_ref());
        }
    }));
    if let Some(cb) = slot.borrow().as_ref() {
        let _ = window.request_animation_frame(cb.as_ref().unchecked_ref());
    }
}

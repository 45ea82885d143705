#![forbid(unsafe_code)]

//! Core: scroll reconciliation, reveal-on-visibility, and page effects for folio.
//!
//! Everything here is host-agnostic. The embedding frontend supplies time as a
//! monotonic [`Duration`](std::time::Duration), geometry as plain values, and
//! receives writes through the [`surface::Surface`] trait.

pub mod config;
pub mod counter;
pub mod effects;
pub mod geometry;
pub mod logging;
pub mod page;
pub mod reveal;
pub mod scroll_state;
pub mod scroll_throttle;
pub mod stagger;
pub mod surface;
pub mod timer;
pub mod typing;

// Re-export tracing macros at crate root for ergonomic use.
#[cfg(feature = "tracing")]
pub use logging::{debug, trace, warn};

pub use config::{ConfigError, PageConfig};
pub use geometry::{ClientRect, Point, Section, ViewportMetrics};
pub use page::{Page, PageLayout, RevealGroupId};
pub use surface::{ElementId, Mutation, RecordingSurface, Surface};

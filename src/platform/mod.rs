//! Platform abstraction layer
//!
//! Thin host-facing pieces the engine depends on:
//! - Time (wall clock for result timestamps)
//! - Input (pointer events and fixed UI hit regions)

pub mod input;
pub mod time;

pub use input::{PointerEvent, PointerKind, Routed, UiLayout, route_pointer};
pub use time::{Clock, FixedClock, SystemClock};

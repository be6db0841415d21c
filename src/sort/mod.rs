// src/sort/mod.rs

//! Deterministic tag-based ordering.
//!
//! - [`compare`] holds the single comparison primitive (case-sensitive
//!   lexicographic order on tag values, flipped for `desc`).
//! - [`display`] orders one event's tag badges.
//! - [`events`] orders an event list by the preference rules.
//!
//! Nothing here touches the repository; callers pass records in and get a
//! new order back.

pub mod compare;
pub mod display;
pub mod events;

pub use compare::{compare_by_rule, compare_tag_values};
pub use display::order_tag_keys_for_display;
pub use events::order_events;

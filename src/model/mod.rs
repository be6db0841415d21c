// src/model/mod.rs

//! Record shapes shared by the repository, the engines and the stores.
//!
//! - [`event`] holds the persisted `Event` record.
//! - [`request`] holds the create/update/filter inputs.
//! - [`prefs`] holds the tag sort rules and their preference set.

pub mod event;
pub mod prefs;
pub mod request;

pub use event::{Event, EventId, TagMap};
pub use prefs::{SortPreferences, TagSortRule};
pub use request::{tag_map_from_pairs, CreateEventRequest, EventFilter, UpdateEventRequest};

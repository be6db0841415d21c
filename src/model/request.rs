// src/model/request.rs

use indexmap::map::Entry;
use serde::{Deserialize, Serialize};

use crate::errors::{Result, SchedulerError};
use crate::model::event::{Event, EventId, TagMap};
use crate::types::EventStatus;

/// Build a [`TagMap`] from `key=value` pairs. A key given twice is a
/// validation error, not a silent overwrite.
pub fn tag_map_from_pairs<I>(pairs: I) -> Result<TagMap>
where
    I: IntoIterator<Item = (String, String)>,
{
    let mut tags = TagMap::new();
    for (key, value) in pairs {
        match tags.entry(key) {
            Entry::Occupied(entry) => {
                return Err(SchedulerError::validation(format!(
                    "duplicate tag key '{}'",
                    entry.key()
                )));
            }
            Entry::Vacant(entry) => {
                entry.insert(value);
            }
        }
    }
    Ok(tags)
}

/// Input for [`crate::repo::EventRepository::create`].
///
/// The initial status is not part of the request; it is computed from the
/// referenced dependencies.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateEventRequest {
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default, deserialize_with = "unique_tags::deserialize")]
    pub tags: TagMap,
    #[serde(default)]
    pub dependencies: Vec<EventId>,
}

impl CreateEventRequest {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }
}

/// Field edits merged into an existing event. `None` leaves a field as is.
///
/// Status is not editable here; status transitions go through
/// [`crate::engine::StatusEngine::set_status`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpdateEventRequest {
    pub id: EventId,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default, deserialize_with = "unique_tags::deserialize_option")]
    pub tags: Option<TagMap>,
    #[serde(default)]
    pub dependencies: Option<Vec<EventId>>,
}

impl UpdateEventRequest {
    pub fn for_event(id: impl Into<EventId>) -> Self {
        Self {
            id: id.into(),
            ..Self::default()
        }
    }

    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.description.is_none()
            && self.tags.is_none()
            && self.dependencies.is_none()
    }
}

/// Predicate used by `list`. Every provided criterion must match.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventFilter {
    #[serde(default)]
    pub status: Option<EventStatus>,
    /// Every key must be present on the event with exactly this value.
    #[serde(default)]
    pub tags: TagMap,
    /// Case-insensitive substring searched in name and description.
    #[serde(default)]
    pub search: Option<String>,
}

impl EventFilter {
    pub fn with_status(status: EventStatus) -> Self {
        Self {
            status: Some(status),
            ..Self::default()
        }
    }

    /// Status and tag criteria. Text search is applied by the repository,
    /// which compiles `search` once per call.
    pub(crate) fn matches_fields(&self, event: &Event) -> bool {
        if let Some(status) = self.status {
            if event.status != status {
                return false;
            }
        }

        self.tags
            .iter()
            .all(|(key, value)| event.tags.get(key) == Some(value))
    }
}

/// Tag maps read from JSON keep every key once; repeated keys are
/// rejected instead of letting the last one win.
mod unique_tags {
    use std::fmt;

    use serde::de::{self, MapAccess, Visitor};
    use serde::{Deserialize, Deserializer};

    use super::TagMap;

    struct UniqueTags(TagMap);

    impl<'de> Deserialize<'de> for UniqueTags {
        fn deserialize<D: Deserializer<'de>>(d: D) -> Result<Self, D::Error> {
            d.deserialize_map(UniqueTagsVisitor)
        }
    }

    struct UniqueTagsVisitor;

    impl<'de> Visitor<'de> for UniqueTagsVisitor {
        type Value = UniqueTags;

        fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            f.write_str("a map of tag keys to string values")
        }

        fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> Result<Self::Value, A::Error> {
            let mut tags = TagMap::with_capacity(map.size_hint().unwrap_or(0));
            while let Some((key, value)) = map.next_entry::<String, String>()? {
                if tags.contains_key(&key) {
                    return Err(de::Error::custom(format!("duplicate tag key '{key}'")));
                }
                tags.insert(key, value);
            }
            Ok(UniqueTags(tags))
        }
    }

    pub(super) fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<TagMap, D::Error> {
        UniqueTags::deserialize(d).map(|tags| tags.0)
    }

    pub(super) fn deserialize_option<'de, D: Deserializer<'de>>(
        d: D,
    ) -> Result<Option<TagMap>, D::Error> {
        Option::<UniqueTags>::deserialize(d).map(|tags| tags.map(|t| t.0))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pair(k: &str, v: &str) -> (String, String) {
        (k.to_string(), v.to_string())
    }

    #[test]
    fn repeated_pair_key_is_rejected() {
        let err = tag_map_from_pairs([pair("k", "1"), pair("k", "2")]).unwrap_err();
        assert!(matches!(err, SchedulerError::Validation(msg) if msg.contains("'k'")));

        let tags = tag_map_from_pairs([pair("b", "1"), pair("a", "2")]).unwrap();
        assert_eq!(tags.keys().collect::<Vec<_>>(), vec!["b", "a"]);
    }

    #[test]
    fn json_request_with_repeated_tag_key_fails_to_parse() {
        let err = serde_json::from_str::<CreateEventRequest>(
            r#"{"name":"x","tags":{"k":"1","k":"2"}}"#,
        )
        .unwrap_err();
        assert!(err.to_string().contains("duplicate tag key 'k'"));

        let err = serde_json::from_str::<UpdateEventRequest>(
            r#"{"id":"a","tags":{"k":"1","k":"2"}}"#,
        )
        .unwrap_err();
        assert!(err.to_string().contains("duplicate tag key"));
    }

    #[test]
    fn json_request_tags_are_optional() {
        let create: CreateEventRequest = serde_json::from_str(r#"{"name":"x"}"#).unwrap();
        assert!(create.tags.is_empty());

        let update: UpdateEventRequest =
            serde_json::from_str(r#"{"id":"a","tags":null}"#).unwrap();
        assert_eq!(update.tags, None);
        let update: UpdateEventRequest =
            serde_json::from_str(r#"{"id":"a","tags":{"k":"v"}}"#).unwrap();
        assert_eq!(update.tags.unwrap()["k"], "v");
    }
}

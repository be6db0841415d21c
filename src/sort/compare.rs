// src/sort/compare.rs

use std::cmp::Ordering;

use crate::model::{Event, TagSortRule};
use crate::types::SortDirection;

/// Compare two tag values: byte-wise lexicographic, case-sensitive, then
/// reversed for [`SortDirection::Desc`].
pub fn compare_tag_values(a: &str, b: &str, direction: SortDirection) -> Ordering {
    let ord = a.cmp(b);
    match direction {
        SortDirection::Asc => ord,
        SortDirection::Desc => ord.reverse(),
    }
}

/// Apply one rule to a pair of events.
///
/// `Equal` means "no decision": either both values are equal or both
/// events lack the tag. An event carrying the tag always sorts before one
/// that does not, regardless of direction.
pub fn compare_by_rule(a: &Event, b: &Event, rule: &TagSortRule) -> Ordering {
    match (a.tag(&rule.tag_key), b.tag(&rule.tag_key)) {
        (Some(va), Some(vb)) => compare_tag_values(va, vb, rule.direction),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

// src/sort/display.rs

use crate::model::{TagMap, TagSortRule};

/// Order one event's tag entries for badge display.
///
/// Entries whose key has a rule come first, by the rule's `order`; the rest
/// follow in ascending key order. Only the key decides the position here;
/// the rule direction is irrelevant for badges.
pub fn order_tag_keys_for_display<'a>(
    tags: &'a TagMap,
    rules: &[TagSortRule],
) -> Vec<(&'a str, &'a str)> {
    let mut ruled: Vec<&TagSortRule> = rules.iter().collect();
    ruled.sort_by_key(|r| r.order);

    let mut out: Vec<(&'a str, &'a str)> = Vec::with_capacity(tags.len());

    for rule in &ruled {
        if let Some((key, value)) = tags.get_key_value(rule.tag_key.as_str()) {
            if !out.iter().any(|(k, _)| *k == key.as_str()) {
                out.push((key.as_str(), value.as_str()));
            }
        }
    }

    let mut rest: Vec<(&'a str, &'a str)> = tags
        .iter()
        .filter(|(key, _)| !ruled.iter().any(|r| &r.tag_key == *key))
        .map(|(k, v)| (k.as_str(), v.as_str()))
        .collect();
    rest.sort_by(|a, b| a.0.cmp(b.0));

    out.extend(rest);
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::SortDirection;

    fn tags(pairs: &[(&str, &str)]) -> TagMap {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn ruled_keys_first_then_alphabetical() {
        let t = tags(&[("zeta", "1"), ("area", "ops"), ("priority", "2"), ("beta", "x")]);
        let rules = vec![
            TagSortRule::new("area", SortDirection::Desc, 1),
            TagSortRule::new("priority", SortDirection::Asc, 0),
        ];

        let keys: Vec<&str> = order_tag_keys_for_display(&t, &rules)
            .into_iter()
            .map(|(k, _)| k)
            .collect();
        assert_eq!(keys, vec!["priority", "area", "beta", "zeta"]);
    }

    #[test]
    fn rules_for_absent_keys_are_skipped() {
        let t = tags(&[("b", "1"), ("a", "2")]);
        let rules = vec![TagSortRule::new("missing", SortDirection::Asc, 0)];

        let ordered = order_tag_keys_for_display(&t, &rules);
        assert_eq!(ordered, vec![("a", "2"), ("b", "1")]);
    }

    #[test]
    fn empty_tags_yield_nothing() {
        let rules = vec![TagSortRule::new("priority", SortDirection::Asc, 0)];
        assert!(order_tag_keys_for_display(&TagMap::new(), &rules).is_empty());
    }
}

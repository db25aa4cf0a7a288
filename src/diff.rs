use std::collections::HashSet;

use crate::listing::Listing;
use crate::state::SeenSet;

/// Filter a snapshot down to listings not yet notified, preserving fetch
/// order. Duplicate ids within one snapshot collapse to the first
/// occurrence. Pure: no side effects, total over any input.
pub fn new_listings(fetched: &[Listing], seen: &SeenSet) -> Vec<Listing> {
    let mut in_snapshot: HashSet<&str> = HashSet::new();
    fetched
        .iter()
        .filter(|l| !seen.contains(&l.id) && in_snapshot.insert(l.id.as_str()))
        .cloned()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn listing(id: &str) -> Listing {
        Listing {
            id: id.to_string(),
            name: None,
            min_price: None,
            banner_url: None,
        }
    }

    #[test]
    fn test_preserves_fetch_order() {
        let fetched = vec![listing("project_a"), listing("project_b"), listing("project_c")];
        let seen: SeenSet = ["project_b".to_string()].into_iter().collect();

        let result = new_listings(&fetched, &seen);
        let ids: Vec<&str> = result.iter().map(|l| l.id.as_str()).collect();
        assert_eq!(ids, vec!["project_a", "project_c"]);
    }

    #[test]
    fn test_single_new_item_keeps_position_semantics() {
        let fetched = vec![listing("project_a"), listing("project_b"), listing("project_c")];
        let seen: SeenSet = ["project_a".to_string(), "project_c".to_string()]
            .into_iter()
            .collect();

        let result = new_listings(&fetched, &seen);
        assert_eq!(result.len(), 1);
        assert_eq!(result[0].id, "project_b");
    }

    #[test]
    fn test_idempotent_after_all_seen() {
        let fetched = vec![listing("project_1"), listing("project_2")];
        let mut seen = SeenSet::new();

        let first = new_listings(&fetched, &seen);
        assert_eq!(first.len(), 2);

        seen.extend(first.into_iter().map(|l| l.id));
        assert!(new_listings(&fetched, &seen).is_empty());
    }

    #[test]
    fn test_duplicate_within_snapshot_collapses() {
        let fetched = vec![listing("project_x"), listing("project_x")];
        let seen = SeenSet::new();

        let result = new_listings(&fetched, &seen);
        assert_eq!(result.len(), 1);
        assert_eq!(result[0].id, "project_x");
    }

    #[test]
    fn test_empty_snapshot() {
        let seen: SeenSet = ["project_1".to_string()].into_iter().collect();
        assert!(new_listings(&[], &seen).is_empty());
    }
}

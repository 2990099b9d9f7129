//! Order-preserving grouping of rows by key.
//!
//! Two flavours are needed:
//!
//! ```text
//! group_ranges (input already sorted by key)    group_by_key (any order)
//! ┌─────────────────────┐                       ┌──────────────────────────┐
//! │ 0 Bretagne  03-01   │ ┐ 0..2                │ Grand Est  → [0, 2]      │
//! │ 1 Bretagne  03-02   │ ┘                     │ Bretagne   → [1]         │
//! │ 2 Grand Est 03-01   │ ] 2..3                └──────────────────────────┘
//! └─────────────────────┘
//! ```
//!
//! Within a group, items always keep their input order.

use std::collections::HashMap;
use std::hash::Hash;
use std::ops::Range;

/// Index ranges of maximal runs of equal keys.
///
/// Callers sort by key first, so each run is a whole group. The key may
/// borrow from the item.
pub fn group_ranges<'a, T, K, F>(items: &'a [T], key: F) -> Vec<Range<usize>>
where
    K: PartialEq,
    F: Fn(&'a T) -> K,
{
    let mut ranges = Vec::new();
    let mut start = 0;

    for i in 1..=items.len() {
        if i == items.len() || key(&items[i]) != key(&items[start]) {
            if start < i {
                ranges.push(start..i);
            }
            start = i;
        }
    }

    ranges
}

/// Group items by key, groups ordered by first appearance.
pub fn group_by_key<'a, T, K, F>(items: &'a [T], key: F) -> Vec<(K, Vec<&'a T>)>
where
    K: Eq + Hash + Clone,
    F: Fn(&T) -> K,
{
    let mut index: HashMap<K, usize> = HashMap::new();
    let mut groups: Vec<(K, Vec<&'a T>)> = Vec::new();

    for item in items {
        let k = key(item);
        let slot = *index.entry(k.clone()).or_insert_with(|| {
            groups.push((k, Vec::new()));
            groups.len() - 1
        });
        groups[slot].1.push(item);
    }

    groups
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ranges_over_sorted_input() {
        let items = ["a", "a", "b", "c", "c", "c"];
        let ranges = group_ranges(&items, |s| *s);
        assert_eq!(ranges, vec![0..2, 2..3, 3..6]);
    }

    #[test]
    fn test_ranges_with_borrowed_key() {
        let items = [("Bretagne".to_string(), 1), ("Bretagne".to_string(), 2), ("Corse".to_string(), 1)];
        let ranges = group_ranges(&items, |(region, _)| region.as_str());
        assert_eq!(ranges, vec![0..2, 2..3]);
    }

    #[test]
    fn test_ranges_empty_and_single() {
        let empty: [u8; 0] = [];
        assert!(group_ranges(&empty, |x| *x).is_empty());
        assert_eq!(group_ranges(&[7], |x| *x), vec![0..1]);
    }

    #[test]
    fn test_group_by_key_keeps_first_appearance_order() {
        let items = [("Grand Est", 1), ("Bretagne", 2), ("Grand Est", 3)];
        let groups = group_by_key(&items, |(region, _)| region.to_string());

        assert_eq!(groups.len(), 2);
        assert_eq!(groups[0].0, "Grand Est");
        assert_eq!(groups[0].1.iter().map(|(_, n)| *n).collect::<Vec<_>>(), vec![1, 3]);
        assert_eq!(groups[1].0, "Bretagne");
    }
}

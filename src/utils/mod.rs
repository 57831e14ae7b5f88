use std::collections::HashSet;
use std::hash::Hash;

/// Keeps the first occurrence of every item, preserving order.
pub fn dedup_ordered<T: Copy + Eq + Hash>(items: &[T]) -> Vec<T> {
    let mut seen = HashSet::with_capacity(items.len());
    items
        .iter()
        .copied()
        .filter(|item| seen.insert(*item))
        .collect()
}

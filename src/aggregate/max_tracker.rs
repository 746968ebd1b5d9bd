// 5.4: running maximum by key. accumulate keeps the first of equal values,
// combine keeps self on ties.

use super::operation::AggregateOperation;

#[derive(Debug, Clone, PartialEq)]
pub struct MaxTracker<K, V> {
    max: Option<(K, V)>,
}

impl<K, V> Default for MaxTracker<K, V> {
    fn default() -> Self {
        Self { max: None }
    }
}

impl<K, V: PartialOrd> MaxTracker<K, V> {
    fn beats(&self, value: &V) -> bool {
        match &self.max {
            None => true,
            Some((_, current)) => value > current,
        }
    }
}

impl<K: Clone, V: PartialOrd + Clone> AggregateOperation for MaxTracker<K, V> {
    type Item = (K, V);
    type Output = Option<(K, V)>;

    fn accumulate(&mut self, item: &(K, V)) {
        if self.beats(&item.1) {
            self.max = Some(item.clone());
        }
    }

    fn combine(&mut self, other: Self) {
        if let Some((key, value)) = other.max {
            if self.beats(&value) {
                self.max = Some((key, value));
            }
        }
    }

    fn export_finish(&self) -> Option<(K, V)> {
        self.max.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aggregate::operation::{fold, par_fold};

    #[test]
    fn tracks_largest() {
        let items = vec![("a", 3.0), ("b", 9.5), ("c", -1.0), ("d", 9.0)];
        let max: MaxTracker<&str, f64> = fold(&items);
        assert_eq!(max.export_finish(), Some(("b", 9.5)));
    }

    #[test]
    fn ties_keep_first() {
        let items = vec![("a", 5u64), ("b", 5u64)];
        let max: MaxTracker<&str, u64> = fold(&items);
        assert_eq!(max.export_finish(), Some(("a", 5)));
    }

    #[test]
    fn combine_with_empty_either_side() {
        let full: MaxTracker<&str, u64> = fold(&vec![("a", 1u64)]);
        let mut left = full.clone();
        left.combine(MaxTracker::default());
        let mut right = MaxTracker::default();
        right.combine(full.clone());
        assert_eq!(left, full);
        assert_eq!(right, full);
    }

    #[test]
    fn parallel_matches_sequential_for_distinct_values() {
        let items: Vec<(u32, u64)> = (0..5_000u32).map(|i| (i, (i as u64 * 7919) % 10_007)).collect();
        let seq: MaxTracker<u32, u64> = fold(&items);
        let par: MaxTracker<u32, u64> = par_fold(&items);
        assert_eq!(seq.export_finish(), par.export_finish());
    }

    #[test]
    fn empty_export_is_none() {
        let max: MaxTracker<String, f64> = MaxTracker::create();
        assert!(max.export_finish().is_none());
    }
}

// 5.0.1: the four-primitive accumulator contract and the fold helpers built on it.

use rayon::prelude::*;

/// An accumulator the pipeline can run per key, split across workers and merge.
///
/// `create` hands out an empty state. `accumulate` folds in one item and must
/// tolerate any arrival order for items of the same key. `combine` merges a
/// partial state built from a disjoint sequence of items; the merged state must
/// match accumulating the union into one state, with each implementation
/// stating its own tie-break for retained metadata. `export_finish` is a read
/// and can be called more than once.
pub trait AggregateOperation: Default {
    type Item;
    type Output;

    fn create() -> Self {
        Self::default()
    }

    fn accumulate(&mut self, item: &Self::Item);

    fn combine(&mut self, other: Self);

    fn export_finish(&self) -> Self::Output;
}

/// Accumulators that can retract a previously combined partial state,
/// used when a sliding window drops its oldest slice.
pub trait Deduct: AggregateOperation {
    fn deduct(&mut self, other: &Self);
}

pub fn fold<'a, A, I>(items: I) -> A
where
    A: AggregateOperation,
    A::Item: 'a,
    I: IntoIterator<Item = &'a A::Item>,
{
    let mut acc = A::create();
    for item in items {
        acc.accumulate(item);
    }
    acc
}

// each rayon split folds its own partial state, partials meet through combine
pub fn par_fold<A>(items: &[A::Item]) -> A
where
    A: AggregateOperation + Send,
    A::Item: Sync,
{
    items
        .par_iter()
        .fold(A::create, |mut acc, item| {
            acc.accumulate(item);
            acc
        })
        .reduce(A::create, |mut left, right| {
            left.combine(right);
            left
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Default, PartialEq)]
    struct Count(u64);

    impl AggregateOperation for Count {
        type Item = u32;
        type Output = u64;

        fn accumulate(&mut self, _item: &u32) {
            self.0 += 1;
        }

        fn combine(&mut self, other: Self) {
            self.0 += other.0;
        }

        fn export_finish(&self) -> u64 {
            self.0
        }
    }

    #[test]
    fn fold_and_par_fold_agree() {
        let items: Vec<u32> = (0..10_000).collect();
        let seq: Count = fold(&items);
        let par: Count = par_fold(&items);
        assert_eq!(seq, par);
        assert_eq!(par.export_finish(), 10_000);
    }

    #[test]
    fn empty_fold_is_create() {
        let items: Vec<u32> = Vec::new();
        let seq: Count = fold(&items);
        let par: Count = par_fold(&items);
        assert_eq!(seq, Count::create());
        assert_eq!(par, Count::create());
    }
}

use std::cmp::Ordering;
use std::marker::PhantomData;

use super::key::Int64Key;

/// Total order over keys of type `K`. Pulled out as a trait (rather than
/// requiring `K: Ord`) so a tree can be parameterized over comparators that
/// don't simply compare bytes, the way the course parameterizes
/// `GenericComparator` by key schema.
pub trait KeyComparator<K>: Clone {
    fn compare(&self, a: &K, b: &K) -> Ordering;
}

#[derive(Clone, Copy, Default)]
pub struct Int64Comparator;

impl KeyComparator<Int64Key> for Int64Comparator {
    fn compare(&self, a: &Int64Key, b: &Int64Key) -> Ordering {
        a.0.cmp(&b.0)
    }
}

/// Adapts any `Ord` key into a comparator, for callers who don't need
/// anything fancier than the key's natural order.
#[derive(Clone, Copy, Default)]
pub struct NaturalOrderComparator<K>(PhantomData<K>);

impl<K: Ord> KeyComparator<K> for NaturalOrderComparator<K> {
    fn compare(&self, a: &K, b: &K) -> Ordering {
        a.cmp(b)
    }
}

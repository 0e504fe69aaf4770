use std::collections::BTreeMap;
use std::collections::btree_map;

/// Values that can be composed as independent probabilities of exceedance.
///
/// `Default::default()` is the neutral element of the composition: composing with it leaves
/// a value unchanged.
pub trait Aggregate: Clone + Default {
    /// Probability that at least one of two independent events occurs.
    fn agg_prob(&self, other: &Self) -> Self;
}

impl Aggregate for f64 {
    fn agg_prob(&self, other: &Self) -> Self {
        1.0 - (1.0 - self) * (1.0 - other)
    }
}

/// Elementwise composition; the shorter curve is padded with zeros.
impl Aggregate for Vec<f64> {
    fn agg_prob(&self, other: &Self) -> Self {
        let len = self.len().max(other.len());
        (0..len)
            .map(|i| {
                let a = self.get(i).copied().unwrap_or(0.0);
                let b = other.get(i).copied().unwrap_or(0.0);
                a.agg_prob(&b)
            })
            .collect()
    }
}

impl<K: Ord + Clone, V: Aggregate> Aggregate for AccumDict<K, V> {
    fn agg_prob(&self, other: &Self) -> Self {
        self.merge_with(other, V::agg_prob)
    }
}

/// Aggregation function for probabilities: `1 - (1 - acc) * (1 - prob)`.
pub fn agg_prob<V: Aggregate>(acc: &V, prob: &V) -> V {
    acc.agg_prob(prob)
}

/// An ordered mapping whose values merge elementwise.
///
/// A key missing on one side of a merge takes `V::default()`, which must be the neutral
/// element of the merge function.
#[derive(Debug, Clone, PartialEq)]
pub struct AccumDict<K: Ord, V>(BTreeMap<K, V>);

impl<K: Ord, V> Default for AccumDict<K, V> {
    fn default() -> Self {
        Self(BTreeMap::new())
    }
}

impl<K: Ord, V> AccumDict<K, V> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, key: &K) -> Option<&V> {
        self.0.get(key)
    }

    pub fn insert(&mut self, key: K, value: V) -> Option<V> {
        self.0.insert(key, value)
    }

    pub fn contains_key(&self, key: &K) -> bool {
        self.0.contains_key(key)
    }

    pub fn iter(&self) -> btree_map::Iter<'_, K, V> {
        self.0.iter()
    }

    pub fn keys(&self) -> btree_map::Keys<'_, K, V> {
        self.0.keys()
    }

    pub fn values(&self) -> btree_map::Values<'_, K, V> {
        self.0.values()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn into_inner(self) -> BTreeMap<K, V> {
        self.0
    }
}

impl<K: Ord + Clone, V: Clone + Default> AccumDict<K, V> {
    /// Folds `value` into the entry of `key` with `f`, starting from the neutral element.
    pub fn accumulate<F>(&mut self, key: K, value: &V, f: F)
    where
        F: Fn(&V, &V) -> V,
    {
        let entry = self.0.entry(key).or_default();
        *entry = f(entry, value);
    }

    /// Merges two dictionaries key by key with `f`.
    pub fn merge_with<F>(&self, other: &Self, f: F) -> Self
    where
        F: Fn(&V, &V) -> V,
    {
        let neutral = V::default();
        let mut merged = self.0.clone();
        for (key, acc) in merged.iter_mut() {
            let rhs = other.0.get(key).unwrap_or(&neutral);
            *acc = f(acc, rhs);
        }
        for (key, value) in &other.0 {
            if !self.0.contains_key(key) {
                merged.insert(key.clone(), f(&neutral, value));
            }
        }
        Self(merged)
    }
}

impl<K: Ord, V> FromIterator<(K, V)> for AccumDict<K, V> {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl<K: Ord, V> IntoIterator for AccumDict<K, V> {
    type Item = (K, V);
    type IntoIter = btree_map::IntoIter<K, V>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

impl<'a, K: Ord, V> IntoIterator for &'a AccumDict<K, V> {
    type Item = (&'a K, &'a V);
    type IntoIter = btree_map::Iter<'a, K, V>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

//! Lookups returning [Maybe] instead of `Option`, so that their results can be fed directly to
//! the container capabilities.
use std::{
    borrow::Borrow,
    collections::{BTreeMap, HashMap},
    hash::Hash,
};

use indexmap::IndexMap;

use crate::{
    container::Maybe,
    identifier::Ident,
    value::Value,
};

/// Fetch an element, or `Nothing` when it doesn't exist.
pub trait FetchMaybe<K: ?Sized> {
    type Output;

    fn fetch_maybe(&self, key: &K) -> Maybe<&Self::Output>;
}

/// Negative indices count from the end: `-1` is the last element.
impl<T> FetchMaybe<isize> for [T] {
    type Output = T;

    fn fetch_maybe(&self, index: &isize) -> Maybe<&T> {
        let index = if *index < 0 {
            self.len().checked_sub(index.unsigned_abs())
        } else {
            Some(*index as usize)
        };

        index.and_then(|i| self.get(i)).into()
    }
}

impl<T> FetchMaybe<isize> for Vec<T> {
    type Output = T;

    fn fetch_maybe(&self, index: &isize) -> Maybe<&T> {
        self.as_slice().fetch_maybe(index)
    }
}

impl<K, Q, V> FetchMaybe<Q> for HashMap<K, V>
where
    K: Borrow<Q> + Hash + Eq,
    Q: Hash + Eq + ?Sized,
{
    type Output = V;

    fn fetch_maybe(&self, key: &Q) -> Maybe<&V> {
        self.get(key).into()
    }
}

impl<K, Q, V> FetchMaybe<Q> for BTreeMap<K, V>
where
    K: Borrow<Q> + Ord,
    Q: Ord + ?Sized,
{
    type Output = V;

    fn fetch_maybe(&self, key: &Q) -> Maybe<&V> {
        self.get(key).into()
    }
}

impl<K, Q, V> FetchMaybe<Q> for IndexMap<K, V>
where
    K: Borrow<Q> + Hash + Eq,
    Q: Hash + Eq + ?Sized,
{
    type Output = V;

    fn fetch_maybe(&self, key: &Q) -> Maybe<&V> {
        self.get(key).into()
    }
}

/// Read an environment variable. Unset variables and variables that aren't valid unicode are
/// both `Nothing`.
pub fn env_fetch_maybe(name: &str) -> Maybe<String> {
    std::env::var(name).ok().into()
}

/// Searches over iterators, returning [Maybe].
pub trait IteratorMaybe: Iterator + Sized {
    fn first_maybe(mut self) -> Maybe<Self::Item> {
        self.next().into()
    }

    /// The first element satisfying `predicate`. The iterator isn't consumed past it.
    fn find_maybe<P>(&mut self, predicate: P) -> Maybe<Self::Item>
    where
        P: FnMut(&Self::Item) -> bool,
    {
        self.find(predicate).into()
    }
}

impl<I: Iterator> IteratorMaybe for I {}

impl Value {
    /// Fetch an element of an array by index, or a field of a record by name.
    ///
    /// Arrays are indexed by integers, negative ones counting from the end. Records are
    /// indexed by strings. Any other combination is `Nothing`.
    pub fn fetch_maybe(&self, key: &Value) -> Maybe<&Value> {
        match (self, key) {
            (Value::Array(elts), key) => key
                .as_i64()
                .and_then(|i| isize::try_from(i).ok())
                .map_or(Maybe::Nothing, |i| elts.fetch_maybe(&i)),
            (Value::Record(fields), Value::Str(name)) => fields.fetch_maybe(&Ident::new(name)),
            _ => Maybe::Nothing,
        }
    }
}

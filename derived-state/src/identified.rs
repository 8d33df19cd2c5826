//! Collections indexed by a stable per-element identity.
use indexmap::IndexMap;
use std::{
    fmt,
    hash::{BuildHasher, Hash},
    ops::Index,
};

/// Elements carrying a stable, unique identity.
pub trait Identifiable {
    type Id: Clone + Eq + Hash + fmt::Debug;

    fn id(&self) -> Self::Id;
}

/// Minimal contract of an identity-indexed collection.
///
/// Elements are visited in a stable order. Lookups of an absent identity return `None`, and
/// updates never insert nor change the identity of an element.
pub trait IdentifiedCollection {
    type Id: Clone + Eq + fmt::Debug;
    type Element;

    /// Calls `f` with every identity in the collection, in order.
    fn for_each_id(&self, f: impl FnMut(&Self::Id));

    fn get(&self, id: &Self::Id) -> Option<&Self::Element>;

    fn get_mut(&mut self, id: &Self::Id) -> Option<&mut Self::Element>;

    /// The identity carried by `element` itself, if elements carry one.
    ///
    /// `None` for collections whose identities are external keys.
    fn identity_of(&self, _element: &Self::Element) -> Option<Self::Id> {
        None
    }

    /// Replaces the element with the given identity.
    ///
    /// Returns `false`, leaving the collection untouched, if there is no such element or if
    /// `element` carries another identity.
    fn update(&mut self, id: &Self::Id, element: Self::Element) -> bool {
        if self.identity_of(&element).map_or(false, |found| found != *id) {
            return false;
        }
        match self.get_mut(id) {
            Some(slot) => {
                *slot = element;
                true
            }
            None => false,
        }
    }
}

/// An ordered vector of [`Identifiable`] elements that can also be indexed by identity.
///
/// Elements must not change their identity while they are in the collection: `get_mut` and
/// `iter_mut` hand out mutable references, and the index is keyed on the identity the element
/// had when it was inserted.
pub struct IdentifiedVec<T: Identifiable> {
    elements: IndexMap<T::Id, T>,
}

impl<T: Identifiable> IdentifiedVec<T> {
    pub fn new() -> IdentifiedVec<T> {
        IdentifiedVec {
            elements: IndexMap::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.elements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    pub fn contains(&self, id: &T::Id) -> bool {
        self.elements.contains_key(id)
    }

    /// Appends an element, or replaces the element with the same identity in place.
    ///
    /// Returns the replaced element.
    pub fn insert(&mut self, element: T) -> Option<T> {
        self.elements.insert(element.id(), element)
    }

    /// Removes the element with the given identity, preserving the order of the others.
    pub fn remove(&mut self, id: &T::Id) -> Option<T> {
        self.elements.shift_remove(id)
    }

    pub fn get(&self, id: &T::Id) -> Option<&T> {
        self.elements.get(id)
    }

    pub fn get_mut(&mut self, id: &T::Id) -> Option<&mut T> {
        self.elements.get_mut(id)
    }

    /// Position of the element with the given identity.
    pub fn index_of(&self, id: &T::Id) -> Option<usize> {
        self.elements.get_index_of(id)
    }

    pub fn ids(&self) -> impl Iterator<Item = &T::Id> + '_ {
        self.elements.keys()
    }

    pub fn iter(&self) -> impl Iterator<Item = &T> + '_ {
        self.elements.values()
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut T> + '_ {
        self.elements.values_mut()
    }
}

impl<T: Identifiable> Default for IdentifiedVec<T> {
    fn default() -> Self {
        IdentifiedVec::new()
    }
}

impl<T: Identifiable + Clone> Clone for IdentifiedVec<T> {
    fn clone(&self) -> Self {
        IdentifiedVec {
            elements: self.elements.clone(),
        }
    }
}

impl<T: Identifiable + PartialEq> PartialEq for IdentifiedVec<T> {
    fn eq(&self, other: &Self) -> bool {
        // order matters
        self.len() == other.len() && self.iter().eq(other.iter())
    }
}

impl<T: Identifiable + Eq> Eq for IdentifiedVec<T> {}

impl<T: Identifiable + fmt::Debug> fmt::Debug for IdentifiedVec<T> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_list().entries(self.iter()).finish()
    }
}

impl<T: Identifiable> Index<usize> for IdentifiedVec<T> {
    type Output = T;

    fn index(&self, index: usize) -> &T {
        &self.elements[index]
    }
}

impl<T: Identifiable> FromIterator<T> for IdentifiedVec<T> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        let mut vec = IdentifiedVec::new();
        vec.extend(iter);
        vec
    }
}

impl<T: Identifiable> Extend<T> for IdentifiedVec<T> {
    fn extend<I: IntoIterator<Item = T>>(&mut self, iter: I) {
        for element in iter {
            self.insert(element);
        }
    }
}

impl<T: Identifiable> IntoIterator for IdentifiedVec<T> {
    type Item = T;
    type IntoIter = indexmap::map::IntoValues<T::Id, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.elements.into_values()
    }
}

impl<T: Identifiable> IdentifiedCollection for IdentifiedVec<T> {
    type Id = T::Id;
    type Element = T;

    fn for_each_id(&self, mut f: impl FnMut(&T::Id)) {
        for id in self.elements.keys() {
            f(id)
        }
    }

    fn get(&self, id: &T::Id) -> Option<&T> {
        self.elements.get(id)
    }

    fn get_mut(&mut self, id: &T::Id) -> Option<&mut T> {
        self.elements.get_mut(id)
    }

    fn identity_of(&self, element: &T) -> Option<T::Id> {
        Some(element.id())
    }
}

impl<K, V, H> IdentifiedCollection for IndexMap<K, V, H>
where
    K: Clone + Eq + Hash + fmt::Debug,
    H: BuildHasher,
{
    type Id = K;
    type Element = V;

    fn for_each_id(&self, mut f: impl FnMut(&K)) {
        for id in self.keys() {
            f(id)
        }
    }

    fn get(&self, id: &K) -> Option<&V> {
        IndexMap::get(self, id)
    }

    fn get_mut(&mut self, id: &K) -> Option<&mut V> {
        IndexMap::get_mut(self, id)
    }
}

use crate::{
    binding::PropertyBinding,
    error::DerivedStateError,
    lift::{missing_identity, ElementAccessor, LiftedState, Lifter},
    misuse::{lifted_push_error, report_lifted_push, LiftShape, MisusePolicy},
    storage::StateStorage,
};
use indexmap::IndexMap;
use std::{
    collections::{BTreeMap, HashMap},
    fmt,
    hash::{BuildHasher, Hash},
    marker::PhantomData,
};

/// Key-value maps whose values can be visited and looked up by key.
pub trait ValueMap {
    type Key;
    type Value;

    /// Calls `f` on every value, in the iteration order of the map.
    fn for_each_value_mut(&mut self, f: impl FnMut(&mut Self::Value));

    fn value(&self, key: &Self::Key) -> Option<&Self::Value>;

    fn value_mut(&mut self, key: &Self::Key) -> Option<&mut Self::Value>;
}

impl<K: Eq + Hash, V, H: BuildHasher> ValueMap for HashMap<K, V, H> {
    type Key = K;
    type Value = V;

    fn for_each_value_mut(&mut self, f: impl FnMut(&mut V)) {
        self.values_mut().for_each(f)
    }

    fn value(&self, key: &K) -> Option<&V> {
        self.get(key)
    }

    fn value_mut(&mut self, key: &K) -> Option<&mut V> {
        self.get_mut(key)
    }
}

impl<K: Ord, V> ValueMap for BTreeMap<K, V> {
    type Key = K;
    type Value = V;

    fn for_each_value_mut(&mut self, f: impl FnMut(&mut V)) {
        self.values_mut().for_each(f)
    }

    fn value(&self, key: &K) -> Option<&V> {
        self.get(key)
    }

    fn value_mut(&mut self, key: &K) -> Option<&mut V> {
        self.get_mut(key)
    }
}

impl<K: Eq + Hash, V, H: BuildHasher> ValueMap for IndexMap<K, V, H> {
    type Key = K;
    type Value = V;

    fn for_each_value_mut(&mut self, f: impl FnMut(&mut V)) {
        self.values_mut().for_each(f)
    }

    fn value(&self, key: &K) -> Option<&V> {
        self.get(key)
    }

    fn value_mut(&mut self, key: &K) -> Option<&mut V> {
        self.get_mut(key)
    }
}

/// Lifts element bindings over the values of a map of type `M`.
pub struct Values<M> {
    misuse: Option<MisusePolicy>,
    _phantom: PhantomData<fn() -> M>,
}

impl<M> Values<M> {
    pub fn new() -> Values<M> {
        Values {
            misuse: None,
            _phantom: PhantomData,
        }
    }

    /// Lifted bindings react to direct pushes with `policy` instead of the default policy.
    pub fn on_misuse(policy: MisusePolicy) -> Values<M> {
        Values {
            misuse: Some(policy),
            _phantom: PhantomData,
        }
    }
}

impl<M> Default for Values<M> {
    fn default() -> Self {
        Values::new()
    }
}

impl<M> Clone for Values<M> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<M> Copy for Values<M> {}

impl<M> fmt::Debug for Values<M> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("Values").field("misuse", &self.misuse).finish()
    }
}

impl<B, M> Lifter<B> for Values<M>
where
    B: PropertyBinding,
    M: ValueMap<Value = B::Destination>,
{
    type Lifted = ForEachValue<B, M>;

    fn lift(&self, binding: B) -> ForEachValue<B, M> {
        ForEachValue {
            binding,
            misuse: self.misuse,
            _phantom: PhantomData,
        }
    }

    fn lower(&self, lifted: ForEachValue<B, M>) -> B {
        lifted.binding
    }
}

/// Applies a binding to every value of a map.
///
/// Keys are never added or removed. Like [`ForEach`](crate::ForEach), pushing is a misuse and
/// `commit` does nothing.
pub struct ForEachValue<B, M> {
    binding: B,
    misuse: Option<MisusePolicy>,
    _phantom: PhantomData<fn() -> M>,
}

impl<B, M> ForEachValue<B, M>
where
    B: PropertyBinding,
    M: ValueMap<Value = B::Destination>,
{
    pub fn new(binding: B) -> ForEachValue<B, M> {
        ForEachValue {
            binding,
            misuse: None,
            _phantom: PhantomData,
        }
    }

    pub fn on_misuse(mut self, policy: MisusePolicy) -> ForEachValue<B, M> {
        self.misuse = Some(policy);
        self
    }

    pub fn element_binding(&self) -> &B {
        &self.binding
    }

    /// Pulls into the value with the given key. Returns `false` if there is none.
    pub fn pull_value(&self, source: &B::Source, map: &mut M, key: &M::Key) -> bool {
        match map.value_mut(key) {
            Some(value) => {
                self.binding.pull(source, value);
                true
            }
            None => false,
        }
    }

    /// Reports a push without applying the misuse policy.
    pub fn try_push(
        &self,
        _source: &mut B::Source,
        _destination: &M,
    ) -> Result<(), DerivedStateError> {
        Err(lifted_push_error::<B::Source, M>(LiftShape::Map))
    }
}

impl<B: Clone, M> Clone for ForEachValue<B, M> {
    fn clone(&self) -> Self {
        ForEachValue {
            binding: self.binding.clone(),
            misuse: self.misuse,
            _phantom: PhantomData,
        }
    }
}

impl<B: fmt::Debug, M> fmt::Debug for ForEachValue<B, M> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("ForEachValue")
            .field("binding", &self.binding)
            .field("misuse", &self.misuse)
            .finish()
    }
}

impl<B, M> PropertyBinding for ForEachValue<B, M>
where
    B: PropertyBinding,
    M: ValueMap<Value = B::Destination>,
{
    type Source = B::Source;
    type Destination = M;

    fn pull(&self, source: &B::Source, destination: &mut M) {
        destination.for_each_value_mut(|value| self.binding.pull(source, value))
    }

    fn push(&self, _source: &mut B::Source, _destination: &M) {
        report_lifted_push::<B::Source, M>(LiftShape::Map, self.misuse)
    }

    fn commit(&self, _source: &mut B::Source, _destination: &M) {}
}

impl<St, B, M> ElementAccessor for LiftedState<St, Values<M>, B>
where
    B: PropertyBinding,
    B::Destination: Clone,
    M: ValueMap<Value = B::Destination>,
    M::Key: fmt::Debug,
    St: StateStorage<Source = B::Source, Destination = M>,
{
    type Key = M::Key;
    type Element = B::Destination;

    fn element(&self, source: &B::Source, key: &M::Key) -> Option<B::Destination> {
        let mut map = self.storage.materialize(source);
        if !self.lifted.pull_value(source, &mut map, key) {
            return None;
        }
        map.value(key).cloned()
    }

    fn set_element(
        &self,
        source: &mut B::Source,
        key: &M::Key,
        element: B::Destination,
    ) -> Result<(), DerivedStateError> {
        let mut map = self.storage.materialize(source);
        match map.value_mut(key) {
            Some(value) => *value = element,
            None => return Err(missing_identity::<M::Key, M>(key)),
        }
        self.storage.absorb(source, &map);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::binding::BlockBinding;

    #[test]
    fn pulls_every_value() {
        let binding = ForEachValue::<_, BTreeMap<&str, (i32, i32)>>::new(BlockBinding::pull_only(
            |s: &i32, d: &mut (i32, i32)| d.1 = *s,
        ));
        let mut map = BTreeMap::from([("a", (1, 0)), ("b", (2, 0))]);
        binding.pull(&5, &mut map);
        assert_eq!(map, BTreeMap::from([("a", (1, 5)), ("b", (2, 5))]));
        assert!(!binding.pull_value(&5, &mut map, &"c"));
        assert_eq!(map.len(), 2);
    }
}

//! Derived accessors: a storage combined with a property binding.
use crate::{
    binding::{
        BlockBinding, FieldBinding, FieldReadBinding, Identity, PropertyBinding, ReadOnly, Zip,
    },
    erased::{AnyAccessor, AnyBinding, AnyStorage},
    field::{Field, ReadField},
    identified::IdentifiedCollection,
    lift::{Identified, LiftedState, Optional, Sequence, ValueMap, Values},
    storage::{BlockStorage, FieldStorage, InitStorage, ReadOnlyStorage, StateStorage},
};

/// Reads a derived value from a source, and writes it back.
pub trait DerivedAccessor {
    type Source;
    type Destination;

    /// Materializes the destination, then pulls every bound field into it.
    fn get(&self, source: &Self::Source) -> Self::Destination;

    /// Absorbs the destination into the source, then writes every bound field back.
    fn set(&self, source: &mut Self::Source, destination: Self::Destination);

    /// Gets the derived value, passes it to `f`, and sets it back.
    fn modify<R>(
        &self,
        source: &mut Self::Source,
        f: impl FnOnce(&mut Self::Destination) -> R,
    ) -> R
    where
        Self: Sized,
    {
        let mut destination = self.get(source);
        let result = f(&mut destination);
        self.set(source, destination);
        result
    }
}

/// A derived accessor built from a [`StateStorage`] and a [`PropertyBinding`].
///
/// Builder methods consume the accessor and return a new one: clone an accessor to derive
/// several variants from it.
///
/// # Examples
///```ignore
/// let child = DerivedState::from_field(Parent::child)
///     .rw(Parent::name, Child::name)
///     .ro(Parent::count, Child::count);
/// let mut c = child.get(&parent);
/// c.internal = 99;
/// child.set(&mut parent, c);
///```
#[derive(Copy, Clone, Debug)]
pub struct DerivedState<St, B> {
    storage: St,
    binding: B,
}

impl<St, B> DerivedState<St, B> {
    pub fn new(storage: St, binding: B) -> DerivedState<St, B> {
        DerivedState { storage, binding }
    }

    pub fn storage(&self) -> &St {
        &self.storage
    }

    pub fn binding(&self) -> &B {
        &self.binding
    }

    pub fn into_parts(self) -> (St, B) {
        (self.storage, self.binding)
    }
}

impl<St: StateStorage> DerivedState<St, Identity<St::Source, St::Destination>> {
    /// An accessor with the given storage and no bindings.
    pub fn from_storage(storage: St) -> Self {
        DerivedState::new(storage, Identity::new())
    }
}

impl<F> DerivedState<FieldStorage<F>, Identity<F::Root, F::Leaf>>
where
    F: Field,
    F::Leaf: Clone,
{
    /// Stores the derived value in a field of the source.
    pub fn from_field(field: F) -> Self {
        DerivedState::new(FieldStorage(field), Identity::new())
    }
}

impl<S, D, C> DerivedState<InitStorage<S, C>, Identity<S, D>>
where
    C: Fn() -> D,
{
    /// Builds the derived value with `init` on every `get`.
    ///
    /// Fields not owned by a binding are reset on every `get`: nothing is absorbed on `set`.
    pub fn from_fn(init: C) -> Self {
        DerivedState::new(InitStorage::new(init), Identity::new())
    }
}

impl<S, D, G> DerivedState<BlockStorage<S, D, G>, Identity<S, D>>
where
    G: Fn(&S) -> D,
{
    /// Builds the derived value from the source with `extract`, without any way to store it back.
    ///
    /// Edits to fields not owned by a binding are lost on the next `get`.
    pub fn extract(extract: G) -> Self {
        DerivedState::new(BlockStorage::extract_only(extract), Identity::new())
    }
}

impl<S, D, G, E> DerivedState<BlockStorage<S, D, G, E>, Identity<S, D>>
where
    G: Fn(&S) -> D,
    E: Fn(&mut S, &D),
{
    /// Builds the derived value with `extract` and stores it back with `embed`.
    pub fn with(extract: G, embed: E) -> Self {
        DerivedState::new(BlockStorage::new(extract, embed), Identity::new())
    }
}

impl<St, B> DerivedState<St, B>
where
    St: StateStorage,
    B: PropertyBinding<Source = St::Source, Destination = St::Destination>,
{
    /// Appends any binding.
    pub fn bind<C>(self, binding: C) -> DerivedState<St, Zip<B, C>>
    where
        C: PropertyBinding<Source = St::Source, Destination = St::Destination>,
    {
        DerivedState::new(self.storage, Zip::new(self.binding, binding))
    }

    /// Binds a field of the source to a field of the destination, in both directions.
    pub fn rw<SF, DF>(
        self,
        source: SF,
        destination: DF,
    ) -> DerivedState<St, Zip<B, FieldBinding<SF, DF>>>
    where
        SF: Field<Root = St::Source>,
        DF: Field<Root = St::Destination, Leaf = SF::Leaf>,
        SF::Leaf: Clone,
    {
        self.bind(FieldBinding::new(source, destination))
    }

    /// Copies a field of the source into a field of the destination. Never written back.
    pub fn ro<SF, DF>(
        self,
        source: SF,
        destination: DF,
    ) -> DerivedState<St, Zip<B, FieldReadBinding<SF, DF>>>
    where
        SF: ReadField<Root = St::Source>,
        DF: Field<Root = St::Destination, Leaf = SF::Leaf>,
        SF::Leaf: Clone,
    {
        self.bind(FieldReadBinding::new(source, destination))
    }

    /// Appends a pull-only closure binding.
    pub fn on<P>(
        self,
        pull: P,
    ) -> DerivedState<St, Zip<B, BlockBinding<St::Source, St::Destination, P>>>
    where
        P: Fn(&St::Source, &mut St::Destination),
    {
        self.bind(BlockBinding::pull_only(pull))
    }

    /// Appends a closure binding with both directions.
    pub fn on_with<P, Q>(
        self,
        pull: P,
        push: Q,
    ) -> DerivedState<St, Zip<B, BlockBinding<St::Source, St::Destination, P, Q>>>
    where
        P: Fn(&St::Source, &mut St::Destination),
        Q: Fn(&mut St::Source, &St::Destination),
    {
        self.bind(BlockBinding::new(pull, push))
    }

    /// Turns off every write-back of this accessor: `set` becomes a no-op.
    pub fn read_only(self) -> DerivedState<ReadOnlyStorage<St>, ReadOnly<B>> {
        DerivedState::new(ReadOnlyStorage(self.storage), ReadOnly(self.binding))
    }

    /// Hides the concrete type of the storage and of the binding chain.
    pub fn erase(self) -> AnyAccessor<St::Source, St::Destination>
    where
        St: Send + Sync + 'static,
        B: Send + Sync + 'static,
    {
        DerivedState::new(AnyStorage::new(self.storage), AnyBinding::new(self.binding))
    }
}

// Lifting entry points. They are only available before any binding is appended: bindings added
// afterwards apply to the elements.

impl<St, S, E> DerivedState<St, Identity<S, Vec<E>>>
where
    St: StateStorage<Source = S, Destination = Vec<E>>,
{
    /// Applies the following bindings to every element of the derived vector.
    pub fn for_each(self) -> LiftedState<St, Sequence, Identity<S, E>> {
        LiftedState::new(self.storage, Sequence::new(), Identity::new())
    }
}

impl<St, S, M> DerivedState<St, Identity<S, M>>
where
    St: StateStorage<Source = S, Destination = M>,
    M: ValueMap,
{
    /// Applies the following bindings to every value of the derived map.
    pub fn for_each_value(self) -> LiftedState<St, Values<M>, Identity<S, M::Value>> {
        LiftedState::new(self.storage, Values::new(), Identity::new())
    }
}

impl<St, S, C> DerivedState<St, Identity<S, C>>
where
    St: StateStorage<Source = S, Destination = C>,
    C: IdentifiedCollection,
{
    /// Applies the following bindings to every element of the derived identified collection.
    pub fn for_each_identified(self) -> LiftedState<St, Identified<C>, Identity<S, C::Element>> {
        LiftedState::new(self.storage, Identified::new(), Identity::new())
    }
}

impl<St, S, W> DerivedState<St, Identity<S, Option<W>>>
where
    St: StateStorage<Source = S, Destination = Option<W>>,
{
    /// Applies the following bindings to the derived value, when there is one.
    pub fn optional(self) -> LiftedState<St, Optional, Identity<S, W>> {
        LiftedState::new(self.storage, Optional, Identity::new())
    }
}

impl<St, B> DerivedAccessor for DerivedState<St, B>
where
    St: StateStorage,
    B: PropertyBinding<Source = St::Source, Destination = St::Destination>,
{
    type Source = St::Source;
    type Destination = St::Destination;

    fn get(&self, source: &St::Source) -> St::Destination {
        let mut destination = self.storage.materialize(source);
        self.binding.pull(source, &mut destination);
        destination
    }

    fn set(&self, source: &mut St::Source, destination: St::Destination) {
        self.storage.absorb(source, &destination);
        self.binding.commit(source, &destination);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::field;

    #[derive(Clone, Debug, Default, PartialEq)]
    struct Child {
        name: String,
        count: i32,
        internal: i32,
    }

    #[derive(Clone, Debug, Default, PartialEq)]
    struct Parent {
        name: String,
        count: i32,
        child: Child,
    }

    fn parent() -> Parent {
        Parent {
            name: "Root".to_string(),
            count: 1,
            child: Child::default(),
        }
    }

    #[test]
    fn storage_runs_before_bindings() {
        // the child field holds a stale name, the binding must win
        let mut source = parent();
        source.child.name = "stale".to_string();
        let accessor = DerivedState::from_field(field!(Parent => child))
            .rw(field!(Parent => name), field!(Child => name));
        assert_eq!(accessor.get(&source).name, "Root");
    }

    #[test]
    fn modify_returns_closure_result() {
        let mut source = parent();
        let accessor = DerivedState::from_field(field!(Parent => child))
            .rw(field!(Parent => count), field!(Child => count));
        let previous = accessor.modify(&mut source, |child| std::mem::replace(&mut child.count, 5));
        assert_eq!(previous, 1);
        assert_eq!(source.count, 5);
    }

    #[test]
    fn read_only_accessor_never_writes() {
        let mut source = parent();
        let accessor = DerivedState::from_field(field!(Parent => child))
            .rw(field!(Parent => count), field!(Child => count))
            .read_only();
        accessor.modify(&mut source, |child| {
            child.count = 10;
            child.internal = 10;
        });
        assert_eq!(source, parent());
    }

    #[test]
    fn on_with_closures() {
        let mut source = parent();
        let accessor = DerivedState::from_field(field!(Parent => child)).on_with(
            |p: &Parent, c: &mut Child| c.count = p.count * 10,
            |p: &mut Parent, c: &Child| p.count = c.count / 10,
        );
        assert_eq!(accessor.get(&source).count, 10);
        accessor.modify(&mut source, |child| child.count = 30);
        assert_eq!(source.count, 3);
    }
}

//! Lifting element bindings over container shapes.
//!
//! A [`Lifter`] turns a binding between a source and an element into a binding between the same
//! source and a container of elements. Every element is synchronized with the _same_ source.
//!
//! Lifted accessors are built with [`LiftedState`], which keeps the element binding apart from
//! the lift, so that `ro`, `on` (and `rw`, `on_with` for lifts that write back) keep appending
//! element-level bindings after the accessor has been lifted.
use crate::{
    binding::{BlockBinding, FieldBinding, FieldReadBinding, Identity, PropertyBinding, Zip},
    erased::{AnyAccessor, AnyBinding, AnyStorage},
    error::DerivedStateError,
    field::{Field, ReadField},
    identified::IdentifiedCollection,
    state::{DerivedAccessor, DerivedState},
    storage::StateStorage,
};
use std::{fmt, marker::PhantomData};

mod identified;
mod map;
mod optional;
mod sequence;

pub use identified::{ForEachIdentified, Identified};
pub use map::{ForEachValue, ValueMap, Values};
pub use optional::{Optional, OptionalBinding};
pub use sequence::{ForEach, Sequence};

/// Lifts element bindings of type `B` over a container shape.
pub trait Lifter<B: PropertyBinding> {
    /// The container-level binding.
    type Lifted: PropertyBinding<Source = B::Source>;

    fn lift(&self, binding: B) -> Self::Lifted;

    /// Recovers the element binding.
    fn lower(&self, lifted: Self::Lifted) -> B;
}

/// Lifts whose container-level `push` forwards to the element binding.
///
/// Only those accept element bindings that write back (`rw`, `on_with`).
pub trait WritesBack {}

/// Nested lift: `Then(outer, inner)` lifts with `inner` then with `outer`.
///
/// For instance `Then(Optional, Sequence)` lifts an element binding over `Option<Vec<_>>`.
#[derive(Copy, Clone, Debug, Default)]
pub struct Then<O, I>(pub O, pub I);

impl<O, I, B> Lifter<B> for Then<O, I>
where
    B: PropertyBinding,
    I: Lifter<B>,
    O: Lifter<I::Lifted>,
{
    type Lifted = O::Lifted;

    fn lift(&self, binding: B) -> O::Lifted {
        self.0.lift(self.1.lift(binding))
    }

    fn lower(&self, lifted: O::Lifted) -> B {
        self.1.lower(self.0.lower(lifted))
    }
}

impl<O: WritesBack, I: WritesBack> WritesBack for Then<O, I> {}

/// Derived accessor over a container, with element-level bindings.
///
/// Obtained from the lifting methods of [`DerivedState`] (`for_each`, `for_each_value`,
/// `for_each_identified`, `optional`). The same four methods on a lifted accessor with no
/// element binding nest the lift.
pub struct LiftedState<St, L, B>
where
    B: PropertyBinding,
    L: Lifter<B>,
{
    storage: St,
    lifter: L,
    lifted: L::Lifted,
    _phantom: PhantomData<fn() -> B>,
}

impl<St, L, B> Clone for LiftedState<St, L, B>
where
    St: Clone,
    B: PropertyBinding,
    L: Lifter<B> + Clone,
    L::Lifted: Clone,
{
    fn clone(&self) -> Self {
        LiftedState {
            storage: self.storage.clone(),
            lifter: self.lifter.clone(),
            lifted: self.lifted.clone(),
            _phantom: PhantomData,
        }
    }
}

impl<St, L, B> fmt::Debug for LiftedState<St, L, B>
where
    St: fmt::Debug,
    B: PropertyBinding,
    L: Lifter<B> + fmt::Debug,
    L::Lifted: fmt::Debug,
{
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("LiftedState")
            .field("storage", &self.storage)
            .field("lifter", &self.lifter)
            .field("lifted", &self.lifted)
            .finish()
    }
}

impl<St, L, B> LiftedState<St, L, B>
where
    B: PropertyBinding,
    L: Lifter<B>,
{
    pub fn new(storage: St, lifter: L, binding: B) -> LiftedState<St, L, B> {
        let lifted = lifter.lift(binding);
        LiftedState {
            storage,
            lifter,
            lifted,
            _phantom: PhantomData,
        }
    }

    pub fn storage(&self) -> &St {
        &self.storage
    }

    pub fn lifter(&self) -> &L {
        &self.lifter
    }

    /// The container-level binding.
    pub fn binding(&self) -> &L::Lifted {
        &self.lifted
    }

    /// Appends any element binding.
    pub fn bind<C>(self, binding: C) -> LiftedState<St, L, Zip<B, C>>
    where
        C: PropertyBinding<Source = B::Source, Destination = B::Destination>,
        L: Lifter<Zip<B, C>>,
    {
        let LiftedState {
            storage,
            lifter,
            lifted,
            ..
        } = self;
        let element = <L as Lifter<B>>::lower(&lifter, lifted);
        let lifted = <L as Lifter<Zip<B, C>>>::lift(&lifter, Zip::new(element, binding));
        LiftedState {
            storage,
            lifter,
            lifted,
            _phantom: PhantomData,
        }
    }

    /// Copies a field of the source into a field of every element.
    pub fn ro<SF, DF>(
        self,
        source: SF,
        destination: DF,
    ) -> LiftedState<St, L, Zip<B, FieldReadBinding<SF, DF>>>
    where
        SF: ReadField<Root = B::Source>,
        DF: Field<Root = B::Destination, Leaf = SF::Leaf>,
        SF::Leaf: Clone,
        L: Lifter<Zip<B, FieldReadBinding<SF, DF>>>,
    {
        self.bind(FieldReadBinding::new(source, destination))
    }

    /// Appends a pull-only closure binding on every element.
    pub fn on<P>(
        self,
        pull: P,
    ) -> LiftedState<St, L, Zip<B, BlockBinding<B::Source, B::Destination, P>>>
    where
        P: Fn(&B::Source, &mut B::Destination),
        L: Lifter<Zip<B, BlockBinding<B::Source, B::Destination, P>>>,
    {
        self.bind(BlockBinding::pull_only(pull))
    }

    /// Binds a field of the source to a field of the element, in both directions.
    pub fn rw<SF, DF>(
        self,
        source: SF,
        destination: DF,
    ) -> LiftedState<St, L, Zip<B, FieldBinding<SF, DF>>>
    where
        SF: Field<Root = B::Source>,
        DF: Field<Root = B::Destination, Leaf = SF::Leaf>,
        SF::Leaf: Clone,
        L: Lifter<Zip<B, FieldBinding<SF, DF>>> + WritesBack,
    {
        self.bind(FieldBinding::new(source, destination))
    }

    /// Appends a closure binding with both directions on the element.
    pub fn on_with<P, Q>(
        self,
        pull: P,
        push: Q,
    ) -> LiftedState<St, L, Zip<B, BlockBinding<B::Source, B::Destination, P, Q>>>
    where
        P: Fn(&B::Source, &mut B::Destination),
        Q: Fn(&mut B::Source, &B::Destination),
        L: Lifter<Zip<B, BlockBinding<B::Source, B::Destination, P, Q>>> + WritesBack,
    {
        self.bind(BlockBinding::new(pull, push))
    }

    /// Forgets the element binding: returns a plain accessor with the container-level binding.
    pub fn finish(self) -> DerivedState<St, L::Lifted> {
        DerivedState::new(self.storage, self.lifted)
    }

    /// Hides the concrete type of the storage, of the lift and of the element bindings.
    pub fn erase(self) -> AnyAccessor<B::Source, St::Destination>
    where
        St: StateStorage<Source = B::Source> + Send + Sync + 'static,
        L::Lifted: PropertyBinding<Destination = St::Destination> + Send + Sync + 'static,
    {
        DerivedState::new(AnyStorage::new(self.storage), AnyBinding::new(self.lifted))
    }
}

// Nested lifts. Like the entry points on `DerivedState`, they are only available before any
// element binding is appended.

impl<St, L, S, E> LiftedState<St, L, Identity<S, Vec<E>>>
where
    L: Lifter<Identity<S, Vec<E>>>,
{
    /// Lifts again over the vector elements.
    pub fn for_each(self) -> LiftedState<St, Then<L, Sequence>, Identity<S, E>>
    where
        L: Lifter<ForEach<Identity<S, E>>>,
    {
        LiftedState::new(self.storage, Then(self.lifter, Sequence::new()), Identity::new())
    }
}

impl<St, L, S, M> LiftedState<St, L, Identity<S, M>>
where
    L: Lifter<Identity<S, M>>,
    M: ValueMap,
{
    /// Lifts again over the map values.
    pub fn for_each_value(self) -> LiftedState<St, Then<L, Values<M>>, Identity<S, M::Value>>
    where
        L: Lifter<ForEachValue<Identity<S, M::Value>, M>>,
    {
        LiftedState::new(self.storage, Then(self.lifter, Values::new()), Identity::new())
    }
}

impl<St, L, S, C> LiftedState<St, L, Identity<S, C>>
where
    L: Lifter<Identity<S, C>>,
    C: IdentifiedCollection,
{
    /// Lifts again over the elements of the identified collection.
    pub fn for_each_identified(
        self,
    ) -> LiftedState<St, Then<L, Identified<C>>, Identity<S, C::Element>>
    where
        L: Lifter<ForEachIdentified<Identity<S, C::Element>, C>>,
    {
        LiftedState::new(self.storage, Then(self.lifter, Identified::new()), Identity::new())
    }
}

impl<St, L, S, W> LiftedState<St, L, Identity<S, Option<W>>>
where
    L: Lifter<Identity<S, Option<W>>>,
{
    /// Lifts again over the optional value.
    pub fn optional(self) -> LiftedState<St, Then<L, Optional>, Identity<S, W>>
    where
        L: Lifter<OptionalBinding<Identity<S, W>>>,
    {
        LiftedState::new(self.storage, Then(self.lifter, Optional), Identity::new())
    }
}

impl<St, L, B> DerivedAccessor for LiftedState<St, L, B>
where
    B: PropertyBinding,
    L: Lifter<B>,
    St: StateStorage<
        Source = B::Source,
        Destination = <L::Lifted as PropertyBinding>::Destination,
    >,
{
    type Source = B::Source;
    type Destination = St::Destination;

    fn get(&self, source: &B::Source) -> St::Destination {
        let mut destination = self.storage.materialize(source);
        self.lifted.pull(source, &mut destination);
        destination
    }

    fn set(&self, source: &mut B::Source, destination: St::Destination) {
        self.storage.absorb(source, &destination);
        self.lifted.commit(source, &destination);
    }
}

/// Access to a single element of a derived container, by key or identity.
pub trait ElementAccessor: DerivedAccessor {
    type Key;
    type Element;

    /// Derives the container and returns the element with the given key, with the element
    /// bindings applied. `None` if there is no such element.
    fn element(&self, source: &Self::Source, key: &Self::Key) -> Option<Self::Element>;

    /// Replaces one element of the derived container and stores the container back.
    ///
    /// Fails with [`DerivedStateError::MissingIdentity`] without touching the source if there
    /// is no such element: elements are never inserted. Fails with
    /// [`DerivedStateError::IdentityChanged`] if `element` carries another identity than `key`.
    fn set_element(
        &self,
        source: &mut Self::Source,
        key: &Self::Key,
        element: Self::Element,
    ) -> Result<(), DerivedStateError>;
}

pub(crate) fn missing_identity<K: fmt::Debug, C>(key: &K) -> DerivedStateError {
    DerivedStateError::MissingIdentity {
        id: format!("{:?}", key),
        collection: std::any::type_name::<C>(),
    }
}

//! Property bindings: field-level synchronization between a source and a destination.
//!
//! A binding _pulls_ the fields it owns from the source into the destination, and _pushes_
//! them back from the destination into the source. Bindings are combined with [`Zip`]; when
//! two combined bindings own the same destination field, the one appended last wins.
use crate::{
    erased::AnyBinding,
    field::{Field, ReadField},
    identified::IdentifiedCollection,
    lift::{ForEach, ForEachIdentified, ForEachValue, OptionalBinding, ValueMap},
};
use std::fmt;
use std::marker::PhantomData;

/// Keeps some fields of `Destination` in sync with fields of `Source`.
pub trait PropertyBinding {
    type Source;
    type Destination;

    /// Copies the fields owned by this binding from `source` into `destination`.
    ///
    /// Must only write fields this binding owns, and must be idempotent.
    fn pull(&self, source: &Self::Source, destination: &mut Self::Destination);

    /// Copies the fields owned by this binding from `destination` back into `source`.
    fn push(&self, source: &mut Self::Source, destination: &Self::Destination);

    /// Write-back performed when a whole derived value is set through an accessor.
    ///
    /// Same as `push`, except for collection-lifted bindings, which leave the container to the
    /// storage and commit nothing.
    fn commit(&self, source: &mut Self::Source, destination: &Self::Destination) {
        self.push(source, destination)
    }
}

impl<B: PropertyBinding + ?Sized> PropertyBinding for &B {
    type Source = B::Source;
    type Destination = B::Destination;

    fn pull(&self, source: &B::Source, destination: &mut B::Destination) {
        (**self).pull(source, destination)
    }

    fn push(&self, source: &mut B::Source, destination: &B::Destination) {
        (**self).push(source, destination)
    }

    fn commit(&self, source: &mut B::Source, destination: &B::Destination) {
        (**self).commit(source, destination)
    }
}

//--------------------------------------------------------------------------------------------------

/// The binding that owns no field.
pub struct Identity<S, D>(PhantomData<fn(&S, &mut D)>);

impl<S, D> Identity<S, D> {
    pub fn new() -> Identity<S, D> {
        Identity(PhantomData)
    }
}

impl<S, D> Default for Identity<S, D> {
    fn default() -> Self {
        Identity::new()
    }
}

// #26925
impl<S, D> Clone for Identity<S, D> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<S, D> Copy for Identity<S, D> {}

impl<S, D> fmt::Debug for Identity<S, D> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str("Identity")
    }
}

impl<S, D> PropertyBinding for Identity<S, D> {
    type Source = S;
    type Destination = D;

    fn pull(&self, _source: &S, _destination: &mut D) {}

    fn push(&self, _source: &mut S, _destination: &D) {}
}

//--------------------------------------------------------------------------------------------------

/// Binds one field of the source to one field of the destination, in both directions.
#[derive(Copy, Clone, Debug)]
pub struct FieldBinding<SF, DF> {
    source: SF,
    destination: DF,
}

impl<SF, DF> FieldBinding<SF, DF>
where
    SF: Field,
    DF: Field<Leaf = SF::Leaf>,
    SF::Leaf: Clone,
{
    pub fn new(source: SF, destination: DF) -> FieldBinding<SF, DF> {
        FieldBinding { source, destination }
    }
}

impl<SF, DF> PropertyBinding for FieldBinding<SF, DF>
where
    SF: Field,
    DF: Field<Leaf = SF::Leaf>,
    SF::Leaf: Clone,
{
    type Source = SF::Root;
    type Destination = DF::Root;

    fn pull(&self, source: &SF::Root, destination: &mut DF::Root) {
        *self.destination.get_mut(destination) = self.source.get(source).clone();
    }

    fn push(&self, source: &mut SF::Root, destination: &DF::Root) {
        *self.source.get_mut(source) = self.destination.get(destination).clone();
    }
}

/// Copies one field of the source into one field of the destination. Pushing is a no-op.
///
/// The source path only needs to be readable.
#[derive(Copy, Clone, Debug)]
pub struct FieldReadBinding<SF, DF> {
    source: SF,
    destination: DF,
}

impl<SF, DF> FieldReadBinding<SF, DF>
where
    SF: ReadField,
    DF: Field<Leaf = SF::Leaf>,
    SF::Leaf: Clone,
{
    pub fn new(source: SF, destination: DF) -> FieldReadBinding<SF, DF> {
        FieldReadBinding { source, destination }
    }
}

impl<SF, DF> PropertyBinding for FieldReadBinding<SF, DF>
where
    SF: ReadField,
    DF: Field<Leaf = SF::Leaf>,
    SF::Leaf: Clone,
{
    type Source = SF::Root;
    type Destination = DF::Root;

    fn pull(&self, source: &SF::Root, destination: &mut DF::Root) {
        *self.destination.get_mut(destination) = self.source.get(source).clone();
    }

    fn push(&self, _source: &mut SF::Root, _destination: &DF::Root) {}
}

//--------------------------------------------------------------------------------------------------

/// Push function of a [`BlockBinding`] created without one.
pub type NoPush<S, D> = fn(&mut S, &D);

fn no_push<S, D>(_source: &mut S, _destination: &D) {}

/// A binding defined by a pair of closures.
pub struct BlockBinding<S, D, P, Q = NoPush<S, D>> {
    pull: P,
    push: Q,
    _phantom: PhantomData<fn(&S, &mut D)>,
}

impl<S, D, P> BlockBinding<S, D, P>
where
    P: Fn(&S, &mut D),
{
    /// A binding that only pulls.
    pub fn pull_only(pull: P) -> BlockBinding<S, D, P> {
        BlockBinding {
            pull,
            push: no_push::<S, D>,
            _phantom: PhantomData,
        }
    }
}

impl<S, D, P, Q> BlockBinding<S, D, P, Q>
where
    P: Fn(&S, &mut D),
    Q: Fn(&mut S, &D),
{
    pub fn new(pull: P, push: Q) -> BlockBinding<S, D, P, Q> {
        BlockBinding {
            pull,
            push,
            _phantom: PhantomData,
        }
    }
}

impl<S, D, P: Clone, Q: Clone> Clone for BlockBinding<S, D, P, Q> {
    fn clone(&self) -> Self {
        BlockBinding {
            pull: self.pull.clone(),
            push: self.push.clone(),
            _phantom: PhantomData,
        }
    }
}

impl<S, D, P, Q> fmt::Debug for BlockBinding<S, D, P, Q> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("BlockBinding").finish_non_exhaustive()
    }
}

impl<S, D, P, Q> PropertyBinding for BlockBinding<S, D, P, Q>
where
    P: Fn(&S, &mut D),
    Q: Fn(&mut S, &D),
{
    type Source = S;
    type Destination = D;

    fn pull(&self, source: &S, destination: &mut D) {
        (self.pull)(source, destination)
    }

    fn push(&self, source: &mut S, destination: &D) {
        (self.push)(source, destination)
    }
}

//--------------------------------------------------------------------------------------------------

/// Suppresses the write-back of a binding.
#[derive(Copy, Clone, Debug)]
pub struct ReadOnly<B>(pub B);

impl<B: PropertyBinding> PropertyBinding for ReadOnly<B> {
    type Source = B::Source;
    type Destination = B::Destination;

    fn pull(&self, source: &B::Source, destination: &mut B::Destination) {
        self.0.pull(source, destination)
    }

    fn push(&self, _source: &mut B::Source, _destination: &B::Destination) {}

    fn commit(&self, _source: &mut B::Source, _destination: &B::Destination) {}
}

/// Sequential combination of two bindings over the same source and destination.
///
/// Both `pull` and `push` run `first` then `second`: on overlapping fields, `second` wins.
#[derive(Copy, Clone, Debug)]
pub struct Zip<A, B> {
    first: A,
    second: B,
}

impl<A, B> Zip<A, B> {
    pub fn new(first: A, second: B) -> Zip<A, B> {
        Zip { first, second }
    }

    pub fn first(&self) -> &A {
        &self.first
    }

    pub fn second(&self) -> &B {
        &self.second
    }
}

impl<A, B> PropertyBinding for Zip<A, B>
where
    A: PropertyBinding,
    B: PropertyBinding<Source = A::Source, Destination = A::Destination>,
{
    type Source = A::Source;
    type Destination = A::Destination;

    fn pull(&self, source: &A::Source, destination: &mut A::Destination) {
        self.first.pull(source, destination);
        self.second.pull(source, destination);
    }

    fn push(&self, source: &mut A::Source, destination: &A::Destination) {
        self.first.push(source, destination);
        self.second.push(source, destination);
    }

    fn commit(&self, source: &mut A::Source, destination: &A::Destination) {
        self.first.commit(source, destination);
        self.second.commit(source, destination);
    }
}

//--------------------------------------------------------------------------------------------------

/// Combinators on bindings.
pub trait PropertyBindingExt: PropertyBinding + Sized {
    /// Runs `other` after this binding. See [`Zip`].
    fn zip<C>(self, other: C) -> Zip<Self, C>
    where
        C: PropertyBinding<Source = Self::Source, Destination = Self::Destination>,
    {
        Zip::new(self, other)
    }

    fn read_only(self) -> ReadOnly<Self> {
        ReadOnly(self)
    }

    /// Lifts this binding over `Vec<Self::Destination>`.
    fn for_each(self) -> ForEach<Self> {
        ForEach::new(self)
    }

    /// Lifts this binding over the values of a map.
    fn for_each_value<M>(self) -> ForEachValue<Self, M>
    where
        M: ValueMap<Value = Self::Destination>,
    {
        ForEachValue::new(self)
    }

    /// Lifts this binding over an identified collection.
    fn for_each_identified<C>(self) -> ForEachIdentified<Self, C>
    where
        C: IdentifiedCollection<Element = Self::Destination>,
    {
        ForEachIdentified::new(self)
    }

    /// Lifts this binding over `Option<Self::Destination>`.
    fn optional(self) -> OptionalBinding<Self> {
        OptionalBinding(self)
    }

    fn erase(self) -> AnyBinding<Self::Source, Self::Destination>
    where
        Self: Send + Sync + 'static,
    {
        AnyBinding::new(self)
    }
}

impl<B: PropertyBinding> PropertyBindingExt for B {}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::field;

    #[derive(Clone, Debug, Default, PartialEq)]
    struct Source {
        name: String,
        count: i32,
    }

    #[derive(Clone, Debug, Default, PartialEq)]
    struct Destination {
        name: String,
        count: i32,
        note: String,
    }

    #[test]
    fn field_binding_round_trip() {
        let binding = FieldBinding::new(field!(Source => name), field!(Destination => name));
        let mut source = Source {
            name: "source".to_string(),
            count: 1,
        };
        let mut destination = Destination::default();
        binding.pull(&source, &mut destination);
        assert_eq!(destination.name, "source");

        destination.name = "edited".to_string();
        binding.push(&mut source, &destination);
        assert_eq!(source.name, "edited");
        assert_eq!(source.count, 1);
    }

    #[test]
    fn read_binding_never_pushes() {
        let binding = FieldReadBinding::new(field!(Source => count), field!(Destination => count));
        let mut source = Source {
            name: String::new(),
            count: 7,
        };
        let mut destination = Destination::default();
        binding.pull(&source, &mut destination);
        assert_eq!(destination.count, 7);

        destination.count = 8;
        binding.push(&mut source, &destination);
        binding.commit(&mut source, &destination);
        assert_eq!(source.count, 7);
    }

    #[test]
    fn zip_last_appended_wins() {
        let first =
            BlockBinding::pull_only(|_: &Source, d: &mut Destination| d.note = "first".to_string());
        let second = BlockBinding::pull_only(|_: &Source, d: &mut Destination| {
            d.note = "second".to_string()
        });
        let zipped = Zip::new(first, second);
        let mut destination = Destination::default();
        zipped.pull(&Source::default(), &mut destination);
        assert_eq!(destination.note, "second");
    }

    #[test]
    fn read_only_suppresses_block_push() {
        let binding = ReadOnly(BlockBinding::new(
            |s: &Source, d: &mut Destination| d.count = s.count,
            |s: &mut Source, d: &Destination| s.count = d.count,
        ));
        let mut source = Source::default();
        let destination = Destination {
            count: 3,
            ..Default::default()
        };
        binding.push(&mut source, &destination);
        assert_eq!(source.count, 0);
    }

    #[test]
    fn optional_skips_absent_value() {
        let binding =
            FieldBinding::new(field!(Source => count), field!(Destination => count)).optional();
        let mut source = Source {
            name: String::new(),
            count: 4,
        };
        let mut absent: Option<Destination> = None;
        binding.pull(&source, &mut absent);
        binding.push(&mut source, &absent);
        assert_eq!(absent, None);
        assert_eq!(source.count, 4);

        let mut present = Some(Destination::default());
        binding.pull(&source, &mut present);
        assert_eq!(present.as_ref().map(|d| d.count), Some(4));
    }
}

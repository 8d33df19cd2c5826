//! State storage: whole-value construction and reabsorption of derived state.
//!
//! The storage is the only authority over the fields of the derived value that no binding owns
//! (its _internal_ state). `materialize` builds a derived value from the source, `absorb`
//! writes back whatever the next `materialize` needs to reproduce those internal fields.
use crate::{erased::AnyStorage, field::Field};
use std::fmt;
use std::marker::PhantomData;

/// Produces a `Destination` from a `Source` and reabsorbs it.
pub trait StateStorage {
    type Source;
    type Destination;

    fn materialize(&self, source: &Self::Source) -> Self::Destination;

    fn absorb(&self, source: &mut Self::Source, destination: &Self::Destination);
}

impl<St: StateStorage + ?Sized> StateStorage for &St {
    type Source = St::Source;
    type Destination = St::Destination;

    fn materialize(&self, source: &St::Source) -> St::Destination {
        (**self).materialize(source)
    }

    fn absorb(&self, source: &mut St::Source, destination: &St::Destination) {
        (**self).absorb(source, destination)
    }
}

/// Stores the derived value in a field of the source whose type is the destination type.
///
/// `absorb` overwrites the field.
#[derive(Copy, Clone, Debug)]
pub struct FieldStorage<F>(pub F);

impl<F> StateStorage for FieldStorage<F>
where
    F: Field,
    F::Leaf: Clone,
{
    type Source = F::Root;
    type Destination = F::Leaf;

    fn materialize(&self, source: &F::Root) -> F::Leaf {
        self.0.get(source).clone()
    }

    fn absorb(&self, source: &mut F::Root, destination: &F::Leaf) {
        *self.0.get_mut(source) = destination.clone();
    }
}

/// Builds a fresh derived value with a constructor that does not look at the source.
///
/// Nothing is absorbed: internal fields of the derived value are reset on every
/// `materialize`. Use this only when bindings cover every field that matters.
pub struct InitStorage<S, C> {
    init: C,
    _phantom: PhantomData<fn(&S)>,
}

impl<S, C, D> InitStorage<S, C>
where
    C: Fn() -> D,
{
    pub fn new(init: C) -> InitStorage<S, C> {
        InitStorage {
            init,
            _phantom: PhantomData,
        }
    }
}

impl<S, C: Clone> Clone for InitStorage<S, C> {
    fn clone(&self) -> Self {
        InitStorage {
            init: self.init.clone(),
            _phantom: PhantomData,
        }
    }
}

impl<S, C> fmt::Debug for InitStorage<S, C> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("InitStorage").finish_non_exhaustive()
    }
}

impl<S, C, D> StateStorage for InitStorage<S, C>
where
    C: Fn() -> D,
{
    type Source = S;
    type Destination = D;

    fn materialize(&self, _source: &S) -> D {
        (self.init)()
    }

    fn absorb(&self, _source: &mut S, _destination: &D) {}
}

/// Embed function of a [`BlockStorage`] created without one.
pub type NoEmbed<S, D> = fn(&mut S, &D);

fn no_embed<S, D>(_source: &mut S, _destination: &D) {}

/// A storage defined by an `extract` closure and an `embed` closure.
///
/// When created with [`BlockStorage::extract_only`], `absorb` does nothing: edits to internal
/// fields of the derived value are lost on the next `materialize`. That mode has to be asked
/// for explicitly.
pub struct BlockStorage<S, D, G, E = NoEmbed<S, D>> {
    extract: G,
    embed: E,
    _phantom: PhantomData<fn(&S) -> D>,
}

impl<S, D, G> BlockStorage<S, D, G>
where
    G: Fn(&S) -> D,
{
    pub fn extract_only(extract: G) -> BlockStorage<S, D, G> {
        BlockStorage {
            extract,
            embed: no_embed::<S, D>,
            _phantom: PhantomData,
        }
    }
}

impl<S, D, G, E> BlockStorage<S, D, G, E>
where
    G: Fn(&S) -> D,
    E: Fn(&mut S, &D),
{
    pub fn new(extract: G, embed: E) -> BlockStorage<S, D, G, E> {
        BlockStorage {
            extract,
            embed,
            _phantom: PhantomData,
        }
    }
}

impl<S, D, G: Clone, E: Clone> Clone for BlockStorage<S, D, G, E> {
    fn clone(&self) -> Self {
        BlockStorage {
            extract: self.extract.clone(),
            embed: self.embed.clone(),
            _phantom: PhantomData,
        }
    }
}

impl<S, D, G, E> fmt::Debug for BlockStorage<S, D, G, E> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("BlockStorage").finish_non_exhaustive()
    }
}

impl<S, D, G, E> StateStorage for BlockStorage<S, D, G, E>
where
    G: Fn(&S) -> D,
    E: Fn(&mut S, &D),
{
    type Source = S;
    type Destination = D;

    fn materialize(&self, source: &S) -> D {
        (self.extract)(source)
    }

    fn absorb(&self, source: &mut S, destination: &D) {
        (self.embed)(source, destination)
    }
}

/// Suppresses `absorb` on a storage.
#[derive(Copy, Clone, Debug)]
pub struct ReadOnlyStorage<St>(pub St);

impl<St: StateStorage> StateStorage for ReadOnlyStorage<St> {
    type Source = St::Source;
    type Destination = St::Destination;

    fn materialize(&self, source: &St::Source) -> St::Destination {
        self.0.materialize(source)
    }

    fn absorb(&self, _source: &mut St::Source, _destination: &St::Destination) {}
}

/// Combinators on storages.
pub trait StateStorageExt: StateStorage + Sized {
    fn read_only(self) -> ReadOnlyStorage<Self> {
        ReadOnlyStorage(self)
    }

    fn erase(self) -> AnyStorage<Self::Source, Self::Destination>
    where
        Self: Send + Sync + 'static,
    {
        AnyStorage::new(self)
    }
}

impl<St: StateStorage> StateStorageExt for St {}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::field;

    #[derive(Clone, Debug, Default, PartialEq)]
    struct Child {
        value: i32,
    }

    #[derive(Clone, Debug, Default, PartialEq)]
    struct Parent {
        child: Child,
        mirror: i32,
    }

    #[test]
    fn field_storage_overwrites_field() {
        let storage = FieldStorage(field!(Parent => child));
        let mut parent = Parent::default();
        storage.absorb(&mut parent, &Child { value: 4 });
        assert_eq!(storage.materialize(&parent), Child { value: 4 });
    }

    #[test]
    fn extract_only_discards_internal_state() {
        let storage = BlockStorage::extract_only(|p: &Parent| Child { value: p.mirror });
        let mut parent = Parent::default();
        storage.absorb(&mut parent, &Child { value: 10 });
        assert_eq!(parent, Parent::default());
    }

    #[test]
    fn read_only_storage_never_absorbs() {
        let storage = ReadOnlyStorage(FieldStorage(field!(Parent => child)));
        let mut parent = Parent::default();
        storage.absorb(&mut parent, &Child { value: 4 });
        assert_eq!(parent.child, Child::default());
    }
}

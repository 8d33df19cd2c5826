//! Type-erased storages, bindings and accessors.
//!
//! Erased values behave exactly like the values they were built from. They are cheap to clone
//! and can be sent across threads.
use crate::{binding::PropertyBinding, state::DerivedState, storage::StateStorage};
use std::{fmt, sync::Arc};

/// A [`StateStorage`] of unknown concrete type.
pub struct AnyStorage<S, D>(Arc<dyn StateStorage<Source = S, Destination = D> + Send + Sync>);

impl<S, D> AnyStorage<S, D> {
    pub fn new<St>(storage: St) -> AnyStorage<S, D>
    where
        St: StateStorage<Source = S, Destination = D> + Send + Sync + 'static,
    {
        tracing::trace!("erasing storage {}", std::any::type_name::<St>());
        AnyStorage(Arc::new(storage))
    }
}

impl<S, D> Clone for AnyStorage<S, D> {
    fn clone(&self) -> Self {
        AnyStorage(self.0.clone())
    }
}

impl<S, D> fmt::Debug for AnyStorage<S, D> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "AnyStorage({} -> {})",
            std::any::type_name::<S>(),
            std::any::type_name::<D>()
        )
    }
}

impl<S, D> StateStorage for AnyStorage<S, D> {
    type Source = S;
    type Destination = D;

    fn materialize(&self, source: &S) -> D {
        self.0.materialize(source)
    }

    fn absorb(&self, source: &mut S, destination: &D) {
        self.0.absorb(source, destination)
    }
}

/// A [`PropertyBinding`] of unknown concrete type.
pub struct AnyBinding<S, D>(Arc<dyn PropertyBinding<Source = S, Destination = D> + Send + Sync>);

impl<S, D> AnyBinding<S, D> {
    pub fn new<B>(binding: B) -> AnyBinding<S, D>
    where
        B: PropertyBinding<Source = S, Destination = D> + Send + Sync + 'static,
    {
        tracing::trace!("erasing binding {}", std::any::type_name::<B>());
        AnyBinding(Arc::new(binding))
    }
}

impl<S, D> Clone for AnyBinding<S, D> {
    fn clone(&self) -> Self {
        AnyBinding(self.0.clone())
    }
}

impl<S, D> fmt::Debug for AnyBinding<S, D> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "AnyBinding({} -> {})",
            std::any::type_name::<S>(),
            std::any::type_name::<D>()
        )
    }
}

impl<S, D> PropertyBinding for AnyBinding<S, D> {
    type Source = S;
    type Destination = D;

    fn pull(&self, source: &S, destination: &mut D) {
        self.0.pull(source, destination)
    }

    fn push(&self, source: &mut S, destination: &D) {
        self.0.push(source, destination)
    }

    fn commit(&self, source: &mut S, destination: &D) {
        self.0.commit(source, destination)
    }
}

/// A derived accessor of unknown concrete type.
pub type AnyAccessor<S, D> = DerivedState<AnyStorage<S, D>, AnyBinding<S, D>>;

use crate::{
    binding::PropertyBinding,
    lift::{Lifter, WritesBack},
};

/// Lifts element bindings over `Option`.
#[derive(Copy, Clone, Debug, Default)]
pub struct Optional;

impl<B: PropertyBinding> Lifter<B> for Optional {
    type Lifted = OptionalBinding<B>;

    fn lift(&self, binding: B) -> OptionalBinding<B> {
        OptionalBinding(binding)
    }

    fn lower(&self, lifted: OptionalBinding<B>) -> B {
        lifted.0
    }
}

impl WritesBack for Optional {}

/// Applies a binding to the contents of an `Option`, if any.
///
/// An absent value is skipped in every direction, it is never an error.
#[derive(Copy, Clone, Debug)]
pub struct OptionalBinding<B>(pub B);

impl<B: PropertyBinding> PropertyBinding for OptionalBinding<B> {
    type Source = B::Source;
    type Destination = Option<B::Destination>;

    fn pull(&self, source: &B::Source, destination: &mut Option<B::Destination>) {
        if let Some(destination) = destination {
            self.0.pull(source, destination)
        }
    }

    fn push(&self, source: &mut B::Source, destination: &Option<B::Destination>) {
        if let Some(destination) = destination {
            self.0.push(source, destination)
        }
    }

    fn commit(&self, source: &mut B::Source, destination: &Option<B::Destination>) {
        if let Some(destination) = destination {
            self.0.commit(source, destination)
        }
    }
}

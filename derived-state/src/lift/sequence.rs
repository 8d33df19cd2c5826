use crate::{
    binding::PropertyBinding,
    error::DerivedStateError,
    lift::Lifter,
    misuse::{lifted_push_error, report_lifted_push, LiftShape, MisusePolicy},
};

/// Lifts element bindings over `Vec`.
#[derive(Copy, Clone, Debug, Default)]
pub struct Sequence {
    misuse: Option<MisusePolicy>,
}

impl Sequence {
    pub fn new() -> Sequence {
        Sequence::default()
    }

    /// Lifted bindings react to direct pushes with `policy` instead of the default policy.
    pub fn on_misuse(policy: MisusePolicy) -> Sequence {
        Sequence { misuse: Some(policy) }
    }
}

impl<B: PropertyBinding> Lifter<B> for Sequence {
    type Lifted = ForEach<B>;

    fn lift(&self, binding: B) -> ForEach<B> {
        ForEach {
            binding,
            misuse: self.misuse,
        }
    }

    fn lower(&self, lifted: ForEach<B>) -> B {
        lifted.binding
    }
}

/// Applies a binding to every element of a vector, in index order.
///
/// Pulling never changes the length or the order of the vector. Pushing is a misuse (see
/// [`MisusePolicy`]): the vector is written back by the storage of the accessor, and `commit`
/// does nothing.
#[derive(Copy, Clone, Debug)]
pub struct ForEach<B> {
    binding: B,
    misuse: Option<MisusePolicy>,
}

impl<B: PropertyBinding> ForEach<B> {
    pub fn new(binding: B) -> ForEach<B> {
        ForEach { binding, misuse: None }
    }

    pub fn on_misuse(mut self, policy: MisusePolicy) -> ForEach<B> {
        self.misuse = Some(policy);
        self
    }

    pub fn element_binding(&self) -> &B {
        &self.binding
    }

    /// Reports a push without applying the misuse policy.
    pub fn try_push(
        &self,
        _source: &mut B::Source,
        _destination: &Vec<B::Destination>,
    ) -> Result<(), DerivedStateError> {
        Err(lifted_push_error::<B::Source, Vec<B::Destination>>(LiftShape::Sequence))
    }
}

impl<B: PropertyBinding> PropertyBinding for ForEach<B> {
    type Source = B::Source;
    type Destination = Vec<B::Destination>;

    fn pull(&self, source: &B::Source, destination: &mut Vec<B::Destination>) {
        for element in destination.iter_mut() {
            self.binding.pull(source, element);
        }
    }

    fn push(&self, _source: &mut B::Source, _destination: &Vec<B::Destination>) {
        report_lifted_push::<B::Source, Vec<B::Destination>>(LiftShape::Sequence, self.misuse)
    }

    fn commit(&self, _source: &mut B::Source, _destination: &Vec<B::Destination>) {}
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::binding::BlockBinding;

    fn mirror() -> ForEach<BlockBinding<i32, (i32, i32), impl Fn(&i32, &mut (i32, i32))>> {
        ForEach::new(BlockBinding::pull_only(|s: &i32, d: &mut (i32, i32)| d.1 = *s))
    }

    #[test]
    fn pulls_every_element_in_place() {
        let mut elements = vec![(1, 0), (2, 0), (3, 0)];
        mirror().pull(&7, &mut elements);
        assert_eq!(elements, vec![(1, 7), (2, 7), (3, 7)]);
    }

    #[test]
    fn ignored_push_changes_nothing() {
        let mut source = 7;
        let elements = vec![(1, 1)];
        let binding = mirror().on_misuse(MisusePolicy::Ignore);
        binding.push(&mut source, &elements);
        binding.commit(&mut source, &elements);
        assert_eq!(source, 7);
        assert!(binding.try_push(&mut source, &elements).is_err());
    }
}

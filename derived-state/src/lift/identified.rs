use crate::{
    binding::PropertyBinding,
    error::DerivedStateError,
    identified::IdentifiedCollection,
    lift::{missing_identity, ElementAccessor, LiftedState, Lifter},
    misuse::{lifted_push_error, report_lifted_push, LiftShape, MisusePolicy},
    storage::StateStorage,
};
use smallvec::SmallVec;
use std::{fmt, marker::PhantomData};

/// Lifts element bindings over an identified collection of type `C`.
pub struct Identified<C> {
    misuse: Option<MisusePolicy>,
    _phantom: PhantomData<fn() -> C>,
}

impl<C> Identified<C> {
    pub fn new() -> Identified<C> {
        Identified {
            misuse: None,
            _phantom: PhantomData,
        }
    }

    /// Lifted bindings react to direct pushes with `policy` instead of the default policy.
    pub fn on_misuse(policy: MisusePolicy) -> Identified<C> {
        Identified {
            misuse: Some(policy),
            _phantom: PhantomData,
        }
    }
}

impl<C> Default for Identified<C> {
    fn default() -> Self {
        Identified::new()
    }
}

// #26925
impl<C> Clone for Identified<C> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<C> Copy for Identified<C> {}

impl<C> fmt::Debug for Identified<C> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("Identified").field("misuse", &self.misuse).finish()
    }
}

impl<B, C> Lifter<B> for Identified<C>
where
    B: PropertyBinding,
    C: IdentifiedCollection<Element = B::Destination>,
{
    type Lifted = ForEachIdentified<B, C>;

    fn lift(&self, binding: B) -> ForEachIdentified<B, C> {
        ForEachIdentified {
            binding,
            misuse: self.misuse,
            _phantom: PhantomData,
        }
    }

    fn lower(&self, lifted: ForEachIdentified<B, C>) -> B {
        lifted.binding
    }
}

/// Applies a binding to every element of an identified collection, in identity order.
///
/// Elements are looked up by identity, never by position. Pushing is a misuse and `commit` does
/// nothing, as for [`ForEach`](crate::ForEach).
pub struct ForEachIdentified<B, C> {
    binding: B,
    misuse: Option<MisusePolicy>,
    _phantom: PhantomData<fn() -> C>,
}

impl<B, C> ForEachIdentified<B, C>
where
    B: PropertyBinding,
    C: IdentifiedCollection<Element = B::Destination>,
{
    pub fn new(binding: B) -> ForEachIdentified<B, C> {
        ForEachIdentified {
            binding,
            misuse: None,
            _phantom: PhantomData,
        }
    }

    pub fn on_misuse(mut self, policy: MisusePolicy) -> ForEachIdentified<B, C> {
        self.misuse = Some(policy);
        self
    }

    pub fn element_binding(&self) -> &B {
        &self.binding
    }

    /// Pulls into the element with the given identity.
    ///
    /// Returns `false`, leaving the collection untouched, if there is no such element.
    pub fn pull_element(&self, source: &B::Source, collection: &mut C, id: &C::Id) -> bool {
        match collection.get_mut(id) {
            Some(element) => {
                self.binding.pull(source, element);
                true
            }
            None => false,
        }
    }

    /// Reports a push without applying the misuse policy.
    pub fn try_push(
        &self,
        _source: &mut B::Source,
        _destination: &C,
    ) -> Result<(), DerivedStateError> {
        Err(lifted_push_error::<B::Source, C>(LiftShape::Identified))
    }
}

impl<B: Clone, C> Clone for ForEachIdentified<B, C> {
    fn clone(&self) -> Self {
        ForEachIdentified {
            binding: self.binding.clone(),
            misuse: self.misuse,
            _phantom: PhantomData,
        }
    }
}

impl<B: fmt::Debug, C> fmt::Debug for ForEachIdentified<B, C> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("ForEachIdentified")
            .field("binding", &self.binding)
            .field("misuse", &self.misuse)
            .finish()
    }
}

impl<B, C> PropertyBinding for ForEachIdentified<B, C>
where
    B: PropertyBinding,
    C: IdentifiedCollection<Element = B::Destination>,
{
    type Source = B::Source;
    type Destination = C;

    fn pull(&self, source: &B::Source, destination: &mut C) {
        // collect first: `for_each_id` borrows the collection
        let mut ids: SmallVec<[C::Id; 16]> = SmallVec::new();
        destination.for_each_id(|id| ids.push(id.clone()));
        for id in ids.iter() {
            if let Some(element) = destination.get_mut(id) {
                self.binding.pull(source, element);
            }
        }
    }

    fn push(&self, _source: &mut B::Source, _destination: &C) {
        report_lifted_push::<B::Source, C>(LiftShape::Identified, self.misuse)
    }

    fn commit(&self, _source: &mut B::Source, _destination: &C) {}
}

impl<St, B, C> ElementAccessor for LiftedState<St, Identified<C>, B>
where
    B: PropertyBinding,
    B::Destination: Clone,
    C: IdentifiedCollection<Element = B::Destination>,
    St: StateStorage<Source = B::Source, Destination = C>,
{
    type Key = C::Id;
    type Element = B::Destination;

    fn element(&self, source: &B::Source, id: &C::Id) -> Option<B::Destination> {
        let mut collection = self.storage.materialize(source);
        if !self.lifted.pull_element(source, &mut collection, id) {
            return None;
        }
        collection.get(id).cloned()
    }

    fn set_element(
        &self,
        source: &mut B::Source,
        id: &C::Id,
        element: B::Destination,
    ) -> Result<(), DerivedStateError> {
        let mut collection = self.storage.materialize(source);
        if let Some(found) = collection.identity_of(&element) {
            if found != *id {
                return Err(DerivedStateError::IdentityChanged {
                    id: format!("{:?}", id),
                    found: format!("{:?}", found),
                    collection: std::any::type_name::<C>(),
                });
            }
        }
        if !collection.update(id, element) {
            return Err(missing_identity::<C::Id, C>(id));
        }
        self.storage.absorb(source, &collection);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        binding::BlockBinding,
        identified::{Identifiable, IdentifiedVec},
    };

    #[derive(Clone, Debug, PartialEq)]
    struct Row {
        id: u32,
        label: String,
    }

    impl Identifiable for Row {
        type Id = u32;

        fn id(&self) -> u32 {
            self.id
        }
    }

    fn rows() -> IdentifiedVec<Row> {
        [1, 2]
            .into_iter()
            .map(|id| Row {
                id,
                label: String::new(),
            })
            .collect()
    }

    #[test]
    fn missing_identity_is_reported_and_untouched() {
        let binding = ForEachIdentified::<_, IdentifiedVec<Row>>::new(BlockBinding::pull_only(
            |s: &String, d: &mut Row| d.label = s.clone(),
        ));
        let mut rows = rows();
        let before = rows.clone();
        assert!(!binding.pull_element(&"label".to_string(), &mut rows, &3));
        assert_eq!(rows, before);
        assert!(binding.pull_element(&"label".to_string(), &mut rows, &2));
        assert_eq!(rows.get(&2).map(|row| row.label.as_str()), Some("label"));
        assert_eq!(rows.get(&1).map(|row| row.label.as_str()), Some(""));
    }
}

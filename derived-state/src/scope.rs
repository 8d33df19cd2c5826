//! Running child reducers on derived state.
//!
//! A reducer framework scopes a reduction from a parent state to a child state derived with an
//! accessor: the child is derived, reduced, and set back into the parent. Whether a missing
//! element is fatal is left to the caller.
use crate::{
    error::DerivedStateError,
    lift::{missing_identity, ElementAccessor},
    state::DerivedAccessor,
};
use std::fmt;

/// Runs `reducer` on the state derived by `accessor`, then writes it back into `source`.
pub fn reduce<A, Act, R>(
    accessor: &A,
    source: &mut A::Source,
    action: Act,
    reducer: impl FnOnce(&mut A::Destination, Act) -> R,
) -> R
where
    A: DerivedAccessor,
{
    accessor.modify(source, |child| reducer(child, action))
}

/// Runs `reducer` on one element of the container derived by `accessor`, then writes the
/// element back.
///
/// If there is no element with this key, logs a warning with the action, leaves `source`
/// untouched and returns [`DerivedStateError::MissingIdentity`].
///
/// If the reducer changes the identity of the element, `source` is left untouched and
/// [`DerivedStateError::IdentityChanged`] is returned.
pub fn reduce_element<A, Act, R>(
    accessor: &A,
    source: &mut A::Source,
    key: &A::Key,
    action: Act,
    reducer: impl FnOnce(&mut A::Element, Act) -> R,
) -> Result<R, DerivedStateError>
where
    A: ElementAccessor,
    A::Key: fmt::Debug,
    Act: fmt::Debug,
{
    let mut element = match accessor.element(source, key) {
        Some(element) => element,
        None => {
            // usually an element removed before its action was handled, or an in-flight action
            // for an element that no longer exists
            tracing::warn!(
                "action {:?} received for id {:?}, but the state contains no element at this id",
                action,
                key
            );
            return Err(missing_identity::<A::Key, A::Destination>(key));
        }
    };
    let result = reducer(&mut element, action);
    accessor.set_element(source, key, element)?;
    Ok(result)
}

//! Bidirectional accessors between a source aggregate and values derived from it.
//!
//! A derived accessor reads a _destination_ value out of a _source_ value, and writes changes to
//! the destination back into the source. It is made of two parts:
//!
//! * a [`StateStorage`], which produces a whole destination from the source (`materialize`) and
//!   stores back the parts of the destination that exist only there (`absorb`);
//! * a [`PropertyBinding`], which keeps individual fields of the destination in sync with fields
//!   of the source (`pull` and `push`).
//!
//! `get` materializes then pulls, `set` absorbs then writes bindings back: bindings always have
//! the final say over the fields they own.
//!
//! ```ignore
//! #[derive(Clone, Default, Fields)]
//! struct Child { name: String, count: i32, internal: i32 }
//!
//! #[derive(Clone, Default, Fields)]
//! struct Parent { name: String, count: i32, child: Child }
//!
//! let child = DerivedState::from_field(Parent::child)
//!     .rw(Parent::name, Child::name)
//!     .rw(Parent::count, Child::count);
//! ```
//!
//! Accessors over containers apply element bindings to every element, see the [`lift`] module.
//! Accessors can be type-erased with `erase` and stored by name in an [`AccessorRegistry`].

extern crate self as derived_state;

mod binding;
mod erased;
mod error;
mod field;
mod identified;
pub mod lift;
mod misuse;
mod registry;
pub mod scope;
mod state;
mod storage;

pub use crate::{
    binding::{
        BlockBinding, FieldBinding, FieldReadBinding, Identity, NoPush, PropertyBinding,
        PropertyBindingExt, ReadOnly, Zip,
    },
    erased::{AnyAccessor, AnyBinding, AnyStorage},
    error::DerivedStateError,
    field::{Field, FieldCompose, FieldExt, FieldFn, Getter, ReadField},
    identified::{Identifiable, IdentifiedCollection, IdentifiedVec},
    lift::{
        ElementAccessor, ForEach, ForEachIdentified, ForEachValue, LiftedState, OptionalBinding,
        ValueMap,
    },
    misuse::{
        default_misuse_policy, set_default_misuse_policy, LiftShape, MisusePolicy,
        MISUSE_POLICY_ENV,
    },
    registry::AccessorRegistry,
    state::{DerivedAccessor, DerivedState},
    storage::{
        BlockStorage, FieldStorage, InitStorage, NoEmbed, ReadOnlyStorage, StateStorage,
        StateStorageExt,
    },
};
pub use derived_state_macros::Fields;

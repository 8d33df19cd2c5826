use crate::misuse::LiftShape;
use thiserror::Error;

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum DerivedStateError {
    /// `push` was called on a collection-lifted binding instead of setting the whole accessor.
    #[error("push through a {shape}-lifted binding ({source_type} -> {destination_type}): set the whole accessor instead")]
    LiftedPush {
        shape: LiftShape,
        source_type: &'static str,
        destination_type: &'static str,
    },
    #[error("no element with id `{id}` in {collection}")]
    MissingIdentity { id: String, collection: &'static str },
    /// An element written at one identity carries another.
    #[error("element written at id `{id}` in {collection} carries id `{found}`")]
    IdentityChanged {
        id: String,
        found: String,
        collection: &'static str,
    },
    #[error("no accessor named `{name}`")]
    UnknownAccessor { name: String },
    #[error("type mismatch for accessor `{name}`: registered as {found_source} -> {found_destination}, requested {expected_source} -> {expected_destination}")]
    TypeMismatch {
        name: String,
        expected_source: &'static str,
        expected_destination: &'static str,
        found_source: &'static str,
        found_destination: &'static str,
    },
    #[error("unknown misuse policy `{value}` (expected `panic`, `warn` or `ignore`)")]
    UnknownPolicy { value: String },
}

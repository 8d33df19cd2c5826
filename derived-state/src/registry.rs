//! Named storage for erased accessors of heterogeneous types.
use crate::{erased::AnyAccessor, error::DerivedStateError};
use std::{any::Any, collections::HashMap, fmt};

struct Entry {
    accessor: Box<dyn Any + Send + Sync>,
    source_type: &'static str,
    destination_type: &'static str,
}

/// Stores erased accessors by name.
///
/// Accessors are retrieved with their source and destination types. A lookup with other types
/// than the registered ones fails: the accessor is never returned with the wrong types.
#[derive(Default)]
pub struct AccessorRegistry {
    entries: HashMap<String, Entry>,
}

impl AccessorRegistry {
    pub fn new() -> AccessorRegistry {
        AccessorRegistry::default()
    }

    /// Registers an accessor, replacing any accessor with the same name.
    ///
    /// Returns `true` if an accessor was replaced.
    pub fn insert<S: 'static, D: 'static>(
        &mut self,
        name: impl Into<String>,
        accessor: AnyAccessor<S, D>,
    ) -> bool {
        let name = name.into();
        let source_type = std::any::type_name::<S>();
        let destination_type = std::any::type_name::<D>();
        tracing::trace!(
            "registering accessor `{}`: {} -> {}",
            name,
            source_type,
            destination_type
        );
        self.entries
            .insert(
                name,
                Entry {
                    accessor: Box::new(accessor),
                    source_type,
                    destination_type,
                },
            )
            .is_some()
    }

    /// Returns the accessor registered under `name`.
    pub fn get<S: 'static, D: 'static>(
        &self,
        name: &str,
    ) -> Result<AnyAccessor<S, D>, DerivedStateError> {
        let entry = self
            .entries
            .get(name)
            .ok_or_else(|| DerivedStateError::UnknownAccessor {
                name: name.to_string(),
            })?;
        entry
            .accessor
            .downcast_ref::<AnyAccessor<S, D>>()
            .cloned()
            .ok_or_else(|| DerivedStateError::TypeMismatch {
                name: name.to_string(),
                expected_source: std::any::type_name::<S>(),
                expected_destination: std::any::type_name::<D>(),
                found_source: entry.source_type,
                found_destination: entry.destination_type,
            })
    }

    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    /// Removes an accessor. Returns `false` if there was none with this name.
    pub fn remove(&mut self, name: &str) -> bool {
        self.entries.remove(name).is_some()
    }

    /// Names of the registered accessors, sorted.
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.entries.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl fmt::Debug for AccessorRegistry {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let mut map = f.debug_map();
        for name in self.names() {
            if let Some(entry) = self.entries.get(name) {
                map.entry(
                    &name,
                    &format_args!("{} -> {}", entry.source_type, entry.destination_type),
                );
            }
        }
        map.finish()
    }
}

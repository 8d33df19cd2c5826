//! Field paths: reified accessors for one field of a struct.
//!
//! A field path over a type `Root` gives access to a value of type `Leaf` stored within it,
//! possibly deep within its structure (e.g. `.child.name`). `Root` is called the _root type_
//! and `Leaf` the _leaf type_.
//!
//! Paths are usually generated with `#[derive(Fields)]`, which exposes one zero-sized path per
//! field as an associated constant (`Parent::name`). The [`field!`](crate::field) and
//! [`getter!`](crate::getter) macros build paths from an arbitrary field expression instead.
use std::fmt;

/// Read access to a field of `Root`.
pub trait ReadField {
    type Root;
    type Leaf;

    fn get<'a>(&self, root: &'a Self::Root) -> &'a Self::Leaf;
}

/// Read-write access to a field of `Root`.
pub trait Field: ReadField {
    fn get_mut<'a>(&self, root: &'a mut Self::Root) -> &'a mut Self::Leaf;
}

/// Path composition.
pub trait FieldExt: ReadField + Sized {
    /// Returns the path to `next` within the leaf of this path.
    ///
    /// The result is a [`Field`] if both paths are.
    fn then<K>(self, next: K) -> FieldCompose<Self, K>
    where
        K: ReadField<Root = Self::Leaf>,
    {
        FieldCompose(self, next)
    }
}

impl<F: ReadField> FieldExt for F {}

/// Path composition: combines a path `U -> V` and a path `V -> W` into `U -> W`.
///
/// The intermediate type `V` must be `'static`.
#[derive(Copy, Clone, Debug)]
pub struct FieldCompose<K, L>(pub K, pub L);

impl<K, L> ReadField for FieldCompose<K, L>
where
    K: ReadField,
    K::Leaf: 'static,
    L: ReadField<Root = K::Leaf>,
{
    type Root = K::Root;
    type Leaf = L::Leaf;

    fn get<'a>(&self, root: &'a K::Root) -> &'a L::Leaf {
        self.1.get(self.0.get(root))
    }
}

impl<K, L> Field for FieldCompose<K, L>
where
    K: Field,
    K::Leaf: 'static,
    L: Field<Root = K::Leaf>,
{
    fn get_mut<'a>(&self, root: &'a mut K::Root) -> &'a mut L::Leaf {
        self.1.get_mut(self.0.get_mut(root))
    }
}

/// A writable path built from a pair of accessor functions.
///
/// See [`field!`](crate::field).
pub struct FieldFn<R, V> {
    get: fn(&R) -> &V,
    get_mut: fn(&mut R) -> &mut V,
}

impl<R, V> FieldFn<R, V> {
    pub fn new(get: fn(&R) -> &V, get_mut: fn(&mut R) -> &mut V) -> FieldFn<R, V> {
        FieldFn { get, get_mut }
    }
}

// #26925
impl<R, V> Clone for FieldFn<R, V> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<R, V> Copy for FieldFn<R, V> {}

impl<R, V> fmt::Debug for FieldFn<R, V> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "FieldFn({} => {})",
            std::any::type_name::<R>(),
            std::any::type_name::<V>()
        )
    }
}

impl<R, V> ReadField for FieldFn<R, V> {
    type Root = R;
    type Leaf = V;

    fn get<'a>(&self, root: &'a R) -> &'a V {
        (self.get)(root)
    }
}

impl<R, V> Field for FieldFn<R, V> {
    fn get_mut<'a>(&self, root: &'a mut R) -> &'a mut V {
        (self.get_mut)(root)
    }
}

/// A read-only path built from an accessor function.
///
/// See [`getter!`](crate::getter).
pub struct Getter<R, V> {
    get: fn(&R) -> &V,
}

impl<R, V> Getter<R, V> {
    pub fn new(get: fn(&R) -> &V) -> Getter<R, V> {
        Getter { get }
    }
}

// #26925
impl<R, V> Clone for Getter<R, V> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<R, V> Copy for Getter<R, V> {}

impl<R, V> fmt::Debug for Getter<R, V> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "Getter({} => {})",
            std::any::type_name::<R>(),
            std::any::type_name::<V>()
        )
    }
}

impl<R, V> ReadField for Getter<R, V> {
    type Root = R;
    type Leaf = V;

    fn get<'a>(&self, root: &'a R) -> &'a V {
        (self.get)(root)
    }
}

/// Builds a writable [`FieldFn`] path from a field expression.
///
/// # Examples
///```ignore
/// let name = field!(Parent => child.name);
/// assert_eq!(name.get(&parent), "Child");
///```
#[macro_export]
macro_rules! field {
    ($root:ty => $($path:tt)+) => {
        $crate::FieldFn::<$root, _>::new(
            |root: &$root| &root.$($path)+,
            |root: &mut $root| &mut root.$($path)+,
        )
    };
}

/// Builds a read-only [`Getter`] path from a field expression.
#[macro_export]
macro_rules! getter {
    ($root:ty => $($path:tt)+) => {
        $crate::Getter::<$root, _>::new(|root: &$root| &root.$($path)+)
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Clone, Debug, Default)]
    struct Inner {
        label: String,
    }

    #[derive(Clone, Debug, Default)]
    struct Outer {
        count: i32,
        inner: Inner,
        pair: (u8, u8),
    }

    #[test]
    fn field_fn_reads_and_writes() {
        let count = field!(Outer => count);
        let mut outer = Outer::default();
        *count.get_mut(&mut outer) = 5;
        assert_eq!(outer.count, 5);
        assert_eq!(count.get(&outer), &5);
    }

    #[test]
    fn nested_paths() {
        let label = field!(Outer => inner.label);
        let second = field!(Outer => pair.1);
        let mut outer = Outer::default();
        *label.get_mut(&mut outer) = "nested".to_string();
        *second.get_mut(&mut outer) = 9;
        assert_eq!(outer.inner.label, "nested");
        assert_eq!(outer.pair, (0, 9));
    }

    #[test]
    fn composed_paths() {
        let inner = field!(Outer => inner);
        let label = field!(Inner => label);
        let path = inner.then(label);
        let mut outer = Outer::default();
        *path.get_mut(&mut outer) = "composed".to_string();
        assert_eq!(path.get(&outer), "composed");

        let read_only = getter!(Outer => inner).then(label);
        assert_eq!(read_only.get(&outer), "composed");
    }

    #[test]
    fn composition_chains() {
        #[derive(Clone, Debug, Default)]
        struct Root {
            outer: Outer,
        }

        let path = field!(Root => outer)
            .then(field!(Outer => inner))
            .then(field!(Inner => label));
        let mut root = Root::default();
        *path.get_mut(&mut root) = "deep".to_string();
        assert_eq!(root.outer.inner.label, "deep");
        assert_eq!(path.get(&root), "deep");
    }
}

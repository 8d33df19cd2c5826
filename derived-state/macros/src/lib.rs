//! Proc-macros for `derived-state`.
extern crate proc_macro;
use proc_macro2::Span;
use quote::{ToTokens, TokenStreamExt};

mod fields;

//--------------------------------------------------------------------------------------------------
struct CrateName;
const CRATE: CrateName = CrateName;

impl ToTokens for CrateName {
    fn to_tokens(&self, tokens: &mut proc_macro2::TokenStream) {
        tokens.append(syn::Ident::new("derived_state", Span::call_site()))
    }
}

//--------------------------------------------------------------------------------------------------

/// Derives one field path per struct field.
///
/// For every field `f` of `struct S`, emits a zero-sized type implementing `ReadField`
/// (and `Field`, unless the field is marked `#[field(read_only)]`) and exposes it as the
/// associated constant `S::f`. Tuple struct fields are exposed as `S::elem_0`, `S::elem_1`...
///
/// # Examples
///```ignore
/// #[derive(Fields)]
/// struct Parent {
///     name: String,
///     #[field(read_only)]
///     revision: u64,
///     #[field(ignore)]
///     scratch: Vec<u8>,
/// }
///
/// assert_eq!(Parent::name.get(&parent), "Root");
///```
#[proc_macro_derive(Fields, attributes(field))]
pub fn derive_fields(input: proc_macro::TokenStream) -> proc_macro::TokenStream {
    fields::derive(input)
}

//! `#[derive(Fields)]` implementation.
use crate::CRATE;
use proc_macro2::{Span, TokenStream};
use quote::quote;
use syn::spanned::Spanned;

const FIELD_ATTR_PATH: &str = "field";
const IGNORE_ATTR_PATH: &str = "ignore";
const READ_ONLY_ATTR_PATH: &str = "read_only";

/// Options parsed from `#[field(...)]`.
#[derive(Debug, Default)]
struct FieldAttrs {
    /// No path is generated for this field.
    ignore: bool,
    /// Only `ReadField` is implemented.
    read_only: bool,
}

impl FieldAttrs {
    fn parse_ast(field: &syn::Field) -> syn::Result<Self> {
        let mut attrs = FieldAttrs::default();

        for attr in field.attrs.iter() {
            if !attr.path().is_ident(FIELD_ATTR_PATH) {
                continue;
            }
            attr.parse_nested_meta(|meta| {
                if meta.path.is_ident(IGNORE_ATTR_PATH) {
                    if attrs.ignore {
                        return Err(meta.error("Duplicate attribute"));
                    }
                    attrs.ignore = true;
                    Ok(())
                } else if meta.path.is_ident(READ_ONLY_ATTR_PATH) {
                    if attrs.read_only {
                        return Err(meta.error("Duplicate attribute"));
                    }
                    attrs.read_only = true;
                    Ok(())
                } else {
                    Err(meta.error("Unknown attribute, expected `ignore` or `read_only`"))
                }
            })?;
        }

        if attrs.ignore && attrs.read_only {
            return Err(syn::Error::new(
                field.span(),
                "`ignore` and `read_only` cannot be used together",
            ));
        }

        Ok(attrs)
    }
}

pub fn derive(input: proc_macro::TokenStream) -> proc_macro::TokenStream {
    let input = syn::parse_macro_input!(input as syn::DeriveInput);

    let result = match &input.data {
        syn::Data::Struct(s) => derive_struct(&input, s),
        syn::Data::Enum(e) => Err(syn::Error::new(
            e.enum_token.span(),
            "`Fields` cannot be derived from enums",
        )),
        syn::Data::Union(u) => Err(syn::Error::new(
            u.union_token.span(),
            "`Fields` cannot be derived from unions",
        )),
    };

    result.unwrap_or_else(|err| err.to_compile_error()).into()
}

fn derive_struct(input: &syn::DeriveInput, s: &syn::DataStruct) -> syn::Result<TokenStream> {
    let ty = &input.ident;

    // the generated path types are not generic
    if !input.generics.params.is_empty() {
        return Err(syn::Error::new(
            input.generics.span(),
            "`Fields` cannot be derived from generic structs",
        ));
    }

    let fields = match &s.fields {
        syn::Fields::Named(fields_named) => &fields_named.named,
        syn::Fields::Unnamed(fields_unnamed) => &fields_unnamed.unnamed,
        syn::Fields::Unit => {
            return Err(syn::Error::new(
                input.ident.span(),
                "`Fields` cannot be derived from unit structs",
            ))
        }
    };

    let mut decls = Vec::new();
    let mut impls = Vec::new();
    let mut associated_items = Vec::new();

    for (i, f) in fields.iter().enumerate() {
        let attrs = FieldAttrs::parse_ast(f)?;
        if attrs.ignore {
            continue;
        }

        let name = f
            .ident
            .clone()
            .unwrap_or_else(|| syn::Ident::new(&format!("elem_{}", i), Span::call_site()));
        let path_ty_name = syn::Ident::new(&format!("{}Field_{}", ty, name), Span::call_site());
        let vis = &f.vis;
        let lty = &f.ty;
        let access = match &f.ident {
            Some(ident) => {
                quote! { #ident }
            }
            None => {
                let index = syn::Index::from(i);
                quote! { #index }
            }
        };

        decls.push(quote! {
            #[allow(non_camel_case_types, dead_code)]
            #[derive(Copy, Clone, Debug, Default)]
            #vis struct #path_ty_name;
        });

        impls.push(quote! {
            impl ::#CRATE::ReadField for #path_ty_name {
                type Root = #ty;
                type Leaf = #lty;

                fn get<'a>(&self, root: &'a #ty) -> &'a #lty {
                    &root.#access
                }
            }
        });

        if !attrs.read_only {
            impls.push(quote! {
                impl ::#CRATE::Field for #path_ty_name {
                    fn get_mut<'a>(&self, root: &'a mut #ty) -> &'a mut #lty {
                        &mut root.#access
                    }
                }
            });
        }

        associated_items.push(quote! {
            #vis const #name: #path_ty_name = #path_ty_name;
        });
    }

    let expanded = quote! {
        #(#decls)*
        #(#impls)*

        #[allow(non_upper_case_globals, dead_code)]
        impl #ty {
            #(#associated_items)*
        }
    };

    Ok(expanded)
}

//! Derive macro for `obscura`.
//!
//! This crate generates the field tables behind `#[derive(Mask)]`. It:
//! - reads `#[mask(...)]` field attributes and validates them at build time
//! - classifies each field as text, nested, or opaque from its declared type
//! - emits `MaskRecord` and `Maskable` implementations that hand the fields
//!   to the runtime walker
//!
//! It does **not** mask anything. The masking algorithms and the graph walk
//! live in the main `obscura` crate.

// <https://doc.rust-lang.org/rustc/lints/listing/allowed-by-default.html>
#![warn(
    anonymous_parameters,
    bare_trait_objects,
    elided_lifetimes_in_paths,
    missing_copy_implementations,
    rust_2018_idioms,
    trivial_casts,
    trivial_numeric_casts,
    unreachable_pub,
    unsafe_code,
    unused_extern_crates,
    unused_import_braces
)]
// <https://rust-lang.github.io/rust-clippy/stable>
#![warn(
    clippy::all,
    clippy::cargo,
    clippy::dbg_macro,
    clippy::float_cmp_const,
    clippy::get_unwrap,
    clippy::mem_forget,
    clippy::nursery,
    clippy::pedantic,
    clippy::todo,
    clippy::unwrap_used,
    clippy::uninlined_format_args
)]
// Allow some clippy lints
#![allow(
    clippy::default_trait_access,
    clippy::doc_markdown,
    clippy::if_not_else,
    clippy::module_name_repetitions,
    clippy::multiple_crate_versions,
    clippy::must_use_candidate,
    clippy::needless_pass_by_value,
    clippy::use_self,
    clippy::cargo_common_metadata,
    clippy::missing_errors_doc,
    clippy::enum_glob_use,
    clippy::missing_const_for_fn,
    clippy::redundant_pub_crate,
    clippy::option_if_let_else,
    clippy::manual_inspect
)]
// Allow some lints while testing
#![cfg_attr(test, allow(clippy::non_ascii_literal, clippy::unwrap_used))]

#[allow(unused_extern_crates)]
extern crate proc_macro;

use proc_macro2::{Ident, TokenStream};
use proc_macro_crate::{crate_name, FoundCrate};
use quote::{format_ident, quote};
use syn::{parse_macro_input, spanned::Spanned, Data, DeriveInput, Result};

mod container;
mod derive_enum;
mod derive_struct;
mod generics;
mod strategy;
mod transform;
mod types;
use container::reject_mask_attributes;
use derive_enum::derive_enum;
use derive_struct::derive_struct;
use generics::add_maskable_bounds;

/// Derives `obscura::MaskRecord` and `obscura::Maskable` for structs and enums.
///
/// # Field Attributes
///
/// - **No annotation**: string-like fields (`String`, `Cow<'static, str>`, or an
///   `Option` of either) are masked with the caller's fallback policy, if any.
///   Other fields are walked recursively, except scalars, byte buffers,
///   temporal values, I/O handles, and references, which are never touched.
///
/// - `#[mask(skip)]`: the field is left out of the walk.
///
/// - `#[mask(style = Style, ...)]`: the field is masked with the declared policy.
///   Styles are `Default`, `Full`, `Prefix`, `Suffix`, `Middle`, `Email`, and
///   `Regex`. Optional keys: `blur_count = <usize>`, `visible_count = <usize>`,
///   `blur_char = '<char>'`, and `pattern = "<regex>"` (required for `Regex`).
///   Only valid on string-like fields.
///
/// Generic type parameters used by walked fields are bounded by `Maskable`.
/// Every type parameter must be `'static`.
///
/// Container-level `#[mask]`, types with lifetime parameters, and unions are
/// rejected at compile time.
#[proc_macro_derive(Mask, attributes(mask))]
pub fn derive_mask(input: proc_macro::TokenStream) -> proc_macro::TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    match expand(input) {
        Ok(tokens) => tokens.into(),
        Err(err) => err.into_compile_error().into(),
    }
}

/// Returns the token stream to reference the obscura crate root.
///
/// Handles crate renaming (e.g., `my_mask = { package = "obscura", ... }`)
/// and internal usage (when derive is used inside the obscura crate itself).
fn crate_root() -> TokenStream {
    match crate_name("obscura") {
        Ok(FoundCrate::Itself) => quote! { crate },
        Ok(FoundCrate::Name(name)) => {
            let ident = format_ident!("{}", name);
            quote! { ::#ident }
        }
        Err(_) => quote! { ::obscura },
    }
}

struct DeriveOutput {
    descriptors: Vec<TokenStream>,
    accessor_body: TokenStream,
    nested_generics: Vec<Ident>,
}

fn expand(input: DeriveInput) -> Result<TokenStream> {
    let DeriveInput {
        ident,
        generics,
        data,
        attrs,
        ..
    } = input;

    reject_mask_attributes(&attrs, "types")?;
    if let Some(lifetime) = generics.lifetimes().next() {
        return Err(syn::Error::new_spanned(
            lifetime,
            "`Mask` cannot be derived for types with lifetime parameters",
        ));
    }

    let crate_root = crate_root();

    let output = match &data {
        Data::Struct(data) => {
            let output = derive_struct(data, &generics, &crate_root)?;
            DeriveOutput {
                descriptors: output.descriptors,
                accessor_body: output.accessor_body,
                nested_generics: output.nested_generics,
            }
        }
        Data::Enum(data) => {
            let output = derive_enum(data, &generics, &crate_root)?;
            DeriveOutput {
                descriptors: output.descriptors,
                accessor_body: output.accessor_body,
                nested_generics: output.nested_generics,
            }
        }
        Data::Union(u) => {
            return Err(syn::Error::new(
                u.union_token.span(),
                "`Mask` cannot be derived for unions",
            ));
        }
    };

    let bounded = add_maskable_bounds(generics, &output.nested_generics, &crate_root);
    let (impl_generics, ty_generics, where_clause) = bounded.split_for_impl();
    let descriptors = &output.descriptors;
    let accessor_body = &output.accessor_body;

    Ok(quote! {
        impl #impl_generics #crate_root::MaskRecord for #ident #ty_generics #where_clause {
            fn describe() -> ::core::result::Result<
                ::std::vec::Vec<#crate_root::FieldDescriptor>,
                #crate_root::PolicyError,
            > {
                ::core::result::Result::Ok(::std::vec![#(#descriptors),*])
            }

            fn field_mut(
                &mut self,
                index: usize,
            ) -> ::core::option::Option<#crate_root::FieldMut<'_>> {
                #accessor_body
            }
        }

        impl #impl_generics #crate_root::Maskable for #ident #ty_generics #where_clause {
            fn mask_with(
                &mut self,
                walker: &mut #crate_root::Walker<'_>,
            ) -> ::core::result::Result<(), #crate_root::MaskError> {
                walker.walk_record(self)
            }
        }
    })
}

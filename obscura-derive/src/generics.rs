//! Generic type parameter handling and trait bound management.
//!
//! Every type parameter receives `'static`, since `Maskable` requires it.
//! Only parameters that appear in walked (nested) fields receive a
//! `Maskable` bound.
//!
//! ## PhantomData Handling
//!
//! `PhantomData<T>` never contributes a `Maskable` bound:
//!
//! ```ignore
//! struct TypedId<T> {
//!     id: String,
//!     _marker: PhantomData<T>,  // T should NOT require Maskable
//! }
//! ```

use proc_macro2::TokenStream;
use syn::{parse_quote, Ident};

pub(crate) fn collect_generics_from_type(
    ty: &syn::Type,
    generics: &syn::Generics,
    result: &mut Vec<Ident>,
) {
    match ty {
        syn::Type::Path(path) => {
            let Some(segment) = path.path.segments.last() else {
                return;
            };
            if segment.ident == "PhantomData" {
                return;
            }

            if let syn::PathArguments::AngleBracketed(args) = &segment.arguments {
                for arg in &args.args {
                    if let syn::GenericArgument::Type(inner_ty) = arg {
                        collect_generics_from_type(inner_ty, generics, result);
                    }
                }
            }

            for param in generics.type_params() {
                if segment.ident == param.ident && !result.iter().any(|g| g == &param.ident) {
                    result.push(param.ident.clone());
                }
            }
        }
        syn::Type::Array(array) => collect_generics_from_type(&array.elem, generics, result),
        syn::Type::Tuple(tuple) => {
            for elem in &tuple.elems {
                collect_generics_from_type(elem, generics, result);
            }
        }
        syn::Type::Paren(inner) => collect_generics_from_type(&inner.elem, generics, result),
        syn::Type::Group(inner) => collect_generics_from_type(&inner.elem, generics, result),
        _ => {}
    }
}

/// Adds `Maskable` bounds to generic parameters used in nested fields and
/// `'static` to every type parameter.
pub(crate) fn add_maskable_bounds(
    mut generics: syn::Generics,
    nested_generics: &[Ident],
    crate_root: &TokenStream,
) -> syn::Generics {
    for param in generics.type_params_mut() {
        param.bounds.push(parse_quote!('static));
        if nested_generics.iter().any(|g| g == &param.ident) {
            param.bounds.push(parse_quote!(#crate_root::Maskable));
        }
    }
    generics
}

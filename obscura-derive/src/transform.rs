//! Shared field planning for struct and enum derivation.
//!
//! Each eligible field becomes one descriptor (built once per type at
//! runtime) and one accessor arm (used on every walk). Struct and enum
//! derivation differ only in how they reach the field.

use proc_macro2::{Ident, Span, TokenStream};
use quote::{format_ident, quote};
use syn::Result;

use crate::{
    generics::collect_generics_from_type,
    strategy::{parse_field_attr, FieldAttr, PolicySpec},
    types::{classify, FieldClass},
};

/// Accumulated state during field processing.
pub(crate) struct DeriveContext<'a> {
    pub(crate) generics: &'a syn::Generics,
    pub(crate) crate_root: &'a TokenStream,
    pub(crate) nested_generics: &'a mut Vec<Ident>,
    pub(crate) next_index: usize,
}

/// An eligible field: its slot, its descriptor expression, and how to wrap
/// a mutable reference to it.
pub(crate) struct PlannedField {
    pub(crate) index: usize,
    pub(crate) descriptor: TokenStream,
    wrapper: Ident,
}

impl PlannedField {
    /// Wraps `access` (an expression of type `&mut FieldType`) in `FieldMut`.
    pub(crate) fn field_mut(&self, crate_root: &TokenStream, access: &TokenStream) -> TokenStream {
        let wrapper = &self.wrapper;
        quote! { ::core::option::Option::Some(#crate_root::FieldMut::#wrapper(#access)) }
    }
}

/// Plans a single field, or returns `None` when it is not eligible.
///
/// ## Field Rules
///
/// | Declared type | Attribute | Result |
/// |---------------|-----------|--------|
/// | text | none | text descriptor, fallback policy |
/// | text | `style = ...` | text descriptor, declared policy |
/// | nested | none | nested descriptor |
/// | opaque | none | not eligible |
/// | any | `skip` | not eligible |
/// | nested / opaque | `style = ...` | compile error |
pub(crate) fn plan_field(
    ctx: &mut DeriveContext<'_>,
    field: &syn::Field,
    name: &str,
) -> Result<Option<PlannedField>> {
    let attr = parse_field_attr(&field.attrs)?;
    let class = classify(&field.ty);

    let descriptor_kind = match (attr, class) {
        (FieldAttr::Skip, _) | (FieldAttr::Default, FieldClass::Opaque) => return Ok(None),
        (FieldAttr::Policy(_), FieldClass::Nested | FieldClass::Opaque) => {
            return Err(syn::Error::new_spanned(
                &field.ty,
                "mask policies apply only to string-like fields \
                 (String, Cow<'static, str>, or an Option of either); \
                 use #[mask(skip)] or remove the attribute",
            ));
        }
        (FieldAttr::Default, FieldClass::Text) => DescriptorKind::Text(None),
        (FieldAttr::Policy(spec), FieldClass::Text) => DescriptorKind::Text(Some(spec)),
        (FieldAttr::Default, FieldClass::Nested) => {
            collect_generics_from_type(&field.ty, ctx.generics, ctx.nested_generics);
            DescriptorKind::Nested
        }
    };

    let index = ctx.next_index;
    ctx.next_index += 1;

    let crate_root = ctx.crate_root;
    let (descriptor, wrapper) = match descriptor_kind {
        DescriptorKind::Text(spec) => {
            let policy = policy_tokens(crate_root, spec.as_ref());
            (
                quote! { #crate_root::FieldDescriptor::text(#index, #name, #policy) },
                format_ident!("Text"),
            )
        }
        DescriptorKind::Nested => (
            quote! { #crate_root::FieldDescriptor::nested(#index, #name) },
            format_ident!("Nested"),
        ),
    };

    Ok(Some(PlannedField {
        index,
        descriptor,
        wrapper,
    }))
}

enum DescriptorKind {
    Text(Option<PolicySpec>),
    Nested,
}

fn policy_tokens(crate_root: &TokenStream, spec: Option<&PolicySpec>) -> TokenStream {
    let Some(spec) = spec else {
        return quote! { ::core::option::Option::None };
    };

    let style = Ident::new(&spec.style.to_string(), Span::call_site());
    let mut setters = Vec::new();
    if let Some(blur_count) = spec.blur_count {
        setters.push(quote! { .blur_count(#blur_count) });
    }
    if let Some(visible_count) = spec.visible_count {
        setters.push(quote! { .visible_count(#visible_count) });
    }
    if let Some(blur_char) = spec.blur_char {
        setters.push(quote! { .blur_char(#blur_char) });
    }
    if let Some(pattern) = &spec.pattern {
        setters.push(quote! { .pattern(#pattern) });
    }

    quote! {
        ::core::option::Option::Some(
            #crate_root::MaskPolicy::builder(#crate_root::MaskStyle::#style)
                #(#setters)*
                .build()?
        )
    }
}

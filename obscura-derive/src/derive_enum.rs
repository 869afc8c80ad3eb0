//! Enum-specific `MaskRecord` derivation.
//!
//! Slots are numbered across all variants; the accessor matches the slot
//! together with the active variant, so fields of inactive variants are
//! never reached. Descriptor names are `Variant.field`.

use proc_macro2::{Ident, TokenStream};
use quote::{format_ident, quote};
use syn::{DataEnum, Member, Result};

use crate::{
    container::reject_mask_attributes,
    transform::{plan_field, DeriveContext},
};

pub(crate) struct EnumDeriveOutput {
    pub(crate) descriptors: Vec<TokenStream>,
    pub(crate) accessor_body: TokenStream,
    pub(crate) nested_generics: Vec<Ident>,
}

pub(crate) fn derive_enum(
    data: &DataEnum,
    generics: &syn::Generics,
    crate_root: &TokenStream,
) -> Result<EnumDeriveOutput> {
    let mut nested_generics = Vec::new();
    let mut ctx = DeriveContext {
        generics,
        crate_root,
        nested_generics: &mut nested_generics,
        next_index: 0,
    };

    let mut descriptors = Vec::new();
    let mut arms = Vec::new();
    for variant in &data.variants {
        reject_mask_attributes(&variant.attrs, "enum variants")?;
        let variant_ident = &variant.ident;

        for (position, field) in variant.fields.iter().enumerate() {
            let member = field
                .ident
                .clone()
                .map_or_else(|| Member::from(position), Member::Named);
            let name = match &member {
                Member::Named(ident) => format!("{variant_ident}.{ident}"),
                Member::Unnamed(index) => format!("{variant_ident}.{}", index.index),
            };

            let Some(planned) = plan_field(&mut ctx, field, &name)? else {
                continue;
            };
            let index = planned.index;
            let binding = format_ident!("__obscura_field");
            let field_mut = planned.field_mut(crate_root, &quote! { #binding });
            arms.push(quote! {
                (#index, Self::#variant_ident { #member: #binding, .. }) => #field_mut
            });
            descriptors.push(planned.descriptor);
        }
    }

    let accessor_body = if arms.is_empty() {
        quote! {
            let _ = (index, self);
            ::core::option::Option::None
        }
    } else {
        quote! {
            match (index, self) {
                #(#arms,)*
                _ => ::core::option::Option::None,
            }
        }
    };

    Ok(EnumDeriveOutput {
        descriptors,
        accessor_body,
        nested_generics,
    })
}

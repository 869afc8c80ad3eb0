//! Struct-specific `MaskRecord` derivation.
//!
//! Fields are reached through `self.<member>`; tuple fields are named by
//! their position.

use proc_macro2::{Ident, TokenStream};
use quote::quote;
use syn::{DataStruct, Member, Result};

use crate::transform::{plan_field, DeriveContext};

pub(crate) struct StructDeriveOutput {
    pub(crate) descriptors: Vec<TokenStream>,
    pub(crate) accessor_body: TokenStream,
    pub(crate) nested_generics: Vec<Ident>,
}

pub(crate) fn derive_struct(
    data: &DataStruct,
    generics: &syn::Generics,
    crate_root: &TokenStream,
) -> Result<StructDeriveOutput> {
    let mut nested_generics = Vec::new();
    let mut ctx = DeriveContext {
        generics,
        crate_root,
        nested_generics: &mut nested_generics,
        next_index: 0,
    };

    let mut descriptors = Vec::new();
    let mut arms = Vec::new();
    for (position, field) in data.fields.iter().enumerate() {
        let member = field
            .ident
            .clone()
            .map_or_else(|| Member::from(position), Member::Named);
        let name = match &member {
            Member::Named(ident) => ident.to_string(),
            Member::Unnamed(index) => index.index.to_string(),
        };

        let Some(planned) = plan_field(&mut ctx, field, &name)? else {
            continue;
        };
        let index = planned.index;
        let field_mut = planned.field_mut(crate_root, &quote! { &mut self.#member });
        arms.push(quote! { #index => #field_mut });
        descriptors.push(planned.descriptor);
    }

    let accessor_body = if arms.is_empty() {
        quote! {
            let _ = (index, self);
            ::core::option::Option::None
        }
    } else {
        quote! {
            match index {
                #(#arms,)*
                _ => ::core::option::Option::None,
            }
        }
    };

    Ok(StructDeriveOutput {
        descriptors,
        accessor_body,
        nested_generics,
    })
}

//! Container-level attribute checks for `#[derive(Mask)]`.
//!
//! Policies are declared on fields only. There is no type-wide default
//! policy; the caller's fallback covers undeclared text instead.

use syn::{Attribute, Result};

/// Rejects `#[mask(...)]` placed on a type or an enum variant.
pub(crate) fn reject_mask_attributes(attrs: &[Attribute], place: &str) -> Result<()> {
    match attrs.iter().find(|attr| attr.path().is_ident("mask")) {
        Some(attr) => Err(syn::Error::new_spanned(
            attr,
            format!(
                "#[mask] is not supported on {place}; declare policies on individual fields \
                 and pass a fallback policy to `mask` for undeclared text"
            ),
        )),
        None => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use quote::quote;
    use syn::DeriveInput;

    use super::*;

    fn parse_attrs(tokens: proc_macro2::TokenStream) -> Vec<Attribute> {
        let input: DeriveInput = syn::parse2(quote! {
            #tokens
            struct Dummy;
        })
        .expect("should parse as DeriveInput");
        input.attrs
    }

    #[test]
    fn no_attribute_is_accepted() {
        let attrs = parse_attrs(quote! { #[derive(Clone)] });
        assert!(reject_mask_attributes(&attrs, "types").is_ok());
    }

    #[test]
    fn container_policy_is_rejected() {
        let attrs = parse_attrs(quote! { #[mask(style = Full)] });
        let message = reject_mask_attributes(&attrs, "types")
            .unwrap_err()
            .to_string();
        assert!(message.contains("#[mask] is not supported on types"));
    }

    #[test]
    fn bare_mask_on_container_is_rejected() {
        let attrs = parse_attrs(quote! { #[mask] });
        assert!(reject_mask_attributes(&attrs, "types").is_err());
    }
}

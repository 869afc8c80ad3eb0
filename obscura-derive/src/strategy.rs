//! Parsing of `#[mask(...)]` field attributes.
//!
//! This module maps attribute syntax to field decisions and produces
//! structured errors for invalid forms. Patterns of `Regex` policies are
//! compiled here, so an invalid pattern fails the build.

use proc_macro2::Ident;
use syn::{Attribute, LitChar, LitInt, LitStr, Meta, Result};

/// Names accepted by `style = ...`.
const STYLES: &[&str] = &[
    "Default", "Full", "Prefix", "Suffix", "Middle", "Email", "Regex",
];

/// Field decision based on `#[mask(...)]` attributes.
///
/// | Attribute | Decision |
/// |-----------|----------|
/// | None | `Default`: eligible by type, masked with the caller's fallback |
/// | `#[mask(skip)]` | `Skip`: never walked |
/// | `#[mask(style = ..., ...)]` | `Policy`: masked with the declared policy |
#[derive(Clone, Debug)]
pub(crate) enum FieldAttr {
    Default,
    Skip,
    Policy(PolicySpec),
}

/// A policy declared on a field, validated but not yet lowered to tokens.
#[derive(Clone, Debug)]
pub(crate) struct PolicySpec {
    pub(crate) style: Ident,
    pub(crate) blur_count: Option<usize>,
    pub(crate) visible_count: Option<usize>,
    pub(crate) blur_char: Option<char>,
    pub(crate) pattern: Option<String>,
}

#[derive(Default)]
struct RawOptions {
    skip: bool,
    style: Option<Ident>,
    blur_count: Option<usize>,
    visible_count: Option<usize>,
    blur_char: Option<char>,
    pattern: Option<String>,
}

impl RawOptions {
    fn has_policy_keys(&self) -> bool {
        self.style.is_some()
            || self.blur_count.is_some()
            || self.visible_count.is_some()
            || self.blur_char.is_some()
            || self.pattern.is_some()
    }
}

fn set_once<T>(slot: &mut Option<T>, value: T, key: &str) -> Result<()> {
    if slot.is_some() {
        return Err(syn::Error::new(
            proc_macro2::Span::call_site(),
            format!("duplicate `{key}` option"),
        ));
    }
    *slot = Some(value);
    Ok(())
}

fn parse_options(attr: &Attribute) -> Result<RawOptions> {
    let list = match &attr.meta {
        Meta::List(list) => list,
        Meta::Path(_) => {
            return Err(syn::Error::new_spanned(
                attr,
                "expected `#[mask(skip)]` or `#[mask(style = ...)]`",
            ));
        }
        Meta::NameValue(_) => {
            return Err(syn::Error::new_spanned(
                attr,
                "name-value syntax is not supported for #[mask]",
            ));
        }
    };

    let mut options = RawOptions::default();
    list.parse_nested_meta(|meta| {
        let key = meta
            .path
            .get_ident()
            .map_or_else(|| "?".to_string(), ToString::to_string);
        match key.as_str() {
            "skip" => {
                if options.skip {
                    return Err(meta.error("duplicate `skip` option"));
                }
                options.skip = true;
                Ok(())
            }
            "style" => {
                let style: Ident = meta.value()?.parse()?;
                if !STYLES.iter().any(|known| style == known) {
                    return Err(meta.error(format!(
                        "unknown mask style `{style}`; expected one of {}",
                        STYLES.join(", ")
                    )));
                }
                set_once(&mut options.style, style, "style")
            }
            "blur_count" => {
                let count: LitInt = meta.value()?.parse()?;
                set_once(&mut options.blur_count, count.base10_parse()?, "blur_count")
            }
            "visible_count" => {
                let count: LitInt = meta.value()?.parse()?;
                set_once(
                    &mut options.visible_count,
                    count.base10_parse()?,
                    "visible_count",
                )
            }
            "blur_char" => {
                let blur_char: LitChar = meta.value()?.parse()?;
                set_once(&mut options.blur_char, blur_char.value(), "blur_char")
            }
            "pattern" => {
                let pattern: LitStr = meta.value()?.parse()?;
                set_once(&mut options.pattern, pattern.value(), "pattern")
            }
            _ => Err(meta.error(format!(
                "unknown mask option `{key}`; expected `skip`, `style`, `blur_count`, \
                 `visible_count`, `blur_char`, or `pattern`"
            ))),
        }
    })
    // Report every attribute problem on the attribute itself.
    .map_err(|err| syn::Error::new_spanned(attr, err.to_string()))?;

    Ok(options)
}

fn validate(attr: &Attribute, options: RawOptions) -> Result<FieldAttr> {
    if options.skip {
        if options.has_policy_keys() {
            return Err(syn::Error::new_spanned(
                attr,
                "`skip` cannot be combined with policy options",
            ));
        }
        return Ok(FieldAttr::Skip);
    }

    let Some(style) = options.style else {
        return Err(syn::Error::new_spanned(
            attr,
            "missing `style`; expected `#[mask(style = ...)]`",
        ));
    };

    if style == "Regex" {
        let pattern = options
            .pattern
            .as_deref()
            .filter(|pattern| !pattern.trim().is_empty())
            .ok_or_else(|| {
                syn::Error::new_spanned(attr, "the `Regex` style requires a non-blank `pattern`")
            })?;
        if let Err(err) = regex::Regex::new(pattern) {
            return Err(syn::Error::new_spanned(
                attr,
                format!("invalid mask pattern: {err}"),
            ));
        }
    }

    Ok(FieldAttr::Policy(PolicySpec {
        style,
        blur_count: options.blur_count,
        visible_count: options.visible_count,
        blur_char: options.blur_char,
        pattern: options.pattern,
    }))
}

pub(crate) fn parse_field_attr(attrs: &[Attribute]) -> Result<FieldAttr> {
    let mut parsed: Option<FieldAttr> = None;
    for attr in attrs {
        if !attr.path().is_ident("mask") {
            continue;
        }
        if parsed.is_some() {
            return Err(syn::Error::new_spanned(
                attr,
                "multiple #[mask] attributes specified on the same field",
            ));
        }
        let options = parse_options(attr)?;
        parsed = Some(validate(attr, options)?);
    }

    Ok(parsed.unwrap_or(FieldAttr::Default))
}

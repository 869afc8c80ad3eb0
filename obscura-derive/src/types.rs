//! Type utilities for the derive macro.
//!
//! Classification is syntactic: the derive only sees tokens, so type aliases
//! and re-exported names are classified by their last path segment.

/// How a field is treated, decided from its declared type.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub(crate) enum FieldClass {
    /// `String`, `Cow<'static, str>`, or an `Option` of either.
    Text,
    /// Never walked: scalars, byte buffers, temporal values, handles,
    /// references, and an `Option` of any of these.
    Opaque,
    /// Walked through its `Maskable` implementation.
    Nested,
}

/// Type names that are never walked, whatever their generic arguments.
const OPAQUE_NAMES: &[&str] = &[
    "Bytes",
    "BytesMut",
    "Decimal",
    "SystemTime",
    "Instant",
    "Duration",
    "DateTime",
    "NaiveDate",
    "NaiveTime",
    "NaiveDateTime",
    "OffsetDateTime",
    "File",
    "TcpStream",
    "UnixStream",
    "Cursor",
    "PhantomData",
];

pub(crate) fn classify(ty: &syn::Type) -> FieldClass {
    match ty {
        syn::Type::Paren(inner) => classify(&inner.elem),
        syn::Type::Group(inner) => classify(&inner.elem),
        syn::Type::Reference(_)
        | syn::Type::Ptr(_)
        | syn::Type::BareFn(_)
        | syn::Type::Never(_)
        | syn::Type::Slice(_)
        | syn::Type::TraitObject(_)
        | syn::Type::ImplTrait(_) => FieldClass::Opaque,
        syn::Type::Array(array) if is_byte(&array.elem) => FieldClass::Opaque,
        syn::Type::Path(path) => classify_path(path),
        _ => FieldClass::Nested,
    }
}

fn classify_path(path: &syn::TypePath) -> FieldClass {
    if path.qself.is_some() {
        return FieldClass::Nested;
    }
    let Some(segment) = path.path.segments.last() else {
        return FieldClass::Nested;
    };
    let name = segment.ident.to_string();

    if is_scalar_type(&syn::Type::Path(path.clone())) || OPAQUE_NAMES.contains(&name.as_str()) {
        return FieldClass::Opaque;
    }

    match name.as_str() {
        "String" if segment.arguments.is_empty() => FieldClass::Text,
        "Cow" if is_text_base_segment(segment) => FieldClass::Text,
        "Option" => match single_type_argument(segment) {
            Some(inner) if is_text_base(inner) => FieldClass::Text,
            // An optional opaque value is still opaque.
            Some(inner) if classify(inner) == FieldClass::Opaque => FieldClass::Opaque,
            _ => FieldClass::Nested,
        },
        "Vec" => match single_type_argument(segment) {
            Some(inner) if is_byte(inner) => FieldClass::Opaque,
            _ => FieldClass::Nested,
        },
        "Box" => match single_type_argument(segment) {
            Some(syn::Type::Slice(slice)) if is_byte(&slice.elem) => FieldClass::Opaque,
            _ => FieldClass::Nested,
        },
        _ => FieldClass::Nested,
    }
}

/// `String` or `Cow<_, str>`; the types an `Option` may wrap and stay text.
fn is_text_base(ty: &syn::Type) -> bool {
    let syn::Type::Path(path) = ty else {
        return false;
    };
    let Some(segment) = path.path.segments.last() else {
        return false;
    };
    (segment.ident == "String" && segment.arguments.is_empty()) || is_text_base_segment(segment)
}

fn is_text_base_segment(segment: &syn::PathSegment) -> bool {
    if segment.ident != "Cow" {
        return false;
    }
    let syn::PathArguments::AngleBracketed(args) = &segment.arguments else {
        return false;
    };
    args.args.iter().any(|arg| {
        matches!(arg, syn::GenericArgument::Type(syn::Type::Path(inner)) if inner.path.is_ident("str"))
    })
}

fn single_type_argument(segment: &syn::PathSegment) -> Option<&syn::Type> {
    let syn::PathArguments::AngleBracketed(args) = &segment.arguments else {
        return None;
    };
    let mut types = args.args.iter().filter_map(|arg| match arg {
        syn::GenericArgument::Type(ty) => Some(ty),
        _ => None,
    });
    let first = types.next()?;
    types.next().is_none().then_some(first)
}

fn is_byte(ty: &syn::Type) -> bool {
    matches!(ty, syn::Type::Path(path) if path.qself.is_none() && path.path.is_ident("u8"))
}

/// Checks if a type is a recognized scalar primitive.
///
/// Returns `true` for bare primitive type names like `i32`, `bool`, `f64`, etc.
/// Returns `false` for qualified paths, generic types, or type aliases; those
/// are walked, and the scalar `Maskable` impls leave them untouched.
pub(crate) fn is_scalar_type(ty: &syn::Type) -> bool {
    let syn::Type::Path(path) = ty else {
        return false;
    };
    if path.qself.is_some() || path.path.leading_colon.is_some() || path.path.segments.len() != 1 {
        return false;
    }
    let Some(segment) = path.path.segments.last() else {
        return false;
    };
    if !segment.arguments.is_empty() {
        return false;
    }
    matches!(
        segment.ident.to_string().as_str(),
        "i8" | "i16"
            | "i32"
            | "i64"
            | "i128"
            | "isize"
            | "u8"
            | "u16"
            | "u32"
            | "u64"
            | "u128"
            | "usize"
            | "f32"
            | "f64"
            | "bool"
            | "char"
    )
}

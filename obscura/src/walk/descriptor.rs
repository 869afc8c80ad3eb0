//! Field metadata for records deriving `Mask`.

use super::traits::{Maskable, MaskableText};
use crate::policy::MaskPolicy;

/// How the walker treats an eligible field.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum FieldKind {
    /// A string-like field, masked with its own policy or the fallback.
    Text,
    /// Any other eligible field; walked recursively.
    Nested,
}

/// One eligible field of a record type.
///
/// Ineligible fields (scalars, byte buffers, temporal values, `#[mask(skip)]`)
/// never get a descriptor.
#[derive(Clone, Debug)]
pub struct FieldDescriptor {
    index: usize,
    name: &'static str,
    kind: FieldKind,
    policy: Option<MaskPolicy>,
}

impl FieldDescriptor {
    #[doc(hidden)]
    #[must_use]
    pub fn text(index: usize, name: &'static str, policy: Option<MaskPolicy>) -> Self {
        Self {
            index,
            name,
            kind: FieldKind::Text,
            policy,
        }
    }

    #[doc(hidden)]
    #[must_use]
    pub fn nested(index: usize, name: &'static str) -> Self {
        Self {
            index,
            name,
            kind: FieldKind::Nested,
            policy: None,
        }
    }

    /// Slot passed to [`MaskRecord::field_mut`](super::MaskRecord::field_mut).
    pub fn index(&self) -> usize {
        self.index
    }

    /// Field name; `Variant.field` for enum variants, the position for tuple fields.
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Whether the field is masked as text or walked as a nested value.
    pub fn kind(&self) -> FieldKind {
        self.kind
    }

    /// The policy declared on the field, if any.
    pub fn policy(&self) -> Option<&MaskPolicy> {
        self.policy.as_ref()
    }
}

/// Mutable access to one field, handed out by a record's generated accessor.
pub enum FieldMut<'a> {
    /// A string-like field, handed to the engine with its resolved policy.
    Text(&'a mut dyn MaskableText),
    /// Any other eligible field, visited through its `Maskable` impl.
    Nested(&'a mut dyn Maskable),
}

//! Graph walker and entry points.
//!
//! One [`Walker`] lives for one top-level call. It owns the visited set and
//! the caller's fallback policy, resolves the policy of every text field it
//! reaches, and hands nested values back to their own [`Maskable`] impls.

use std::{
    any::TypeId,
    collections::HashSet,
    panic::{catch_unwind, AssertUnwindSafe},
};

use thiserror::Error;
use tracing::{trace, warn};

use super::{
    cache::fields_of,
    descriptor::{FieldDescriptor, FieldMut},
    traits::{MaskRecord, Maskable, MaskableText},
};
use crate::{engine, policy::MaskPolicy, PolicyError};

/// Errors surfaced by [`try_mask`].
#[derive(Debug, Error)]
pub enum MaskError {
    /// A declared policy failed to build.
    #[error(transparent)]
    Policy(#[from] PolicyError),
    /// A shared `RefCell` node was already borrowed outside the walk.
    #[error("shared `{type_name}` node is already borrowed")]
    AlreadyBorrowed {
        /// Type held by the node.
        type_name: &'static str,
    },
    /// A lock guarding part of the graph was poisoned.
    #[error("lock around `{type_name}` is poisoned")]
    Poisoned {
        /// Type held by the lock.
        type_name: &'static str,
    },
}

/// Key of the visited set.
///
/// The type is part of the key: a record and its first field can share an
/// address.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
struct Identity {
    type_id: TypeId,
    address: usize,
}

impl Identity {
    fn of(value: &dyn Maskable) -> Self {
        Self {
            type_id: value.type_key(),
            address: std::ptr::from_ref(value).cast::<()>() as usize,
        }
    }

    fn of_shared<T: ?Sized + 'static>(allocation: *const T) -> Self {
        Self {
            type_id: TypeId::of::<T>(),
            address: allocation.cast::<()>() as usize,
        }
    }
}

/// State of one masking pass.
#[derive(Debug)]
pub struct Walker<'p> {
    fallback: Option<&'p MaskPolicy>,
    visited: HashSet<Identity>,
}

impl<'p> Walker<'p> {
    pub(crate) fn new(fallback: Option<&'p MaskPolicy>) -> Self {
        Self {
            fallback,
            visited: HashSet::new(),
        }
    }

    /// Policy applied to text without a declared policy of its own.
    pub fn fallback(&self) -> Option<&'p MaskPolicy> {
        self.fallback
    }

    /// Visits `value` unless it was already reached during this pass.
    pub fn visit(&mut self, value: &mut dyn Maskable) -> Result<(), MaskError> {
        if value.is_inert() {
            return Ok(());
        }
        let identity = Identity::of(value);
        if !self.visited.insert(identity) {
            trace!(type_name = value.type_name(), "already visited, skipping");
            return Ok(());
        }
        value.mask_with(self)
    }

    /// Marks a shared allocation as entered.
    ///
    /// Returns `false` when the allocation was already entered during this
    /// pass. Shared handles call this before borrowing or locking the node.
    pub fn enter_shared<T: ?Sized + 'static>(&mut self, allocation: *const T) -> bool {
        let entered = self.visited.insert(Identity::of_shared(allocation));
        if !entered {
            trace!(
                type_name = std::any::type_name::<T>(),
                "shared node already entered, skipping"
            );
        }
        entered
    }

    /// Masks a text value that carries no declaration, using the fallback.
    pub fn mask_element(&self, value: &mut dyn MaskableText) {
        if let Some(policy) = self.fallback {
            mask_text(value, policy);
        }
    }

    /// Walks the eligible fields of a record.
    pub fn walk_record<T: MaskRecord>(&mut self, record: &mut T) -> Result<(), MaskError> {
        let fields = fields_of::<T>()?;
        for field in fields.iter() {
            match record.field_mut(field.index()) {
                Some(FieldMut::Text(value)) => self.mask_field(field, value),
                Some(FieldMut::Nested(value)) => self.visit(value)?,
                None => {}
            }
        }
        Ok(())
    }

    fn mask_field(&self, field: &FieldDescriptor, value: &mut dyn MaskableText) {
        if let Some(policy) = field.policy().or(self.fallback) {
            mask_text(value, policy);
        }
    }
}

fn mask_text(value: &mut dyn MaskableText, policy: &MaskPolicy) {
    let Some(current) = value.text() else {
        return;
    };
    if current.trim().is_empty() {
        return;
    }
    let masked = engine::apply(current, Some(policy));
    value.set_text(masked);
}

/// Masks `root` in place and returns it.
///
/// Never fails and never panics outward: on an error or a panic inside a
/// custom implementation the problem is logged and the partially masked
/// root is returned.
pub fn mask<'a, T: Maskable>(root: &'a mut T, fallback: Option<&MaskPolicy>) -> &'a mut T {
    match catch_unwind(AssertUnwindSafe(|| try_mask(&mut *root, fallback))) {
        Ok(Ok(())) => {}
        Ok(Err(err)) => warn!(
            type_name = std::any::type_name::<T>(),
            error = %err,
            "masking stopped early, returning partially masked value"
        ),
        Err(_) => warn!(
            type_name = std::any::type_name::<T>(),
            "masking panicked, returning partially masked value"
        ),
    }
    root
}

/// Masks `root` in place, surfacing the first error.
pub fn try_mask<T: Maskable>(root: &mut T, fallback: Option<&MaskPolicy>) -> Result<(), MaskError> {
    Walker::new(fallback).visit(root)
}

/// Method-call entry points for every [`Maskable`] type.
pub trait MaskExt: Maskable + Sized {
    /// Masks declared fields in place.
    fn mask(&mut self) -> &mut Self {
        mask(self, None)
    }

    /// Masks declared fields, and undeclared text with `fallback`.
    fn mask_or(&mut self, fallback: &MaskPolicy) -> &mut Self {
        mask(self, Some(fallback))
    }

    /// Consumes the value and returns its masked form.
    #[must_use]
    fn masked(mut self) -> Self {
        mask(&mut self, None);
        self
    }
}

impl<T: Maskable> MaskExt for T {}

#[cfg(test)]
mod tests {
    use super::{mask, try_mask, MaskError, MaskExt, Walker};
    use crate::{Mask, MaskPolicy, Maskable};

    #[derive(Mask)]
    struct Card {
        #[mask(style = Full, visible_count = 4)]
        number: String,
        holder: String,
        label: Option<String>,
    }

    fn card() -> Card {
        Card {
            number: "4111111111111111".to_string(),
            holder: "Jane Doe".to_string(),
            label: None,
        }
    }

    struct Exploding;

    impl Maskable for Exploding {
        fn mask_with(&mut self, _walker: &mut Walker<'_>) -> Result<(), MaskError> {
            panic!("custom impl failed");
        }
    }

    #[test]
    fn declared_fields_use_their_policy() {
        let mut value = card();
        mask(&mut value, None);
        assert_eq!(value.number, "************1111");
        assert_eq!(value.holder, "Jane Doe");
    }

    #[test]
    fn fallback_covers_undeclared_text() {
        let mut value = card();
        value.mask_or(&MaskPolicy::full(0));
        assert_eq!(value.number, "************1111");
        assert_eq!(value.holder, "********");
        assert_eq!(value.label, None);
    }

    #[test]
    fn blank_text_is_left_alone() {
        let mut value = card();
        value.holder = "   ".to_string();
        value.mask_or(&MaskPolicy::full(0));
        assert_eq!(value.holder, "   ");
    }

    #[test]
    fn masked_consumes_and_returns() {
        let value = card().masked();
        assert_eq!(value.number, "************1111");
    }

    #[test]
    fn walker_skips_repeated_identity() {
        let policy = MaskPolicy::regex(".{2}").unwrap();
        let mut value = "abcd".to_string();
        let mut walker = Walker::new(Some(&policy));
        walker.visit(&mut value).unwrap();
        walker.visit(&mut value).unwrap();
        assert_eq!(value, "**");
    }

    #[test]
    fn inert_values_are_not_recorded() {
        let mut values = vec![1_u64, 2, 3];
        let mut bytes = Some(vec![0_u8; 16]);
        let policy = MaskPolicy::full(0);
        let mut walker = Walker::new(Some(&policy));
        walker.visit(&mut values).unwrap();
        walker.visit(&mut bytes).unwrap();
        // Only the containers are recorded: the two vectors and the option.
        assert_eq!(walker.visited.len(), 3);
    }

    #[test]
    fn enter_shared_reports_first_entry_only() {
        let mut walker = Walker::new(None);
        let node = std::rc::Rc::new(1_u8);
        assert!(walker.enter_shared(std::rc::Rc::as_ptr(&node)));
        assert!(!walker.enter_shared(std::rc::Rc::as_ptr(&node)));
    }

    #[test]
    fn panics_are_contained() {
        let mut value = vec![Exploding];
        let _ = mask(&mut value, None);
        assert_eq!(value.len(), 1);
    }

    #[test]
    fn errors_are_surfaced_by_try_mask() {
        let lock = std::sync::Arc::new(std::sync::Mutex::new("ab".to_string()));
        let poisoner = std::sync::Arc::clone(&lock);
        let _ = std::thread::spawn(move || {
            let _guard = poisoner.lock().unwrap();
            panic!("poison");
        })
        .join();

        let mut handle = std::sync::Arc::clone(&lock);
        let err = try_mask(&mut handle, Some(&MaskPolicy::full(0))).unwrap_err();
        assert!(matches!(err, MaskError::Poisoned { .. }));
        assert!(err.to_string().contains("poisoned"));

        // Fail-open entry point returns the value instead.
        let _ = mask(&mut handle, Some(&MaskPolicy::full(0)));
    }
}

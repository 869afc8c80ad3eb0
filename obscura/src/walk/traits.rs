//! Types that can be walked and types that can be masked.
//!
//! - [`Maskable`]: anything the walker can visit (records, containers, shared
//!   nodes, raw strings, and inert scalars)
//! - [`MaskRecord`]: records deriving `Mask`, which expose a descriptor table
//! - [`MaskableText`]: string-like field values a policy can be applied to
//!
//! ## Container Implementations
//!
//! Containers visit each element. Map keys are never touched. Interior-mutable
//! cells reached by `&mut` are entered through `get_mut`; shared handles
//! (`Rc<RefCell<_>>`, `Arc<Mutex<_>>`, ...) are deduplicated by their
//! allocation before they are borrowed or locked, which is what keeps cyclic
//! graphs finite.

use std::{
    any::{type_name, TypeId},
    borrow::Cow,
    cell::RefCell,
    collections::{BTreeMap, HashMap, VecDeque},
    rc::{self, Rc},
    sync::{self, Arc, Mutex, RwLock},
    time::{Duration, Instant, SystemTime},
};

use tracing::trace;

use super::{
    descriptor::{FieldDescriptor, FieldMut},
    walker::{MaskError, Walker},
};
use crate::policy::PolicyError;

// =============================================================================
// MaskableText - string-like leaf values
// =============================================================================

/// String-like values a policy can be applied to.
///
/// `text` returns `None` when there is nothing to mask (an absent optional).
pub trait MaskableText {
    /// Read-only view of the current value.
    fn text(&self) -> Option<&str>;
    /// Replaces the value with its masked form.
    fn set_text(&mut self, masked: String);
}

impl MaskableText for String {
    fn text(&self) -> Option<&str> {
        Some(self.as_str())
    }

    fn set_text(&mut self, masked: String) {
        *self = masked;
    }
}

impl MaskableText for Cow<'static, str> {
    fn text(&self) -> Option<&str> {
        Some(self.as_ref())
    }

    fn set_text(&mut self, masked: String) {
        *self = Cow::Owned(masked);
    }
}

impl<T> MaskableText for Option<T>
where
    T: MaskableText,
{
    fn text(&self) -> Option<&str> {
        self.as_ref().and_then(MaskableText::text)
    }

    fn set_text(&mut self, masked: String) {
        if let Some(inner) = self {
            inner.set_text(masked);
        }
    }
}

// =============================================================================
// Maskable - anything the walker can visit
// =============================================================================

/// A value the walker can visit.
///
/// Derive it with `#[derive(Mask)]` for your own types. Implementations for
/// std containers, shared nodes, strings, and scalars are provided.
///
/// Hand-written implementations should visit children through
/// [`Walker::visit`] so the cycle guard sees them.
#[diagnostic::on_unimplemented(
    message = "`{Self}` does not implement `Maskable`",
    label = "this type cannot be walked for maskable fields",
    note = "use `#[derive(Mask)]` on the type definition",
    note = "or mark the field with `#[mask(skip)]` to leave it out"
)]
pub trait Maskable: 'static {
    /// Masks this value in place.
    fn mask_with(&mut self, walker: &mut Walker<'_>) -> Result<(), MaskError>;

    /// `true` when `mask_with` never touches anything; the walker then
    /// skips the value without recording it.
    #[doc(hidden)]
    fn is_inert(&self) -> bool {
        false
    }

    #[doc(hidden)]
    fn type_key(&self) -> TypeId {
        TypeId::of::<Self>()
    }

    #[doc(hidden)]
    fn type_name(&self) -> &'static str {
        type_name::<Self>()
    }
}

/// A record type with a field descriptor table, generated by `#[derive(Mask)]`.
pub trait MaskRecord: Maskable + Sized {
    /// Builds the descriptor table for this type. Called once per type by the cache.
    fn describe() -> Result<Vec<FieldDescriptor>, PolicyError>;

    /// Mutable access to the field at `index`, or `None` when the slot does
    /// not exist on this value (an enum variant that is not active).
    fn field_mut(&mut self, index: usize) -> Option<FieldMut<'_>>;
}

// =============================================================================
// Maskable implementations for standard library types
// =============================================================================

macro_rules! impl_maskable_inert {
    ($($ty:ty),* $(,)?) => {
        $(
            impl Maskable for $ty {
                fn mask_with(&mut self, _walker: &mut Walker<'_>) -> Result<(), MaskError> {
                    Ok(())
                }

                fn is_inert(&self) -> bool {
                    true
                }
            }
        )*
    };
}

impl_maskable_inert!(
    bool, char, i8, i16, i32, i64, i128, isize, u8, u16, u32, u64, u128, usize, f32, f64, (),
    Duration, Instant, SystemTime,
);

// Tuples are anonymous shapes: they cannot carry field declarations.
macro_rules! impl_maskable_anonymous {
    ($(($($name:ident),+)),* $(,)?) => {
        $(
            impl<$($name: 'static),+> Maskable for ($($name,)+) {
                fn mask_with(&mut self, _walker: &mut Walker<'_>) -> Result<(), MaskError> {
                    trace!(type_name = type_name::<Self>(), "skipping anonymous shape");
                    Ok(())
                }
            }
        )*
    };
}

impl_maskable_anonymous!((A), (A, B), (A, B, C), (A, B, C, D), (A, B, C, D, E), (A, B, C, D, E, F));

impl Maskable for String {
    fn mask_with(&mut self, walker: &mut Walker<'_>) -> Result<(), MaskError> {
        walker.mask_element(self);
        Ok(())
    }
}

impl Maskable for Cow<'static, str> {
    fn mask_with(&mut self, walker: &mut Walker<'_>) -> Result<(), MaskError> {
        walker.mask_element(self);
        Ok(())
    }
}

impl<T> Maskable for Option<T>
where
    T: Maskable,
{
    fn mask_with(&mut self, walker: &mut Walker<'_>) -> Result<(), MaskError> {
        match self {
            Some(value) => walker.visit(value),
            None => Ok(()),
        }
    }
}

impl<T> Maskable for Box<T>
where
    T: Maskable,
{
    fn mask_with(&mut self, walker: &mut Walker<'_>) -> Result<(), MaskError> {
        walker.visit(&mut **self)
    }
}

impl<T> Maskable for Vec<T>
where
    T: Maskable,
{
    fn mask_with(&mut self, walker: &mut Walker<'_>) -> Result<(), MaskError> {
        self.iter_mut().try_for_each(|value| walker.visit(value))
    }
}

impl<T> Maskable for VecDeque<T>
where
    T: Maskable,
{
    fn mask_with(&mut self, walker: &mut Walker<'_>) -> Result<(), MaskError> {
        self.iter_mut().try_for_each(|value| walker.visit(value))
    }
}

impl<T, const N: usize> Maskable for [T; N]
where
    T: Maskable,
{
    fn mask_with(&mut self, walker: &mut Walker<'_>) -> Result<(), MaskError> {
        self.iter_mut().try_for_each(|value| walker.visit(value))
    }
}

impl<K, V, S> Maskable for HashMap<K, V, S>
where
    K: 'static,
    V: Maskable,
    S: 'static,
{
    fn mask_with(&mut self, walker: &mut Walker<'_>) -> Result<(), MaskError> {
        self.values_mut().try_for_each(|value| walker.visit(value))
    }
}

impl<K, V> Maskable for BTreeMap<K, V>
where
    K: 'static,
    V: Maskable,
{
    fn mask_with(&mut self, walker: &mut Walker<'_>) -> Result<(), MaskError> {
        self.values_mut().try_for_each(|value| walker.visit(value))
    }
}

impl<T> Maskable for RefCell<T>
where
    T: Maskable,
{
    fn mask_with(&mut self, walker: &mut Walker<'_>) -> Result<(), MaskError> {
        walker.visit(self.get_mut())
    }
}

impl<T> Maskable for Mutex<T>
where
    T: Maskable,
{
    fn mask_with(&mut self, walker: &mut Walker<'_>) -> Result<(), MaskError> {
        let value = self.get_mut().map_err(|_| MaskError::Poisoned {
            type_name: type_name::<T>(),
        })?;
        walker.visit(value)
    }
}

impl<T> Maskable for RwLock<T>
where
    T: Maskable,
{
    fn mask_with(&mut self, walker: &mut Walker<'_>) -> Result<(), MaskError> {
        let value = self.get_mut().map_err(|_| MaskError::Poisoned {
            type_name: type_name::<T>(),
        })?;
        walker.visit(value)
    }
}

// =============================================================================
// Shared nodes
// =============================================================================

impl<T> Maskable for Rc<RefCell<T>>
where
    T: Maskable,
{
    fn mask_with(&mut self, walker: &mut Walker<'_>) -> Result<(), MaskError> {
        if !walker.enter_shared(Rc::as_ptr(self)) {
            return Ok(());
        }
        let mut node = self
            .try_borrow_mut()
            .map_err(|_| MaskError::AlreadyBorrowed {
                type_name: type_name::<T>(),
            })?;
        walker.visit(&mut *node)
    }
}

impl<T> Maskable for rc::Weak<RefCell<T>>
where
    T: Maskable,
{
    fn mask_with(&mut self, walker: &mut Walker<'_>) -> Result<(), MaskError> {
        match self.upgrade() {
            Some(mut node) => node.mask_with(walker),
            None => Ok(()),
        }
    }
}

impl<T> Maskable for Arc<Mutex<T>>
where
    T: Maskable,
{
    fn mask_with(&mut self, walker: &mut Walker<'_>) -> Result<(), MaskError> {
        if !walker.enter_shared(Arc::as_ptr(self)) {
            return Ok(());
        }
        let mut node = self.lock().map_err(|_| MaskError::Poisoned {
            type_name: type_name::<T>(),
        })?;
        walker.visit(&mut *node)
    }
}

impl<T> Maskable for Arc<RwLock<T>>
where
    T: Maskable,
{
    fn mask_with(&mut self, walker: &mut Walker<'_>) -> Result<(), MaskError> {
        if !walker.enter_shared(Arc::as_ptr(self)) {
            return Ok(());
        }
        let mut node = self.write().map_err(|_| MaskError::Poisoned {
            type_name: type_name::<T>(),
        })?;
        walker.visit(&mut *node)
    }
}

impl<T> Maskable for sync::Weak<Mutex<T>>
where
    T: Maskable,
{
    fn mask_with(&mut self, walker: &mut Walker<'_>) -> Result<(), MaskError> {
        match self.upgrade() {
            Some(mut node) => node.mask_with(walker),
            None => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::{
        borrow::Cow,
        cell::RefCell,
        collections::{BTreeMap, HashMap, VecDeque},
        rc::Rc,
        sync::{Arc, Mutex, RwLock},
    };

    use super::MaskableText;
    use crate::{mask, try_mask, MaskError, MaskPolicy};

    fn fallback() -> MaskPolicy {
        MaskPolicy::full(0)
    }

    #[test]
    fn option_text_reports_absence() {
        let mut value: Option<String> = None;
        assert_eq!(value.text(), None);
        value.set_text("masked".to_string());
        assert_eq!(value, None);
    }

    #[test]
    fn cow_text_becomes_owned() {
        let mut value: Cow<'static, str> = Cow::Borrowed("secret");
        value.set_text("******".to_string());
        assert!(matches!(value, Cow::Owned(ref masked) if masked == "******"));
    }

    #[test]
    fn raw_strings_use_fallback() {
        let mut values = vec!["abc".to_string(), "  ".to_string(), String::new()];
        mask(&mut values, Some(&fallback()));
        assert_eq!(values, ["***", "  ", ""]);
    }

    #[test]
    fn raw_strings_without_fallback_are_untouched() {
        let mut values = vec!["abc".to_string()];
        mask(&mut values, None);
        assert_eq!(values, ["abc"]);
    }

    #[test]
    fn nested_containers_are_walked() {
        let mut values: VecDeque<Option<Box<String>>> =
            VecDeque::from([Some(Box::new("abc".to_string())), None]);
        mask(&mut values, Some(&fallback()));
        assert_eq!(values[0].as_deref().map(String::as_str), Some("***"));
        assert!(values[1].is_none());
    }

    #[test]
    fn map_values_are_masked_and_keys_are_not() {
        let mut map = HashMap::from([("key".to_string(), "value".to_string())]);
        mask(&mut map, Some(&fallback()));
        assert_eq!(map["key"], "*****");

        let mut map = BTreeMap::from([("key".to_string(), vec!["ab".to_string()])]);
        mask(&mut map, Some(&fallback()));
        assert_eq!(map["key"], ["**"]);
    }

    #[test]
    fn arrays_are_walked() {
        let mut values = ["ab".to_string(), "cd".to_string()];
        mask(&mut values, Some(&fallback()));
        assert_eq!(values, ["**", "**"]);
    }

    #[test]
    fn tuples_are_skipped() {
        let mut values = vec![("secret".to_string(), 1_u8)];
        mask(&mut values, Some(&fallback()));
        assert_eq!(values[0].0, "secret");
    }

    #[test]
    fn cells_and_locks_are_entered() {
        let mut cell = RefCell::new("ab".to_string());
        mask(&mut cell, Some(&fallback()));
        assert_eq!(*cell.borrow(), "**");

        let mut lock = Mutex::new("ab".to_string());
        mask(&mut lock, Some(&fallback()));
        assert_eq!(*lock.lock().unwrap(), "**");

        let mut lock = RwLock::new("ab".to_string());
        mask(&mut lock, Some(&fallback()));
        assert_eq!(*lock.read().unwrap(), "**");
    }

    #[test]
    fn shared_handles_to_one_node_mask_it_once() {
        let node = Rc::new(RefCell::new("abcdefghij".to_string()));
        let mut handles = vec![Rc::clone(&node), Rc::clone(&node)];
        // Regex collapse would shrink the value again on a second pass.
        let policy = MaskPolicy::regex(".{2}").unwrap();
        mask(&mut handles, Some(&policy));
        assert_eq!(*node.borrow(), "*****");
    }

    #[test]
    fn arc_nodes_are_locked_and_deduplicated() {
        let node = Arc::new(Mutex::new("abcd".to_string()));
        let mut handles = vec![Arc::clone(&node), Arc::clone(&node)];
        let policy = MaskPolicy::regex(".{2}").unwrap();
        mask(&mut handles, Some(&policy));
        assert_eq!(*node.lock().unwrap(), "**");

        let node = Arc::new(RwLock::new("abcd".to_string()));
        let mut handles = vec![Arc::clone(&node), Arc::clone(&node)];
        mask(&mut handles, Some(&policy));
        assert_eq!(*node.read().unwrap(), "**");
    }

    #[test]
    fn weak_handles_follow_live_nodes() {
        let node = Rc::new(RefCell::new("ab".to_string()));
        let mut weak = Rc::downgrade(&node);
        mask(&mut weak, Some(&fallback()));
        assert_eq!(*node.borrow(), "**");

        drop(node);
        assert!(try_mask(&mut weak, Some(&fallback())).is_ok());
    }

    #[test]
    fn node_borrowed_elsewhere_is_reported() {
        let node = Rc::new(RefCell::new("ab".to_string()));
        let _guard = node.borrow();
        let mut handle = Rc::clone(&node);
        let err = try_mask(&mut handle, Some(&fallback())).unwrap_err();
        assert!(matches!(err, MaskError::AlreadyBorrowed { .. }));
    }
}

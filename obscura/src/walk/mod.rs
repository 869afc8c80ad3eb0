//! Object-graph traversal and policy resolution.
//!
//! - **`traits`**: what can be walked (`Maskable`, `MaskRecord`) and what can be
//!   masked (`MaskableText`), plus impls for std containers and shared nodes
//! - **`descriptor`**: per-field metadata emitted by `#[derive(Mask)]`
//! - **`cache`**: process-wide memoization of descriptor tables
//! - **`walker`**: the cycle-safe visitor and the `mask` entrypoints

mod cache;
mod descriptor;
mod traits;
mod walker;

pub use cache::fields_of;
pub use descriptor::{FieldDescriptor, FieldKind, FieldMut};
pub use traits::{MaskRecord, Maskable, MaskableText};
pub use walker::{mask, try_mask, MaskError, MaskExt, Walker};

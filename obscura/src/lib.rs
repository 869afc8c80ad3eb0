//! Declarative masking of sensitive strings inside object graphs.
//!
//! This crate separates:
//! - **Policy**: how one string is masked ([`MaskPolicy`], [`engine`]).
//! - **Declaration**: which fields are sensitive (`#[derive(Mask)]`).
//! - **Traversal**: walking a value graph, cycles included, and applying the
//!   resolved policy to every text field it reaches ([`mask`]).
//!
//! Key rules:
//! - `#[mask(style = ..., ...)]` declares a policy on a string-like field.
//! - `#[mask(skip)]` leaves a field out of the walk.
//! - Undeclared text is masked only when the caller passes a fallback policy.
//! - Other eligible fields are walked recursively; scalars, byte buffers, and
//!   temporal values are never touched.
//! - Masking happens in place. The entry point never fails: errors and panics
//!   are logged and the partially masked value is returned.
//!
//! ```ignore
//! use obscura::{Mask, MaskExt};
//!
//! #[derive(Mask)]
//! struct Customer {
//!     #[mask(style = Email, visible_count = 2)]
//!     email: String,
//!     #[mask(style = Full, visible_count = 4)]
//!     card: String,
//! }
//!
//! let mut customer = load_customer();
//! customer.mask();
//! ```
//!
//! Eligibility is decided from the declared type's name, so the derive cannot
//! tell a plain enum from a record. A field whose type is a user enum must
//! derive `Mask` itself (a fieldless enum then walks as a no-op) or be marked
//! `#[mask(skip)]`:
//!
//! ```compile_fail,E0277
//! use obscura::Mask;
//!
//! enum Role {
//!     Admin,
//!     Member,
//! }
//!
//! #[derive(Mask)]
//! struct Account {
//!     login: String,
//!     role: Role,
//! }
//! ```
//!
//! What it does not do:
//! - install a logging subscriber; events go through `tracing`
//! - mask map keys, set members, or tuple elements
//! - restore original values
//!
//! Structured logging of masked values through `slog` lives behind the `slog`
//! feature.

// <https://doc.rust-lang.org/rustc/lints/listing/allowed-by-default.html>
#![warn(
    anonymous_parameters,
    bare_trait_objects,
    elided_lifetimes_in_paths,
    missing_copy_implementations,
    rust_2018_idioms,
    trivial_casts,
    trivial_numeric_casts,
    unreachable_pub,
    unsafe_code,
    unused_extern_crates,
    unused_import_braces
)]
// <https://rust-lang.github.io/rust-clippy/stable>
#![warn(
    clippy::all,
    clippy::cargo,
    clippy::dbg_macro,
    clippy::float_cmp_const,
    clippy::get_unwrap,
    clippy::mem_forget,
    clippy::nursery,
    clippy::pedantic,
    clippy::todo,
    clippy::unwrap_used,
    clippy::uninlined_format_args
)]
// Allow some clippy lints
#![allow(
    clippy::default_trait_access,
    clippy::doc_markdown,
    clippy::if_not_else,
    clippy::module_name_repetitions,
    clippy::multiple_crate_versions,
    clippy::must_use_candidate,
    clippy::needless_pass_by_value,
    clippy::use_self,
    clippy::cargo_common_metadata,
    clippy::missing_errors_doc,
    clippy::enum_glob_use,
    clippy::missing_const_for_fn,
    clippy::redundant_pub_crate,
    clippy::option_if_let_else,
    clippy::manual_inspect
)]
// Allow some lints while testing
#![cfg_attr(test, allow(clippy::non_ascii_literal, clippy::unwrap_used))]

pub use obscura_derive::Mask;

// Module declarations
pub mod engine;
mod policy;
#[cfg(feature = "slog")]
pub mod slog;
mod walk;

// Re-exports
pub use policy::{MaskPolicy, MaskPolicyBuilder, MaskStyle, PolicyError, DEFAULT_BLUR_CHAR};
pub use walk::{
    fields_of, mask, try_mask, FieldDescriptor, FieldKind, FieldMut, MaskError, MaskExt,
    MaskRecord, Maskable, MaskableText, Walker,
};

//! Process-wide cache of field descriptor tables.
//!
//! Tables are built once per concrete type from `MaskRecord::describe` and
//! never invalidated: the shape of a type cannot change at runtime.

use std::{
    any::{type_name, TypeId},
    collections::HashMap,
    sync::{Arc, OnceLock},
};

use parking_lot::RwLock;
use tracing::debug;

use super::{descriptor::FieldDescriptor, traits::MaskRecord};
use crate::policy::PolicyError;

type FieldTable = Arc<[FieldDescriptor]>;

static FIELD_TABLES: OnceLock<RwLock<HashMap<TypeId, FieldTable>>> = OnceLock::new();

fn field_tables() -> &'static RwLock<HashMap<TypeId, FieldTable>> {
    FIELD_TABLES.get_or_init(|| RwLock::new(HashMap::new()))
}

/// Returns the eligible fields of `T`, building and caching them on first use.
///
/// Concurrent first calls may each build a table; the first insert wins and
/// every caller receives that table. Build failures are not cached.
pub fn fields_of<T: MaskRecord>() -> Result<Arc<[FieldDescriptor]>, PolicyError> {
    let key = TypeId::of::<T>();
    if let Some(table) = field_tables().read().get(&key) {
        return Ok(Arc::clone(table));
    }

    let built: FieldTable = T::describe()?.into();
    debug!(
        type_name = type_name::<T>(),
        fields = built.len(),
        "built field table"
    );

    let mut tables = field_tables().write();
    Ok(Arc::clone(tables.entry(key).or_insert(built)))
}

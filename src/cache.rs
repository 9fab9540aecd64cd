//! Per-type metadata memoization.

use std::any::{Any, TypeId};
use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::RwLock;
use tracing::{trace, warn};

use crate::config::NamingConvention;
use crate::entity::Entity;
use crate::error::MapperResult;
use crate::metadata::TableMetadata;

type Slot = Arc<dyn Any + Send + Sync>;

/// Compute-once cache of [`TableMetadata`] keyed by entity type.
///
/// Reads share the lock. A miss takes the write lock and re-checks before
/// deriving, so each type is derived at most once and no reader ever sees a
/// partially built entry. Failed derivations are not cached.
pub struct MetadataCache {
    naming: NamingConvention,
    entries: RwLock<HashMap<TypeId, Slot>>,
}

impl MetadataCache {
    pub fn new(naming: NamingConvention) -> Self {
        Self {
            naming,
            entries: RwLock::new(HashMap::new()),
        }
    }

    pub fn naming(&self) -> NamingConvention {
        self.naming
    }

    pub fn get<E: Entity>(&self) -> MapperResult<Arc<TableMetadata<E>>> {
        let key = TypeId::of::<E>();
        if let Some(meta) = self.entries.read().get(&key).and_then(downcast::<E>) {
            trace!(entity = std::any::type_name::<E>(), "metadata cache hit");
            return Ok(meta);
        }

        let mut entries = self.entries.write();
        if let Some(meta) = entries.get(&key).and_then(downcast::<E>) {
            return Ok(meta);
        }
        let meta = match TableMetadata::<E>::derive(self.naming) {
            Ok(meta) => Arc::new(meta),
            Err(e) => {
                warn!(entity = std::any::type_name::<E>(), error = %e, "cannot map entity");
                return Err(e);
            }
        };
        entries.insert(key, meta.clone());
        Ok(meta)
    }

    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }
}

impl Default for MetadataCache {
    fn default() -> Self {
        Self::new(NamingConvention::default())
    }
}

fn downcast<E: Entity>(slot: &Slot) -> Option<Arc<TableMetadata<E>>> {
    slot.clone().downcast::<TableMetadata<E>>().ok()
}

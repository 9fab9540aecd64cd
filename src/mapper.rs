//! CRUD execution for registered entities.

use std::sync::Arc;

use tracing::debug;

use crate::builder::{build_delete, build_insert, build_select_all, build_select_by_id, build_update};
use crate::cache::MetadataCache;
use crate::config::MapperConfig;
use crate::entity::Entity;
use crate::error::MapperResult;
use crate::metadata::TableMetadata;
use crate::store::{Row, Session, Store};
use crate::value::Value;

/// Maps entities onto a [`Store`].
///
/// Each operation opens exactly one session and drops it before returning,
/// whether the operation succeeded or not.
pub struct Mapper<S> {
    store: S,
    cache: Arc<MetadataCache>,
}

impl<S: Store> Mapper<S> {
    pub fn new(store: S) -> Self {
        Self::with_config(store, MapperConfig::default())
    }

    pub fn with_config(store: S, config: MapperConfig) -> Self {
        Self {
            store,
            cache: Arc::new(MetadataCache::new(config.naming)),
        }
    }

    /// Shares an existing cache, e.g. between mappers over different stores.
    pub fn with_cache(store: S, cache: Arc<MetadataCache>) -> Self {
        Self { store, cache }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn cache(&self) -> &Arc<MetadataCache> {
        &self.cache
    }

    pub fn metadata<E: Entity>(&self) -> MapperResult<Arc<TableMetadata<E>>> {
        self.cache.get::<E>()
    }

    /// Inserts `entity`. For auto-increment tables the key reported by the
    /// store is written back into the entity's key field.
    pub fn create<E: Entity>(&self, entity: &mut E) -> MapperResult<()> {
        let meta = self.metadata::<E>()?;
        let stmt = build_insert(&*meta, entity)?;

        let insertion = {
            let mut session = self.store.session()?;
            session.insert(&stmt.sql, &stmt.args)?
        };
        debug!(
            table = meta.table_name(),
            rows = insertion.rows_affected,
            key = ?insertion.generated_key,
            "inserted entity"
        );

        if meta.auto_increment() {
            if let (Some(key), Some(value)) = (meta.primary_key(), insertion.generated_key) {
                key.write_value(entity, value)?;
            }
        }
        Ok(())
    }

    /// Updates the row targeted by the entity's key and returns the number of
    /// rows affected.
    pub fn update<E: Entity>(&self, entity: &E) -> MapperResult<usize> {
        let meta = self.metadata::<E>()?;
        let stmt = build_update(&*meta, entity)?;

        let mut session = self.store.session()?;
        let rows = session.execute(&stmt.sql, &stmt.args)?;
        debug!(table = meta.table_name(), rows, "updated entity");
        Ok(rows)
    }

    /// Deletes the row targeted by the entity's key. Returns `false` without
    /// touching the store when the key is null.
    pub fn delete<E: Entity>(&self, entity: &E) -> MapperResult<bool> {
        let meta = self.metadata::<E>()?;
        let Some(stmt) = build_delete(&*meta, entity)? else {
            debug!(table = meta.table_name(), "skipping delete of entity without key");
            return Ok(false);
        };

        let mut session = self.store.session()?;
        let rows = session.execute(&stmt.sql, &stmt.args)?;
        debug!(table = meta.table_name(), rows, "deleted entity");
        Ok(rows > 0)
    }

    pub fn get_by_id<E: Entity + Default>(&self, key: impl Into<Value>) -> MapperResult<Option<E>> {
        let meta = self.metadata::<E>()?;
        let stmt = build_select_by_id(&*meta, key.into())?;

        let rows = {
            let mut session = self.store.session()?;
            session.query(&stmt.sql, &stmt.args)?
        };
        rows.into_iter().next().map(|row| hydrate(&*meta, row)).transpose()
    }

    pub fn get_list<E: Entity + Default>(&self) -> MapperResult<Vec<E>> {
        let meta = self.metadata::<E>()?;
        let stmt = build_select_all(&*meta);

        let rows = {
            let mut session = self.store.session()?;
            session.query(&stmt.sql, &stmt.args)?
        };
        rows.into_iter().map(|row| hydrate(&*meta, row)).collect()
    }

    /// Runs caller-supplied SQL and hydrates every returned row as `E`.
    ///
    /// Result columns are matched to the entity's columns by name; columns the
    /// entity does not map are skipped.
    pub fn query<E: Entity + Default>(&self, sql: &str, args: &[Value]) -> MapperResult<Vec<E>> {
        let meta = self.metadata::<E>()?;

        let rows = {
            let mut session = self.store.session()?;
            session.query(sql, args)?
        };
        debug!(table = meta.table_name(), rows = rows.len(), "queried entities");
        rows.into_iter().map(|row| hydrate(&*meta, row)).collect()
    }

    /// Like [`query`](Self::query), keeping only the first row.
    pub fn query_one<E: Entity + Default>(
        &self,
        sql: &str,
        args: &[Value],
    ) -> MapperResult<Option<E>> {
        let meta = self.metadata::<E>()?;

        let rows = {
            let mut session = self.store.session()?;
            session.query(sql, args)?
        };
        rows.into_iter().next().map(|row| hydrate(&*meta, row)).transpose()
    }
}

fn hydrate<E: Entity + Default>(meta: &TableMetadata<E>, row: Row) -> MapperResult<E> {
    let mut entity = E::default();
    for (column, value) in row.into_pairs() {
        if let Some(mapping) = meta.column(&column) {
            mapping.write_value(&mut entity, value)?;
        }
    }
    Ok(entity)
}

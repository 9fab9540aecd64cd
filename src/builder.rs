//! SQL synthesis for single-entity statements.
//!
//! Every builder is pure: it reads the entity through the metadata accessors
//! and returns SQL text with one `?` per bound argument, in binding order.

use crate::error::{MapperError, MapperResult};
use crate::metadata::{ColumnMapping, TableMetadata};
use crate::value::Value;

/// SQL text with its positional arguments.
#[derive(Debug, Clone, PartialEq)]
pub struct SqlStatement {
    pub sql: String,
    pub args: Vec<Value>,
}

impl SqlStatement {
    pub fn new(sql: impl Into<String>, args: Vec<Value>) -> Self {
        Self {
            sql: sql.into(),
            args,
        }
    }

    pub fn placeholder_count(&self) -> usize {
        self.sql.matches('?').count()
    }
}

pub fn build_insert<E>(meta: &TableMetadata<E>, entity: &E) -> MapperResult<SqlStatement> {
    let mut names = Vec::new();
    let mut args = Vec::new();
    for col in meta.insert_columns() {
        names.push(col.column_name());
        args.push(col.read_value(entity, true)?);
    }
    if names.is_empty() {
        return Err(MapperError::sql_build(format!(
            "nothing to insert into '{}'",
            meta.table_name()
        )));
    }

    let sql = format!(
        "INSERT INTO {} ({}) VALUES ({})",
        meta.table_name(),
        names.join(","),
        vec!["?"; names.len()].join(",")
    );
    Ok(SqlStatement::new(sql, args))
}

/// Builds `UPDATE .. SET .. WHERE key = ?`. The key is never assigned; its
/// value is bound last.
pub fn build_update<E>(meta: &TableMetadata<E>, entity: &E) -> MapperResult<SqlStatement> {
    let key = require_key(meta, "update")?;

    let mut sets = Vec::new();
    let mut args = Vec::new();
    for col in meta.update_columns() {
        sets.push(format!("{} = ?", col.column_name()));
        args.push(col.read_value(entity, true)?);
    }
    if sets.is_empty() {
        return Err(MapperError::sql_build(format!(
            "'{}' has no columns besides its primary key to update",
            meta.table_name()
        )));
    }
    args.push(key.read_value(entity, false)?);

    let sql = format!(
        "UPDATE {} SET {} WHERE {} = ?",
        meta.table_name(),
        sets.join(", "),
        key.column_name()
    );
    Ok(SqlStatement::new(sql, args))
}

/// Builds `DELETE .. WHERE key = ?`, or `None` when the entity's key is null.
pub fn build_delete<E>(meta: &TableMetadata<E>, entity: &E) -> MapperResult<Option<SqlStatement>> {
    let key = require_key(meta, "delete")?;
    let value = key.read_value(entity, true)?;
    if value.is_null() {
        return Ok(None);
    }

    let sql = format!(
        "DELETE FROM {} WHERE {} = ?",
        meta.table_name(),
        key.column_name()
    );
    Ok(Some(SqlStatement::new(sql, vec![value])))
}

pub fn build_select_by_id<E>(meta: &TableMetadata<E>, key: Value) -> MapperResult<SqlStatement> {
    let key_column = require_key(meta, "select by id")?;
    if key.is_null() {
        return Err(MapperError::sql_build(format!(
            "null primary key for '{}'",
            meta.table_name()
        )));
    }

    let sql = format!(
        "{} WHERE {} = ?",
        select_all_sql(meta),
        key_column.column_name()
    );
    Ok(SqlStatement::new(sql, vec![key]))
}

pub fn build_select_all<E>(meta: &TableMetadata<E>) -> SqlStatement {
    SqlStatement::new(select_all_sql(meta), Vec::new())
}

fn select_all_sql<E>(meta: &TableMetadata<E>) -> String {
    let names: Vec<_> = meta.columns().iter().map(ColumnMapping::column_name).collect();
    format!("SELECT {} FROM {}", names.join(", "), meta.table_name())
}

fn require_key<'m, E>(meta: &'m TableMetadata<E>, op: &str) -> MapperResult<&'m ColumnMapping<E>> {
    meta.primary_key().ok_or_else(|| {
        MapperError::sql_build(format!(
            "cannot {op} '{}': no primary key declared",
            meta.table_name()
        ))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::NamingConvention;
    use crate::entity::{Entity, FieldDef};
    use crate::field;

    #[derive(Debug, Default)]
    struct Tag {
        id: Option<i64>,
    }

    impl Entity for Tag {
        const AUTO_INCREMENT: bool = true;

        fn fields() -> Vec<FieldDef<Self>> {
            vec![field!(Tag, id).primary_key()]
        }
    }

    #[derive(Debug, Default)]
    struct AuditLine {
        message: String,
    }

    impl Entity for AuditLine {
        fn fields() -> Vec<FieldDef<Self>> {
            vec![field!(AuditLine, message)]
        }
    }

    #[test]
    fn insert_with_only_generated_key_fails() {
        let meta = TableMetadata::<Tag>::derive(NamingConvention::Lowercase).unwrap();
        let err = build_insert(&meta, &Tag::default()).unwrap_err();
        assert!(matches!(err, MapperError::SqlBuild(_)));
    }

    #[test]
    fn update_with_only_key_fails() {
        let meta = TableMetadata::<Tag>::derive(NamingConvention::Lowercase).unwrap();
        let err = build_update(&meta, &Tag { id: Some(1) }).unwrap_err();
        assert!(err.to_string().contains("no columns besides its primary key"));
    }

    #[test]
    fn keyless_table_inserts_but_cannot_be_targeted() {
        let meta = TableMetadata::<AuditLine>::derive(NamingConvention::Lowercase).unwrap();
        let line = AuditLine {
            message: "boot".into(),
        };
        let insert = build_insert(&meta, &line).unwrap();
        assert_eq!(insert.sql, "INSERT INTO auditline (message) VALUES (?)");

        assert!(matches!(build_update(&meta, &line), Err(MapperError::SqlBuild(_))));
        assert!(matches!(build_delete(&meta, &line), Err(MapperError::SqlBuild(_))));
    }

    #[test]
    fn delete_with_null_key_is_a_no_op() {
        let meta = TableMetadata::<Tag>::derive(NamingConvention::Lowercase).unwrap();
        assert_eq!(build_delete(&meta, &Tag::default()).unwrap(), None);
    }

    #[test]
    fn select_by_id_lists_every_column() {
        let meta = TableMetadata::<Tag>::derive(NamingConvention::Lowercase).unwrap();
        let stmt = build_select_by_id(&meta, Value::Integer(3)).unwrap();
        assert_eq!(stmt.sql, "SELECT id FROM tag WHERE id = ?");
        assert_eq!(stmt.args, vec![Value::Integer(3)]);
        assert!(build_select_by_id(&meta, Value::Null).is_err());
    }
}

//! Table and column metadata derived from an entity's field registrations.

use std::collections::HashSet;

use tracing::debug;

use crate::config::NamingConvention;
use crate::entity::{EnumCodec, Entity, FieldValue, Getter, Setter};
use crate::error::{MapperError, MapperResult};
use crate::value::Value;

/// One field mapped to one column.
pub struct ColumnMapping<E> {
    column_name: String,
    field_name: &'static str,
    is_primary_key: bool,
    enum_codec: EnumCodec,
    getter: Getter<E>,
    setter: Setter<E>,
}

impl<E> ColumnMapping<E> {
    pub fn column_name(&self) -> &str {
        &self.column_name
    }

    pub fn field_name(&self) -> &'static str {
        self.field_name
    }

    pub fn is_primary_key(&self) -> bool {
        self.is_primary_key
    }

    pub fn enum_codec(&self) -> EnumCodec {
        self.enum_codec
    }

    /// Reads the column value from `entity`, encoding enum members with the
    /// column's codec. A null value fails unless `allow_null` is set.
    pub fn read_value(&self, entity: &E, allow_null: bool) -> MapperResult<Value> {
        let value = match (self.getter)(entity) {
            FieldValue::Value(value) => value,
            FieldValue::Enum(member) => {
                let Some(ordinal) = member.ordinal else {
                    return Err(MapperError::sql_build(format!(
                        "field '{}' holds enum member '{}' missing from its variants",
                        self.field_name, member.name
                    )));
                };
                match self.enum_codec {
                    EnumCodec::ToString => Value::Text(member.name.to_string()),
                    EnumCodec::Ordinal => {
                        let ordinal = i64::try_from(ordinal).map_err(|e| {
                            MapperError::sql_build(format!(
                                "ordinal of field '{}' does not fit a column: {e}",
                                self.field_name
                            ))
                        })?;
                        Value::Integer(ordinal)
                    }
                }
            }
        };
        if value.is_null() && !allow_null {
            return Err(MapperError::sql_build(format!(
                "field '{}' (column '{}') is null",
                self.field_name, self.column_name
            )));
        }
        Ok(value)
    }

    /// Assigns a store value to the field, converting it to the field's type.
    pub fn write_value(&self, entity: &mut E, value: Value) -> MapperResult<()> {
        (self.setter)(entity, value).map_err(|e| match e {
            MapperError::SqlBuild(msg) => MapperError::sql_build(format!(
                "cannot assign column '{}' to field '{}': {msg}",
                self.column_name, self.field_name
            )),
            other => other,
        })
    }
}

impl<E> std::fmt::Debug for ColumnMapping<E> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ColumnMapping")
            .field("column_name", &self.column_name)
            .field("field_name", &self.field_name)
            .field("is_primary_key", &self.is_primary_key)
            .field("enum_codec", &self.enum_codec)
            .finish()
    }
}

/// Mapping of an entity type onto its table.
#[derive(Debug)]
pub struct TableMetadata<E> {
    table_name: String,
    auto_increment: bool,
    primary_key: Option<usize>,
    columns: Vec<ColumnMapping<E>>,
}

impl<E: Entity> TableMetadata<E> {
    /// Builds the mapping from `E::fields()`.
    ///
    /// Column names resolve as: explicit column, then explicit key column,
    /// then the field name passed through `naming`. Ignored fields are dropped.
    /// Fails when no column remains, when more than one field is flagged as
    /// primary key, when two fields share a column, or when an auto-increment
    /// table has no key.
    pub fn derive(naming: NamingConvention) -> MapperResult<Self> {
        let table_name = match E::TABLE {
            Some(name) => name.to_string(),
            None => naming.apply(short_type_name::<E>()),
        };

        let mut columns = Vec::new();
        let mut primary_key = None;
        let mut seen = HashSet::new();

        for def in E::fields() {
            if def.ignore {
                continue;
            }
            let column_name = def
                .column
                .or(def.key_column)
                .map(str::to_string)
                .unwrap_or_else(|| naming.apply(def.name));

            if !seen.insert(column_name.clone()) {
                return Err(MapperError::metadata(format!(
                    "table '{table_name}': column '{column_name}' is mapped by more than one field"
                )));
            }
            if def.primary_key {
                if let Some(existing) = primary_key {
                    let existing: &ColumnMapping<E> = &columns[existing];
                    return Err(MapperError::metadata(format!(
                        "table '{table_name}': fields '{}' and '{}' are both marked as primary key",
                        existing.field_name, def.name
                    )));
                }
                primary_key = Some(columns.len());
            }

            columns.push(ColumnMapping {
                column_name,
                field_name: def.name,
                is_primary_key: def.primary_key,
                enum_codec: def.enum_codec.unwrap_or_default(),
                getter: def.getter,
                setter: def.setter,
            });
        }

        if columns.is_empty() {
            return Err(MapperError::metadata(format!(
                "table '{table_name}' has no mapped columns"
            )));
        }
        if E::AUTO_INCREMENT && primary_key.is_none() {
            return Err(MapperError::metadata(format!(
                "table '{table_name}' is auto-increment but declares no primary key"
            )));
        }

        debug!(
            table = %table_name,
            columns = columns.len(),
            primary_key = ?primary_key.map(|i| columns[i].column_name.as_str()),
            auto_increment = E::AUTO_INCREMENT,
            "derived table metadata"
        );

        Ok(Self {
            table_name,
            auto_increment: E::AUTO_INCREMENT,
            primary_key,
            columns,
        })
    }
}

impl<E> TableMetadata<E> {
    pub fn table_name(&self) -> &str {
        &self.table_name
    }

    pub fn auto_increment(&self) -> bool {
        self.auto_increment
    }

    pub fn columns(&self) -> &[ColumnMapping<E>] {
        &self.columns
    }

    pub fn primary_key(&self) -> Option<&ColumnMapping<E>> {
        self.primary_key.map(|i| &self.columns[i])
    }

    pub fn primary_key_column_name(&self) -> Option<&str> {
        self.primary_key().map(ColumnMapping::column_name)
    }

    pub fn column(&self, column_name: &str) -> Option<&ColumnMapping<E>> {
        self.columns.iter().find(|c| c.column_name == column_name)
    }

    /// Columns written by INSERT: all of them, minus a store-assigned key.
    pub fn insert_columns(&self) -> impl Iterator<Item = &ColumnMapping<E>> {
        let skip_key = self.auto_increment;
        self.columns
            .iter()
            .filter(move |c| !(skip_key && c.is_primary_key))
    }

    /// Columns assigned by UPDATE's SET clause.
    pub fn update_columns(&self) -> impl Iterator<Item = &ColumnMapping<E>> {
        self.columns.iter().filter(|c| !c.is_primary_key)
    }
}

fn short_type_name<E>() -> &'static str {
    let full = std::any::type_name::<E>();
    let base = full.split('<').next().unwrap_or(full);
    base.rsplit("::").next().unwrap_or(base)
}

//! Entity registration.
//!
//! An entity type describes its fields through an explicit table of
//! [`FieldDef`]s: a getter/setter pair plus the column, primary-key, ignore and
//! enum-codec settings for each field. The [`field!`](crate::field) and
//! [`enum_field!`](crate::enum_field) macros generate the accessor pairs.

use serde::{Deserialize, Serialize};

use crate::error::{MapperError, MapperResult};
use crate::value::Value;

/// A data type that maps onto a single table row.
pub trait Entity: Send + Sync + Sized + 'static {
    /// Explicit table name. When `None` the name is derived from the type name.
    const TABLE: Option<&'static str> = None;

    /// Whether the store assigns the primary key on insert.
    const AUTO_INCREMENT: bool = false;

    /// Field registrations in declaration order.
    fn fields() -> Vec<FieldDef<Self>>;
}

/// How an enum member is stored.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EnumCodec {
    /// The member's name as text.
    #[default]
    ToString,
    /// The member's zero-based declaration index as an integer.
    Ordinal,
}

/// A single member of a [`SqlEnum`], as seen by the accessor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EnumMember {
    pub name: &'static str,
    /// Position in [`SqlEnum::variants`], `None` when the member is not listed.
    pub ordinal: Option<usize>,
}

/// A field's raw value before column encoding.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    Value(Value),
    Enum(EnumMember),
}

/// Fieldless enums stored through an [`EnumCodec`].
pub trait SqlEnum: Copy + PartialEq + Sized + 'static {
    /// All members in declaration order.
    fn variants() -> &'static [Self];

    /// Canonical member name.
    fn name(&self) -> &'static str;

    /// Zero-based index in [`variants`](SqlEnum::variants). Fails for a member
    /// the list leaves out.
    fn ordinal(&self) -> MapperResult<usize> {
        self.member().ordinal.ok_or_else(|| {
            MapperError::sql_build(format!(
                "enum member '{}' is missing from its variants",
                self.name()
            ))
        })
    }

    fn member(&self) -> EnumMember {
        EnumMember {
            name: self.name(),
            ordinal: Self::variants().iter().position(|v| v == self),
        }
    }

    /// Accepts either encoding, so columns can be read back regardless of codec.
    fn from_value(value: Value) -> MapperResult<Self> {
        match value {
            Value::Text(name) => Self::variants()
                .iter()
                .find(|v| v.name() == name)
                .copied()
                .ok_or_else(|| MapperError::sql_build(format!("unknown enum member '{name}'"))),
            Value::Integer(i) => usize::try_from(i)
                .ok()
                .and_then(|idx| Self::variants().get(idx))
                .copied()
                .ok_or_else(|| MapperError::sql_build(format!("enum ordinal {i} out of range"))),
            other => Err(MapperError::sql_build(format!(
                "cannot convert {} value to enum",
                other.kind()
            ))),
        }
    }
}

pub type Getter<E> = fn(&E) -> FieldValue;
pub type Setter<E> = fn(&mut E, Value) -> MapperResult<()>;

/// Registration record for one field of an entity.
pub struct FieldDef<E> {
    pub(crate) name: &'static str,
    pub(crate) getter: Getter<E>,
    pub(crate) setter: Setter<E>,
    pub(crate) column: Option<&'static str>,
    pub(crate) primary_key: bool,
    pub(crate) key_column: Option<&'static str>,
    pub(crate) ignore: bool,
    pub(crate) enum_codec: Option<EnumCodec>,
}

impl<E> FieldDef<E> {
    pub fn new(name: &'static str, getter: Getter<E>, setter: Setter<E>) -> Self {
        Self {
            name,
            getter,
            setter,
            column: None,
            primary_key: false,
            key_column: None,
            ignore: false,
            enum_codec: None,
        }
    }

    /// Store the field under an explicit column name.
    pub fn column(mut self, column: &'static str) -> Self {
        self.column = Some(column);
        self
    }

    pub fn primary_key(mut self) -> Self {
        self.primary_key = true;
        self
    }

    /// Mark the field as primary key stored under `column`.
    pub fn primary_key_named(mut self, column: &'static str) -> Self {
        self.primary_key = true;
        self.key_column = Some(column);
        self
    }

    /// Exclude the field from every generated statement.
    pub fn ignore(mut self) -> Self {
        self.ignore = true;
        self
    }

    pub fn enum_codec(mut self, codec: EnumCodec) -> Self {
        self.enum_codec = Some(codec);
        self
    }

    pub fn name(&self) -> &'static str {
        self.name
    }
}

impl<E> std::fmt::Debug for FieldDef<E> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FieldDef")
            .field("name", &self.name)
            .field("column", &self.column)
            .field("primary_key", &self.primary_key)
            .field("key_column", &self.key_column)
            .field("ignore", &self.ignore)
            .field("enum_codec", &self.enum_codec)
            .finish()
    }
}

/// Registers a plain field whose type implements `ToValue` and `FromValue`.
///
/// ```ignore
/// rust_mapper::field!(User, name).column("user_name")
/// ```
#[macro_export]
macro_rules! field {
    ($entity:ty, $name:ident) => {
        $crate::FieldDef::<$entity>::new(
            stringify!($name),
            |e: &$entity| $crate::FieldValue::Value($crate::ToValue::to_value(&e.$name)),
            |e: &mut $entity, v: $crate::Value| {
                e.$name = $crate::FromValue::from_value(v)?;
                Ok(())
            },
        )
    };
}

/// Registers a field whose type implements [`SqlEnum`].
#[macro_export]
macro_rules! enum_field {
    ($entity:ty, $name:ident) => {
        $crate::FieldDef::<$entity>::new(
            stringify!($name),
            |e: &$entity| $crate::FieldValue::Enum($crate::SqlEnum::member(&e.$name)),
            |e: &mut $entity, v: $crate::Value| {
                e.$name = $crate::SqlEnum::from_value(v)?;
                Ok(())
            },
        )
    };
}
